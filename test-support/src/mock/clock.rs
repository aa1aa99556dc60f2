//! 时间相关操作的 Mock 实现
//!
//! `msleep` 不真正睡眠，只推进假时钟，测试因此可以检查延时长度而不必等待。

use std::sync::atomic::{AtomicU64, Ordering};

/// 假单调时钟（毫秒）
pub struct MockClock {
    now_ms: AtomicU64,
    slept_ms: AtomicU64,
}

impl MockClock {
    pub const fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(0),
            slept_ms: AtomicU64::new(0),
        }
    }

    /// 推进时钟
    pub fn msleep(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
        self.slept_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// 当前时间
    pub fn uptime_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    /// 累计睡眠时长
    pub fn total_slept_ms(&self) -> u64 {
        self.slept_ms.load(Ordering::SeqCst)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局 Mock 实例
pub static MOCK_CLOCK: MockClock = MockClock::new();
