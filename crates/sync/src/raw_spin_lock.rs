//! 自旋锁实现
//!
//! 基于原子操作实现 `lock_api::RawMutex`，获取锁时保存并屏蔽本地中断，
//! 释放时恢复。

use core::hint;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::intr_guard::{local_irq_restore, local_irq_save};

/// 原始自旋锁
///
/// 不可重入。持锁期间本地中断处于屏蔽状态，嵌套持有多把锁时必须按相反顺序释放。
#[derive(Debug)]
pub struct RawSpinLock {
    locked: AtomicBool,
    /// 获取锁之前的中断状态，仅由持锁者读写
    saved_flags: AtomicUsize,
}

impl RawSpinLock {
    /// 创建一个未加锁的 RawSpinLock
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            saved_flags: AtomicUsize::new(0),
        }
    }

    /// 检查锁是否被占用 (仅用于调试/测试)
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: locked 的 Acquire/Release 保证了互斥，unlock 只会被持锁者调用
unsafe impl lock_api::RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();

    type GuardMarker = lock_api::GuardNoSend;

    fn lock(&self) {
        let mut flags = local_irq_save();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // 自旋等待期间打开中断
            local_irq_restore(flags);
            while self.locked.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
            flags = local_irq_save();
        }
        self.saved_flags.store(flags, Ordering::Relaxed);
    }

    fn try_lock(&self) -> bool {
        let flags = local_irq_save();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.saved_flags.store(flags, Ordering::Relaxed);
            true
        } else {
            local_irq_restore(flags);
            false
        }
    }

    unsafe fn unlock(&self) {
        let flags = self.saved_flags.load(Ordering::Relaxed);
        self.locked.store(false, Ordering::Release);
        local_irq_restore(flags);
    }

    fn is_locked(&self) -> bool {
        RawSpinLock::is_locked(self)
    }
}
