//! 架构相关操作的 Mock 实现

use std::cell::Cell;

thread_local! {
    /// 每个测试线程视为一个 CPU，拥有独立的中断使能状态
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Mock 架构操作
pub struct MockArchOps;

impl MockArchOps {
    pub const fn new() -> Self {
        Self
    }

    pub unsafe fn read_and_disable_interrupts(&self) -> usize {
        INTERRUPTS_ENABLED.with(|state| state.replace(false)) as usize
    }

    pub unsafe fn restore_interrupts(&self, flags: usize) {
        INTERRUPTS_ENABLED.with(|state| state.set(flags != 0));
    }

    /// 当前线程的中断是否处于使能状态
    pub fn interrupts_enabled(&self) -> bool {
        INTERRUPTS_ENABLED.with(|state| state.get())
    }
}

impl Default for MockArchOps {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
