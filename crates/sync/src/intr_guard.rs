//! 中断保护器
//!
//! 注意：禁用中断只能阻止**本地 CPU** 的“任务 vs 本地中断”并发，
//! 并不能阻止其他 CPU 的并行访问；多核共享数据仍需要配合自旋锁等原语。

use crate::arch_ops;

/// 保存当前中断状态并禁用本地中断
#[inline]
pub fn local_irq_save() -> usize {
    // SAFETY: 返回的 flags 由调用者交还给 local_irq_restore
    unsafe { arch_ops().read_and_disable_interrupts() }
}

/// 恢复由 [`local_irq_save`] 保存的中断状态
#[inline]
pub fn local_irq_restore(flags: usize) {
    // SAFETY: flags 来自 local_irq_save
    unsafe { arch_ops().restore_interrupts(flags) };
}

/// 中断保护器，基于 RAII 实现中断保护。
///
/// 创建时禁用中断并保存之前的状态；销毁时恢复。
///
/// # 示例
/// ```ignore
/// {
///     let _guard = IntrGuard::new(); // 禁用中断
///     // 临界区代码
/// } // 离开作用域，自动恢复中断状态
/// ```
pub struct IntrGuard {
    flags: usize,
}

impl IntrGuard {
    /// 禁用中断并返回一个 IntrGuard 实例。
    pub fn new() -> Self {
        Self {
            flags: local_irq_save(),
        }
    }

    /// 进入临界区前保存的中断状态
    pub fn flags(&self) -> usize {
        self.flags
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        local_irq_restore(self.flags);
    }
}
