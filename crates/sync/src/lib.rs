//! 同步原语
//!
//! 向驱动框架和驱动提供基本的锁原语：
//!
//! - [`SpinLock`] - 获取时保存并屏蔽本地中断的自旋锁（`spin_lock_irqsave` 语义）
//! - [`RwLock`] - 读多写少场景（注册表等）使用的读写自旋锁
//! - [`IntrGuard`] - 基于 RAII 的中断保护器
//!
//! 两种锁都通过 `lock_api` 的 raw trait 实现，守卫类型直接复用 `lock_api`。
//!
//! # 架构依赖
//!
//! 此 crate 通过 [`ArchOps`] trait 抽象中断控制。
//! 内核在启动时调用 [`register_arch_ops`] 注册实现，未注册时首次加锁即 panic。
//! 主机测试需先注册 mock 实现。

#![no_std]

mod intr_guard;
mod raw_spin_lock;
mod rwlock;

pub use intr_guard::{IntrGuard, local_irq_restore, local_irq_save};
pub use raw_spin_lock::RawSpinLock;
pub use rwlock::RawRwSpinLock;

use core::sync::atomic::{AtomicUsize, Ordering};

/// 保护数据的自旋锁，持锁期间本地中断被屏蔽
pub type SpinLock<T> = lock_api::Mutex<RawSpinLock, T>;

/// 读写自旋锁
pub type RwLock<T> = lock_api::RwLock<RawRwSpinLock, T>;
/// [`RwLock`] 的读守卫
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, RawRwSpinLock, T>;
/// [`RwLock`] 的写守卫
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, RawRwSpinLock, T>;

/// 架构相关操作的 trait
///
/// 由内核实现并注册，提供本地中断控制
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);
}

/// 全局架构操作实例（存储 fat pointer 的两个部分）
static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
    ARCH_OPS_DATA.store(data, Ordering::Release);
}

/// 获取已注册的架构操作实例
///
/// # Panics
/// 如果尚未调用 [`register_arch_ops`] 注册实现，则 panic
#[inline]
pub(crate) fn arch_ops() -> &'static dyn ArchOps {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("sync: ArchOps not registered, call register_arch_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) }
}
