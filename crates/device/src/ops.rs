//! 时间操作 trait 定义和注册
//!
//! 此模块定义了 device crate 需要的时间操作接口，通过 trait 抽象实现与内核时钟的解耦。

use core::sync::atomic::{AtomicUsize, Ordering};

/// 时间操作
///
/// 内核需要实现此 trait 并在启动时注册。
pub trait TimeOps: Send + Sync {
    /// 睡眠至少 `ms` 毫秒
    fn msleep(&self, ms: u64);

    /// 启动以来经过的毫秒数
    fn uptime_ms(&self) -> u64;
}

static TIME_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static TIME_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册时间操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_time_ops(ops: &'static dyn TimeOps) {
    let ptr = ops as *const dyn TimeOps;
    // SAFETY: 将 fat pointer 拆分为 data 和 vtable 两部分存储
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn TimeOps, (usize, usize)>(ptr) };
    TIME_OPS_VTABLE.store(vtable, Ordering::Release);
    TIME_OPS_DATA.store(data, Ordering::Release);
}

/// 获取已注册的时间操作实现
///
/// # Panics
/// 如果尚未调用 [`register_time_ops`] 注册实现，则 panic
#[inline]
pub fn time_ops() -> &'static dyn TimeOps {
    let data = TIME_OPS_DATA.load(Ordering::Acquire);
    let vtable = TIME_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("device: TimeOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn TimeOps>((data, vtable)) }
}
