//! 测试支持 crate
//!
//! 提供主机测试使用的 Mock 实现和测试工具：
//!
//! - [`mock::arch::MockArchOps`] - 按线程模拟本地中断状态
//! - [`mock::clock::MockClock`] - `msleep` 立即返回的假单调时钟
//! - [`logger::CaptureLogger`] - 记录格式化日志行的 `log::Log` 实现
//!
//! 这里不直接依赖 `sync` / `device` crate（避免循环依赖），
//! 各 crate 在测试中为这些类型实现自己的 trait。

pub mod logger;
pub mod mock;

use std::sync::atomic::{AtomicUsize, Ordering};

/// 生成测试内唯一的名字，避免并行测试在全局注册表中冲突
pub fn unique_name(prefix: &str) -> String {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    format!("{}{}", prefix, NEXT.fetch_add(1, Ordering::Relaxed))
}
