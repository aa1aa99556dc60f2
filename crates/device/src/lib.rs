//! 平台驱动框架
//!
//! 此 crate 提供平台驱动运行所需的内核子系统，包括：
//!
//! - [`platform`] - 平台设备、[`PlatformDriver`] trait 与 [`PlatformBus`]
//! - [`of`] - 设备树节点模型与 `compatible` 匹配
//! - [`gpio`] - GPIO 控制器注册与描述符接口，以及模拟控制器 [`SimGpioChip`]
//! - [`class`] - 设备类、类设备与设备属性
//! - [`kstrtox`] - `kstrto*()` 语义的整数解析
//! - [`delay`] - 睡眠与时间
//! - `dev_err!` 等设备日志宏
//!
//! # 架构解耦
//!
//! 通过 trait 抽象与内核时钟解耦：
//! - [`TimeOps`]: 睡眠与时间读取
//!
//! 使用前必须调用 [`register_time_ops`] 注册实现，未注册时调用 [`time_ops`] 即 panic。
//! 锁依赖的 `sync::ArchOps` 采用同样的策略，内核启动时两者都要注册。

#![no_std]

extern crate alloc;

pub mod class;
pub mod delay;
pub mod error;
pub mod gpio;
pub mod kstrtox;
mod macros;
pub mod of;
pub mod ops;
pub mod platform;

#[doc(hidden)]
pub use log as __log;

// Re-export ops
pub use ops::{TimeOps, register_time_ops, time_ops};

// Re-export error
pub use error::{DeviceError, Result};

// Re-export class
pub use class::{
    AttrMode, AttributeGroup, CLASS_REGISTRY, Class, ClassDevice, ClassRegistry, DeviceAttribute,
};

// Re-export gpio
pub use gpio::sim::SimGpioChip;
pub use gpio::{GpioChip, GpioDesc, GpioFlags, GpiodFlags};

// Re-export platform
pub use platform::{PLATFORM_BUS, PlatformBus, PlatformDevice, PlatformDriver};

#[cfg(test)]
pub(crate) mod test_util;
