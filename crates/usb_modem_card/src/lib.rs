//! USB 模块卡平台驱动
//!
//! 控制给 USB 模块卡供电的一根 GPIO 使能线：
//!
//! - 探测时创建设备类 `usb_modem_card` 与类设备 `enable`，
//!   获取设备树 `enable-gpios` 描述的使能线并执行上电时序（拉低、等待 50ms、拉高）
//! - 通过 `/sys/class/usb_modem_card/enable/enable` 读写使能线的逻辑电平，
//!   写入按 `kstrtoint` 解析，非零值视为 1
//! - 移除时销毁设备类，使能线随设备托管资源一起释放
//!
//! 没有使能线或获取失败不会导致探测失败，只有设备类创建失败会。
//!
//! 设备树示例：
//!
//! ```text
//! usb-modem {
//!     compatible = "usb-modem-card";
//!     enable-gpios = <&gpio0 12 GPIO_ACTIVE_HIGH>;
//! };
//! ```

#![no_std]

extern crate alloc;

mod card;
pub mod config;
mod driver;

use alloc::sync::Arc;

use device::{PLATFORM_BUS, PlatformBus, Result};

pub use card::UsbModemCard;
pub use driver::UsbModemCardDriver;

/// 在平台总线上注册驱动
pub fn init(bus: &PlatformBus) -> Result<()> {
    bus.register_driver(Arc::new(UsbModemCardDriver::new()))
}

/// 从平台总线注销驱动
pub fn exit(bus: &PlatformBus) -> Result<()> {
    bus.unregister_driver(config::DRIVER_NAME)
}

/// 内核启动时调用，在全局 [`PLATFORM_BUS`] 上注册驱动
pub fn driver_init() -> Result<()> {
    init(&PLATFORM_BUS)
}

/// 从全局 [`PLATFORM_BUS`] 注销驱动
pub fn driver_exit() -> Result<()> {
    exit(&PLATFORM_BUS)
}

#[cfg(test)]
pub(crate) mod test_util;
