//! 驱动配置常量

/// 平台驱动名，也用于无设备树时按设备名匹配（`platform:usb_modem_card`）
pub const DRIVER_NAME: &str = "usb_modem_card";

/// 设备类名，对应 `/sys/class/usb_modem_card`
pub const CLASS_NAME: &str = "usb_modem_card";

/// 设备树 compatible
pub const OF_COMPATIBLE: &str = "usb-modem-card";

/// 类设备名
pub const SYS_DEVICE_NAME: &str = "enable";

/// 使能线的 GPIO 连接名，对应设备树属性 `enable-gpios`
pub const ENABLE_CON_ID: &str = "enable";

/// 上电时拉低使能线后保持的时间（毫秒）
pub const POWER_ON_DELAY_MS: u64 = 50;
