//! 设备日志宏
//!
//! 与 Linux `dev_err()` 等接口对应，在消息前加上设备名，底层使用 `log` 门面。
//! 设备参数只需提供 `name()` 方法（[`PlatformDevice`](crate::platform::PlatformDevice)、
//! [`ClassDevice`](crate::class::ClassDevice) 等）。

/// 以 error 级别记录设备日志
#[macro_export]
macro_rules! dev_err {
    ($dev:expr, $($arg:tt)+) => {
        $crate::__log::error!("{}: {}", $dev.name(), format_args!($($arg)+))
    };
}

/// 以 warn 级别记录设备日志
#[macro_export]
macro_rules! dev_warn {
    ($dev:expr, $($arg:tt)+) => {
        $crate::__log::warn!("{}: {}", $dev.name(), format_args!($($arg)+))
    };
}

/// 以 info 级别记录设备日志
#[macro_export]
macro_rules! dev_info {
    ($dev:expr, $($arg:tt)+) => {
        $crate::__log::info!("{}: {}", $dev.name(), format_args!($($arg)+))
    };
}

/// 以 debug 级别记录设备日志
#[macro_export]
macro_rules! dev_dbg {
    ($dev:expr, $($arg:tt)+) => {
        $crate::__log::debug!("{}: {}", $dev.name(), format_args!($($arg)+))
    };
}
