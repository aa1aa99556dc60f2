//! 设备框架错误类型
//!
//! 各错误码对应标准 POSIX errno 值，可通过 [`DeviceError::to_errno()`] 转换。

use core::fmt;

/// 设备框架错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 对象不存在 (-ENOENT)
    NotFound,
    /// I/O 错误 (-EIO)
    IoError,
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 资源忙 (-EBUSY)
    Busy,
    /// 对象已存在 (-EEXIST)
    AlreadyExists,
    /// 设备不存在 (-ENODEV)
    NoDevice,
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 数值超出范围 (-ERANGE)
    OutOfRange,
    /// 操作不支持 (-EOPNOTSUPP)
    NotSupported,
    /// 依赖的资源尚未就绪，稍后重新探测 (-EPROBE_DEFER)
    ProbeDefer,
}

impl DeviceError {
    /// 转换为内核错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            DeviceError::NotFound => -2,
            DeviceError::IoError => -5,
            DeviceError::NoMemory => -12,
            DeviceError::Busy => -16,
            DeviceError::AlreadyExists => -17,
            DeviceError::NoDevice => -19,
            DeviceError::InvalidArgument => -22,
            DeviceError::OutOfRange => -34,
            DeviceError::NotSupported => -95,
            DeviceError::ProbeDefer => -517,
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DeviceError::NotFound => "no such entry",
            DeviceError::IoError => "I/O error",
            DeviceError::NoMemory => "out of memory",
            DeviceError::Busy => "resource busy",
            DeviceError::AlreadyExists => "already exists",
            DeviceError::NoDevice => "no such device",
            DeviceError::InvalidArgument => "invalid argument",
            DeviceError::OutOfRange => "result out of range",
            DeviceError::NotSupported => "operation not supported",
            DeviceError::ProbeDefer => "probe deferred",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

impl core::error::Error for DeviceError {}

/// 设备框架的 Result 别名
pub type Result<T> = core::result::Result<T, DeviceError>;
