//! Sysfs 错误类型
//!
//! 各错误码对应标准 POSIX errno 值，可通过 [`FsError::to_errno()`] 转换为系统调用错误码。
//! 属性回调返回的 [`DeviceError`] 经 `From` 转换后保持相同的 errno。

use device::DeviceError;

/// Sysfs 错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// 文件不存在 (-ENOENT)
    NotFound,
    /// 已存在 (-EEXIST)
    AlreadyExists,
    /// 不是目录 (-ENOTDIR)
    NotDirectory,
    /// 是目录 (-EISDIR)
    IsDirectory,
    /// 权限被拒绝 (-EACCES)
    PermissionDenied,
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 数值超出范围 (-ERANGE)
    OutOfRange,
    /// I/O 错误 (-EIO)
    IoError,
    /// 设备不存在 (-ENODEV)
    NoDevice,
    /// 资源忙 (-EBUSY)
    Busy,
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
    /// 符号链接层级过多 (-ELOOP)
    TooManySymlinks,
}

impl FsError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::NotFound => -2,
            FsError::IoError => -5,
            FsError::NoMemory => -12,
            FsError::PermissionDenied => -13,
            FsError::Busy => -16,
            FsError::AlreadyExists => -17,
            FsError::NoDevice => -19,
            FsError::NotDirectory => -20,
            FsError::IsDirectory => -21,
            FsError::InvalidArgument => -22,
            FsError::OutOfRange => -34,
            FsError::TooManySymlinks => -40,
            FsError::NotSupported => -95,
        }
    }
}

impl From<DeviceError> for FsError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::NotFound => FsError::NotFound,
            DeviceError::IoError => FsError::IoError,
            DeviceError::NoMemory => FsError::NoMemory,
            DeviceError::Busy => FsError::Busy,
            DeviceError::AlreadyExists => FsError::AlreadyExists,
            DeviceError::NoDevice => FsError::NoDevice,
            DeviceError::InvalidArgument => FsError::InvalidArgument,
            DeviceError::OutOfRange => FsError::OutOfRange,
            DeviceError::NotSupported => FsError::NotSupported,
            // 用户态不应看到 -EPROBE_DEFER
            DeviceError::ProbeDefer => FsError::NoDevice,
        }
    }
}
