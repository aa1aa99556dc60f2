//! Sysfs 虚拟文件系统
//!
//! 提供与 Linux 兼容的 sysfs 视图，把设备类与类设备属性暴露为文件：
//!
//! ```text
//! /sys
//! ├── class/<class>/<dev> -> ../../devices/virtual/<class>/<dev>
//! └── devices/virtual/<class>/<dev>/
//!     ├── <attr>            属性文件，读写转发到类设备的 show/store
//!     ├── <group>/<attr>    命名属性组
//!     ├── subsystem -> ../../../../class/<class>
//!     └── uevent
//! ```

#![no_std]

extern crate alloc;

mod builders;
pub mod error;
pub mod inode;
mod sysfs;

pub use error::FsError;
pub use inode::{InodeKind, SysfsAttr, SysfsInode};
pub use sysfs::SysFS;

#[cfg(test)]
mod test_util;
#[cfg(test)]
mod tests;
