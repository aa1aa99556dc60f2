//! sysfs 目录树构建器

mod class;

use alloc::sync::Arc;

use device::ClassRegistry;

use crate::error::FsError;
use crate::inode::SysfsInode;

pub use class::build_class_devices;

/// 构建完整的 `/sys` 目录树
pub fn build_tree(classes: &ClassRegistry) -> Result<Arc<SysfsInode>, FsError> {
    let root = SysfsInode::new_directory();

    root.add_child("class", SysfsInode::new_directory())?;
    let devices = SysfsInode::new_directory();
    root.add_child("devices", devices.clone())?;
    devices.add_child("virtual", SysfsInode::new_directory())?;

    build_class_devices(&root, classes)?;

    Ok(root)
}
