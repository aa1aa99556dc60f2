//! /sys/class 与 /sys/devices/virtual 构建器

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use device::{AttributeGroup, ClassDevice, ClassRegistry, DeviceAttribute};

use crate::error::FsError;
use crate::inode::{SysfsAttr, SysfsInode};

/// 为注册表中的每个设备类构建目录
///
/// 类设备的真实目录在 `/sys/devices/virtual/<class>/<dev>`，
/// `/sys/class/<class>/<dev>` 是指向它的符号链接。
pub fn build_class_devices(root: &Arc<SysfsInode>, classes: &ClassRegistry) -> Result<(), FsError> {
    let class_root = root.lookup("class")?;
    let virtual_root = root.lookup("devices")?.lookup("virtual")?;

    for class in classes.classes() {
        let class_dir = SysfsInode::new_directory();
        class_root.add_child(class.name(), class_dir.clone())?;
        let virtual_dir = SysfsInode::new_directory();
        virtual_root.add_child(class.name(), virtual_dir.clone())?;

        for dev in class.devices() {
            virtual_dir.add_child(dev.name(), build_device_dir(&dev)?)?;

            let target = format!("../../devices/virtual/{}/{}", class.name(), dev.name());
            class_dir.add_child(dev.name(), SysfsInode::new_symlink(target))?;
        }
    }

    Ok(())
}

fn build_device_dir(dev: &Arc<ClassDevice>) -> Result<Arc<SysfsInode>, FsError> {
    let dev_dir = SysfsInode::new_directory();

    for group in dev.groups() {
        let group_dir = match group.name {
            Some(name) => {
                let dir = SysfsInode::new_directory();
                dev_dir.add_child(name, dir.clone())?;
                dir
            }
            None => dev_dir.clone(),
        };
        for attr in group.attrs {
            let inode = SysfsInode::new_attribute(class_attr(dev, group, *attr));
            group_dir.add_child(attr.name, inode)?;
        }
    }

    let uevent = SysfsAttr {
        name: "uevent".to_string(),
        mode: device::AttrMode::RO,
        show: Arc::new(|| Ok(String::new())),
        store: None,
    };
    dev_dir.add_child("uevent", SysfsInode::new_attribute(uevent))?;

    let subsystem = format!("../../../../class/{}", dev.class_name());
    dev_dir.add_child("subsystem", SysfsInode::new_symlink(subsystem))?;

    Ok(dev_dir)
}

/// 把类设备属性包装为 sysfs 属性文件，读写时转发到 [`ClassDevice`]
fn class_attr(
    dev: &Arc<ClassDevice>,
    group: &AttributeGroup,
    attr: &'static DeviceAttribute,
) -> SysfsAttr {
    let path = match group.name {
        Some(group) => format!("{}/{}", group, attr.name),
        None => attr.name.to_string(),
    };

    let show = {
        let dev = dev.clone();
        let path = path.clone();
        Arc::new(move || dev.show(&path).map_err(FsError::from))
    };
    let store = attr.store.map(|_| {
        let dev = dev.clone();
        Arc::new(move |buf: &str| dev.store(&path, buf).map_err(FsError::from))
            as crate::inode::StoreFn
    });

    SysfsAttr {
        name: attr.name.to_string(),
        mode: attr.mode,
        show,
        store,
    }
}
