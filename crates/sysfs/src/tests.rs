use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;

use device::class::{AttributeGroup, DeviceAttribute};
use device::{
    ClassDevice, ClassRegistry, DeviceError, device_attr_ro, device_attr_rw, device_attr_wo,
};
use sync::SpinLock;

use super::*;
use crate::test_util::init_test_ops;

struct Level(SpinLock<u32>);

fn level_show(dev: &ClassDevice, _attr: &DeviceAttribute) -> device::Result<String> {
    let level = dev.drvdata::<Level>().ok_or(DeviceError::NoDevice)?;
    Ok(format!("{}\n", *level.0.lock()))
}

fn level_store(dev: &ClassDevice, _attr: &DeviceAttribute, buf: &str) -> device::Result<usize> {
    let level = dev.drvdata::<Level>().ok_or(DeviceError::NoDevice)?;
    *level.0.lock() = device::kstrtox::kstrtouint(buf, 0)?;
    Ok(buf.len())
}

fn reset_store(dev: &ClassDevice, _attr: &DeviceAttribute, buf: &str) -> device::Result<usize> {
    let level = dev.drvdata::<Level>().ok_or(DeviceError::NoDevice)?;
    if device::kstrtox::kstrtouint(buf, 0)? != 0 {
        *level.0.lock() = 0;
    }
    Ok(buf.len())
}

fn version_show(_dev: &ClassDevice, _attr: &DeviceAttribute) -> device::Result<String> {
    Ok("1.0\n".to_string())
}

device_attr_rw!(DEV_ATTR_LEVEL, "level", level_show, level_store);
device_attr_ro!(DEV_ATTR_VERSION, "version", version_show);
device_attr_wo!(DEV_ATTR_RESET, "reset", reset_store);

static MAIN_GROUP: AttributeGroup = AttributeGroup {
    name: None,
    attrs: &[&DEV_ATTR_LEVEL, &DEV_ATTR_RESET],
};
static INFO_GROUP: AttributeGroup = AttributeGroup {
    name: Some("info"),
    attrs: &[&DEV_ATTR_VERSION],
};
static GROUPS: [&AttributeGroup; 2] = [&MAIN_GROUP, &INFO_GROUP];

fn registry_with_device() -> (ClassRegistry, Arc<ClassDevice>) {
    init_test_ops();
    let registry = ClassRegistry::new();
    let class = registry.class_create("dimmer").unwrap();
    class.set_dev_groups(&GROUPS);
    let dev = class.device_register("lamp").unwrap();
    dev.set_drvdata(Arc::new(Level(SpinLock::new(3))));
    (registry, dev)
}

#[test]
fn test_tree_layout() {
    let (registry, _dev) = registry_with_device();
    let sysfs = SysFS::new(&registry).unwrap();

    assert_eq!(sysfs.list("/sys").unwrap(), vec!["class", "devices"]);
    assert_eq!(sysfs.list("/sys/class").unwrap(), vec!["dimmer"]);
    assert_eq!(
        sysfs.list("/sys/class/dimmer/lamp").unwrap(),
        vec!["info", "level", "reset", "subsystem", "uevent"]
    );
    assert_eq!(
        sysfs.readlink("/sys/class/dimmer/lamp").unwrap(),
        "../../devices/virtual/dimmer/lamp"
    );
    let via_link = sysfs.lookup("/sys/class/dimmer/lamp").unwrap();
    let real = sysfs.lookup("/sys/devices/virtual/dimmer/lamp").unwrap();
    assert_eq!(via_link.inode_no(), real.inode_no());
    assert_eq!(real.kind(), InodeKind::Directory);

    let subsystem = sysfs.lookup("devices/virtual/dimmer/lamp/subsystem").unwrap();
    assert_eq!(subsystem.list().unwrap(), vec!["lamp"]);
}

#[test]
fn test_attribute_read_write() {
    let (registry, _dev) = registry_with_device();
    let sysfs = SysFS::new(&registry).unwrap();

    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/level").unwrap(), "3\n");
    assert_eq!(sysfs.write("/sys/class/dimmer/lamp/level", "0x10\n"), Ok(5));
    assert_eq!(sysfs.read("/sys/devices/virtual/dimmer/lamp/level").unwrap(), "16\n");
    assert_eq!(
        sysfs.write("/sys/class/dimmer/lamp/level", "-1").unwrap_err(),
        FsError::InvalidArgument
    );
    assert_eq!(
        sysfs.write("/sys/class/dimmer/lamp/level", "99999999999").unwrap_err(),
        FsError::OutOfRange
    );
    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/level").unwrap(), "16\n");

    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/info/version").unwrap(), "1.0\n");
    assert_eq!(
        sysfs.write("/sys/class/dimmer/lamp/info/version", "2").unwrap_err(),
        FsError::PermissionDenied
    );
    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/uevent").unwrap(), "");
}

#[test]
fn test_path_errors() {
    let (registry, _dev) = registry_with_device();
    let sysfs = SysFS::new(&registry).unwrap();

    assert_eq!(sysfs.read("/sys/class/dimmer/bulb/level").unwrap_err(), FsError::NotFound);
    assert_eq!(sysfs.read("/sys/class/dimmer").unwrap_err(), FsError::IsDirectory);
    assert_eq!(
        sysfs.read("/sys/class/dimmer/lamp/level/x").unwrap_err(),
        FsError::NotDirectory
    );
    assert_eq!(sysfs.readlink("/sys/class").unwrap_err(), FsError::InvalidArgument);
}

#[test]
fn test_symlink_loop() {
    init_test_ops();
    let registry = ClassRegistry::new();
    let sysfs = SysFS::new(&registry).unwrap();
    let root = sysfs.root_inode();
    root.add_child("loop", SysfsInode::new_symlink("loop".to_string()))
        .unwrap();
    assert_eq!(sysfs.lookup("/sys/loop").unwrap_err(), FsError::TooManySymlinks);
}

#[test]
fn test_rebuild_follows_registry() {
    let (registry, dev) = registry_with_device();
    let sysfs = SysFS::new(&registry).unwrap();
    let level = sysfs.lookup("/sys/class/dimmer/lamp/level").unwrap();

    let class = registry.find("dimmer").unwrap();
    registry.class_destroy(&class);
    assert!(!dev.is_registered());
    // 旧快照中的属性文件已失效
    assert_eq!(level.read().unwrap_err(), FsError::NoDevice);

    sysfs.rebuild().unwrap();
    assert!(sysfs.list("/sys/class").unwrap().is_empty());
    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/level").unwrap_err(), FsError::NotFound);
}

#[test]
fn test_write_only_attribute() {
    let (registry, _dev) = registry_with_device();
    let sysfs = SysFS::new(&registry).unwrap();
    let reset = sysfs.lookup("/sys/class/dimmer/lamp/reset").unwrap();
    assert_eq!(reset.mode(), inode::S_IFREG | 0o200);

    assert_eq!(
        sysfs.read("/sys/class/dimmer/lamp/reset").unwrap_err(),
        FsError::PermissionDenied
    );
    assert_eq!(sysfs.write("/sys/class/dimmer/lamp/reset", "1\n"), Ok(2));
    assert_eq!(sysfs.read("/sys/class/dimmer/lamp/level").unwrap(), "0\n");
}
