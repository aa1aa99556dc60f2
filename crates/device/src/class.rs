//! 设备类与设备属性
//!
//! 设备类（`/sys/class/<name>`）把同类设备组织在一起，并为其下每个设备提供同一组属性。
//! 属性的读写回调为静态函数，通过 [`ClassDevice::drvdata`] 拿到驱动上下文，
//! 相当于 Linux 中的 `container_of` / `dev_get_drvdata`。
//!
//! ```text
//! ClassRegistry
//! └── Class "usb_modem_card"   (dev_groups: [enable])
//!     └── ClassDevice "enable" (drvdata: 驱动上下文)
//! ```

use alloc::collections::btree_map::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use sync::{RwLock, SpinLock};

use crate::error::{DeviceError, Result};
use crate::platform::DrvData;

bitflags! {
    /// 属性文件权限位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttrMode: u16 {
        /// 所有者可读
        const S_IRUSR = 0o400;
        /// 所有者可写
        const S_IWUSR = 0o200;
        /// 组可读
        const S_IRGRP = 0o040;
        /// 其他人可读
        const S_IROTH = 0o004;
        /// 只读属性
        const RO = 0o444;
        /// 只写属性
        const WO = 0o200;
        /// 读写属性，仅所有者可写
        const RW = 0o644;
    }
}

impl AttrMode {
    /// 是否有任何读权限
    pub fn readable(&self) -> bool {
        self.intersects(AttrMode::RO)
    }

    /// 是否有写权限
    pub fn writable(&self) -> bool {
        self.contains(AttrMode::S_IWUSR)
    }
}

/// 属性读回调
pub type ShowFn = fn(&ClassDevice, &DeviceAttribute) -> Result<String>;
/// 属性写回调，返回消耗的字节数
pub type StoreFn = fn(&ClassDevice, &DeviceAttribute, &str) -> Result<usize>;

/// 设备属性
pub struct DeviceAttribute {
    /// 文件名
    pub name: &'static str,
    /// 权限
    pub mode: AttrMode,
    /// 读回调
    pub show: Option<ShowFn>,
    /// 写回调
    pub store: Option<StoreFn>,
}

/// 属性组，有名字时在 sysfs 中表现为子目录
pub struct AttributeGroup {
    /// 子目录名
    pub name: Option<&'static str>,
    /// 属性列表
    pub attrs: &'static [&'static DeviceAttribute],
}

/// 定义可读写的设备属性
///
/// ```ignore
/// device_attr_rw!(pub DEV_ATTR_ENABLE, "enable", enable_show, enable_store);
/// ```
#[macro_export]
macro_rules! device_attr_rw {
    ($vis:vis $ident:ident, $name:literal, $show:path, $store:path) => {
        $vis static $ident: $crate::class::DeviceAttribute = $crate::class::DeviceAttribute {
            name: $name,
            mode: $crate::class::AttrMode::RW,
            show: Some($show),
            store: Some($store),
        };
    };
}

/// 定义只读的设备属性
#[macro_export]
macro_rules! device_attr_ro {
    ($vis:vis $ident:ident, $name:literal, $show:path) => {
        $vis static $ident: $crate::class::DeviceAttribute = $crate::class::DeviceAttribute {
            name: $name,
            mode: $crate::class::AttrMode::RO,
            show: Some($show),
            store: None,
        };
    };
}

/// 定义只写的设备属性
#[macro_export]
macro_rules! device_attr_wo {
    ($vis:vis $ident:ident, $name:literal, $store:path) => {
        $vis static $ident: $crate::class::DeviceAttribute = $crate::class::DeviceAttribute {
            name: $name,
            mode: $crate::class::AttrMode::WO,
            show: None,
            store: Some($store),
        };
    };
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

/// 类设备
pub struct ClassDevice {
    name: String,
    class_name: String,
    groups: &'static [&'static AttributeGroup],
    drvdata: SpinLock<Option<DrvData>>,
    registered: AtomicBool,
}

impl ClassDevice {
    /// 设备名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所属类名
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// 注册时从类继承的属性组
    pub fn groups(&self) -> &'static [&'static AttributeGroup] {
        self.groups
    }

    /// 是否仍处于注册状态
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// 设置驱动私有数据
    pub fn set_drvdata<T: Any + Send + Sync>(&self, data: Arc<T>) {
        *self.drvdata.lock() = Some(data);
    }

    /// 取出驱动私有数据，未设置或类型不符时返回 None
    pub fn drvdata<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let data = self.drvdata.lock().clone()?;
        data.downcast::<T>().ok()
    }

    /// 按路径查找属性，命名组中的属性写作 `group/attr`
    pub fn find_attribute(&self, path: &str) -> Option<&'static DeviceAttribute> {
        let (group_name, attr_name) = match path.split_once('/') {
            Some((group, attr)) => (Some(group), attr),
            None => (None, path),
        };
        self.groups
            .iter()
            .filter(|g| g.name == group_name)
            .flat_map(|g| g.attrs.iter())
            .find(|a| a.name == attr_name)
            .copied()
    }

    /// 读取属性
    pub fn show(&self, path: &str) -> Result<String> {
        let attr = self.find_attribute(path).ok_or(DeviceError::NotFound)?;
        if !self.is_registered() {
            return Err(DeviceError::NoDevice);
        }
        let show = attr.show.ok_or(DeviceError::IoError)?;
        show(self, attr)
    }

    /// 写入属性
    pub fn store(&self, path: &str, buf: &str) -> Result<usize> {
        let attr = self.find_attribute(path).ok_or(DeviceError::NotFound)?;
        if !self.is_registered() {
            return Err(DeviceError::NoDevice);
        }
        let store = attr.store.ok_or(DeviceError::IoError)?;
        store(self, attr, buf)
    }

    fn unregister(&self) {
        self.registered.store(false, Ordering::Release);
        // 驱动上下文通常反向持有本设备，清空以打破引用环
        let data = self.drvdata.lock().take();
        drop(data);
    }
}

impl core::fmt::Debug for ClassDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClassDevice")
            .field("class", &self.class_name)
            .field("name", &self.name)
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// 设备类
pub struct Class {
    name: String,
    dev_groups: RwLock<&'static [&'static AttributeGroup]>,
    devices: RwLock<Vec<Arc<ClassDevice>>>,
    #[cfg(feature = "fault-injection")]
    register_fault: SpinLock<Option<DeviceError>>,
}

impl Class {
    /// 类名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置此后注册的设备默认拥有的属性组
    pub fn set_dev_groups(&self, groups: &'static [&'static AttributeGroup]) {
        *self.dev_groups.write() = groups;
    }

    /// 在类下注册一个设备
    pub fn device_register(&self, name: &str) -> Result<Arc<ClassDevice>> {
        if !valid_name(name) {
            return Err(DeviceError::InvalidArgument);
        }
        self.take_register_fault()?;
        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.name == name) {
            return Err(DeviceError::AlreadyExists);
        }
        let dev = Arc::new(ClassDevice {
            name: name.to_string(),
            class_name: self.name.clone(),
            groups: *self.dev_groups.read(),
            drvdata: SpinLock::new(None),
            registered: AtomicBool::new(true),
        });
        devices.push(dev.clone());
        log::debug!("class {}: registered device {}", self.name, name);
        Ok(dev)
    }

    /// 注销设备
    pub fn device_unregister(&self, name: &str) -> Result<()> {
        let dev = {
            let mut devices = self.devices.write();
            let idx = devices
                .iter()
                .position(|d| d.name == name)
                .ok_or(DeviceError::NotFound)?;
            devices.remove(idx)
        };
        dev.unregister();
        Ok(())
    }

    /// 按名称查找设备
    pub fn find_device(&self, name: &str) -> Option<Arc<ClassDevice>> {
        self.devices.read().iter().find(|d| d.name == name).cloned()
    }

    /// 类下的全部设备
    pub fn devices(&self) -> Vec<Arc<ClassDevice>> {
        self.devices.read().clone()
    }

    #[cfg(feature = "fault-injection")]
    fn take_register_fault(&self) -> Result<()> {
        match self.register_fault.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[cfg(not(feature = "fault-injection"))]
    fn take_register_fault(&self) -> Result<()> {
        Ok(())
    }

    fn unregister_all(&self) {
        let devices = core::mem::take(&mut *self.devices.write());
        for dev in devices {
            dev.unregister();
        }
    }
}

impl core::fmt::Debug for Class {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Class").field("name", &self.name).finish()
    }
}

/// 设备类注册表
pub struct ClassRegistry {
    classes: RwLock<BTreeMap<String, Arc<Class>>>,
    /// 类名 -> 该类下一次注册设备时返回的错误
    #[cfg(feature = "fault-injection")]
    register_faults: SpinLock<BTreeMap<String, DeviceError>>,
}

/// 全局设备类注册表
pub static CLASS_REGISTRY: ClassRegistry = ClassRegistry::new();

impl ClassRegistry {
    /// 创建空注册表
    pub const fn new() -> Self {
        Self {
            classes: RwLock::new(BTreeMap::new()),
            #[cfg(feature = "fault-injection")]
            register_faults: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 创建设备类，同名类已存在时返回 [`DeviceError::AlreadyExists`]
    pub fn class_create(&self, name: &str) -> Result<Arc<Class>> {
        if !valid_name(name) {
            return Err(DeviceError::InvalidArgument);
        }
        let mut classes = self.classes.write();
        if classes.contains_key(name) {
            return Err(DeviceError::AlreadyExists);
        }
        let class = Arc::new(Class {
            name: name.to_string(),
            dev_groups: RwLock::new(&[]),
            devices: RwLock::new(Vec::new()),
            #[cfg(feature = "fault-injection")]
            register_fault: SpinLock::new(self.register_faults.lock().remove(name)),
        });
        classes.insert(name.to_string(), class.clone());
        Ok(class)
    }

    /// 销毁设备类并注销其下所有设备
    pub fn class_destroy(&self, class: &Arc<Class>) {
        {
            let mut classes = self.classes.write();
            if classes
                .get(class.name())
                .is_some_and(|c| Arc::ptr_eq(c, class))
            {
                classes.remove(class.name());
            }
        }
        class.unregister_all();
    }

    /// 让此后创建的名为 `class` 的类在第一次注册设备时返回 `err`
    #[cfg(feature = "fault-injection")]
    pub fn inject_device_register_fault(&self, class: &str, err: DeviceError) {
        self.register_faults.lock().insert(class.to_string(), err);
    }

    /// 按名称查找设备类
    pub fn find(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.read().get(name).cloned()
    }

    /// 全部设备类，按名称排序
    pub fn classes(&self) -> Vec<Arc<Class>> {
        self.classes.read().values().cloned().collect()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
