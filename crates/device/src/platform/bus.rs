//! 平台总线

use alloc::sync::Arc;
use alloc::vec::Vec;

use sync::RwLock;

use super::{PlatformDevice, PlatformDriver};
use crate::error::{DeviceError, Result};

/// 全局平台总线
pub static PLATFORM_BUS: PlatformBus = PlatformBus::new();

/// 平台总线：登记驱动和设备，并在两者之一注册时尝试绑定
///
/// 探测错误只记录日志，不会从注册接口返回。
/// 调用驱动回调时不持有总线的锁。
pub struct PlatformBus {
    drivers: RwLock<Vec<Arc<dyn PlatformDriver>>>,
    devices: RwLock<Vec<Arc<PlatformDevice>>>,
}

impl PlatformBus {
    /// 创建空总线
    pub const fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
            devices: RwLock::new(Vec::new()),
        }
    }

    /// 注册驱动并绑定所有匹配且未绑定的设备
    pub fn register_driver(&self, driver: Arc<dyn PlatformDriver>) -> Result<()> {
        {
            let mut drivers = self.drivers.write();
            if drivers.iter().any(|d| d.name() == driver.name()) {
                return Err(DeviceError::AlreadyExists);
            }
            drivers.push(driver.clone());
        }
        log::debug!("platform: registered driver {}", driver.name());

        let candidates: Vec<_> = self
            .devices
            .read()
            .iter()
            .filter(|pdev| !pdev.is_bound() && pdev.matches(driver.as_ref()))
            .cloned()
            .collect();
        for pdev in candidates {
            Self::probe_device(&driver, &pdev);
        }
        Ok(())
    }

    /// 注销驱动，先解绑它绑定的所有设备
    pub fn unregister_driver(&self, name: &str) -> Result<()> {
        let driver = {
            let mut drivers = self.drivers.write();
            let idx = drivers
                .iter()
                .position(|d| d.name() == name)
                .ok_or(DeviceError::NotFound)?;
            drivers.remove(idx)
        };

        let bound: Vec<_> = self
            .devices
            .read()
            .iter()
            .filter(|pdev| pdev.driver_name() == Some(driver.name()))
            .cloned()
            .collect();
        for pdev in bound {
            Self::release_device(&driver, &pdev);
        }
        log::debug!("platform: unregistered driver {}", name);
        Ok(())
    }

    /// 注册设备并尝试与已注册的驱动绑定
    pub fn register_device(&self, pdev: Arc<PlatformDevice>) -> Result<()> {
        {
            let mut devices = self.devices.write();
            if devices.iter().any(|d| d.name() == pdev.name()) {
                return Err(DeviceError::AlreadyExists);
            }
            devices.push(pdev.clone());
        }

        let driver = self
            .drivers
            .read()
            .iter()
            .find(|d| pdev.matches(d.as_ref()))
            .cloned();
        if let Some(driver) = driver {
            Self::probe_device(&driver, &pdev);
        }
        Ok(())
    }

    /// 注销设备，已绑定时先解绑
    pub fn unregister_device(&self, name: &str) -> Result<()> {
        let pdev = {
            let mut devices = self.devices.write();
            let idx = devices
                .iter()
                .position(|d| d.name() == name)
                .ok_or(DeviceError::NotFound)?;
            devices.remove(idx)
        };

        if let Some(driver_name) = pdev.driver_name() {
            let driver = self
                .drivers
                .read()
                .iter()
                .find(|d| d.name() == driver_name)
                .cloned();
            if let Some(driver) = driver {
                Self::release_device(&driver, &pdev);
            }
        }
        Ok(())
    }

    /// 按名称查找设备
    pub fn find_device(&self, name: &str) -> Option<Arc<PlatformDevice>> {
        self.devices.read().iter().find(|d| d.name() == name).cloned()
    }

    /// 已注册的驱动名
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.read().iter().map(|d| d.name()).collect()
    }

    fn probe_device(driver: &Arc<dyn PlatformDriver>, pdev: &Arc<PlatformDevice>) {
        if pdev.of_node().is_some_and(|node| !node.is_available()) {
            log::debug!("platform: {} is disabled, skip probe", pdev.name());
            return;
        }

        match driver.probe(pdev) {
            Ok(()) => {
                pdev.set_driver(Some(driver.name()));
                log::debug!("platform: {} bound to {}", pdev.name(), driver.name());
            }
            Err(err) => {
                pdev.devres_release_all();
                pdev.clear_drvdata();
                if err == DeviceError::ProbeDefer {
                    log::info!("platform: {} probe deferred", pdev.name());
                } else {
                    log::warn!(
                        "platform: probe of {} with driver {} failed with error {}",
                        pdev.name(),
                        driver.name(),
                        err.to_errno()
                    );
                }
            }
        }
    }

    fn release_device(driver: &Arc<dyn PlatformDriver>, pdev: &Arc<PlatformDevice>) {
        if let Err(err) = driver.remove(pdev) {
            log::warn!(
                "platform: remove of {} returned error {}",
                pdev.name(),
                err.to_errno()
            );
        }
        pdev.devres_release_all();
        pdev.clear_drvdata();
        pdev.set_driver(None);
    }
}

impl Default for PlatformBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::init_test_ops;
    use crate::of::{DeviceNode, OfDeviceId, Property};
    use alloc::string::String;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static MATCH: [OfDeviceId; 1] = [OfDeviceId::compatible("test,widget")];

    struct Resource(Arc<AtomicUsize>);

    impl Drop for Resource {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct WidgetDriver {
        fail_with: Option<DeviceError>,
        probed: AtomicUsize,
        removed: AtomicUsize,
        released: Arc<AtomicUsize>,
    }

    impl WidgetDriver {
        fn new(fail_with: Option<DeviceError>) -> Arc<Self> {
            Arc::new(Self {
                fail_with,
                probed: AtomicUsize::new(0),
                removed: AtomicUsize::new(0),
                released: Arc::new(AtomicUsize::new(0)),
            })
        }
    }

    impl PlatformDriver for WidgetDriver {
        fn name(&self) -> &'static str {
            "widget"
        }

        fn of_match_table(&self) -> &'static [OfDeviceId] {
            &MATCH
        }

        fn probe(&self, pdev: &Arc<PlatformDevice>) -> Result<()> {
            self.probed.fetch_add(1, Ordering::SeqCst);
            pdev.devres_add(Resource(self.released.clone()));
            pdev.set_drvdata(Arc::new(String::from("ctx")));
            match self.fail_with {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn remove(&self, _pdev: &Arc<PlatformDevice>) -> Result<()> {
            self.removed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn widget_node() -> DeviceNode {
        DeviceNode::new("widget@0").with_compatible(&["test,widget"])
    }

    #[test]
    fn test_bind_on_device_register_and_unbind_on_driver_unregister() {
        init_test_ops();
        let bus = PlatformBus::new();
        let driver = WidgetDriver::new(None);
        bus.register_driver(driver.clone()).unwrap();

        let pdev = PlatformDevice::new("w0", Some(widget_node()));
        bus.register_device(pdev.clone()).unwrap();
        assert_eq!(driver.probed.load(Ordering::SeqCst), 1);
        assert_eq!(pdev.driver_name(), Some("widget"));
        assert_eq!(pdev.drvdata::<String>().as_deref().map(String::as_str), Some("ctx"));
        assert!(pdev.drvdata::<u32>().is_none());

        bus.unregister_driver("widget").unwrap();
        assert_eq!(driver.removed.load(Ordering::SeqCst), 1);
        assert_eq!(driver.released.load(Ordering::SeqCst), 1);
        assert!(!pdev.is_bound());
        assert!(pdev.drvdata::<String>().is_none());
        assert_eq!(bus.unregister_driver("widget"), Err(DeviceError::NotFound));
    }

    #[test]
    fn test_bind_existing_devices_on_driver_register() {
        init_test_ops();
        let bus = PlatformBus::new();
        let by_of = PlatformDevice::new("w0", Some(widget_node()));
        let by_name = PlatformDevice::new("widget", None);
        let other = PlatformDevice::new("gadget", Some(DeviceNode::new("g")));
        for pdev in [&by_of, &by_name, &other] {
            bus.register_device(pdev.clone()).unwrap();
        }

        let driver = WidgetDriver::new(None);
        bus.register_driver(driver.clone()).unwrap();
        assert!(by_of.is_bound());
        assert!(by_name.is_bound());
        assert!(!other.is_bound());
        assert_eq!(driver.probed.load(Ordering::SeqCst), 2);

        bus.unregister_device("w0").unwrap();
        assert_eq!(driver.removed.load(Ordering::SeqCst), 1);
        assert!(bus.find_device("w0").is_none());
    }

    #[test]
    fn test_probe_failure_releases_resources() {
        init_test_ops();
        let bus = PlatformBus::new();
        let driver = WidgetDriver::new(Some(DeviceError::AlreadyExists));
        bus.register_driver(driver.clone()).unwrap();

        let pdev = PlatformDevice::new("w0", Some(widget_node()));
        // 探测失败不影响设备注册
        bus.register_device(pdev.clone()).unwrap();
        assert!(!pdev.is_bound());
        assert_eq!(driver.released.load(Ordering::SeqCst), 1);
        assert_eq!(pdev.devres_count(), 0);
        assert!(pdev.drvdata::<String>().is_none());

        bus.unregister_device("w0").unwrap();
        assert_eq!(driver.removed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicate_registration() {
        init_test_ops();
        let bus = PlatformBus::new();
        bus.register_driver(WidgetDriver::new(None)).unwrap();
        assert_eq!(
            bus.register_driver(WidgetDriver::new(None)),
            Err(DeviceError::AlreadyExists)
        );
        bus.register_device(PlatformDevice::new("w0", None)).unwrap();
        assert_eq!(
            bus.register_device(PlatformDevice::new("w0", None)),
            Err(DeviceError::AlreadyExists)
        );
        assert_eq!(bus.driver_names(), vec!["widget"]);
    }

    #[test]
    fn test_disabled_node_is_not_probed() {
        init_test_ops();
        let bus = PlatformBus::new();
        let driver = WidgetDriver::new(None);
        bus.register_driver(driver.clone()).unwrap();
        let node = widget_node().with_property("status", Property::Strings(vec!["disabled".into()]));
        let pdev = PlatformDevice::new("w0", Some(node));
        bus.register_device(pdev.clone()).unwrap();
        assert!(!pdev.is_bound());
        assert_eq!(driver.probed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_devres_released_in_reverse_order() {
        init_test_ops();
        struct Ordered(usize, Arc<sync::SpinLock<Vec<usize>>>);

        impl Drop for Ordered {
            fn drop(&mut self) {
                self.1.lock().push(self.0);
            }
        }

        let order = Arc::new(sync::SpinLock::new(Vec::new()));
        let pdev = PlatformDevice::new("w0", None);
        for i in 1..=3 {
            pdev.devres_add(Ordered(i, order.clone()));
        }
        pdev.devres_release_all();
        assert_eq!(*order.lock(), vec![3, 2, 1]);
        assert_eq!(pdev.devres_count(), 0);
    }
}
