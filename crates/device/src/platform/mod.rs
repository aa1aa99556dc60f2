//! 平台设备与平台驱动
//!
//! 平台设备由设备树节点（或板级代码）描述，挂在 [`PlatformBus`] 上，
//! 通过 `compatible` 或设备名与 [`PlatformDriver`] 匹配。
//!
//! 每个设备带有：
//!
//! - 驱动私有数据槽（[`PlatformDevice::set_drvdata`]），解绑时清空
//! - 设备托管资源列表（devres），解绑或探测失败时按注册的相反顺序释放

mod bus;

pub use bus::{PLATFORM_BUS, PlatformBus};

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use sync::SpinLock;

use crate::error::Result;
use crate::of::{DeviceNode, OfDeviceId, of_match_node};

/// 驱动私有数据
pub type DrvData = Arc<dyn Any + Send + Sync>;

/// 平台驱动接口
pub trait PlatformDriver: Send + Sync {
    /// 驱动名，用于无设备树时按设备名匹配
    fn name(&self) -> &'static str;

    /// 设备树匹配表
    fn of_match_table(&self) -> &'static [OfDeviceId] {
        &[]
    }

    /// 绑定设备。返回错误时总线会释放该设备已登记的托管资源
    fn probe(&self, pdev: &Arc<PlatformDevice>) -> Result<()>;

    /// 解绑设备。返回后总线释放托管资源
    fn remove(&self, _pdev: &Arc<PlatformDevice>) -> Result<()> {
        Ok(())
    }
}

/// 平台设备
pub struct PlatformDevice {
    name: String,
    of_node: Option<DeviceNode>,
    driver: SpinLock<Option<&'static str>>,
    drvdata: SpinLock<Option<DrvData>>,
    devres: SpinLock<Vec<Box<dyn Any + Send + Sync>>>,
}

impl PlatformDevice {
    /// 创建平台设备
    pub fn new(name: &str, of_node: Option<DeviceNode>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            of_node,
            driver: SpinLock::new(None),
            drvdata: SpinLock::new(None),
            devres: SpinLock::new(Vec::new()),
        })
    }

    /// 设备名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设备树节点
    pub fn of_node(&self) -> Option<&DeviceNode> {
        self.of_node.as_ref()
    }

    /// 已绑定的驱动名
    pub fn driver_name(&self) -> Option<&'static str> {
        *self.driver.lock()
    }

    /// 是否已绑定驱动
    pub fn is_bound(&self) -> bool {
        self.driver.lock().is_some()
    }

    pub(crate) fn set_driver(&self, driver: Option<&'static str>) {
        *self.driver.lock() = driver;
    }

    /// 设置驱动私有数据
    pub fn set_drvdata<T: Any + Send + Sync>(&self, data: Arc<T>) {
        *self.drvdata.lock() = Some(data);
    }

    /// 取出驱动私有数据，类型不符时返回 None
    pub fn drvdata<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let data = self.drvdata.lock().clone()?;
        data.downcast::<T>().ok()
    }

    pub(crate) fn clear_drvdata(&self) {
        // 在锁外 drop，私有数据的析构可能再次访问本设备
        let data = self.drvdata.lock().take();
        drop(data);
    }

    /// 登记一个设备托管资源，解绑时 drop
    pub fn devres_add<T: Any + Send + Sync>(&self, res: T) {
        self.devres.lock().push(Box::new(res));
    }

    /// 已登记的托管资源数量
    pub fn devres_count(&self) -> usize {
        self.devres.lock().len()
    }

    /// 按登记的相反顺序释放全部托管资源
    pub fn devres_release_all(&self) {
        let resources = core::mem::take(&mut *self.devres.lock());
        for res in resources.into_iter().rev() {
            drop(res);
        }
    }

    /// 判断驱动能否匹配本设备：优先设备树 `compatible`，其次设备名
    pub fn matches(&self, driver: &dyn PlatformDriver) -> bool {
        if let Some(node) = &self.of_node {
            if of_match_node(driver.of_match_table(), node).is_some() {
                return true;
            }
        }
        self.name == driver.name()
    }
}

impl core::fmt::Debug for PlatformDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlatformDevice")
            .field("name", &self.name)
            .field("driver", &self.driver_name())
            .finish()
    }
}
