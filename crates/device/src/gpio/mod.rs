//! GPIO 子系统
//!
//! 分为两层：
//!
//! - 控制器层：[`GpioChip`] trait 由具体控制器驱动实现，通过 [`gpiochip_add`] 按 label 注册
//! - 消费者层：驱动通过 [`gpiod_get_optional`] 等接口从设备树属性获取 [`GpioDesc`]，
//!   之后只使用逻辑电平（已按 `ACTIVE_LOW` 取反）
//!
//! 线的申请状态由本模块统一记录，控制器只负责硬件操作。

mod desc;
pub mod sim;

pub use desc::{GpioDesc, devm_gpiod_get_optional, gpiod_get, gpiod_get_optional};

use alloc::collections::btree_map::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use bitflags::bitflags;
use lazy_static::lazy_static;
use sync::{RwLock, SpinLock};

use crate::error::{DeviceError, Result};

bitflags! {
    /// 设备树 GPIO 说明符中的标志位（与 dt-bindings/gpio/gpio.h 数值一致）
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GpioFlags: u32 {
        /// 低电平有效
        const ACTIVE_LOW = 1 << 0;
        /// 单端输出
        const SINGLE_ENDED = 1 << 1;
        /// 单端输出时为开漏（否则为开源）
        const LINE_OPEN_DRAIN = 1 << 2;
        /// 开漏输出
        const OPEN_DRAIN = Self::SINGLE_ENDED.bits() | Self::LINE_OPEN_DRAIN.bits();
    }
}

/// 获取 GPIO 时对线的初始配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpiodFlags {
    /// 保持当前方向不变
    AsIs,
    /// 配置为输入
    In,
    /// 配置为输出，逻辑低
    OutLow,
    /// 配置为输出，逻辑高
    OutHigh,
}

/// 线方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 输入
    In,
    /// 输出
    Out,
}

/// GPIO 控制器驱动接口
///
/// 所有值均为物理电平。
pub trait GpioChip: Send + Sync {
    /// 控制器 label，设备树说明符通过它引用控制器
    fn label(&self) -> &str;

    /// 线数量
    fn ngpio(&self) -> u32;

    /// 线被申请时调用，控制器可在此拒绝
    fn request(&self, _offset: u32) -> Result<()> {
        Ok(())
    }

    /// 线被释放时调用
    fn free(&self, _offset: u32) {}

    /// 读取当前方向
    fn get_direction(&self, offset: u32) -> Result<Direction>;

    /// 配置为输入
    fn direction_input(&self, offset: u32) -> Result<()>;

    /// 配置为输出并设置电平
    fn direction_output(&self, offset: u32, value: bool) -> Result<()>;

    /// 读取电平
    fn get(&self, offset: u32) -> Result<bool>;

    /// 设置电平
    fn set(&self, offset: u32, value: bool) -> Result<()>;
}

/// 已注册的控制器及其线申请表
pub struct GpioDevice {
    chip: Arc<dyn GpioChip>,
    /// offset -> consumer
    requested: SpinLock<BTreeMap<u32, String>>,
}

impl GpioDevice {
    /// 控制器
    pub fn chip(&self) -> &Arc<dyn GpioChip> {
        &self.chip
    }

    /// 线是否已被申请
    pub fn is_requested(&self, offset: u32) -> bool {
        self.requested.lock().contains_key(&offset)
    }

    /// 申请一条线，返回前已调用控制器的 request 钩子
    fn request_line(&self, offset: u32, consumer: &str) -> Result<()> {
        if offset >= self.chip.ngpio() {
            return Err(DeviceError::InvalidArgument);
        }
        let mut requested = self.requested.lock();
        if requested.contains_key(&offset) {
            return Err(DeviceError::Busy);
        }
        self.chip.request(offset)?;
        requested.insert(offset, consumer.to_string());
        Ok(())
    }

    fn free_line(&self, offset: u32) {
        if self.requested.lock().remove(&offset).is_some() {
            self.chip.free(offset);
        }
    }
}

lazy_static! {
    /// 全局 GPIO 控制器表，键为 label
    static ref GPIO_DEVICES: RwLock<BTreeMap<String, Arc<GpioDevice>>> =
        RwLock::new(BTreeMap::new());
}

/// 注册 GPIO 控制器
pub fn gpiochip_add(chip: Arc<dyn GpioChip>) -> Result<()> {
    if chip.label().is_empty() || chip.ngpio() == 0 {
        return Err(DeviceError::InvalidArgument);
    }
    let mut devices = GPIO_DEVICES.write();
    if devices.contains_key(chip.label()) {
        return Err(DeviceError::AlreadyExists);
    }
    log::debug!("gpio: registered chip {} ({} lines)", chip.label(), chip.ngpio());
    devices.insert(
        chip.label().to_string(),
        Arc::new(GpioDevice {
            chip,
            requested: SpinLock::new(BTreeMap::new()),
        }),
    );
    Ok(())
}

/// 注销 GPIO 控制器
///
/// 已发出的描述符仍持有控制器引用，可以继续使用直到被释放。
pub fn gpiochip_remove(label: &str) -> Result<()> {
    let gdev = GPIO_DEVICES
        .write()
        .remove(label)
        .ok_or(DeviceError::NotFound)?;
    let still_requested: Vec<u32> = gdev.requested.lock().keys().copied().collect();
    if !still_requested.is_empty() {
        log::warn!(
            "gpio: removing chip {} with lines still requested: {:?}",
            label,
            still_requested
        );
    }
    Ok(())
}

/// 按 label 查找控制器
pub fn gpiochip_find(label: &str) -> Option<Arc<GpioDevice>> {
    GPIO_DEVICES.read().get(label).cloned()
}
