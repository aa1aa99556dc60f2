//! 设备上下文与 `enable` 属性

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;

use device::class::{AttributeGroup, Class, ClassDevice, DeviceAttribute};
use device::kstrtox::kstrtoint;
use device::{DeviceError, GpioDesc, PlatformDevice, Result, delay, dev_err};

use crate::config::POWER_ON_DELAY_MS;

/// 每个已绑定平台设备的驱动上下文
///
/// 同时挂在平台设备和类设备的 drvdata 上。
/// 类被销毁、设备解绑时两处引用都会被清空。
pub struct UsbModemCard {
    class: Arc<Class>,
    dev: Arc<PlatformDevice>,
    sys_dev: Arc<ClassDevice>,
    enable_gpio: Option<Arc<GpioDesc>>,
}

impl UsbModemCard {
    pub(crate) fn new(
        class: Arc<Class>,
        dev: Arc<PlatformDevice>,
        sys_dev: Arc<ClassDevice>,
        enable_gpio: Option<Arc<GpioDesc>>,
    ) -> Self {
        Self {
            class,
            dev,
            sys_dev,
            enable_gpio,
        }
    }

    /// 设备类
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// 平台设备
    pub fn device(&self) -> &Arc<PlatformDevice> {
        &self.dev
    }

    /// `/sys/class/usb_modem_card/enable` 对应的类设备
    pub fn sys_dev(&self) -> &Arc<ClassDevice> {
        &self.sys_dev
    }

    /// 使能线，设备树未描述或获取失败时为 None
    pub fn enable_gpio(&self) -> Option<&Arc<GpioDesc>> {
        self.enable_gpio.as_ref()
    }

    /// 使能线的逻辑电平，没有使能线时视为低
    pub fn enabled(&self) -> Result<bool> {
        match &self.enable_gpio {
            Some(gpio) => gpio.get_value(),
            None => Ok(false),
        }
    }

    /// 设置使能线的逻辑电平，没有使能线时什么也不做
    pub fn set_enabled(&self, on: bool) -> Result<()> {
        match &self.enable_gpio {
            Some(gpio) => gpio.set_value(on),
            None => Ok(()),
        }
    }

    /// 上电时序：拉低，等待 [`POWER_ON_DELAY_MS`]，再拉高
    ///
    /// 方向配置失败只记录日志，时序继续执行。
    pub fn power_on(&self) {
        let Some(gpio) = &self.enable_gpio else {
            return;
        };

        if let Err(err) = gpio.direction_output(false) {
            dev_err!(self.dev, "failed to pull down enable gpio, err={}", err.to_errno());
        }
        delay::msleep(POWER_ON_DELAY_MS);
        if let Err(err) = gpio.direction_output(true) {
            dev_err!(self.dev, "failed to pull up enable gpio, err={}", err.to_errno());
        }
    }
}

fn enable_show(dev: &ClassDevice, _attr: &DeviceAttribute) -> Result<String> {
    let card = dev.drvdata::<UsbModemCard>().ok_or(DeviceError::NoDevice)?;
    Ok(format!("{}\n", card.enabled()? as u8))
}

fn enable_store(dev: &ClassDevice, _attr: &DeviceAttribute, buf: &str) -> Result<usize> {
    let value = kstrtoint(buf, 0)?;
    let card = dev.drvdata::<UsbModemCard>().ok_or(DeviceError::NoDevice)?;
    card.set_enabled(value != 0)?;
    Ok(buf.len())
}

device::device_attr_rw!(DEV_ATTR_ENABLE, "enable", enable_show, enable_store);

static ENABLE_GROUP: AttributeGroup = AttributeGroup {
    name: None,
    attrs: &[&DEV_ATTR_ENABLE],
};

/// 类设备默认属性组
pub(crate) static ENABLE_GROUPS: [&AttributeGroup; 1] = [&ENABLE_GROUP];
