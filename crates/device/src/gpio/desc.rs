//! GPIO 描述符（消费者接口）

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use super::{Direction, GpioDevice, GpioFlags, GpiodFlags, gpiochip_find};
use crate::error::{DeviceError, Result};
use crate::of::GpioSpec;
use crate::platform::PlatformDevice;

/// 一条已申请的 GPIO 线
///
/// 所有读写接口使用逻辑电平：`ACTIVE_LOW` 线上逻辑 1 对应物理低电平。
/// 描述符被 drop 时释放线。
pub struct GpioDesc {
    gdev: Arc<GpioDevice>,
    offset: u32,
    flags: GpioFlags,
    consumer: String,
}

impl GpioDesc {
    /// 控制器 label
    pub fn chip_label(&self) -> &str {
        self.gdev.chip().label()
    }

    /// 控制器内的线号
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// 申请者名字
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// 是否低电平有效
    pub fn is_active_low(&self) -> bool {
        self.flags.contains(GpioFlags::ACTIVE_LOW)
    }

    fn is_open_drain(&self) -> bool {
        self.flags.contains(GpioFlags::OPEN_DRAIN)
    }

    fn to_raw(&self, value: bool) -> bool {
        value ^ self.is_active_low()
    }

    /// 当前方向
    pub fn direction(&self) -> Result<Direction> {
        self.gdev.chip().get_direction(self.offset)
    }

    /// 配置为输入
    pub fn direction_input(&self) -> Result<()> {
        self.gdev.chip().direction_input(self.offset)
    }

    /// 配置为输出并设置逻辑电平
    ///
    /// 开漏线输出物理高电平时改为输入（释放总线）。
    pub fn direction_output(&self, value: bool) -> Result<()> {
        let raw = self.to_raw(value);
        if self.is_open_drain() && raw {
            return self.gdev.chip().direction_input(self.offset);
        }
        self.gdev.chip().direction_output(self.offset, raw)
    }

    /// 读取逻辑电平
    pub fn get_value(&self) -> Result<bool> {
        let raw = self.gdev.chip().get(self.offset)?;
        Ok(raw ^ self.is_active_low())
    }

    /// 设置逻辑电平
    pub fn set_value(&self, value: bool) -> Result<()> {
        let raw = self.to_raw(value);
        if self.is_open_drain() {
            return if raw {
                self.gdev.chip().direction_input(self.offset)
            } else {
                self.gdev.chip().direction_output(self.offset, false)
            };
        }
        self.gdev.chip().set(self.offset, raw)
    }

    fn apply_flags(&self, flags: GpiodFlags) -> Result<()> {
        match flags {
            GpiodFlags::AsIs => Ok(()),
            GpiodFlags::In => self.direction_input(),
            GpiodFlags::OutLow => self.direction_output(false),
            GpiodFlags::OutHigh => self.direction_output(true),
        }
    }
}

impl Drop for GpioDesc {
    fn drop(&mut self) {
        self.gdev.free_line(self.offset);
    }
}

impl core::fmt::Debug for GpioDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioDesc")
            .field("chip", &self.chip_label())
            .field("offset", &self.offset)
            .field("flags", &self.flags)
            .field("consumer", &self.consumer)
            .finish()
    }
}

/// 查找 `<con_id>-gpios`，其次 `<con_id>-gpio` 属性的第一个说明符
fn find_gpio_spec<'a>(dev: &'a PlatformDevice, con_id: &str) -> Option<&'a GpioSpec> {
    let node = dev.of_node()?;
    ["gpios", "gpio"]
        .iter()
        .find_map(|suffix| node.gpios(&format!("{}-{}", con_id, suffix)))
        .and_then(|specs| specs.first())
}

fn request_spec(dev: &PlatformDevice, spec: &GpioSpec, flags: GpiodFlags) -> Result<Arc<GpioDesc>> {
    let gdev = gpiochip_find(&spec.chip).ok_or(DeviceError::ProbeDefer)?;
    gdev.request_line(spec.offset, dev.name())?;

    let desc = Arc::new(GpioDesc {
        gdev,
        offset: spec.offset,
        flags: spec.flags,
        consumer: dev.name().to_string(),
    });
    // 配置失败时 desc 被 drop，线随之释放
    desc.apply_flags(flags)?;
    Ok(desc)
}

/// 获取可选的 GPIO
///
/// 设备树中没有对应属性时返回 `Ok(None)`；控制器尚未注册时返回
/// [`DeviceError::ProbeDefer`]；线已被占用时返回 [`DeviceError::Busy`]。
pub fn gpiod_get_optional(
    dev: &PlatformDevice,
    con_id: &str,
    flags: GpiodFlags,
) -> Result<Option<Arc<GpioDesc>>> {
    match find_gpio_spec(dev, con_id) {
        Some(spec) => request_spec(dev, spec, flags).map(Some),
        None => Ok(None),
    }
}

/// 获取 GPIO，属性缺失时返回 [`DeviceError::NotFound`]
pub fn gpiod_get(dev: &PlatformDevice, con_id: &str, flags: GpiodFlags) -> Result<Arc<GpioDesc>> {
    gpiod_get_optional(dev, con_id, flags)?.ok_or(DeviceError::NotFound)
}

/// 设备托管版本的 [`gpiod_get_optional`]
///
/// 描述符的一个引用挂在设备的 devres 上，设备解绑时释放。
pub fn devm_gpiod_get_optional(
    dev: &PlatformDevice,
    con_id: &str,
    flags: GpiodFlags,
) -> Result<Option<Arc<GpioDesc>>> {
    let desc = gpiod_get_optional(dev, con_id, flags)?;
    if let Some(desc) = &desc {
        dev.devres_add(desc.clone());
    }
    Ok(desc)
}
