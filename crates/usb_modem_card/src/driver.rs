//! 平台驱动

use alloc::sync::Arc;

use device::gpio::{GpiodFlags, devm_gpiod_get_optional};
use device::of::OfDeviceId;
use device::{
    CLASS_REGISTRY, ClassRegistry, PlatformDevice, PlatformDriver, Result, dev_dbg, dev_err,
    dev_info, dev_warn,
};

use crate::card::{ENABLE_GROUPS, UsbModemCard};
use crate::config::{CLASS_NAME, DRIVER_NAME, ENABLE_CON_ID, OF_COMPATIBLE, SYS_DEVICE_NAME};

static USB_MODEM_CARD_OF_MATCH: [OfDeviceId; 1] = [OfDeviceId::compatible(OF_COMPATIBLE)];

/// USB 模块卡驱动
///
/// 设备类创建在构造时指定的注册表中，内核使用全局 [`CLASS_REGISTRY`]。
pub struct UsbModemCardDriver {
    classes: &'static ClassRegistry,
}

impl UsbModemCardDriver {
    /// 使用全局设备类注册表
    pub fn new() -> Self {
        Self::with_registry(&CLASS_REGISTRY)
    }

    /// 使用指定的设备类注册表
    pub fn with_registry(classes: &'static ClassRegistry) -> Self {
        Self { classes }
    }
}

impl Default for UsbModemCardDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformDriver for UsbModemCardDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn of_match_table(&self) -> &'static [OfDeviceId] {
        &USB_MODEM_CARD_OF_MATCH
    }

    fn probe(&self, pdev: &Arc<PlatformDevice>) -> Result<()> {
        let class = self.classes.class_create(CLASS_NAME).inspect_err(|err| {
            dev_err!(pdev, "failed to create class, err={}", err.to_errno());
        })?;
        class.set_dev_groups(&ENABLE_GROUPS);

        let sys_dev = match class.device_register(SYS_DEVICE_NAME) {
            Ok(sys_dev) => sys_dev,
            Err(err) => {
                dev_err!(pdev, "failed to register device");
                self.classes.class_destroy(&class);
                return Err(err);
            }
        };

        let enable_gpio = devm_gpiod_get_optional(pdev, ENABLE_CON_ID, GpiodFlags::AsIs)
            .unwrap_or_else(|err| {
                dev_warn!(pdev, "failed to get enable-gpios! err={}", err.to_errno());
                None
            });

        let card = Arc::new(UsbModemCard::new(
            class,
            pdev.clone(),
            sys_dev.clone(),
            enable_gpio,
        ));
        sys_dev.set_drvdata(card.clone());
        pdev.set_drvdata(card.clone());

        card.power_on();

        dev_info!(pdev, "probe success");
        Ok(())
    }

    fn remove(&self, pdev: &Arc<PlatformDevice>) -> Result<()> {
        if let Some(card) = pdev.drvdata::<UsbModemCard>() {
            self.classes.class_destroy(card.class());
        }
        dev_dbg!(pdev, "removed");
        Ok(())
    }
}
