//! 集成测试共用的初始化与设备构造

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use device::gpio::gpiochip_add;
use device::of::{DeviceNode, GpioSpec};
use device::{ClassRegistry, GpioFlags, PlatformDevice, SimGpioChip, TimeOps, register_time_ops};
use sync::{ArchOps, register_arch_ops};
use test_support::logger::{self, CaptureLogger};
use test_support::mock::arch::{MOCK_ARCH_OPS, MockArchOps};
use test_support::mock::clock::{MOCK_CLOCK, MockClock};

pub use test_support::unique_name;

struct TestArchOps(&'static MockArchOps);

impl ArchOps for TestArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        unsafe { self.0.read_and_disable_interrupts() }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        unsafe { self.0.restore_interrupts(flags) }
    }
}

struct TestTimeOps(&'static MockClock);

impl TimeOps for TestTimeOps {
    fn msleep(&self, ms: u64) {
        self.0.msleep(ms);
    }

    fn uptime_ms(&self) -> u64 {
        self.0.uptime_ms()
    }
}

static TEST_ARCH_OPS: TestArchOps = TestArchOps(&MOCK_ARCH_OPS);
static TEST_TIME_OPS: TestTimeOps = TestTimeOps(&MOCK_CLOCK);
// 0 = uninit, 1 = initializing, 2 = ready
static OPS_INIT: AtomicUsize = AtomicUsize::new(0);

/// 注册 mock 的架构与时间操作，并安装捕获 logger
pub fn init() -> &'static CaptureLogger {
    match OPS_INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            // Safety: tests use a single global mock ArchOps and clock.
            unsafe {
                register_arch_ops(&TEST_ARCH_OPS);
                register_time_ops(&TEST_TIME_OPS);
            }
            OPS_INIT.store(2, Ordering::Release);
        }
        Err(_) => {
            while OPS_INIT.load(Ordering::Acquire) != 2 {
                std::hint::spin_loop();
            }
        }
    }
    logger::init()
}

/// 每个测试独占的设备类注册表
pub fn leak_registry() -> &'static ClassRegistry {
    Box::leak(Box::new(ClassRegistry::new()))
}

/// 注册一个模拟 GPIO 控制器，label 在测试间唯一
pub fn sim_chip(ngpio: u32) -> (String, Arc<SimGpioChip>) {
    let label = unique_name("modem-gpio");
    let chip = SimGpioChip::new(&label, ngpio);
    gpiochip_add(chip.clone()).unwrap();
    (label, chip)
}

/// `compatible = "usb-modem-card"` 的设备树节点
pub fn modem_node() -> DeviceNode {
    DeviceNode::new("usb-modem").with_compatible(&["usb-modem-card"])
}

/// 带 `enable-gpios` 的平台设备，设备名在测试间唯一
pub fn modem_device(chip: &str, offset: u32, flags: GpioFlags) -> Arc<PlatformDevice> {
    let node = modem_node().with_gpios("enable-gpios", vec![GpioSpec::new(chip, offset, flags)]);
    PlatformDevice::new(&unique_name("usb-modem"), Some(node))
}
