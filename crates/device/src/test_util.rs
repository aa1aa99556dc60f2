//! 单元测试共用的初始化

use core::sync::atomic::{AtomicUsize, Ordering};

use sync::{ArchOps, register_arch_ops};
use test_support::mock::arch::{MOCK_ARCH_OPS, MockArchOps};
use test_support::mock::clock::{MOCK_CLOCK, MockClock};
pub(crate) use test_support::unique_name;

use crate::ops::{TimeOps, register_time_ops};

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

/// 注册 mock 的 ArchOps 与 TimeOps，每个用到锁或时钟的测试开头调用
pub(crate) fn init_test_ops() {
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
                core::hint::spin_loop();
            }
        }
    }
}
