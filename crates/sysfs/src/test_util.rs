//! 单元测试共用的初始化

use core::sync::atomic::{AtomicUsize, Ordering};

use sync::{ArchOps, register_arch_ops};
use test_support::mock::arch::{MOCK_ARCH_OPS, MockArchOps};

struct TestArchOps(&'static MockArchOps);

impl ArchOps for TestArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        unsafe { self.0.read_and_disable_interrupts() }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        unsafe { self.0.restore_interrupts(flags) }
    }
}

static TEST_ARCH_OPS: TestArchOps = TestArchOps(&MOCK_ARCH_OPS);
// 0 = uninit, 1 = initializing, 2 = ready
static ARCH_INIT: AtomicUsize = AtomicUsize::new(0);

/// 注册 mock 的 ArchOps
pub(crate) fn init_test_ops() {
    match ARCH_INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            // Safety: tests use a single global mock ArchOps.
            unsafe { register_arch_ops(&TEST_ARCH_OPS) };
            ARCH_INIT.store(2, Ordering::Release);
        }
        Err(_) => {
            while ARCH_INIT.load(Ordering::Acquire) != 2 {
                core::hint::spin_loop();
            }
        }
    }
}
