//! 延时辅助函数

use crate::ops::time_ops;

/// 睡眠至少 `ms` 毫秒，可能调度出去，不能在原子上下文中调用
pub fn msleep(ms: u64) {
    time_ops().msleep(ms);
}

/// 启动以来经过的毫秒数
pub fn uptime_ms() -> u64 {
    time_ops().uptime_ms()
}
