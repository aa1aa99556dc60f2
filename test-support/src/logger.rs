//! 捕获日志输出的 logger
//!
//! 测试通过 [`init`] 安装全局 logger，然后用 [`CaptureLogger::contains`]
//! 断言某条日志已输出。并行测试共享同一个 logger，断言时应使用测试内唯一的设备名。

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// 一条被捕获的日志
#[derive(Debug, Clone)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// 记录所有日志的 logger
pub struct CaptureLogger {
    records: Mutex<Vec<CapturedRecord>>,
}

impl CaptureLogger {
    pub const fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// 是否存在给定级别且包含全部片段的日志
    pub fn contains(&self, level: Level, fragments: &[&str]) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.level == level && fragments.iter().all(|f| r.message.contains(f)))
    }

    /// 包含给定片段的全部日志
    pub fn matching(&self, fragment: &str) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.message.contains(fragment))
            .cloned()
            .collect()
    }
}

impl Default for CaptureLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().unwrap().push(CapturedRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger::new();
static INIT: Once = Once::new();

/// 安装全局捕获 logger（多次调用安全）
pub fn init() -> &'static CaptureLogger {
    INIT.call_once(|| {
        // 其它 logger 已安装时忽略
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    &LOGGER
}
