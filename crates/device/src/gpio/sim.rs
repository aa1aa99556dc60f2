//! 内存模拟的 GPIO 控制器
//!
//! 用于测试和开发。每次电平或方向变化都带时间戳记录下来，
//! 还可以对指定线注入方向配置失败。

use alloc::collections::btree_set::BTreeSet;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use sync::SpinLock;

use super::{Direction, GpioChip};
use crate::delay::uptime_ms;
use crate::error::{DeviceError, Result};

/// 一条模拟线的状态（物理电平）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimLine {
    /// 方向
    pub direction: Direction,
    /// 电平
    pub value: bool,
}

/// 线状态变化记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent {
    /// 线号
    pub offset: u32,
    /// 变化后的方向
    pub direction: Direction,
    /// 变化后的电平
    pub value: bool,
    /// 发生时间（毫秒）
    pub at_ms: u64,
}

/// 内存模拟的 GPIO 控制器
pub struct SimGpioChip {
    label: String,
    lines: SpinLock<Vec<SimLine>>,
    events: SpinLock<Vec<LineEvent>>,
    direction_faults: SpinLock<BTreeSet<u32>>,
}

impl SimGpioChip {
    /// 创建有 `ngpio` 条线的控制器，所有线初始为输入、低电平
    pub fn new(label: &str, ngpio: u32) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            lines: SpinLock::new(vec![
                SimLine {
                    direction: Direction::In,
                    value: false,
                };
                ngpio as usize
            ]),
            events: SpinLock::new(Vec::new()),
            direction_faults: SpinLock::new(BTreeSet::new()),
        })
    }

    /// 读取线的当前状态
    pub fn line(&self, offset: u32) -> Option<SimLine> {
        self.lines.lock().get(offset as usize).copied()
    }

    /// 某条线的全部变化记录，按发生顺序排列
    pub fn events(&self, offset: u32) -> Vec<LineEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.offset == offset)
            .copied()
            .collect()
    }

    /// 注入或清除方向配置失败
    pub fn set_direction_fault(&self, offset: u32, fail: bool) {
        let mut faults = self.direction_faults.lock();
        if fail {
            faults.insert(offset);
        } else {
            faults.remove(&offset);
        }
    }

    fn check_direction_fault(&self, offset: u32) -> Result<()> {
        if self.direction_faults.lock().contains(&offset) {
            Err(DeviceError::IoError)
        } else {
            Ok(())
        }
    }

    fn update(&self, offset: u32, f: impl FnOnce(&mut SimLine)) -> Result<()> {
        let line = {
            let mut lines = self.lines.lock();
            let line = lines
                .get_mut(offset as usize)
                .ok_or(DeviceError::InvalidArgument)?;
            f(line);
            *line
        };
        self.events.lock().push(LineEvent {
            offset,
            direction: line.direction,
            value: line.value,
            at_ms: uptime_ms(),
        });
        Ok(())
    }
}

impl GpioChip for SimGpioChip {
    fn label(&self) -> &str {
        &self.label
    }

    fn ngpio(&self) -> u32 {
        self.lines.lock().len() as u32
    }

    fn get_direction(&self, offset: u32) -> Result<Direction> {
        self.line(offset)
            .map(|l| l.direction)
            .ok_or(DeviceError::InvalidArgument)
    }

    fn direction_input(&self, offset: u32) -> Result<()> {
        self.check_direction_fault(offset)?;
        self.update(offset, |line| line.direction = Direction::In)
    }

    fn direction_output(&self, offset: u32, value: bool) -> Result<()> {
        self.check_direction_fault(offset)?;
        self.update(offset, |line| {
            line.direction = Direction::Out;
            line.value = value;
        })
    }

    fn get(&self, offset: u32) -> Result<bool> {
        self.line(offset)
            .map(|l| l.value)
            .ok_or(DeviceError::InvalidArgument)
    }

    fn set(&self, offset: u32, value: bool) -> Result<()> {
        self.update(offset, |line| line.value = value)
    }
}
