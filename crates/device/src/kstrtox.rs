//! 字符串到整数的转换
//!
//! 与 Linux `kstrto*()` 系列保持一致的语义，用于解析 sysfs 属性写入的内容：
//!
//! - 整个字符串必须是一个合法整数，末尾最多允许一个 `\n`
//! - `base == 0` 时自动识别进制：`0x`/`0X` 且后跟十六进制数字为 16 进制，
//!   以 `0` 开头为 8 进制，其余为 10 进制
//! - 有符号版本允许一个前导 `+` 或 `-`
//! - 非法输入返回 [`DeviceError::InvalidArgument`]，溢出返回 [`DeviceError::OutOfRange`]

use crate::error::{DeviceError, Result};

/// 根据前缀确定进制，返回 (进制, 需要跳过的前缀长度)
fn fixup_radix(s: &[u8], base: u32) -> (u32, usize) {
    let has_hex_prefix = s.len() >= 2 && s[0] == b'0' && s[1].eq_ignore_ascii_case(&b'x');

    let base = if base == 0 {
        if s.first() == Some(&b'0') {
            if has_hex_prefix && s.get(2).is_some_and(u8::is_ascii_hexdigit) {
                16
            } else {
                8
            }
        } else {
            10
        }
    } else {
        base
    };

    if base == 16 && has_hex_prefix {
        (16, 2)
    } else {
        (base, 0)
    }
}

/// 解析尽可能多的数字，返回 (值, 消耗的字节数, 是否溢出)
fn parse_digits(s: &[u8], base: u32) -> (u64, usize, bool) {
    let mut value: u64 = 0;
    let mut overflow = false;
    let mut consumed = 0;

    for &c in s {
        let digit = match (c as char).to_digit(16) {
            Some(d) if d < base => d as u64,
            _ => break,
        };
        match value
            .checked_mul(base as u64)
            .and_then(|v| v.checked_add(digit))
        {
            Some(v) => value = v,
            None => overflow = true,
        }
        consumed += 1;
    }

    (value, consumed, overflow)
}

fn kstrtoull_bytes(s: &[u8], base: u32) -> Result<u64> {
    if base != 0 && !(2..=16).contains(&base) {
        return Err(DeviceError::InvalidArgument);
    }

    let (base, prefix) = fixup_radix(s, base);
    let s = &s[prefix..];
    let (value, consumed, overflow) = parse_digits(s, base);

    if overflow {
        return Err(DeviceError::OutOfRange);
    }
    if consumed == 0 {
        return Err(DeviceError::InvalidArgument);
    }

    match &s[consumed..] {
        [] | [b'\n'] => Ok(value),
        _ => Err(DeviceError::InvalidArgument),
    }
}

/// 将字符串转换为 u64
///
/// 允许一个前导 `+`，不允许负号。
pub fn kstrtoull(s: &str, base: u32) -> Result<u64> {
    let bytes = s.as_bytes();
    let bytes = bytes.strip_prefix(b"+").unwrap_or(bytes);
    kstrtoull_bytes(bytes, base)
}

/// 将字符串转换为 i64
pub fn kstrtoll(s: &str, base: u32) -> Result<i64> {
    let bytes = s.as_bytes();

    if let Some(rest) = bytes.strip_prefix(b"-") {
        let magnitude = kstrtoull_bytes(rest, base)?;
        if magnitude > i64::MAX as u64 + 1 {
            return Err(DeviceError::OutOfRange);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        let bytes = bytes.strip_prefix(b"+").unwrap_or(bytes);
        let value = kstrtoull_bytes(bytes, base)?;
        i64::try_from(value).map_err(|_| DeviceError::OutOfRange)
    }
}

/// 将字符串转换为 i32
pub fn kstrtoint(s: &str, base: u32) -> Result<i32> {
    let value = kstrtoll(s, base)?;
    i32::try_from(value).map_err(|_| DeviceError::OutOfRange)
}

/// 将字符串转换为 u32
pub fn kstrtouint(s: &str, base: u32) -> Result<u32> {
    let value = kstrtoull(s, base)?;
    u32::try_from(value).map_err(|_| DeviceError::OutOfRange)
}
