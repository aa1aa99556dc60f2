//! 设备树节点模型
//!
//! 内核在解析 FDT 后为每个平台设备构造一个 [`DeviceNode`]，驱动只通过这里的接口读取属性。
//! GPIO 属性（`<con_id>-gpios`）在构造时已经把 phandle 解析成 GPIO 控制器的 label。

use alloc::collections::btree_map::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::gpio::GpioFlags;

/// 一个 GPIO 说明符：`<&chip offset flags>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioSpec {
    /// GPIO 控制器的 label
    pub chip: String,
    /// 控制器内的线号
    pub offset: u32,
    /// 说明符中的标志位
    pub flags: GpioFlags,
}

impl GpioSpec {
    /// 创建 GPIO 说明符
    pub fn new(chip: &str, offset: u32, flags: GpioFlags) -> Self {
        Self {
            chip: chip.to_string(),
            offset,
            flags,
        }
    }
}

/// 设备树属性值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// 空属性（布尔属性）
    Empty,
    /// u32 数组
    U32(Vec<u32>),
    /// 字符串列表
    Strings(Vec<String>),
    /// GPIO 说明符列表
    Gpios(Vec<GpioSpec>),
}

/// 设备树节点
#[derive(Debug, Clone, Default)]
pub struct DeviceNode {
    name: String,
    properties: BTreeMap<String, Property>,
}

impl DeviceNode {
    /// 创建没有任何属性的节点
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// 添加（或替换）一个属性
    pub fn with_property(mut self, name: &str, value: Property) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// 设置 `compatible` 属性
    pub fn with_compatible(self, compatible: &[&str]) -> Self {
        let list = compatible.iter().map(|c| c.to_string()).collect();
        self.with_property("compatible", Property::Strings(list))
    }

    /// 设置 GPIO 属性，`name` 为完整属性名（如 `enable-gpios`）
    pub fn with_gpios(self, name: &str, gpios: Vec<GpioSpec>) -> Self {
        self.with_property(name, Property::Gpios(gpios))
    }

    /// 节点名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 按名称查找属性
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// `compatible` 列表，从最具体到最通用
    pub fn compatible(&self) -> impl Iterator<Item = &str> {
        let list: &[String] = match self.property("compatible") {
            Some(Property::Strings(list)) => list,
            _ => &[],
        };
        list.iter().map(String::as_str)
    }

    /// 是否兼容给定字符串
    pub fn is_compatible(&self, compatible: &str) -> bool {
        self.compatible().any(|c| c == compatible)
    }

    /// 读取 u32 属性的第一个元素
    pub fn read_u32(&self, name: &str) -> Option<u32> {
        match self.property(name) {
            Some(Property::U32(values)) => values.first().copied(),
            _ => None,
        }
    }

    /// 读取字符串属性的第一个元素
    pub fn read_string(&self, name: &str) -> Option<&str> {
        match self.property(name) {
            Some(Property::Strings(values)) => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// 读取 GPIO 属性
    pub fn gpios(&self, name: &str) -> Option<&[GpioSpec]> {
        match self.property(name) {
            Some(Property::Gpios(specs)) => Some(specs),
            _ => None,
        }
    }

    /// `status` 属性缺省或为 `okay`/`ok` 时节点可用
    pub fn is_available(&self) -> bool {
        matches!(self.read_string("status"), None | Some("okay") | Some("ok"))
    }
}

/// 驱动匹配表中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfDeviceId {
    /// 匹配的 `compatible` 字符串
    pub compatible: &'static str,
}

impl OfDeviceId {
    /// 创建匹配项
    pub const fn compatible(compatible: &'static str) -> Self {
        Self { compatible }
    }
}

/// 在匹配表中查找节点的最佳匹配
///
/// 节点 `compatible` 列表越靠前的字符串越具体，优先匹配。
pub fn of_match_node<'a>(table: &'a [OfDeviceId], node: &DeviceNode) -> Option<&'a OfDeviceId> {
    node.compatible()
        .find_map(|c| table.iter().find(|id| id.compatible == c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    static TABLE: [OfDeviceId; 2] = [
        OfDeviceId::compatible("vendor,generic"),
        OfDeviceId::compatible("vendor,specific"),
    ];

    #[test]
    fn test_match_prefers_most_specific() {
        let node =
            DeviceNode::new("dev@0").with_compatible(&["vendor,specific", "vendor,generic"]);
        let id = of_match_node(&TABLE, &node).unwrap();
        assert_eq!(id.compatible, "vendor,specific");
    }

    #[test]
    fn test_match_none() {
        let node = DeviceNode::new("dev@0").with_compatible(&["other"]);
        assert!(of_match_node(&TABLE, &node).is_none());
        assert!(of_match_node(&TABLE, &DeviceNode::new("bare")).is_none());
    }

    #[test]
    fn test_property_accessors() {
        let node = DeviceNode::new("modem")
            .with_property("reg", Property::U32(vec![0x1000, 0x100]))
            .with_gpios(
                "enable-gpios",
                vec![GpioSpec::new("gpio0", 17, GpioFlags::ACTIVE_LOW)],
            );
        assert_eq!(node.read_u32("reg"), Some(0x1000));
        assert_eq!(node.read_u32("missing"), None);
        let gpios = node.gpios("enable-gpios").unwrap();
        assert_eq!(gpios[0].offset, 17);
        assert!(gpios[0].flags.contains(GpioFlags::ACTIVE_LOW));
        assert!(node.gpios("reg").is_none());
    }

    #[test]
    fn test_status() {
        let node = DeviceNode::new("a");
        assert!(node.is_available());
        let node = node.with_property("status", Property::Strings(vec!["disabled".into()]));
        assert!(!node.is_available());
    }
}
