//! Sysfs inode

use core::sync::atomic::{AtomicUsize, Ordering};

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use device::AttrMode;
use sync::SpinLock;

use crate::error::FsError;

/// 目录类型位
pub const S_IFDIR: u32 = 0o040000;
/// 普通文件类型位
pub const S_IFREG: u32 = 0o100000;
/// 符号链接类型位
pub const S_IFLNK: u32 = 0o120000;

/// 属性读回调
pub type ShowFn = Arc<dyn Fn() -> Result<String, FsError> + Send + Sync>;
/// 属性写回调，返回消耗的字节数
pub type StoreFn = Arc<dyn Fn(&str) -> Result<usize, FsError> + Send + Sync>;

/// 属性文件
pub struct SysfsAttr {
    /// 文件名
    pub name: String,
    /// 权限位
    pub mode: AttrMode,
    /// 读回调
    pub show: ShowFn,
    /// 写回调，只读属性为 None
    pub store: Option<StoreFn>,
}

/// inode 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    /// 目录
    Directory,
    /// 属性文件
    Attribute,
    /// 符号链接
    Symlink,
}

enum SysfsContent {
    Directory(SpinLock<BTreeMap<String, Arc<SysfsInode>>>),
    Attribute(SysfsAttr),
    Symlink(String),
}

static NEXT_INODE_NO: AtomicUsize = AtomicUsize::new(1);

/// Sysfs 中的 inode 节点
pub struct SysfsInode {
    inode_no: usize,
    content: SysfsContent,
}

impl SysfsInode {
    fn new(content: SysfsContent) -> Arc<Self> {
        Arc::new(Self {
            inode_no: NEXT_INODE_NO.fetch_add(1, Ordering::Relaxed),
            content,
        })
    }

    /// 创建目录 inode
    pub fn new_directory() -> Arc<Self> {
        Self::new(SysfsContent::Directory(SpinLock::new(BTreeMap::new())))
    }

    /// 创建属性文件 inode
    pub fn new_attribute(attr: SysfsAttr) -> Arc<Self> {
        Self::new(SysfsContent::Attribute(attr))
    }

    /// 创建符号链接 inode
    pub fn new_symlink(target: String) -> Arc<Self> {
        Self::new(SysfsContent::Symlink(target))
    }

    /// inode 编号
    pub fn inode_no(&self) -> usize {
        self.inode_no
    }

    /// inode 类型
    pub fn kind(&self) -> InodeKind {
        match &self.content {
            SysfsContent::Directory(_) => InodeKind::Directory,
            SysfsContent::Attribute(_) => InodeKind::Attribute,
            SysfsContent::Symlink(_) => InodeKind::Symlink,
        }
    }

    /// 完整的 `st_mode`（类型位加权限位）
    pub fn mode(&self) -> u32 {
        match &self.content {
            SysfsContent::Directory(_) => S_IFDIR | 0o755,
            SysfsContent::Attribute(attr) => S_IFREG | attr.mode.bits() as u32,
            SysfsContent::Symlink(_) => S_IFLNK | 0o777,
        }
    }

    fn children(&self) -> Result<&SpinLock<BTreeMap<String, Arc<SysfsInode>>>, FsError> {
        match &self.content {
            SysfsContent::Directory(children) => Ok(children),
            _ => Err(FsError::NotDirectory),
        }
    }

    /// 添加子节点
    pub fn add_child(&self, name: &str, child: Arc<SysfsInode>) -> Result<(), FsError> {
        if name.is_empty() || name.contains('/') {
            return Err(FsError::InvalidArgument);
        }
        let mut children = self.children()?.lock();
        if children.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        children.insert(name.to_string(), child);
        Ok(())
    }

    /// 移除子节点
    pub fn remove_child(&self, name: &str) -> Result<Arc<SysfsInode>, FsError> {
        self.children()?.lock().remove(name).ok_or(FsError::NotFound)
    }

    /// 在目录中查找子节点（不跟随符号链接）
    pub fn lookup(&self, name: &str) -> Result<Arc<SysfsInode>, FsError> {
        self.children()?
            .lock()
            .get(name)
            .cloned()
            .ok_or(FsError::NotFound)
    }

    /// 列出目录项，按名称排序
    pub fn list(&self) -> Result<Vec<String>, FsError> {
        Ok(self.children()?.lock().keys().cloned().collect())
    }

    /// 符号链接目标
    pub fn symlink_target(&self) -> Option<&str> {
        match &self.content {
            SysfsContent::Symlink(target) => Some(target),
            _ => None,
        }
    }

    /// 读取属性内容
    pub fn read(&self) -> Result<String, FsError> {
        match &self.content {
            SysfsContent::Attribute(attr) => {
                if !attr.mode.readable() {
                    return Err(FsError::PermissionDenied);
                }
                (attr.show)()
            }
            SysfsContent::Directory(_) => Err(FsError::IsDirectory),
            SysfsContent::Symlink(_) => Err(FsError::InvalidArgument),
        }
    }

    /// 写入属性内容
    pub fn write(&self, data: &str) -> Result<usize, FsError> {
        match &self.content {
            SysfsContent::Attribute(attr) => match &attr.store {
                Some(store) if attr.mode.writable() => store(data),
                _ => Err(FsError::PermissionDenied),
            },
            SysfsContent::Directory(_) => Err(FsError::IsDirectory),
            SysfsContent::Symlink(_) => Err(FsError::InvalidArgument),
        }
    }
}

impl core::fmt::Debug for SysfsInode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SysfsInode")
            .field("inode_no", &self.inode_no)
            .field("kind", &self.kind())
            .finish()
    }
}
