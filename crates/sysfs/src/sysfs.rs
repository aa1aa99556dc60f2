//! Sysfs 文件系统对象

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use device::ClassRegistry;
use sync::RwLock;

use crate::builders;
use crate::error::FsError;
use crate::inode::{InodeKind, SysfsInode};

/// 路径解析时允许跟随的符号链接层数
const MAX_SYMLINK_HOPS: usize = 8;

/// Sysfs 文件系统对象（提供 `/sys` 目录树）
///
/// 目录树是设备类注册表的快照，类或设备增删后需调用 [`SysFS::rebuild`]。
/// 属性文件的读写直接转发到类设备，不经过快照。
pub struct SysFS<'a> {
    classes: &'a ClassRegistry,
    root_inode: RwLock<Arc<SysfsInode>>,
}

impl<'a> SysFS<'a> {
    /// 基于设备类注册表创建 sysfs 并构建目录树
    pub fn new(classes: &'a ClassRegistry) -> Result<Self, FsError> {
        let root = builders::build_tree(classes)?;
        Ok(Self {
            classes,
            root_inode: RwLock::new(root),
        })
    }

    /// 重新构建目录树
    pub fn rebuild(&self) -> Result<(), FsError> {
        let root = builders::build_tree(self.classes)?;
        *self.root_inode.write() = root;
        log::debug!("sysfs: rebuilt tree ({} classes)", self.classes.classes().len());
        Ok(())
    }

    /// 根目录
    pub fn root_inode(&self) -> Arc<SysfsInode> {
        self.root_inode.read().clone()
    }

    /// 解析路径并跟随符号链接
    ///
    /// 路径可以带 `/sys` 前缀，也可以相对于 sysfs 根目录。
    pub fn lookup(&self, path: &str) -> Result<Arc<SysfsInode>, FsError> {
        self.resolve(path, true)
    }

    /// 读取属性文件
    pub fn read(&self, path: &str) -> Result<String, FsError> {
        self.lookup(path)?.read()
    }

    /// 写入属性文件
    pub fn write(&self, path: &str, data: &str) -> Result<usize, FsError> {
        self.lookup(path)?.write(data)
    }

    /// 列出目录项
    pub fn list(&self, path: &str) -> Result<Vec<String>, FsError> {
        self.lookup(path)?.list()
    }

    /// 读取符号链接目标（不跟随最后一级）
    pub fn readlink(&self, path: &str) -> Result<String, FsError> {
        self.resolve(path, false)?
            .symlink_target()
            .map(ToString::to_string)
            .ok_or(FsError::InvalidArgument)
    }

    fn resolve(&self, path: &str, follow_last: bool) -> Result<Arc<SysfsInode>, FsError> {
        let root = self.root_inode();
        let mut pending: VecDeque<String> = components(path).collect();
        let mut stack: Vec<Arc<SysfsInode>> = Vec::new();
        stack.push(root.clone());
        let mut hops = 0;

        while let Some(name) = pending.pop_front() {
            match name.as_str() {
                "." => continue,
                ".." => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                    continue;
                }
                _ => {}
            }

            let dir = stack.last().ok_or(FsError::NotFound)?;
            let node = dir.lookup(&name)?;
            if node.kind() != InodeKind::Symlink || (pending.is_empty() && !follow_last) {
                stack.push(node);
                continue;
            }

            hops += 1;
            if hops > MAX_SYMLINK_HOPS {
                return Err(FsError::TooManySymlinks);
            }
            let target = node.symlink_target().unwrap_or_default();
            if target.starts_with('/') {
                stack.truncate(1);
            }
            for component in components(target).collect::<Vec<_>>().into_iter().rev() {
                pending.push_front(component);
            }
        }

        stack.pop().ok_or(FsError::NotFound)
    }
}

/// 拆分路径，去掉开头的 `/sys`
fn components(path: &str) -> impl Iterator<Item = String> + '_ {
    let path = path.trim_start_matches('/');
    let path = match path.strip_prefix("sys") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
}
