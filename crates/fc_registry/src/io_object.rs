// crates/fc_registry/src/io_object.rs

//! IoObject - 注册对象的身份与磁盘位置
//!
//! 每个注册对象带有一个 `IoObject`：名称、时间实例、局部路径、读写选项、
//! 全局唯一的对象 ID 和事件号。
//!
//! # 路径约定
//!
//! ```text
//! rootPath/caseName/instance/dbDir/local/name
//! ```
//!
//! `dbDir` 为所属注册表的目录（根注册表为空，区域注册表为区域名）。
//!
//! # 对象 ID
//!
//! 对象 ID 在构造时由全局计数器分配，克隆出的 IoObject 得到新 ID。
//! 注册表用 ID 判断 checkOut 传入的对象是否就是所存储的那一个。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// 全局唯一对象 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// 分配新 ID
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ObjectId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始值
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 读选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadOption {
    /// 不读
    #[default]
    NoRead,
    /// 必须读，文件缺失为错误
    MustRead,
    /// 必须读，并在文件修改后重读
    MustReadIfModified,
    /// 文件存在时读
    ReadIfPresent,
}

impl ReadOption {
    /// 是否需要监视文件修改
    pub fn watches(self) -> bool {
        self == Self::MustReadIfModified
    }
}

/// 写选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteOption {
    /// 不写
    #[default]
    NoWrite,
    /// 随注册表写出
    AutoWrite,
}

/// 注册表在磁盘上的位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbLocation {
    /// 根目录
    pub root_path: PathBuf,
    /// 算例名
    pub case_name: String,
    /// 注册表目录（相对于时间实例）
    pub db_dir: PathBuf,
}

impl DbLocation {
    /// 构造根位置
    pub fn new(root_path: impl Into<PathBuf>, case_name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            case_name: case_name.into(),
            db_dir: PathBuf::new(),
        }
    }

    /// 子注册表位置
    pub fn child(&self, dir: &str) -> Self {
        Self {
            root_path: self.root_path.clone(),
            case_name: self.case_name.clone(),
            db_dir: self.db_dir.join(dir),
        }
    }

    /// 算例目录
    pub fn case_path(&self) -> PathBuf {
        self.root_path.join(&self.case_name)
    }
}

/// 文件修改监视
#[derive(Debug, Clone, PartialEq)]
struct FileWatch {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// 注册对象的身份与磁盘位置
#[derive(Debug)]
pub struct IoObject {
    name: String,
    instance: String,
    local: PathBuf,
    location: DbLocation,
    read_opt: ReadOption,
    write_opt: WriteOption,
    id: ObjectId,
    event_no: u64,
    registered: bool,
    watch: Option<FileWatch>,
}

impl IoObject {
    /// 构造
    pub fn new(name: impl Into<String>, instance: impl Into<String>, location: &DbLocation) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
            local: PathBuf::new(),
            location: location.clone(),
            read_opt: ReadOption::NoRead,
            write_opt: WriteOption::NoWrite,
            id: ObjectId::next(),
            event_no: 0,
            registered: false,
            watch: None,
        }
    }

    /// 不关联磁盘位置的对象
    pub fn detached(name: impl Into<String>) -> Self {
        Self::new(name, "", &DbLocation::default())
    }

    /// 设置局部路径
    pub fn with_local(mut self, local: impl Into<PathBuf>) -> Self {
        self.local = local.into();
        self
    }

    /// 设置读选项
    pub fn with_read(mut self, read_opt: ReadOption) -> Self {
        self.read_opt = read_opt;
        self
    }

    /// 设置写选项
    pub fn with_write(mut self, write_opt: WriteOption) -> Self {
        self.write_opt = write_opt;
        self
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 重命名（未注册时）
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 名称中的成员部分：`alpha.water` -> `alpha`
    pub fn member(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[..i],
            None => &self.name,
        }
    }

    /// 名称中的组部分：`alpha.water` -> `water`
    pub fn group(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[i + 1..],
            None => "",
        }
    }

    /// 拼接组名
    pub fn group_name(name: &str, group: &str) -> String {
        if group.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{group}")
        }
    }

    /// 时间实例
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// 设置时间实例
    pub fn set_instance(&mut self, instance: impl Into<String>) {
        self.instance = instance.into();
    }

    /// 局部路径
    pub fn local(&self) -> &Path {
        &self.local
    }

    /// 所属注册表位置
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// 目录：rootPath/caseName/instance/dbDir/local
    pub fn path(&self) -> PathBuf {
        self.location
            .case_path()
            .join(&self.instance)
            .join(&self.location.db_dir)
            .join(&self.local)
    }

    /// 文件路径：rootPath/caseName/instance/dbDir/local/name
    pub fn object_path(&self) -> PathBuf {
        self.path().join(&self.name)
    }

    /// 读选项
    pub fn read_opt(&self) -> ReadOption {
        self.read_opt
    }

    /// 写选项
    pub fn write_opt(&self) -> WriteOption {
        self.write_opt
    }

    /// 设置写选项
    pub fn set_write_opt(&mut self, write_opt: WriteOption) {
        self.write_opt = write_opt;
    }

    /// 对象 ID
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// 事件号，0 表示从未标记
    pub fn event_no(&self) -> u64 {
        self.event_no
    }

    /// 设置事件号（由注册表调用）
    pub fn set_event_no(&mut self, event_no: u64) {
        self.event_no = event_no;
    }

    /// 是否已注册
    pub fn registered(&self) -> bool {
        self.registered
    }

    pub(crate) fn set_registered(&mut self, registered: bool) {
        self.registered = registered;
    }

    /// 文件是否存在
    pub fn header_ok(&self) -> bool {
        self.object_path().is_file()
    }

    /// 开始监视文件修改，记录当前修改时间
    pub fn watch_file(&mut self) {
        let path = self.object_path();
        let last_modified = file_mtime(&path);
        self.watch = Some(FileWatch {
            path,
            last_modified,
        });
    }

    /// 是否在监视文件
    pub fn watching(&self) -> bool {
        self.watch.is_some()
    }

    /// 监视的文件自上次记录以来是否被修改
    pub fn file_modified(&self) -> bool {
        match &self.watch {
            Some(w) => file_mtime(&w.path) != w.last_modified,
            None => false,
        }
    }

    /// 重读之后更新记录的修改时间
    pub fn update_watch(&mut self) {
        if let Some(w) = &mut self.watch {
            w.last_modified = file_mtime(&w.path);
        }
    }
}

/// 克隆得到新对象：新 ID、未注册、事件号清零
impl Clone for IoObject {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: self.instance.clone(),
            local: self.local.clone(),
            location: self.location.clone(),
            read_opt: self.read_opt,
            write_opt: self.write_opt,
            id: ObjectId::next(),
            event_no: 0,
            registered: false,
            watch: self.watch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_convention() {
        let loc = DbLocation::new("/data", "cavity").child("fluid");
        let io = IoObject::new("p", "0.5", &loc).with_local("uniform");
        assert_eq!(
            io.object_path(),
            PathBuf::from("/data/cavity/0.5/fluid/uniform/p")
        );
    }

    #[test]
    fn test_member_and_group() {
        let io = IoObject::detached("alpha.water");
        assert_eq!(io.member(), "alpha");
        assert_eq!(io.group(), "water");
        let plain = IoObject::detached("p");
        assert_eq!(plain.member(), "p");
        assert_eq!(plain.group(), "");
        assert_eq!(IoObject::group_name("alpha", "air"), "alpha.air");
        assert_eq!(IoObject::group_name("p", ""), "p");
    }

    #[test]
    fn test_ids_unique_and_clone_fresh() {
        let a = IoObject::detached("a");
        let b = IoObject::detached("a");
        assert_ne!(a.id(), b.id());
        let mut c = a.clone();
        assert_ne!(c.id(), a.id());
        c.set_event_no(3);
        assert_eq!(c.clone().event_no(), 0);
    }

    #[test]
    fn test_options() {
        let io = IoObject::detached("U")
            .with_read(ReadOption::MustReadIfModified)
            .with_write(WriteOption::AutoWrite);
        assert!(io.read_opt().watches());
        assert_eq!(io.write_opt(), WriteOption::AutoWrite);
        assert!(!io.file_modified());
    }
}
