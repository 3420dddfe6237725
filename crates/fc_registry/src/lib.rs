// crates/fc_registry/src/lib.rs

//! FoamCore Registry Layer
//!
//! 进程内层级命名对象库：场、网格、子注册表按名称注册与查找，
//! 支持事件计数、依赖重读、临时对象缓存和网格变化通知的分派。
//!
//! # 模块概览
//!
//! - [`io_object`]: 对象身份、路径约定、读写选项
//! - [`reg_io_object`]: 可注册对象 trait 与网格变化通知接口
//! - [`object_registry`]: 注册表
//! - [`time`]: 根注册表与时间控制
//! - [`io_dictionary`]: 可注册、可重读的字典
//!
//! # 示例
//!
//! ```
//! use fc_registry::{IoDictionary, ObjectRegistry, DbLocation, IoObject};
//! use fc_config::Dictionary;
//!
//! let mut db = ObjectRegistry::new("region0", DbLocation::default());
//! let io = db.io_object("transportProperties", "constant");
//! let dict = IoDictionary::from_dictionary(io, Dictionary::new(""));
//! let id = db.check_in(Box::new(dict)).ok().unwrap();
//! assert!(db.found_object::<IoDictionary>("transportProperties"));
//! assert!(db.check_out("transportProperties", id));
//! ```
//!
//! 注册表不是线程安全的：每个进程单线程访问，跨进程一致性由同步原语负责。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod io_dictionary;
pub mod io_object;
pub mod object_registry;
pub mod reg_io_object;
pub mod time;

pub use io_dictionary::IoDictionary;
pub use io_object::{DbLocation, IoObject, ObjectId, ReadOption, WriteOption};
pub use object_registry::{ObjectRegistry, ReadReport};
pub use reg_io_object::{short_type_name, AsAny, MapStatus, RegIoObject};
pub use time::{time_name, Time};
