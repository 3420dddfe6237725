// crates/fc_registry/src/io_dictionary.rs

//! IoDictionary - 可注册的字典
//!
//! 从对象路径读取 JSON 字典。读选项为 `MUST_READ_IF_MODIFIED` 时监视文件，
//! 注册表的 `read_modified_objects` 在文件修改后重读。

use std::ops::Deref;

use tracing::info;

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::io_object::{IoObject, ReadOption};
use crate::reg_io_object::RegIoObject;

/// 可注册的字典
#[derive(Debug)]
pub struct IoDictionary {
    io: IoObject,
    dict: Dictionary,
}

impl IoDictionary {
    /// 按读选项构造
    ///
    /// `MUST_READ*` 时文件缺失为错误；`READ_IF_PRESENT` 时文件缺失得到空字典。
    pub fn new(mut io: IoObject) -> FoamResult<Self> {
        let path = io.object_path();
        let dict = match io.read_opt() {
            ReadOption::MustRead | ReadOption::MustReadIfModified => {
                if !path.is_file() {
                    return Err(FoamError::file_not_found(path));
                }
                Dictionary::from_file(&path)?.with_scope(io.name())
            }
            ReadOption::ReadIfPresent if path.is_file() => {
                Dictionary::from_file(&path)?.with_scope(io.name())
            }
            _ => Dictionary::new(io.name()),
        };
        if io.read_opt().watches() {
            io.watch_file();
        }
        Ok(Self { io, dict })
    }

    /// 由内存中的字典构造
    pub fn from_dictionary(io: IoObject, dict: Dictionary) -> Self {
        let dict = dict.with_scope(io.name());
        Self { io, dict }
    }

    /// 字典内容
    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    /// 字典内容（可变）
    pub fn dict_mut(&mut self) -> &mut Dictionary {
        &mut self.dict
    }
}

impl Deref for IoDictionary {
    type Target = Dictionary;

    fn deref(&self) -> &Dictionary {
        &self.dict
    }
}

impl RegIoObject for IoDictionary {
    fn io(&self) -> &IoObject {
        &self.io
    }

    fn io_mut(&mut self) -> &mut IoObject {
        &mut self.io
    }

    fn type_name(&self) -> String {
        "dictionary".into()
    }

    fn read(&mut self) -> FoamResult<bool> {
        let path = self.io.object_path();
        if !path.is_file() {
            return Ok(false);
        }
        self.dict = Dictionary::from_file(&path)?.with_scope(self.io.name());
        self.io.update_watch();
        info!("重读字典 {}", path.display());
        Ok(true)
    }

    fn write_data(&self) -> FoamResult<serde_json::Value> {
        Ok(self.dict.to_value())
    }
}
