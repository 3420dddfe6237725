// crates/fc_config/src/dictionary.rs

//! 层级键值字典
//!
//! 运行时选择的所有多态组件（边界条件、场源、分布）都由字典中的 `type` 条目选择。
//! 字典以 JSON 对象承载，每个字典记录自己的作用域（如 `p::boundaryField::inlet`），
//! 查找失败的错误信息中带有完整作用域。
//!
//! # 示例
//!
//! ```
//! use fc_config::Dictionary;
//!
//! let dict = Dictionary::from_json_str("p", r#"{
//!     "boundaryField": { "inlet": { "type": "fixedValue", "value": 1.0 } }
//! }"#).unwrap();
//! let inlet = dict.sub_dict("boundaryField").unwrap().sub_dict("inlet").unwrap();
//! assert_eq!(inlet.type_name().unwrap(), "fixedValue");
//! assert_eq!(inlet.scope(), "p::boundaryField::inlet");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// 作用域分隔符
pub const SCOPE_SEPARATOR: &str = "::";

/// 层级键值字典
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    scope: String,
    entries: Map<String, Value>,
}

impl Dictionary {
    /// 空字典
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entries: Map::new(),
        }
    }

    /// 由 JSON 值构造，值必须是对象
    pub fn from_value(scope: impl Into<String>, value: Value) -> ConfigResult<Self> {
        let scope = scope.into();
        match value {
            Value::Object(entries) => Ok(Self { scope, entries }),
            other => Err(ConfigError::invalid_value(
                scope,
                other.to_string(),
                "字典必须是 JSON 对象",
            )),
        }
    }

    /// 由 JSON 文本构造
    pub fn from_json_str(scope: impl Into<String>, text: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(scope, value)
    }

    /// 由 JSON 文件构造，作用域为文件名
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scope = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json_str(scope, &text)
    }

    /// 完整作用域
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// 作用域最后一级（字典自身的名字）
    pub fn name(&self) -> &str {
        self.scope
            .rsplit(SCOPE_SEPARATOR)
            .next()
            .unwrap_or(&self.scope)
    }

    fn child_scope(&self, key: &str) -> String {
        if self.scope.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.scope, SCOPE_SEPARATOR, key)
        }
    }

    /// 条目个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否有条目
    pub fn found(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 条目是否为子字典
    pub fn is_dict(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Value::Object(_)))
    }

    /// 原始条目
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// 有序键列表
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 查找并反序列化条目，缺失或类型不符时报错
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| ConfigError::missing(&self.scope, key))?;
        self.convert(key, value)
    }

    /// 查找条目，缺失时返回默认值；存在但无效时仍报错
    pub fn lookup_or<T: DeserializeOwned>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.entries.get(key) {
            Some(value) => self.convert(key, value),
            None => Ok(default),
        }
    }

    /// 查找可选条目
    pub fn lookup_opt<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<Option<T>> {
        self.entries
            .get(key)
            .map(|value| self.convert(key, value))
            .transpose()
    }

    fn convert<T: DeserializeOwned>(&self, key: &str, value: &Value) -> ConfigResult<T> {
        T::deserialize(value).map_err(|e| {
            ConfigError::invalid_value(self.child_scope(key), value.to_string(), e.to_string())
        })
    }

    /// 运行时选择的类型名（`type` 条目）
    pub fn type_name(&self) -> ConfigResult<String> {
        self.lookup("type")
    }

    /// 子字典
    pub fn sub_dict(&self, key: &str) -> ConfigResult<Dictionary> {
        match self.entries.get(key) {
            Some(Value::Object(entries)) => Ok(Dictionary {
                scope: self.child_scope(key),
                entries: entries.clone(),
            }),
            Some(other) => Err(ConfigError::invalid_value(
                self.child_scope(key),
                other.to_string(),
                "不是子字典",
            )),
            None => Err(ConfigError::missing(&self.scope, key)),
        }
    }

    /// 可选子字典
    pub fn opt_sub_dict(&self, key: &str) -> Option<Dictionary> {
        match self.entries.get(key) {
            Some(Value::Object(entries)) => Some(Dictionary {
                scope: self.child_scope(key),
                entries: entries.clone(),
            }),
            _ => None,
        }
    }

    /// 设置条目
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> ConfigResult<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| ConfigError::invalid_value(self.child_scope(&key), "?", e.to_string()))?;
        self.entries.insert(key, value);
        Ok(())
    }

    /// 添加子字典
    pub fn add_sub_dict(&mut self, key: impl Into<String>, dict: Dictionary) {
        self.entries.insert(key.into(), Value::Object(dict.entries));
    }

    /// 删除条目
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// 合并另一个字典，子字典递归合并，其余条目覆盖
    pub fn merge(&mut self, other: &Dictionary) {
        fn merge_map(into: &mut Map<String, Value>, from: &Map<String, Value>) {
            for (k, v) in from {
                match (into.get_mut(k), v) {
                    (Some(Value::Object(a)), Value::Object(b)) => merge_map(a, b),
                    _ => {
                        into.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        merge_map(&mut self.entries, &other.entries);
    }

    /// 转为 JSON 值
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }

    /// 格式化 JSON 文本
    pub fn to_json_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_default()
    }

    /// 修改作用域
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Dictionary {
            scope: String::new(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        Dictionary::from_json_str(
            "U",
            r#"{
                "dimensions": "[0 1 -1 0 0]",
                "internalField": [0.0, 0.0, 0.0],
                "boundaryField": {
                    "inlet": { "type": "fixedValue", "value": [1.0, 0.0, 0.0] },
                    "walls": { "type": "zeroGradient" }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_scope() {
        let dict = sample();
        let bf = dict.sub_dict("boundaryField").unwrap();
        assert_eq!(bf.scope(), "U::boundaryField");
        assert_eq!(bf.keys(), vec!["inlet".to_string(), "walls".to_string()]);
        let inlet = bf.sub_dict("inlet").unwrap();
        assert_eq!(inlet.name(), "inlet");
        let v: [f64; 3] = inlet.lookup("value").unwrap();
        assert_eq!(v, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_reports_scope() {
        let dict = sample();
        let walls = dict.sub_dict("boundaryField").unwrap().sub_dict("walls").unwrap();
        let err = walls.lookup::<f64>("value").unwrap_err();
        match err {
            ConfigError::Missing { scope, key } => {
                assert_eq!(scope, "U::boundaryField::walls");
                assert_eq!(key, "value");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_wrong_type_is_invalid_value() {
        let dict = sample();
        let err = dict.lookup::<f64>("boundaryField").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(dict.sub_dict("dimensions").is_err());
        assert!(dict.opt_sub_dict("dimensions").is_none());
    }

    #[test]
    fn test_lookup_or() {
        let dict = sample();
        assert_eq!(dict.lookup_or("missing", 3.5).unwrap(), 3.5);
        assert!(dict.lookup_or("boundaryField", 3.5).is_err());
        assert_eq!(dict.lookup_opt::<f64>("missing").unwrap(), None);
    }

    #[test]
    fn test_set_and_merge() {
        let mut a = Dictionary::new("a");
        a.set("x", 1.0).unwrap();
        let mut sub = Dictionary::new("");
        sub.set("k", "v").unwrap();
        a.add_sub_dict("sub", sub);

        let b = Dictionary::from_json_str("b", r#"{"x": 2.0, "sub": {"m": 1}}"#).unwrap();
        a.merge(&b);
        assert_eq!(a.lookup::<f64>("x").unwrap(), 2.0);
        let sub = a.sub_dict("sub").unwrap();
        assert_eq!(sub.lookup::<String>("k").unwrap(), "v");
        assert_eq!(sub.lookup::<i64>("m").unwrap(), 1);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Dictionary::from_json_str("x", "[1, 2]").is_err());
    }
}
