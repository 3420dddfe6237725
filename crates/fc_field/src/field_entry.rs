// crates/fc_field/src/field_entry.rs

//! 场值条目
//!
//! 字典中的场值有三种写法：
//!
//! ```text
//! "value": 1.0                       均匀（裸值）
//! "value": {"uniform": [1, 0, 0]}    均匀
//! "value": {"nonuniform": [...]}     逐元素
//! ```

use serde::{Deserialize, Serialize};

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};

/// 场值条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry<T> {
    /// 均匀值
    Uniform {
        /// 值
        uniform: T,
    },
    /// 逐元素值
    Nonuniform {
        /// 值列表
        nonuniform: Vec<T>,
    },
    /// 裸值，等同均匀值
    Value(T),
}

impl<T: FieldValue> FieldEntry<T> {
    /// 由值列表生成条目，全部相等时写为均匀值
    pub fn from_values(values: &[T]) -> Self {
        match values.first() {
            Some(first) if values.iter().all(|v| v == first) => Self::Uniform { uniform: *first },
            _ => Self::Nonuniform {
                nonuniform: values.to_vec(),
            },
        }
    }

    /// 展开为 n 个值
    pub fn expand(&self, n: usize, scope: &str, key: &str) -> FoamResult<Vec<T>> {
        match self {
            Self::Uniform { uniform: v } | Self::Value(v) => Ok(vec![*v; n]),
            Self::Nonuniform { nonuniform } => {
                if nonuniform.len() != n {
                    return Err(FoamError::invalid_entry(
                        scope,
                        key,
                        format!("需要 {} 个值, 实际 {} 个", n, nonuniform.len()),
                    ));
                }
                Ok(nonuniform.clone())
            }
        }
    }
}

/// 读取 n 个场值
pub fn read_values<T: FieldValue>(dict: &Dictionary, key: &str, n: usize) -> FoamResult<Vec<T>> {
    let entry: FieldEntry<T> = dict.lookup(key)?;
    entry.expand(n, dict.scope(), key)
}

/// 读取可选的场值
pub fn read_values_opt<T: FieldValue>(
    dict: &Dictionary,
    key: &str,
    n: usize,
) -> FoamResult<Option<Vec<T>>> {
    match dict.lookup_opt::<FieldEntry<T>>(key)? {
        Some(entry) => entry.expand(n, dict.scope(), key).map(Some),
        None => Ok(None),
    }
}

/// 写出场值
pub fn write_values<T: FieldValue>(dict: &mut Dictionary, key: &str, values: &[T]) -> FoamResult<()> {
    dict.set(key, FieldEntry::from_values(values))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_three_forms() {
        let d = Dictionary::from_json_str(
            "p",
            r#"{"a": 2.0, "b": {"uniform": 3.0}, "c": {"nonuniform": [1.0, 2.0]}}"#,
        )
        .unwrap();
        assert_eq!(read_values::<f64>(&d, "a", 2).unwrap(), vec![2.0, 2.0]);
        assert_eq!(read_values::<f64>(&d, "b", 1).unwrap(), vec![3.0]);
        assert_eq!(read_values::<f64>(&d, "c", 2).unwrap(), vec![1.0, 2.0]);
        assert!(read_values::<f64>(&d, "c", 3).is_err());
        assert!(read_values_opt::<f64>(&d, "missing", 3).unwrap().is_none());
    }

    #[test]
    fn test_vector_uniform() {
        let d = Dictionary::from_json_str("U", r#"{"value": {"uniform": [1.0, 0.0, 0.0]}}"#)
            .unwrap();
        let v = read_values::<DVec3>(&d, "value", 2).unwrap();
        assert_eq!(v, vec![DVec3::X, DVec3::X]);
    }

    #[test]
    fn test_write_compacts_uniform() {
        let mut d = Dictionary::new("p");
        write_values(&mut d, "value", &[1.5, 1.5]).unwrap();
        assert_eq!(d.get("value").unwrap(), &serde_json::json!({"uniform": 1.5}));
        write_values(&mut d, "value", &[1.0, 2.0]).unwrap();
        assert_eq!(d.get("value").unwrap(), &serde_json::json!({"nonuniform": [1.0, 2.0]}));
    }
}
