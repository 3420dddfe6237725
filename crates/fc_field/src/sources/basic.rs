// crates/fc_field/src/sources/basic.rs

//! 通用场源：internal、uniformFixedValue、uniformInletOutlet

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};

use super::{FieldSource, SourceContext};

// ============================================================
// 均匀值（常数或时间表）
// ============================================================

/// 常数或按时间线性插值的表 `[[t, v], ...]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformValue<T> {
    /// 常数
    Constant(T),
    /// 时间表，超出范围取端点值
    Table(Vec<(f64, T)>),
}

impl<T: FieldValue> UniformValue<T> {
    /// 读取并检查时间表非空且严格递增
    pub fn read(dict: &Dictionary, key: &str) -> FoamResult<Self> {
        let value: Self = dict.lookup(key)?;
        if let Self::Table(rows) = &value {
            if rows.is_empty() {
                return Err(FoamError::invalid_entry(dict.scope(), key, "时间表为空"));
            }
            if rows.windows(2).any(|w| w[1].0 <= w[0].0) {
                return Err(FoamError::invalid_entry(dict.scope(), key, "时间必须严格递增"));
            }
        }
        Ok(value)
    }

    /// `t` 时刻的值
    pub fn value(&self, t: f64) -> T {
        match self {
            Self::Constant(v) => *v,
            Self::Table(rows) => {
                let i = rows.partition_point(|(ti, _)| *ti <= t);
                match i {
                    0 => rows[0].1,
                    i if i == rows.len() => rows[i - 1].1,
                    i => {
                        let (t0, v0) = rows[i - 1];
                        let (t1, v1) = rows[i];
                        let w = (t - t0) / (t1 - t0);
                        v0.scale(1.0 - w) + v1.scale(w)
                    }
                }
            }
        }
    }
}

// ============================================================
// internal
// ============================================================

/// 注入值取内部场值
pub struct InternalSource<T> {
    _value: PhantomData<T>,
}

impl<T: FieldValue> InternalSource<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "internal";

    /// 从字典构造
    pub fn from_dictionary(_dict: &Dictionary) -> FoamResult<Self> {
        Ok(Self {
            _value: PhantomData,
        })
    }
}

impl<T> std::fmt::Debug for InternalSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InternalSource")
    }
}

impl<T: FieldValue> FieldSource<T> for InternalSource<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn source_value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.cell_values())
    }

    fn internal_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>> {
        Ok(vec![1.0; ctx.size()])
    }

    fn clone_box(&self) -> Box<dyn FieldSource<T>> {
        Box::new(Self {
            _value: PhantomData,
        })
    }
}

// ============================================================
// uniformFixedValue
// ============================================================

/// 注入给定的均匀值
#[derive(Debug, Clone)]
pub struct UniformFixedValueSource<T> {
    uniform_value: UniformValue<T>,
}

impl<T: FieldValue> UniformFixedValueSource<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "uniformFixedValue";

    /// 从字典构造：`uniformValue`
    pub fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        Ok(Self {
            uniform_value: UniformValue::read(dict, "uniformValue")?,
        })
    }
}

impl<T: FieldValue> FieldSource<T> for UniformFixedValueSource<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn source_value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(vec![self.uniform_value.value(ctx.time); ctx.size()])
    }

    fn internal_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>> {
        Ok(vec![0.0; ctx.size()])
    }

    fn clone_box(&self) -> Box<dyn FieldSource<T>> {
        Box::new(self.clone())
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", Self::TYPE_NAME)?;
        dict.set("uniformValue", &self.uniform_value)?;
        Ok(())
    }
}

// ============================================================
// uniformInletOutlet
// ============================================================

/// 注入时取给定值，抽出时取内部值
#[derive(Debug, Clone)]
pub struct UniformInletOutletSource<T> {
    uniform_inlet_value: UniformValue<T>,
}

impl<T: FieldValue> UniformInletOutletSource<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "uniformInletOutlet";

    /// 从字典构造：`uniformInletValue`
    pub fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        Ok(Self {
            uniform_inlet_value: UniformValue::read(dict, "uniformInletValue")?,
        })
    }
}

impl<T: FieldValue> FieldSource<T> for UniformInletOutletSource<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn source_value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(vec![self.uniform_inlet_value.value(ctx.time); ctx.size()])
    }

    fn internal_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>> {
        Ok(ctx
            .rate
            .iter()
            .map(|r| if *r > 0.0 { 0.0 } else { 1.0 })
            .collect())
    }

    fn clone_box(&self) -> Box<dyn FieldSource<T>> {
        Box::new(self.clone())
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", Self::TYPE_NAME)?;
        dict.set("uniformInletValue", &self.uniform_inlet_value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_value_table() {
        let d = Dictionary::from_json_str("s", r#"{"v": [[0.0, 1.0], [2.0, 3.0]]}"#).unwrap();
        let v = UniformValue::<f64>::read(&d, "v").unwrap();
        assert_eq!(v.value(-1.0), 1.0);
        assert_eq!(v.value(1.0), 2.0);
        assert_eq!(v.value(5.0), 3.0);

        let bad = Dictionary::from_json_str("s", r#"{"v": [[1.0, 1.0], [1.0, 3.0]]}"#).unwrap();
        assert!(UniformValue::<f64>::read(&bad, "v").is_err());
    }

    #[test]
    fn test_inlet_outlet_switches_on_rate_sign() {
        let d = Dictionary::from_json_str(
            "s",
            r#"{"type": "uniformInletOutlet", "uniformInletValue": 10.0}"#,
        )
        .unwrap();
        let src = UniformInletOutletSource::<f64>::from_dictionary(&d).unwrap();
        let internal = [1.0, 2.0];
        let ctx = SourceContext::new(&[0, 1], &internal, &[1.0, -1.0], 0.0).unwrap();
        assert_eq!(src.value(&ctx).unwrap(), vec![10.0, 2.0]);
    }

    #[test]
    fn test_internal_source_takes_cell_values() {
        let src = InternalSource::<f64>::from_dictionary(&Dictionary::new("s")).unwrap();
        let internal = [4.0, 5.0];
        let ctx = SourceContext::new(&[1], &internal, &[2.0], 0.0).unwrap();
        assert_eq!(src.value(&ctx).unwrap(), vec![5.0]);
    }
}
