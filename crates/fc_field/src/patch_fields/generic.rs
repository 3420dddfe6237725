// crates/fc_field/src/patch_fields/generic.rs

//! generic - 未知边界类型的占位
//!
//! 保存原始字典和实际类型名，边界值保持读入时的值，写出时原样回显。
//! 离散系数不可用：对占位边界求解方程是配置错误。
//!
//! 网格变化时，字典中元素数等于补丁尺寸的逐元素条目按分量映射。

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamResult};
use fc_registry::ObjectId;

use crate::field_entry::{read_values, FieldEntry};

use super::{
    mapped_or_refilled, no_coeffs, PatchContext, PatchFaceMapper, PatchField, PatchFieldBase,
    PatchInit,
};

/// 不随网格映射的条目
const UNMAPPED_KEYS: [&str; 3] = ["type", "patchType", "value"];

/// 未知类型的占位补丁场
#[derive(Debug, Clone)]
pub struct GenericPatchField<T> {
    base: PatchFieldBase<T>,
    actual_type: String,
    dict: Dictionary,
}

impl<T: FieldValue> GenericPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "generic";

    /// 从字典构造，`value` 必须给出
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let actual_type = dict.type_name()?;
        let values = read_values(dict, "value", init.size)?;
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(values);
        Ok(Self {
            base,
            actual_type,
            dict: dict.clone(),
        })
    }

    /// 字典中写的类型名
    pub fn actual_type(&self) -> &str {
        &self.actual_type
    }

    /// 原始字典
    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    /// 标量逐元素条目
    fn scalar_list(&self, key: &str, n: usize) -> Option<Vec<f64>> {
        match self.dict.lookup_opt::<FieldEntry<f64>>(key).ok().flatten() {
            Some(FieldEntry::Nonuniform { nonuniform }) if nonuniform.len() == n => Some(nonuniform),
            _ => None,
        }
    }

    /// 多分量逐元素条目（各元素分量数相同）
    fn component_list(&self, key: &str, n: usize) -> Option<Vec<Vec<f64>>> {
        match self.dict.lookup_opt::<FieldEntry<Vec<f64>>>(key).ok().flatten() {
            Some(FieldEntry::Nonuniform { nonuniform })
                if nonuniform.len() == n
                    && nonuniform.iter().all(|r| r.len() == nonuniform[0].len()) =>
            {
                Some(nonuniform)
            }
            _ => None,
        }
    }
}

/// 按分量映射多分量列表
fn map_components<T>(
    rows: &[Vec<f64>],
    mapper: &dyn PatchFaceMapper<T>,
) -> FoamResult<Vec<Vec<f64>>> {
    let n = mapper.size();
    let width = rows.first().map_or(0, Vec::len);
    let mut out = vec![Vec::with_capacity(width); n];
    for c in 0..width {
        let column: Vec<f64> = rows.iter().map(|r| r[c]).collect();
        let mapped = mapper.map_scalars(&column)?;
        let column = mapped_or_refilled(mapped, &column, n, 0.0)?;
        for (row, v) in out.iter_mut().zip(column) {
            row.push(v);
        }
    }
    Ok(out)
}

impl<T: FieldValue> PatchField<T> for GenericPatchField<T> {
    fn type_name(&self) -> &str {
        &self.actual_type
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn evaluate_values(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.base.values().to_vec())
    }

    fn sn_grad(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(&self.actual_type, "sn_grad", self.patch())
    }

    fn value_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(&self.actual_type, "value_internal_coeffs", self.patch())
    }

    fn value_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(&self.actual_type, "value_boundary_coeffs", self.patch())
    }

    fn gradient_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(&self.actual_type, "gradient_internal_coeffs", self.patch())
    }

    fn gradient_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(&self.actual_type, "gradient_boundary_coeffs", self.patch())
    }

    fn map_faces(&mut self, mapper: &dyn PatchFaceMapper<T>) -> FoamResult<()> {
        let old_size = self.base.values().len();
        let mut dict = self.dict.clone();
        for key in self.dict.keys() {
            if UNMAPPED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(list) = self.scalar_list(&key, old_size) {
                let mapped = mapper.map_scalars(&list)?;
                let nonuniform = mapped_or_refilled(mapped, &list, mapper.size(), 0.0)?;
                dict.set(key, FieldEntry::Nonuniform { nonuniform })?;
            } else if let Some(rows) = self.component_list(&key, old_size) {
                let nonuniform = map_components(&rows, mapper)?;
                dict.set(key, FieldEntry::Nonuniform { nonuniform })?;
            }
        }
        self.dict = dict;
        Ok(())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
            ..self.clone()
        })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.merge(&self.dict);
        crate::field_entry::write_values(dict, "value", self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_mesh::{PatchKind, PolyPatch};

    #[test]
    fn test_generic_echoes_dictionary() {
        let patch = PolyPatch::new("outlet", PatchKind::Patch, 0, 2);
        let init = PatchInit::<f64> {
            patch: &patch,
            internal_id: ObjectId::next(),
            size: 2,
            patch_internal: None,
        };
        let d = Dictionary::from_json_str(
            "b",
            r#"{"type": "waveTransmissive", "gamma": 1.4, "value": 1.0}"#,
        )
        .unwrap();
        let pf = GenericPatchField::from_dictionary(&init, &d).unwrap();
        assert_eq!(pf.type_name(), "waveTransmissive");

        let mut out = Dictionary::new("b");
        pf.write(&mut out).unwrap();
        assert_eq!(out.lookup::<f64>("gamma").unwrap(), 1.4);
        assert_eq!(out.type_name().unwrap(), "waveTransmissive");
    }

    struct Reverse;

    impl PatchFaceMapper<f64> for Reverse {
        fn size(&self) -> usize {
            2
        }

        fn map_values(&self, values: &[f64]) -> FoamResult<Option<Vec<f64>>> {
            Ok(Some(values.iter().rev().copied().collect()))
        }

        fn map_scalars(&self, values: &[f64]) -> FoamResult<Option<Vec<f64>>> {
            self.map_values(values)
        }
    }

    #[test]
    fn test_generic_maps_nonuniform_entries() {
        let patch = PolyPatch::new("outlet", PatchKind::Patch, 0, 2);
        let init = PatchInit::<f64> {
            patch: &patch,
            internal_id: ObjectId::next(),
            size: 2,
            patch_internal: None,
        };
        let d = Dictionary::from_json_str(
            "b",
            r#"{"type": "advective", "value": 1.0, "gamma": 1.4,
                "phiInf": {"nonuniform": [1.0, 2.0]},
                "UInf": {"nonuniform": [[1, 0, 0], [0, 2, 0]]},
                "weights": {"nonuniform": [1.0, 2.0, 3.0]}}"#,
        )
        .unwrap();
        let mut pf = GenericPatchField::from_dictionary(&init, &d).unwrap();
        pf.map_faces(&Reverse).unwrap();

        let out = pf.dict();
        assert_eq!(
            out.lookup::<FieldEntry<f64>>("phiInf").unwrap(),
            FieldEntry::Nonuniform { nonuniform: vec![2.0, 1.0] }
        );
        assert_eq!(
            out.lookup::<FieldEntry<Vec<f64>>>("UInf").unwrap(),
            FieldEntry::Nonuniform {
                nonuniform: vec![vec![0.0, 2.0, 0.0], vec![1.0, 0.0, 0.0]]
            }
        );
        // 元素数与补丁不符的条目原样保留
        assert_eq!(
            out.lookup::<FieldEntry<f64>>("weights").unwrap(),
            FieldEntry::Nonuniform { nonuniform: vec![1.0, 2.0, 3.0] }
        );
        assert_eq!(out.lookup::<f64>("gamma").unwrap(), 1.4);
    }

    #[test]
    fn test_generic_requires_value() {
        let patch = PolyPatch::new("outlet", PatchKind::Patch, 0, 2);
        let init = PatchInit::<f64> {
            patch: &patch,
            internal_id: ObjectId::next(),
            size: 2,
            patch_internal: None,
        };
        let d = Dictionary::from_json_str("b", r#"{"type": "waveTransmissive"}"#).unwrap();
        assert!(GenericPatchField::from_dictionary(&init, &d).is_err());
    }
}
