// crates/fc_field/src/patch_fields/basic.rs

//! 基本边界类型
//!
//! | 类型 | 边界值 | vIC | vBC | gIC | gBC |
//! |------|--------|-----|-----|-----|-----|
//! | fixedValue | φ_b | 0 | φ_b | -δ | δφ_b |
//! | zeroGradient | φ_P | 1 | 0 | 0 | 0 |
//! | fixedGradient | φ_P + g/δ | 1 | g/δ | 0 | g |
//! | mixed | f·φ_ref + (1-f)(φ_P + g/δ) | 1-f | f·φ_ref + (1-f)g/δ | -fδ | fδφ_ref + (1-f)g |
//!
//! calculated 的值由外部赋值，没有离散系数。

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};
use fc_registry::ObjectId;

use crate::field_entry::{read_values, write_values};

use super::{
    mapped_or_refilled, no_coeffs, scaled, uniform_coeffs, PatchContext, PatchFaceMapper,
    PatchField, PatchFieldBase, PatchInit,
};

// ============================================================
// calculated
// ============================================================

/// 由外部计算赋值的边界
#[derive(Debug, Clone)]
pub struct CalculatedPatchField<T> {
    base: PatchFieldBase<T>,
}

impl<T: FieldValue> CalculatedPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "calculated";

    /// 以相邻内部值（或零）为初值
    pub fn new(init: &PatchInit<'_, T>) -> Self {
        Self {
            base: PatchFieldBase::new(init.patch.clone(), init.internal_id, init.default_values()),
        }
    }

    /// 从字典构造
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        Ok(Self {
            base: PatchFieldBase::from_init(init, dict)?,
        })
    }

    /// 赋边界值
    pub fn assign(&mut self, values: &[T]) -> FoamResult<()> {
        FoamError::check_size(self.base.patch().name(), self.base.values().len(), values.len())?;
        self.base.values_mut().copy_from_slice(values);
        Ok(())
    }
}

impl<T: FieldValue> PatchField<T> for CalculatedPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
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

    fn value_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(Self::TYPE_NAME, "value_internal_coeffs", self.patch())
    }

    fn value_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(Self::TYPE_NAME, "value_boundary_coeffs", self.patch())
    }

    fn gradient_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(Self::TYPE_NAME, "gradient_internal_coeffs", self.patch())
    }

    fn gradient_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        no_coeffs(Self::TYPE_NAME, "gradient_boundary_coeffs", self.patch())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
        })
    }
}

// ============================================================
// fixedValue
// ============================================================

/// 固定值
#[derive(Debug, Clone)]
pub struct FixedValuePatchField<T> {
    base: PatchFieldBase<T>,
}

impl<T: FieldValue> FixedValuePatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "fixedValue";

    /// 从字典构造，`value` 必须给出
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let values = read_values(dict, "value", init.size)?;
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(values);
        Ok(Self { base })
    }

    /// 给定值构造
    pub fn new(init: &PatchInit<'_, T>, value: T) -> Self {
        Self {
            base: PatchFieldBase::new(init.patch.clone(), init.internal_id, vec![value; init.size]),
        }
    }
}

impl<T: FieldValue> PatchField<T> for FixedValuePatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn fixes_value(&self) -> bool {
        true
    }

    fn evaluate_values(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.base.values().to_vec())
    }

    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn value_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.base.values().to_vec())
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.delta_coeffs.iter().map(|d| T::splat(-d)).collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(scaled(self.base.values(), &ctx.delta_coeffs))
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
        })
    }
}

// ============================================================
// zeroGradient
// ============================================================

/// 零法向梯度
#[derive(Debug, Clone)]
pub struct ZeroGradientPatchField<T> {
    base: PatchFieldBase<T>,
}

impl<T: FieldValue> ZeroGradientPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "zeroGradient";

    /// 从字典构造，初值取相邻内部值
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(init.default_values());
        Ok(Self { base })
    }
}

impl<T: FieldValue> PatchField<T> for ZeroGradientPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        match &ctx.patch_internal {
            Some(pif) => Ok(pif.clone()),
            None => Ok(self.base.values().to_vec()),
        }
    }

    fn sn_grad(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 1.0))
    }

    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
        })
    }

    // 值由内部场决定，不写出
    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", Self::TYPE_NAME)?;
        if let Some(pt) = self.base.patch_type() {
            dict.set("patchType", pt)?;
        }
        Ok(())
    }
}

// ============================================================
// fixedGradient
// ============================================================

/// 固定法向梯度
#[derive(Debug, Clone)]
pub struct FixedGradientPatchField<T> {
    base: PatchFieldBase<T>,
    gradient: Vec<T>,
}

impl<T: FieldValue> FixedGradientPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "fixedGradient";

    /// 从字典构造，`gradient` 必须给出
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let gradient = read_values(dict, "gradient", init.size)?;
        Ok(Self {
            base: PatchFieldBase::from_init(init, dict)?,
            gradient,
        })
    }

    /// 梯度
    pub fn gradient(&self) -> &[T] {
        &self.gradient
    }

    /// 可变梯度
    pub fn gradient_mut(&mut self) -> &mut [T] {
        &mut self.gradient
    }

    fn gradient_over_delta(&self, delta: &[f64]) -> Vec<T> {
        self.gradient
            .iter()
            .zip(delta)
            .map(|(g, d)| g.scale(1.0 / d))
            .collect()
    }
}

impl<T: FieldValue> PatchField<T> for FixedGradientPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(Self::TYPE_NAME)?;
        Ok(pif
            .iter()
            .zip(self.gradient_over_delta(&ctx.delta_coeffs))
            .map(|(p, g)| *p + g)
            .collect())
    }

    fn sn_grad(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.gradient.clone())
    }

    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 1.0))
    }

    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.gradient_over_delta(&ctx.delta_coeffs))
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(uniform_coeffs(ctx.size(), 0.0))
    }

    fn gradient_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.gradient.clone())
    }

    fn map_faces(&mut self, mapper: &dyn PatchFaceMapper<T>) -> FoamResult<()> {
        let mapped = mapper.map_values(&self.gradient)?;
        self.gradient = mapped_or_refilled(mapped, &self.gradient, mapper.size(), T::zero())?;
        Ok(())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
            gradient: self.gradient.clone(),
        })
    }

    fn write_entries(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_values(dict, "gradient", &self.gradient)
    }
}

// ============================================================
// mixed
// ============================================================

/// 固定值与固定梯度按 `valueFraction` 混合
#[derive(Debug, Clone)]
pub struct MixedPatchField<T> {
    base: PatchFieldBase<T>,
    ref_value: Vec<T>,
    ref_grad: Vec<T>,
    value_fraction: Vec<f64>,
}

impl<T: FieldValue> MixedPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "mixed";

    /// 从字典构造：`refValue`、`refGradient`、`valueFraction`
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let ref_value = read_values(dict, "refValue", init.size)?;
        let ref_grad = read_values(dict, "refGradient", init.size)?;
        let value_fraction: Vec<f64> = read_values(dict, "valueFraction", init.size)?;
        if let Some(f) = value_fraction.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(FoamError::invalid_entry(
                dict.scope(),
                "valueFraction",
                format!("{f} 不在 [0, 1] 内"),
            ));
        }
        Ok(Self {
            base: PatchFieldBase::from_init(init, dict)?,
            ref_value,
            ref_grad,
            value_fraction,
        })
    }

    /// 参考值
    pub fn ref_value(&self) -> &[T] {
        &self.ref_value
    }

    /// 参考梯度
    pub fn ref_grad(&self) -> &[T] {
        &self.ref_grad
    }

    /// 值权重
    pub fn value_fraction(&self) -> &[f64] {
        &self.value_fraction
    }

    /// 可变值权重
    pub fn value_fraction_mut(&mut self) -> &mut [f64] {
        &mut self.value_fraction
    }

    fn per_face<'a>(&'a self, delta: &'a [f64]) -> impl Iterator<Item = (T, T, f64, f64)> + 'a {
        self.ref_value
            .iter()
            .zip(&self.ref_grad)
            .zip(&self.value_fraction)
            .zip(delta)
            .map(|(((r, g), f), d)| (*r, *g, *f, *d))
    }
}

impl<T: FieldValue> PatchField<T> for MixedPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(Self::TYPE_NAME)?;
        Ok(self
            .per_face(&ctx.delta_coeffs)
            .zip(pif)
            .map(|((r, g, f, d), p)| r.scale(f) + (*p + g.scale(1.0 / d)).scale(1.0 - f))
            .collect())
    }

    fn sn_grad(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(Self::TYPE_NAME)?;
        Ok(self
            .per_face(&ctx.delta_coeffs)
            .zip(pif)
            .map(|((r, g, f, d), p)| (r - *p).scale(f * d) + g.scale(1.0 - f))
            .collect())
    }

    fn value_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self.value_fraction.iter().map(|f| T::splat(1.0 - f)).collect())
    }

    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .per_face(&ctx.delta_coeffs)
            .map(|(r, g, f, d)| r.scale(f) + g.scale((1.0 - f) / d))
            .collect())
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .value_fraction
            .iter()
            .zip(&ctx.delta_coeffs)
            .map(|(f, d)| T::splat(-f * d))
            .collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .per_face(&ctx.delta_coeffs)
            .map(|(r, g, f, d)| r.scale(f * d) + g.scale(1.0 - f))
            .collect())
    }

    fn map_faces(&mut self, mapper: &dyn PatchFaceMapper<T>) -> FoamResult<()> {
        let n = mapper.size();
        let ref_value = mapper.map_values(&self.ref_value)?;
        let ref_grad = mapper.map_values(&self.ref_grad)?;
        let value_fraction = mapper.map_scalars(&self.value_fraction)?;
        self.ref_value = mapped_or_refilled(ref_value, &self.ref_value, n, T::zero())?;
        self.ref_grad = mapped_or_refilled(ref_grad, &self.ref_grad, n, T::zero())?;
        self.value_fraction = mapped_or_refilled(value_fraction, &self.value_fraction, n, 0.0)?;
        Ok(())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
            ..self.clone()
        })
    }

    fn write_entries(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_values(dict, "refValue", &self.ref_value)?;
        write_values(dict, "refGradient", &self.ref_grad)?;
        write_values(dict, "valueFraction", &self.value_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_mesh::{PatchKind, PolyPatch};
    use crate::patch_fields::PatchFieldState;

    fn ctx_parts() -> (PolyPatch, Vec<f64>) {
        (PolyPatch::new("inlet", PatchKind::Patch, 4, 2), vec![1.0, 3.0])
    }

    fn init<'a>(patch: &'a PolyPatch, pif: &[f64]) -> PatchInit<'a, f64> {
        PatchInit {
            patch,
            internal_id: ObjectId::next(),
            size: pif.len(),
            patch_internal: Some(pif.to_vec()),
        }
    }

    #[test]
    fn test_fixed_value_requires_value() {
        let (patch, pif) = ctx_parts();
        let d = Dictionary::from_json_str("b", r#"{"type": "fixedValue"}"#).unwrap();
        assert!(FixedValuePatchField::from_dictionary(&init(&patch, &pif), &d).is_err());
    }

    #[test]
    fn test_mixed_fraction_range() {
        let (patch, pif) = ctx_parts();
        let d = Dictionary::from_json_str(
            "b",
            r#"{"type": "mixed", "refValue": 1.0, "refGradient": 0.0, "valueFraction": 1.5}"#,
        )
        .unwrap();
        assert!(MixedPatchField::from_dictionary(&init(&patch, &pif), &d).is_err());
    }

    /// 逐面反序
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

    /// 点场补丁：不能按面映射，尺寸变为 3
    struct Unmappable;

    impl PatchFaceMapper<f64> for Unmappable {
        fn size(&self) -> usize {
            3
        }

        fn map_values(&self, _values: &[f64]) -> FoamResult<Option<Vec<f64>>> {
            Ok(None)
        }

        fn map_scalars(&self, _values: &[f64]) -> FoamResult<Option<Vec<f64>>> {
            Ok(None)
        }
    }

    #[test]
    fn test_mixed_maps_all_face_lists() {
        let (patch, pif) = ctx_parts();
        let d = Dictionary::from_json_str(
            "b",
            r#"{"type": "mixed", "refValue": {"nonuniform": [1.0, 2.0]},
                "refGradient": {"nonuniform": [3.0, 4.0]},
                "valueFraction": {"nonuniform": [0.25, 0.75]}}"#,
        )
        .unwrap();
        let mut pf = MixedPatchField::from_dictionary(&init(&patch, &pif), &d).unwrap();
        pf.map_faces(&Reverse).unwrap();
        assert_eq!(pf.ref_value(), &[2.0, 1.0]);
        assert_eq!(pf.ref_grad(), &[4.0, 3.0]);
        assert_eq!(pf.value_fraction(), &[0.75, 0.25]);
    }

    #[test]
    fn test_fixed_gradient_refilled_when_unmappable() {
        let (patch, pif) = ctx_parts();
        let d = Dictionary::from_json_str("b", r#"{"type": "fixedGradient", "gradient": 2.0}"#)
            .unwrap();
        let mut pf = FixedGradientPatchField::from_dictionary(&init(&patch, &pif), &d).unwrap();
        pf.map_faces(&Reverse).unwrap();
        assert_eq!(pf.gradient(), &[2.0, 2.0]);
        pf.map_faces(&Unmappable).unwrap();
        assert_eq!(pf.gradient(), &[0.0; 3]);
    }

    #[test]
    fn test_zero_gradient_initial_values() {
        let (patch, pif) = ctx_parts();
        let d = Dictionary::from_json_str("b", r#"{"type": "zeroGradient"}"#).unwrap();
        let pf = ZeroGradientPatchField::from_dictionary(&init(&patch, &pif), &d).unwrap();
        assert_eq!(pf.values(), &[1.0, 3.0]);
        assert_eq!(pf.state(), PatchFieldState::Constructed);
    }
}
