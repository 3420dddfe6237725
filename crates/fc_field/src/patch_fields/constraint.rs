// crates/fc_field/src/patch_fields/constraint.rs

//! 约束边界类型
//!
//! 约束类型只能出现在同名补丁上，补丁的约束类型反过来要求其上的补丁场
//! 为对应类型（选择表负责替换）。
//!
//! 对称类（symmetryPlane、symmetry、wedge）以补丁法向的镜像 `R = I - 2nn` 求值：
//!
//! ```text
//! φ_b = (φ_P + R·φ_P) / 2
//! ∂φ/∂n = (R·φ_P - φ_P)·δ/2
//! ```

use glam::{DMat3, DVec3};

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};
use fc_mesh::PatchKind;
use fc_registry::ObjectId;

use super::{
    require_patch_kind, uniform_coeffs, PatchContext, PatchField, PatchFieldBase, PatchInit,
};

// ============================================================
// empty
// ============================================================

/// 降维方向上的空边界，不持有值
#[derive(Debug, Clone)]
pub struct EmptyPatchField<T> {
    base: PatchFieldBase<T>,
}

impl<T: FieldValue> EmptyPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "empty";

    /// 从字典构造，补丁必须为 empty
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        require_patch_kind(Self::TYPE_NAME, init.patch, PatchKind::Empty)?;
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(Vec::new());
        Ok(Self { base })
    }
}

impl<T: FieldValue> PatchField<T> for EmptyPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn constraint_type(&self) -> Option<&'static str> {
        Some(Self::TYPE_NAME)
    }

    fn evaluate_values(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn sn_grad(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn value_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn value_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn gradient_internal_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn gradient_boundary_coeffs(&self, _ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
        })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", Self::TYPE_NAME)?;
        Ok(())
    }
}

// ============================================================
// symmetryPlane / symmetry / wedge
// ============================================================

/// 镜像对称边界
#[derive(Debug, Clone)]
pub struct SymmetryPatchField<T> {
    base: PatchFieldBase<T>,
    kind: PatchKind,
}

impl<T: FieldValue> SymmetryPatchField<T> {
    fn build(init: &PatchInit<'_, T>, dict: &Dictionary, kind: PatchKind) -> FoamResult<Self> {
        require_patch_kind(kind.type_name(), init.patch, kind)?;
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(init.default_values());
        Ok(Self { base, kind })
    }

    /// symmetryPlane
    pub fn symmetry_plane(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        Self::build(init, dict, PatchKind::SymmetryPlane)
    }

    /// symmetry
    pub fn symmetry(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        Self::build(init, dict, PatchKind::Symmetry)
    }

    /// wedge
    pub fn wedge(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        Self::build(init, dict, PatchKind::Wedge)
    }

    fn reflected(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<(T, T)>> {
        let who = self.kind.type_name();
        let pif = ctx.internal(who)?;
        let normals = ctx.normals(who)?;
        Ok(pif
            .iter()
            .zip(normals)
            .map(|(p, n)| (*p, p.transform(&reflection(*n))))
            .collect())
    }

    fn sn_grad_diag(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx
            .normals(self.kind.type_name())?
            .iter()
            .map(|n| transform_diag::<T>(*n))
            .collect())
    }
}

/// 以 `n` 为法向的镜像矩阵
fn reflection(n: DVec3) -> DMat3 {
    DMat3::IDENTITY - DMat3::from_cols(n * n.x, n * n.y, n * n.z) * 2.0
}

/// 镜像法向梯度的对角部分：标量 0，矢量 |n_i|，张量 |n_i||n_j|
fn transform_diag<T: FieldValue>(n: DVec3) -> T {
    let a = n.abs();
    let mut diag = T::zero();
    match T::N_COMPONENTS {
        3 => {
            for d in 0..3 {
                diag.set_component(d, a[d]);
            }
        }
        9 => {
            for i in 0..3 {
                for j in 0..3 {
                    diag.set_component(3 * i + j, a[i] * a[j]);
                }
            }
        }
        _ => {}
    }
    diag
}

impl<T: FieldValue> PatchField<T> for SymmetryPatchField<T> {
    fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn constraint_type(&self) -> Option<&'static str> {
        Some(self.kind.type_name())
    }

    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .reflected(ctx)?
            .into_iter()
            .map(|(p, r)| (p + r).scale(0.5))
            .collect())
    }

    fn sn_grad(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .reflected(ctx)?
            .into_iter()
            .zip(&ctx.delta_coeffs)
            .map(|((p, r), d)| (r - p).scale(0.5 * d))
            .collect())
    }

    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .sn_grad_diag(ctx)?
            .into_iter()
            .map(|d| T::splat(1.0) - d)
            .collect())
    }

    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(self.type_name())?;
        let vic = self.value_internal_coeffs(ctx)?;
        Ok(self
            .evaluate_values(ctx)?
            .into_iter()
            .zip(vic)
            .zip(pif)
            .map(|((v, c), p)| v - c.cmpt_multiply(*p))
            .collect())
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(self
            .sn_grad_diag(ctx)?
            .into_iter()
            .zip(&ctx.delta_coeffs)
            .map(|(d, delta)| d.scale(-delta))
            .collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(self.type_name())?;
        let gic = self.gradient_internal_coeffs(ctx)?;
        Ok(self
            .sn_grad(ctx)?
            .into_iter()
            .zip(gic)
            .zip(pif)
            .map(|((g, c), p)| g - c.cmpt_multiply(*p))
            .collect())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
            kind: self.kind,
        })
    }
}

// ============================================================
// cyclic
// ============================================================

/// 周期边界，值由两侧相邻单元插值
#[derive(Debug, Clone)]
pub struct CyclicPatchField<T> {
    base: PatchFieldBase<T>,
}

impl<T: FieldValue> CyclicPatchField<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "cyclic";

    /// 从字典构造，补丁必须为 cyclic 且有配对补丁
    pub fn from_dictionary(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        require_patch_kind(Self::TYPE_NAME, init.patch, PatchKind::Cyclic)?;
        if init.patch.neighbour_patch().is_none() {
            return Err(FoamError::invalid_mesh(format!(
                "循环补丁 {} 没有配对补丁",
                init.patch.name()
            )));
        }
        let mut base = PatchFieldBase::from_init(init, dict)?;
        base.set_values(init.default_values());
        Ok(Self { base })
    }

    fn neighbour<'c>(&self, ctx: &'c PatchContext<'_, T>) -> FoamResult<&'c [T]> {
        ctx.neighbour_internal.as_deref().ok_or_else(|| {
            FoamError::invalid_mesh(format!(
                "循环补丁 {} 找不到配对补丁 {:?}",
                self.patch().name(),
                self.patch().neighbour_patch()
            ))
        })
    }
}

impl<T: FieldValue> PatchField<T> for CyclicPatchField<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &PatchFieldBase<T> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PatchFieldBase<T> {
        &mut self.base
    }

    fn coupled(&self) -> bool {
        true
    }

    fn constraint_type(&self) -> Option<&'static str> {
        Some(Self::TYPE_NAME)
    }

    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(Self::TYPE_NAME)?;
        let nbr = self.neighbour(ctx)?;
        FoamError::check_size(self.patch().name(), pif.len(), nbr.len())?;
        Ok(pif
            .iter()
            .zip(nbr)
            .zip(ctx.weights())
            .map(|((p, n), w)| p.scale(w) + n.scale(1.0 - w))
            .collect())
    }

    fn sn_grad(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(Self::TYPE_NAME)?;
        let nbr = self.neighbour(ctx)?;
        Ok(pif
            .iter()
            .zip(nbr)
            .zip(&ctx.delta_coeffs)
            .map(|((p, n), d)| (*n - *p).scale(*d))
            .collect())
    }

    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.weights().into_iter().map(T::splat).collect())
    }

    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.weights().into_iter().map(|w| T::splat(1.0 - w)).collect())
    }

    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.delta_coeffs.iter().map(|d| T::splat(-d)).collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(ctx.delta_coeffs.iter().map(|d| T::splat(*d)).collect())
    }

    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>> {
        Box::new(Self {
            base: self.base.rebind(internal_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_flips_normal_component() {
        let r = reflection(DVec3::Z);
        assert_eq!(r * DVec3::new(1.0, 2.0, 3.0), DVec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn test_transform_diag_by_rank() {
        let n = DVec3::new(0.0, -1.0, 0.0);
        assert_eq!(transform_diag::<f64>(n), 0.0);
        assert_eq!(transform_diag::<DVec3>(n), DVec3::new(0.0, 1.0, 0.0));
        let t = transform_diag::<fc_foundation::Tensor>(n);
        assert_eq!(t.component(4), 1.0);
        assert_eq!(t.component(0), 0.0);
    }

    #[test]
    fn test_empty_requires_empty_patch() {
        let patch = fc_mesh::PolyPatch::new("wall", PatchKind::Wall, 0, 2);
        let init = PatchInit::<f64> {
            patch: &patch,
            internal_id: ObjectId::next(),
            size: 2,
            patch_internal: None,
        };
        let d = Dictionary::from_json_str("b", r#"{"type": "empty"}"#).unwrap();
        assert!(EmptyPatchField::from_dictionary(&init, &d).is_err());
    }
}
