// crates/fc_field/src/patch_fields/mod.rs

//! 边界补丁场
//!
//! 每个 (场, 补丁) 对持有一个补丁场对象，负责补丁上的边界值及其离散系数。
//! 所有边界类型对值类型只泛型实现一次。
//!
//! # 状态机
//!
//! ```text
//! Constructed ──update_coeffs──> Updated ──evaluate──> Evaluated
//!      ^                            │ (重复 update_coeffs 为空操作)
//!      └────────── 下一轮 update_coeffs 重新进入 Updated ─────────┘
//! ```
//!
//! # 模块概览
//!
//! - [`basic`]: calculated、fixedValue、zeroGradient、fixedGradient、mixed
//! - [`constraint`]: empty、symmetryPlane、symmetry、wedge、cyclic
//! - [`generic`]: 未知类型的占位回退
//! - [`table`]: 按类型名的运行时选择

pub mod basic;
pub mod constraint;
pub mod generic;
pub mod table;

use std::fmt;

use glam::DVec3;

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};
use fc_mesh::{BoundaryGeoMesh, PatchKind, PolyMesh, PolyPatch};
use fc_registry::{AsAny, ObjectId};

use crate::field_entry::write_values;

pub use basic::{
    CalculatedPatchField, FixedGradientPatchField, FixedValuePatchField, MixedPatchField,
    ZeroGradientPatchField,
};
pub use constraint::{CyclicPatchField, EmptyPatchField, SymmetryPatchField};
pub use generic::GenericPatchField;
pub use table::{PatchFieldCtor, PatchFieldTable, PatchInit};

// ============================================================
// 状态
// ============================================================

/// 补丁场求值状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchFieldState {
    /// 刚构造或已被拓扑变化重置
    #[default]
    Constructed,
    /// 系数已更新
    Updated,
    /// 边界值已求得
    Evaluated,
}

// ============================================================
// 求值上下文
// ============================================================

/// 补丁求值所需的网格与内部场数据
///
/// 由几何场在每次求值前按补丁组装，补丁场本身不持有网格或内部场引用。
#[derive(Debug, Clone)]
pub struct PatchContext<'a, T> {
    /// 网格
    pub mesh: &'a PolyMesh,
    /// 补丁编号
    pub patch_i: usize,
    /// 补丁元素相邻的内部值（面场为 `None`）
    pub patch_internal: Option<Vec<T>>,
    /// 单位外法向
    pub normals: Option<Vec<DVec3>>,
    /// 法向距离倒数
    pub delta_coeffs: Vec<f64>,
    /// 循环补丁另一侧的相邻内部值
    pub neighbour_internal: Option<Vec<T>>,
    /// 耦合插值权重（缺省 0.5）
    pub weights: Option<Vec<f64>>,
    /// 当前时间值
    pub time: f64,
}

impl<'a, T: FieldValue> PatchContext<'a, T> {
    /// 按几何网格类型组装补丁 `patch_i` 的上下文
    pub fn new<G: BoundaryGeoMesh>(mesh: &'a PolyMesh, patch_i: usize, internal: &[T]) -> Self {
        let gather = |addr: Vec<usize>| addr.iter().map(|&i| internal[i]).collect::<Vec<T>>();
        let patch = &mesh.boundary_mesh()[patch_i];

        let neighbour_internal = if patch.kind() == PatchKind::Cyclic {
            patch
                .neighbour_patch()
                .and_then(|name| mesh.boundary_mesh().find_patch_id(name))
                .and_then(|nbr| G::patch_internal_addressing(mesh, nbr))
                .map(gather)
        } else {
            None
        };

        Self {
            mesh,
            patch_i,
            patch_internal: G::patch_internal_addressing(mesh, patch_i).map(gather),
            normals: G::patch_normals(mesh, patch_i),
            delta_coeffs: G::patch_delta_coeffs(mesh, patch_i),
            neighbour_internal,
            weights: None,
            time: 0.0,
        }
    }

    /// 设置时间值
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// 补丁
    pub fn patch(&self) -> &PolyPatch {
        &self.mesh.boundary_mesh()[self.patch_i]
    }

    /// 补丁元素数
    pub fn size(&self) -> usize {
        self.delta_coeffs.len()
    }

    /// 相邻内部值，缺失时报错
    pub fn internal(&self, who: &str) -> FoamResult<&[T]> {
        self.patch_internal.as_deref().ok_or_else(|| {
            FoamError::not_implemented(format!("{who}: 补丁 {} 没有相邻内部值", self.patch().name()))
        })
    }

    /// 外法向，缺失时报错
    pub fn normals(&self, who: &str) -> FoamResult<&[DVec3]> {
        self.normals.as_deref().ok_or_else(|| {
            FoamError::not_implemented(format!("{who}: 补丁 {} 没有法向", self.patch().name()))
        })
    }

    /// 耦合权重
    pub fn weights(&self) -> Vec<f64> {
        self.weights
            .clone()
            .unwrap_or_else(|| vec![0.5; self.size()])
    }
}

// ============================================================
// 网格变化映射
// ============================================================

/// 网格变化时补丁逐面数据的映射
///
/// 由几何场按补丁组装，映射规则与边界值相同。
pub trait PatchFaceMapper<T> {
    /// 映射后的补丁尺寸
    fn size(&self) -> usize;

    /// 映射值列表；几何网格不能按面映射时返回 `None`
    fn map_values(&self, values: &[T]) -> FoamResult<Option<Vec<T>>>;

    /// 映射标量列表
    fn map_scalars(&self, values: &[f64]) -> FoamResult<Option<Vec<f64>>>;
}

/// 映射结果落地：不能映射时尺寸未变则保留原值，否则以 `fill` 重建
pub(crate) fn mapped_or_refilled<V: Clone>(
    mapped: Option<Vec<V>>,
    old: &[V],
    size: usize,
    fill: V,
) -> FoamResult<Vec<V>> {
    match mapped {
        Some(v) => {
            FoamError::check_size("补丁映射", size, v.len())?;
            Ok(v)
        }
        None if old.len() == size => Ok(old.to_vec()),
        None => Ok(vec![fill; size]),
    }
}

// ============================================================
// 公共数据
// ============================================================

/// 所有补丁场共有的数据
#[derive(Debug, Clone, PartialEq)]
pub struct PatchFieldBase<T> {
    patch: PolyPatch,
    internal_id: ObjectId,
    values: Vec<T>,
    state: PatchFieldState,
    overrides_constraint: bool,
    patch_type: Option<String>,
}

impl<T: FieldValue> PatchFieldBase<T> {
    /// 构造
    pub fn new(patch: PolyPatch, internal_id: ObjectId, values: Vec<T>) -> Self {
        Self {
            patch,
            internal_id,
            values,
            state: PatchFieldState::Constructed,
            overrides_constraint: false,
            patch_type: None,
        }
    }

    /// 由初始化信息与字典构造：有 `value` 时读取，否则取相邻内部值或零
    pub fn from_init(init: &PatchInit<'_, T>, dict: &Dictionary) -> FoamResult<Self> {
        let values = match crate::field_entry::read_values_opt(dict, "value", init.size)? {
            Some(v) => v,
            None => init.default_values(),
        };
        let mut base = Self::new(init.patch.clone(), init.internal_id, values);
        base.patch_type = dict.lookup_opt("patchType")?;
        Ok(base)
    }

    /// 同一补丁、新内部场的副本，状态回到 `Constructed`
    pub fn rebind(&self, internal_id: ObjectId) -> Self {
        Self {
            internal_id,
            state: PatchFieldState::Constructed,
            ..self.clone()
        }
    }

    /// 补丁
    pub fn patch(&self) -> &PolyPatch {
        &self.patch
    }

    /// 替换补丁（拓扑变化后）
    pub fn set_patch(&mut self, patch: PolyPatch) {
        self.patch = patch;
    }

    /// 所属内部场
    pub fn internal_id(&self) -> ObjectId {
        self.internal_id
    }

    /// 边界值
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 可变边界值
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// 整体替换边界值（长度可变，用于拓扑变化）
    pub fn set_values(&mut self, values: Vec<T>) {
        self.values = values;
    }

    /// 状态
    pub fn state(&self) -> PatchFieldState {
        self.state
    }

    /// 设置状态
    pub fn set_state(&mut self, state: PatchFieldState) {
        self.state = state;
    }

    /// 显式的 `patchType` 条目
    pub fn patch_type(&self) -> Option<&str> {
        self.patch_type.as_deref()
    }
}

// ============================================================
// 接口
// ============================================================

/// 边界补丁场
pub trait PatchField<T: FieldValue>: AsAny + fmt::Debug {
    /// 运行时类型名
    fn type_name(&self) -> &str;

    /// 公共数据
    fn base(&self) -> &PatchFieldBase<T>;

    /// 可变公共数据
    fn base_mut(&mut self) -> &mut PatchFieldBase<T>;

    /// 补丁
    fn patch(&self) -> &PolyPatch {
        self.base().patch()
    }

    /// 所属内部场
    fn internal_field_id(&self) -> ObjectId {
        self.base().internal_id()
    }

    /// 边界值
    fn values(&self) -> &[T] {
        self.base().values()
    }

    /// 状态
    fn state(&self) -> PatchFieldState {
        self.base().state()
    }

    /// 是否固定边界值
    fn fixes_value(&self) -> bool {
        false
    }

    /// 是否与另一侧耦合
    fn coupled(&self) -> bool {
        false
    }

    /// 约束类型名（普通补丁场为 `None`）
    fn constraint_type(&self) -> Option<&'static str> {
        None
    }

    /// 是否有意覆盖补丁自身的约束类型
    fn overrides_constraint(&self) -> bool {
        self.base().overrides_constraint
    }

    /// 设置约束覆盖标记
    fn set_overrides_constraint(&mut self, overrides: bool) {
        self.base_mut().overrides_constraint = overrides;
    }

    /// 系数更新钩子（时变参数在此刷新）
    fn refresh(&mut self, _ctx: &PatchContext<'_, T>) -> FoamResult<()> {
        Ok(())
    }

    /// 由当前系数求边界值
    fn evaluate_values(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 更新系数；同一轮次内重复调用为空操作
    fn update_coeffs(&mut self, ctx: &PatchContext<'_, T>) -> FoamResult<()> {
        if self.state() == PatchFieldState::Updated {
            return Ok(());
        }
        self.refresh(ctx)?;
        self.base_mut().set_state(PatchFieldState::Updated);
        Ok(())
    }

    /// 求边界值；未更新时先更新系数
    fn evaluate(&mut self, ctx: &PatchContext<'_, T>) -> FoamResult<()> {
        if self.state() != PatchFieldState::Updated {
            self.update_coeffs(ctx)?;
        }
        let values = self.evaluate_values(ctx)?;
        FoamError::check_size(self.patch().name(), self.values().len(), values.len())?;
        let base = self.base_mut();
        base.set_values(values);
        base.set_state(PatchFieldState::Evaluated);
        Ok(())
    }

    /// 法向梯度 `(φ_b - φ_P)·δ`
    fn sn_grad(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>> {
        let pif = ctx.internal(self.type_name())?;
        Ok(self
            .values()
            .iter()
            .zip(pif)
            .zip(&ctx.delta_coeffs)
            .map(|((b, p), d)| (*b - *p).scale(*d))
            .collect())
    }

    /// 边界值对内部值的隐式系数
    fn value_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 边界值的显式部分
    fn value_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 法向梯度对内部值的隐式系数
    fn gradient_internal_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 法向梯度的显式部分
    fn gradient_boundary_coeffs(&self, ctx: &PatchContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 网格变化时映射类型特有的逐面数据；边界值本身由几何场映射
    fn map_faces(&mut self, _mapper: &dyn PatchFaceMapper<T>) -> FoamResult<()> {
        Ok(())
    }

    /// 绑定到另一个内部场的副本
    fn clone_with(&self, internal_id: ObjectId) -> Box<dyn PatchField<T>>;

    /// 类型特有条目
    fn write_entries(&self, _dict: &mut Dictionary) -> FoamResult<()> {
        Ok(())
    }

    /// 写出：`type`、`patchType`、类型特有条目、`value`
    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", self.type_name())?;
        if let Some(pt) = self.base().patch_type() {
            dict.set("patchType", pt)?;
        }
        self.write_entries(dict)?;
        write_values(dict, "value", self.values())
    }
}

// ============================================================
// 辅助
// ============================================================

/// 各分量均为 `v` 的列表
pub(crate) fn uniform_coeffs<T: FieldValue>(n: usize, v: f64) -> Vec<T> {
    vec![T::splat(v); n]
}

/// 逐元素以 `δ` 缩放
pub(crate) fn scaled<T: FieldValue>(values: &[T], delta: &[f64]) -> Vec<T> {
    values.iter().zip(delta).map(|(v, d)| v.scale(*d)).collect()
}

/// 系数不可用
pub(crate) fn no_coeffs<T>(type_name: &str, what: &str, patch: &PolyPatch) -> FoamResult<Vec<T>> {
    Err(FoamError::not_implemented(format!(
        "{type_name}::{what} (补丁 {})",
        patch.name()
    )))
}

/// 补丁类型必须为 `kind`
pub(crate) fn require_patch_kind(type_name: &str, patch: &PolyPatch, kind: PatchKind) -> FoamResult<()> {
    if patch.kind() != kind {
        return Err(FoamError::invalid_entry(
            format!("boundaryField::{}", patch.name()),
            "type",
            format!("{type_name} 只能用于 {kind} 补丁, 实际为 {}", patch.kind()),
        ));
    }
    Ok(())
}
