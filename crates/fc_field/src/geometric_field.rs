// crates/fc_field/src/geometric_field.rs

//! GeometricField - 带边界的几何场
//!
//! 几何场 = 内部场 + 每个补丁一个补丁场 + 场源集合。
//!
//! # 字典格式
//!
//! ```text
//! {
//!   "dimensions": [0, 1, -1, 0, 0, 0, 0],
//!   "internalField": {"uniform": [1, 0, 0]},
//!   "boundaryField": {
//!     "inlet":  {"type": "fixedValue", "value": {"uniform": [1, 0, 0]}},
//!     "walls":  {"type": "zeroGradient"}
//!   },
//!   "sources": {
//!     "injector": {"type": "uniformFixedValue", "uniformValue": [0, 0, 1]}
//!   }
//! }
//! ```
//!
//! `boundaryField` 先按补丁名查找，再按补丁组名查找。
//!
//! # 网格变化
//!
//! 拓扑变化时先映射内部场，再映射各补丁值及补丁场特有的逐面数据；几何网格不能映射补丁值时
//! （点场），补丁值由新的相邻内部值重新求得。最后丢弃场源缓存。

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};
use std::rc::Rc;

use tracing::debug;

use fc_config::{DebugSwitches, Dictionary};
use fc_foundation::{
    field_value::capitalised_type_name, fatal, DimensionSet, FieldValue, FoamError, FoamResult,
    PolyDistributionMap, PolyMeshMap, PolyTopoChangeMap,
};
use fc_mesh::{BoundaryGeoMesh, PolyMesh};
use fc_registry::{IoObject, MapStatus, RegIoObject};

use crate::dimensioned_field::DimensionedField;
use crate::field_entry::{read_values, FieldEntry};
use crate::patch_fields::{
    PatchContext, PatchFaceMapper, PatchField, PatchFieldState, PatchFieldTable, PatchInit,
};
use crate::sources::{FieldSourceTable, GeometricFieldSources, SelectableValue};

/// 补丁的四组离散系数
#[derive(Debug, Clone, PartialEq)]
pub struct PatchCoeffs<T> {
    /// 边界值对内部值的隐式系数
    pub value_internal: Vec<T>,
    /// 边界值的显式部分
    pub value_boundary: Vec<T>,
    /// 法向梯度对内部值的隐式系数
    pub gradient_internal: Vec<T>,
    /// 法向梯度的显式部分
    pub gradient_boundary: Vec<T>,
}

/// 带边界的几何场
pub struct GeometricField<T: FieldValue, G: BoundaryGeoMesh> {
    internal: DimensionedField<T, G>,
    boundary: Vec<Box<dyn PatchField<T>>>,
    sources: GeometricFieldSources<T>,
}

impl<T: FieldValue, G: BoundaryGeoMesh> GeometricField<T, G> {
    // ========================================================================
    // 构造
    // ========================================================================

    /// 均匀内部值，所有补丁为 calculated（约束补丁取约束类型）
    pub fn new_calculated(
        io: IoObject,
        mesh: Rc<RefCell<PolyMesh>>,
        dimensions: DimensionSet,
        value: T,
    ) -> FoamResult<Self>
    where
        T: SelectableValue,
    {
        let internal = DimensionedField::uniform(io, mesh, dimensions, value);
        let table = T::patch_field_table();
        let boundary = Self::build_boundary(&internal, |init| {
            table.new_patch_field("calculated", init)
        })?;
        Ok(Self {
            internal,
            boundary,
            sources: GeometricFieldSources::none(),
        })
    }

    /// 从字典构造，使用值类型的默认选择表
    pub fn from_dictionary(
        io: IoObject,
        mesh: Rc<RefCell<PolyMesh>>,
        dict: &Dictionary,
        switches: &DebugSwitches,
    ) -> FoamResult<Self>
    where
        T: SelectableValue,
    {
        let patch_table =
            T::patch_field_table().disallow_generic(switches.disallow_generic_patch_field);
        let source_table = T::field_source_table();
        Self::from_dictionary_with(io, mesh, dict, &patch_table, &source_table)
            .map(|f| f.with_dimension_check(switches.check_field_dimensions))
    }

    /// 从字典构造，使用给定选择表
    pub fn from_dictionary_with(
        io: IoObject,
        mesh: Rc<RefCell<PolyMesh>>,
        dict: &Dictionary,
        patch_table: &PatchFieldTable<T>,
        source_table: &FieldSourceTable<T>,
    ) -> FoamResult<Self> {
        let dimensions: DimensionSet = dict.lookup("dimensions")?;
        let n = G::size(&mesh.borrow());
        let values = read_values(dict, "internalField", n)?;
        let internal = DimensionedField::new(io, mesh, dimensions, values)?;

        let boundary_dict = dict.sub_dict("boundaryField")?;
        let boundary = Self::build_boundary(&internal, |init| {
            let patch_dict = find_patch_dict(&boundary_dict, init)?;
            patch_table.select(init, &patch_dict)
        })?;

        let sources = match dict.opt_sub_dict("sources") {
            Some(d) => GeometricFieldSources::from_dictionary(&d, source_table)?,
            None => GeometricFieldSources::none(),
        };

        debug!(
            "读入场 {} ({}): {} 个补丁, {} 个场源",
            internal.name(),
            Self::field_type_name(),
            boundary.len(),
            sources.len()
        );
        Ok(Self {
            internal,
            boundary,
            sources,
        })
    }

    fn build_boundary(
        internal: &DimensionedField<T, G>,
        mut make: impl FnMut(&PatchInit<'_, T>) -> FoamResult<Box<dyn PatchField<T>>>,
    ) -> FoamResult<Vec<Box<dyn PatchField<T>>>> {
        let mesh = internal.mesh().borrow();
        let id = internal.io_ref().id();
        mesh.boundary_mesh()
            .iter()
            .enumerate()
            .map(|(i, patch)| {
                let init = PatchInit {
                    patch,
                    internal_id: id,
                    size: G::patch_size(&mesh, i),
                    patch_internal: gather::<T, G>(&mesh, i, internal.values()),
                };
                make(&init)
            })
            .collect()
    }

    /// 复合赋值时检查量纲
    pub fn with_dimension_check(mut self, check: bool) -> Self {
        self.internal = self.internal.with_dimension_check(check);
        self
    }

    /// 新名字的副本：补丁场重新绑定到副本的内部场
    pub fn clone_named(&self, name: impl Into<String>) -> Self {
        let internal = self.internal.clone_named(name);
        let id = internal.io_ref().id();
        Self {
            boundary: self.boundary.iter().map(|pf| pf.clone_with(id)).collect(),
            sources: self.sources.clone(),
            internal,
        }
    }

    // ========================================================================
    // 访问
    // ========================================================================

    /// 场类型名，如 `volScalarField`
    pub fn field_type_name() -> String {
        format!("{}{}Field", G::NAME, capitalised_type_name::<T>())
    }

    /// 名称
    pub fn name(&self) -> &str {
        self.internal.name()
    }

    /// 网格
    pub fn mesh(&self) -> &Rc<RefCell<PolyMesh>> {
        self.internal.mesh()
    }

    /// 量纲
    pub fn dimensions(&self) -> &DimensionSet {
        self.internal.dimensions()
    }

    /// 内部场
    pub fn internal(&self) -> &DimensionedField<T, G> {
        &self.internal
    }

    /// 可变内部场
    pub fn internal_mut(&mut self) -> &mut DimensionedField<T, G> {
        &mut self.internal
    }

    /// 内部值
    pub fn values(&self) -> &[T] {
        self.internal.values()
    }

    /// 补丁场
    pub fn boundary_field(&self) -> &[Box<dyn PatchField<T>>] {
        &self.boundary
    }

    /// 可变补丁场
    pub fn boundary_field_mut(&mut self) -> &mut [Box<dyn PatchField<T>>] {
        &mut self.boundary
    }

    /// 按补丁名查找补丁场
    pub fn patch_field(&self, name: &str) -> FoamResult<&dyn PatchField<T>> {
        self.boundary
            .iter()
            .find(|pf| pf.patch().name() == name)
            .map(|pf| pf.as_ref())
            .ok_or_else(|| {
                FoamError::not_found(
                    format!("{}::boundaryField", self.name()),
                    name,
                    "patchField",
                    self.boundary.iter().map(|pf| pf.patch().name().to_string()).collect(),
                )
            })
    }

    /// 各补丁场类型名
    pub fn boundary_types(&self) -> Vec<String> {
        self.boundary.iter().map(|pf| pf.type_name().to_string()).collect()
    }

    /// 场源
    pub fn sources(&self) -> &GeometricFieldSources<T> {
        &self.sources
    }

    /// 可变场源
    pub fn sources_mut(&mut self) -> &mut GeometricFieldSources<T> {
        &mut self.sources
    }

    // ========================================================================
    // 边界求值
    // ========================================================================

    /// 更新全部补丁的系数
    pub fn update_coeffs(&mut self, time: f64) -> FoamResult<()> {
        let mesh = self.internal.mesh().clone();
        let mesh = mesh.borrow();
        for (i, pf) in self.boundary.iter_mut().enumerate() {
            let ctx = PatchContext::new::<G>(&mesh, i, self.internal.values()).with_time(time);
            pf.update_coeffs(&ctx)?;
        }
        Ok(())
    }

    /// 求全部补丁的边界值
    pub fn correct_boundary_conditions(&mut self) -> FoamResult<()> {
        self.correct_boundary_conditions_at(0.0)
    }

    /// 在给定时间求全部补丁的边界值
    ///
    /// 补丁值同时是内部值时（点场），求值后回写内部场。
    pub fn correct_boundary_conditions_at(&mut self, time: f64) -> FoamResult<()> {
        let mesh = self.internal.mesh().clone();
        let mesh = mesh.borrow();
        for (i, pf) in self.boundary.iter_mut().enumerate() {
            let ctx = PatchContext::new::<G>(&mesh, i, self.internal.values()).with_time(time);
            pf.evaluate(&ctx)?;
        }
        if G::PATCH_VALUES_IN_INTERNAL {
            for (i, pf) in self.boundary.iter().enumerate() {
                let Some(addr) = G::patch_internal_addressing(&mesh, i) else {
                    continue;
                };
                if pf.values().len() != addr.len() {
                    continue;
                }
                let values = self.internal.values_mut();
                for (p, v) in addr.iter().zip(pf.values()) {
                    values[*p] = *v;
                }
            }
        }
        Ok(())
    }

    /// 补丁 `patch_i` 的离散系数
    pub fn patch_coeffs(&self, patch_i: usize) -> FoamResult<PatchCoeffs<T>> {
        let pf = self.checked_patch(patch_i)?;
        let mesh = self.internal.mesh().borrow();
        let ctx = PatchContext::new::<G>(&mesh, patch_i, self.internal.values());
        Ok(PatchCoeffs {
            value_internal: pf.value_internal_coeffs(&ctx)?,
            value_boundary: pf.value_boundary_coeffs(&ctx)?,
            gradient_internal: pf.gradient_internal_coeffs(&ctx)?,
            gradient_boundary: pf.gradient_boundary_coeffs(&ctx)?,
        })
    }

    /// 补丁 `patch_i` 的法向梯度
    pub fn sn_grad(&self, patch_i: usize) -> FoamResult<Vec<T>> {
        let pf = self.checked_patch(patch_i)?;
        let mesh = self.internal.mesh().borrow();
        let ctx = PatchContext::new::<G>(&mesh, patch_i, self.internal.values());
        pf.sn_grad(&ctx)
    }

    fn checked_patch(&self, patch_i: usize) -> FoamResult<&dyn PatchField<T>> {
        FoamError::check_index("patch", patch_i, self.boundary.len())?;
        Ok(self.boundary[patch_i].as_ref())
    }

    // ========================================================================
    // 旧时间层
    // ========================================================================

    /// 时间索引变化时保存内部场旧值
    pub fn store_old_times(&mut self, time_index: usize) -> bool {
        self.internal.store_old_times(time_index)
    }

    /// 第 `level` 层旧内部值
    pub fn old_time(&self, level: usize) -> Option<&[T]> {
        self.internal.old_time(level)
    }

    // ========================================================================
    // 写出
    // ========================================================================

    /// 写出为字典
    pub fn to_dictionary(&self) -> FoamResult<Dictionary> {
        let mut dict = Dictionary::new(self.name());
        dict.set("dimensions", self.internal.dimensions())?;
        dict.set("internalField", FieldEntry::from_values(self.values()))?;
        let mut boundary = Dictionary::new(format!("{}::boundaryField", self.name()));
        for pf in &self.boundary {
            let name = pf.patch().name().to_string();
            let mut sub = Dictionary::new(format!("{}::boundaryField::{name}", self.name()));
            pf.write(&mut sub)?;
            boundary.add_sub_dict(name, sub);
        }
        dict.add_sub_dict("boundaryField", boundary);
        if let Some(sources) = self.sources.to_dictionary(&format!("{}::sources", self.name()))? {
            dict.add_sub_dict("sources", sources);
        }
        Ok(dict)
    }

    // ========================================================================
    // 网格变化
    // ========================================================================

    fn remap_boundary(&mut self, change: MeshChange<'_>) -> FoamResult<()> {
        let mesh = self.internal.mesh().clone();
        let mesh = mesh.borrow();
        let n_patches = mesh.boundary_mesh().len();
        if n_patches != self.boundary.len() {
            return Err(FoamError::invalid_mesh(format!(
                "场 {} 有 {} 个补丁场, 网格有 {} 个补丁",
                self.name(),
                self.boundary.len(),
                n_patches
            )));
        }
        for (i, pf) in self.boundary.iter_mut().enumerate() {
            let patch = mesh.boundary_mesh()[i].clone();
            if pf.constraint_type() == Some("empty") {
                pf.base_mut().set_patch(patch);
                pf.base_mut().set_state(PatchFieldState::Constructed);
                continue;
            }
            let mapper = PatchMapper::<G> {
                change,
                mesh: &mesh,
                patch_i: i,
                geo: PhantomData,
            };
            // 类型特有数据先映射：部分类型按旧边界值尺寸识别逐面条目
            pf.map_faces(&mapper)?;
            let values = match mapper.map(pf.values())? {
                Some(v) => v,
                None => gather::<T, G>(&mesh, i, self.internal.values())
                    .unwrap_or_else(|| vec![T::zero(); G::patch_size(&mesh, i)]),
            };
            let base = pf.base_mut();
            base.set_patch(patch);
            base.set_values(values);
            base.set_state(PatchFieldState::Constructed);
        }
        self.sources.clear_caches();
        Ok(())
    }
}

/// 一次网格变化
#[derive(Clone, Copy)]
enum MeshChange<'a> {
    TopoChange(&'a PolyTopoChangeMap),
    MapMesh(&'a PolyMeshMap),
    Distribute(&'a PolyDistributionMap),
}

/// 单个补丁的逐面映射器
struct PatchMapper<'a, G> {
    change: MeshChange<'a>,
    mesh: &'a PolyMesh,
    patch_i: usize,
    geo: PhantomData<G>,
}

impl<G: BoundaryGeoMesh> PatchMapper<'_, G> {
    fn map<V: FieldValue>(&self, values: &[V]) -> FoamResult<Option<Vec<V>>> {
        match self.change {
            MeshChange::TopoChange(map) => {
                G::map_patch_topo_change(self.mesh, map, self.patch_i, values)
            }
            MeshChange::MapMesh(map) => G::map_patch_mesh(self.mesh, map, self.patch_i, values),
            MeshChange::Distribute(map) => G::distribute_patch(self.mesh, map, self.patch_i, values),
        }
    }
}

impl<T: FieldValue, G: BoundaryGeoMesh> PatchFaceMapper<T> for PatchMapper<'_, G> {
    fn size(&self) -> usize {
        G::patch_size(self.mesh, self.patch_i)
    }

    fn map_values(&self, values: &[T]) -> FoamResult<Option<Vec<T>>> {
        self.map(values)
    }

    fn map_scalars(&self, values: &[f64]) -> FoamResult<Option<Vec<f64>>> {
        self.map(values)
    }
}

/// 补丁 `patch_i` 相邻的内部值
fn gather<T: FieldValue, G: BoundaryGeoMesh>(
    mesh: &PolyMesh,
    patch_i: usize,
    internal: &[T],
) -> Option<Vec<T>> {
    G::patch_internal_addressing(mesh, patch_i).map(|addr| addr.iter().map(|&c| internal[c]).collect())
}

/// 按补丁名、再按补丁组查找补丁字典
fn find_patch_dict<T>(boundary: &Dictionary, init: &PatchInit<'_, T>) -> FoamResult<Dictionary> {
    let patch = init.patch;
    std::iter::once(patch.name())
        .chain(patch.groups().iter().map(String::as_str))
        .find_map(|key| boundary.opt_sub_dict(key))
        .map(|d| d.with_scope(format!("{}::{}", boundary.scope(), patch.name())))
        .ok_or_else(|| {
            FoamError::invalid_entry(boundary.scope(), patch.name(), "缺少补丁的边界条件")
        })
}

impl<T: FieldValue, G: BoundaryGeoMesh> fmt::Debug for GeometricField<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometricField")
            .field("name", &self.name())
            .field("type", &Self::field_type_name())
            .field("size", &self.internal.size())
            .field("boundary", &self.boundary_types())
            .field("sources", &self.sources)
            .finish()
    }
}

// ============================================================
// 运算符
// ============================================================

impl<T: FieldValue, G: BoundaryGeoMesh> AddAssign<&GeometricField<T, G>> for GeometricField<T, G> {
    fn add_assign(&mut self, rhs: &GeometricField<T, G>) {
        self.internal += &rhs.internal;
        for (a, b) in self.boundary.iter_mut().zip(&rhs.boundary) {
            if a.values().len() != b.values().len() {
                fatal(FoamError::size_mismatch(a.patch().name(), a.values().len(), b.values().len()));
            }
            for (x, y) in a.base_mut().values_mut().iter_mut().zip(b.values()) {
                *x += *y;
            }
        }
    }
}

impl<T: FieldValue, G: BoundaryGeoMesh> SubAssign<&GeometricField<T, G>> for GeometricField<T, G> {
    fn sub_assign(&mut self, rhs: &GeometricField<T, G>) {
        self.internal -= &rhs.internal;
        for (a, b) in self.boundary.iter_mut().zip(&rhs.boundary) {
            if a.values().len() != b.values().len() {
                fatal(FoamError::size_mismatch(a.patch().name(), a.values().len(), b.values().len()));
            }
            for (x, y) in a.base_mut().values_mut().iter_mut().zip(b.values()) {
                *x -= *y;
            }
        }
    }
}

// ============================================================
// 注册
// ============================================================

impl<T: FieldValue, G: BoundaryGeoMesh> RegIoObject for GeometricField<T, G> {
    fn io(&self) -> &IoObject {
        self.internal.io_ref()
    }

    fn io_mut(&mut self) -> &mut IoObject {
        self.internal.io_ref_mut()
    }

    fn type_name(&self) -> String {
        Self::field_type_name()
    }

    fn write_data(&self) -> FoamResult<serde_json::Value> {
        Ok(self.to_dictionary()?.to_value())
    }

    fn move_points(&mut self) -> FoamResult<MapStatus> {
        self.internal.check_size()?;
        for pf in &mut self.boundary {
            pf.base_mut().set_state(PatchFieldState::Constructed);
        }
        self.sources.clear_caches();
        Ok(MapStatus::Handled)
    }

    fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        if self.internal.apply_topo_change(map)? == MapStatus::Unaffected {
            return Ok(MapStatus::Unaffected);
        }
        self.remap_boundary(MeshChange::TopoChange(map))?;
        Ok(MapStatus::Handled)
    }

    fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<MapStatus> {
        if self.internal.apply_map_mesh(map)? == MapStatus::Unaffected {
            return Ok(MapStatus::Unaffected);
        }
        self.remap_boundary(MeshChange::MapMesh(map))?;
        Ok(MapStatus::Handled)
    }

    fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        if self.internal.apply_distribute(map)? == MapStatus::Unaffected {
            return Ok(MapStatus::Unaffected);
        }
        self.remap_boundary(MeshChange::Distribute(map))?;
        Ok(MapStatus::Handled)
    }
}
