// crates/fc_field/src/dimensioned_field.rs

//! DimensionedField - 带量纲的内部场
//!
//! 场始终绑定一套网格和一个量纲集合。值的个数只由网格决定：
//! 构造时检查 `size == G::size(mesh)`，之后只能通过网格变化通知改变长度，
//! 对外只暴露定长切片。
//!
//! # 复合赋值
//!
//! `+=`/`-=` 默认不检查量纲（方程组装处已保证量纲平衡），
//! 打开 `check_field_dimensions` 开关或使用 `checked_add_assign` 时检查。
//! 两个场不在同一网格上时总是致命错误。

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{AddAssign, MulAssign, SubAssign};
use std::rc::Rc;

use serde_json::json;

use fc_config::Dictionary;
use fc_foundation::{
    fatal, field_value::capitalised_type_name, DimensionSet, Dimensioned, DimensionedScalar,
    DirectMap, FieldValue, FoamError, FoamResult, PolyDistributionMap, PolyMeshMap,
    PolyTopoChangeMap,
};
use fc_mesh::GeoMesh;
use fc_registry::{IoObject, MapStatus, RegIoObject};

use crate::field_entry::{read_values, FieldEntry};
use crate::old_time::OldTimeField;

/// 默认保存的旧时间层数
pub const DEFAULT_OLD_TIME_LEVELS: usize = 2;

/// 带量纲的内部场
pub struct DimensionedField<T: FieldValue, G: GeoMesh> {
    io: IoObject,
    mesh: Rc<RefCell<G::Mesh>>,
    dimensions: DimensionSet,
    values: Vec<T>,
    old_time: OldTimeField<T>,
    check_dimensions: bool,
    _geo: PhantomData<G>,
}

impl<T: FieldValue, G: GeoMesh> DimensionedField<T, G> {
    // ========================================================================
    // 构造
    // ========================================================================

    /// 由值构造，值的个数须等于网格实体数
    pub fn new(
        io: IoObject,
        mesh: Rc<RefCell<G::Mesh>>,
        dimensions: DimensionSet,
        values: Vec<T>,
    ) -> FoamResult<Self> {
        let n = G::size(&mesh.borrow());
        FoamError::check_size(io.name(), n, values.len())?;
        Ok(Self {
            io,
            mesh,
            dimensions,
            values,
            old_time: OldTimeField::new(DEFAULT_OLD_TIME_LEVELS),
            check_dimensions: false,
            _geo: PhantomData,
        })
    }

    /// 均匀场
    pub fn uniform(
        io: IoObject,
        mesh: Rc<RefCell<G::Mesh>>,
        dimensions: DimensionSet,
        value: T,
    ) -> Self {
        let n = G::size(&mesh.borrow());
        Self {
            io,
            mesh,
            dimensions,
            values: vec![value; n],
            old_time: OldTimeField::new(DEFAULT_OLD_TIME_LEVELS),
            check_dimensions: false,
            _geo: PhantomData,
        }
    }

    /// 从字典读取：`dimensions` 与 `key` 条目
    pub fn from_dictionary(
        io: IoObject,
        mesh: Rc<RefCell<G::Mesh>>,
        dict: &Dictionary,
        key: &str,
    ) -> FoamResult<Self> {
        let dimensions: DimensionSet = dict.lookup("dimensions")?;
        let n = G::size(&mesh.borrow());
        let values = read_values(dict, key, n)?;
        Self::new(io, mesh, dimensions, values)
    }

    /// 复合赋值时检查量纲
    pub fn with_dimension_check(mut self, check: bool) -> Self {
        self.check_dimensions = check;
        self
    }

    /// 同一网格、同一位置上的新场（新的对象 ID，不带旧时间层）
    pub fn clone_named(&self, name: impl Into<String>) -> Self {
        Self {
            io: clone_io(&self.io, name),
            mesh: self.mesh.clone(),
            dimensions: self.dimensions,
            values: self.values.clone(),
            old_time: OldTimeField::new(DEFAULT_OLD_TIME_LEVELS),
            check_dimensions: self.check_dimensions,
            _geo: PhantomData,
        }
    }

    // ========================================================================
    // 访问
    // ========================================================================

    /// 名称
    pub fn name(&self) -> &str {
        self.io.name()
    }

    /// 网格
    pub fn mesh(&self) -> &Rc<RefCell<G::Mesh>> {
        &self.mesh
    }

    /// 量纲
    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    /// 重设量纲
    pub fn set_dimensions(&mut self, dimensions: DimensionSet) {
        self.dimensions = dimensions;
    }

    /// 值
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 可变值（定长）
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// 元素数
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// 检查元素数与网格一致
    pub fn check_size(&self) -> FoamResult<()> {
        FoamError::check_size(self.name(), G::size(&self.mesh.borrow()), self.values.len())
    }

    /// 是否与另一个场共享网格
    pub fn same_mesh<S: FieldValue>(&self, other: &DimensionedField<S, G>) -> bool {
        Rc::ptr_eq(&self.mesh, &other.mesh)
    }

    /// 覆盖全部值，不触及旧时间层
    pub fn reset(&mut self, values: Vec<T>) -> FoamResult<()> {
        FoamError::check_size(self.io.name(), self.values.len(), values.len())?;
        self.values = values;
        Ok(())
    }

    /// 赋为均匀值
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }

    // ========================================================================
    // 分量
    // ========================================================================

    /// 取出一个分量（复制）
    pub fn component(&self, d: usize) -> FoamResult<DimensionedField<f64, G>> {
        FoamError::check_index("component", d, T::N_COMPONENTS)?;
        let name = format!("{}.component({})", self.name(), T::COMPONENT_NAMES[d]);
        let values = self.values.iter().map(|v| v.component(d)).collect();
        Ok(DimensionedField {
            io: clone_io(&self.io, name),
            mesh: self.mesh.clone(),
            dimensions: self.dimensions,
            values,
            old_time: OldTimeField::new(0),
            check_dimensions: self.check_dimensions,
            _geo: PhantomData,
        })
    }

    /// 原地写回一个分量
    pub fn replace(&mut self, d: usize, sf: &DimensionedField<f64, G>) -> FoamResult<()> {
        FoamError::check_index("component", d, T::N_COMPONENTS)?;
        if !Rc::ptr_eq(&self.mesh, &sf.mesh) {
            return Err(FoamError::invalid_mesh(format!(
                "{}.replace: 分量场 {} 不在同一网格上",
                self.name(),
                sf.name()
            )));
        }
        for (v, s) in self.values.iter_mut().zip(&sf.values) {
            v.set_component(d, *s);
        }
        Ok(())
    }

    // ========================================================================
    // 归约
    // ========================================================================

    fn reduced(&self, op: &str, value: T) -> Dimensioned<T> {
        Dimensioned::new(format!("{}({})", op, self.name()), self.dimensions, value)
    }

    /// 逐分量最小值（空场为零）
    pub fn min(&self) -> Dimensioned<T> {
        let v = self
            .values
            .iter()
            .copied()
            .reduce(T::cmpt_min)
            .unwrap_or_else(T::zero);
        self.reduced("min", v)
    }

    /// 逐分量最大值（空场为零）
    pub fn max(&self) -> Dimensioned<T> {
        let v = self
            .values
            .iter()
            .copied()
            .reduce(T::cmpt_max)
            .unwrap_or_else(T::zero);
        self.reduced("max", v)
    }

    /// 总和
    pub fn sum(&self) -> Dimensioned<T> {
        let v = self.values.iter().fold(T::zero(), |acc, v| acc + *v);
        self.reduced("sum", v)
    }

    /// 算术平均（空场为零）
    pub fn average(&self) -> Dimensioned<T> {
        let n = self.values.len();
        let v = if n == 0 {
            T::zero()
        } else {
            self.sum().value.scale(1.0 / n as f64)
        };
        self.reduced("average", v)
    }

    /// 加权平均（例如以单元体积加权）
    pub fn weighted_average(&self, weights: &[f64]) -> FoamResult<Dimensioned<T>> {
        FoamError::check_size("weights", self.values.len(), weights.len())?;
        let total: f64 = weights.iter().sum();
        let v = if total.abs() > fc_foundation::VSMALL {
            self.values
                .iter()
                .zip(weights)
                .fold(T::zero(), |acc, (v, w)| acc + v.scale(*w))
                .scale(1.0 / total)
        } else {
            self.average().value
        };
        Ok(self.reduced("weightedAverage", v))
    }

    // ========================================================================
    // 量纲检查的复合赋值
    // ========================================================================

    /// `+=`，检查量纲
    pub fn checked_add_assign(&mut self, other: &Self) -> FoamResult<()> {
        self.check_compatible(other, "+=")?;
        self.dimensions.check_same(&other.dimensions, "+=")?;
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a += *b;
        }
        Ok(())
    }

    /// `-=`，检查量纲
    pub fn checked_sub_assign(&mut self, other: &Self) -> FoamResult<()> {
        self.check_compatible(other, "-=")?;
        self.dimensions.check_same(&other.dimensions, "-=")?;
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a -= *b;
        }
        Ok(())
    }

    fn check_compatible<S: FieldValue>(
        &self,
        other: &DimensionedField<S, G>,
        op: &str,
    ) -> FoamResult<()> {
        if !self.same_mesh(other) {
            return Err(FoamError::invalid_mesh(format!(
                "{} {} {}: 场不在同一网格上",
                self.name(),
                op,
                other.name()
            )));
        }
        Ok(())
    }

    fn combine_assign(&mut self, other: &Self, op: &str, f: impl Fn(&mut T, T)) {
        if let Err(e) = self.check_compatible(other, op) {
            fatal(e);
        }
        if self.check_dimensions {
            if let Err(e) = self.dimensions.check_same(&other.dimensions, op) {
                fatal(e);
            }
        }
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            f(a, *b);
        }
    }

    // ========================================================================
    // 旧时间层
    // ========================================================================

    /// 旧时间层数
    pub fn n_old_times(&self) -> usize {
        self.old_time.n_old_times()
    }

    /// 第 `level` 层旧值（1 为上一时间步）
    pub fn old_time(&self, level: usize) -> Option<&[T]> {
        self.old_time.old_time(level)
    }

    /// 时间索引变化时保存当前值
    pub fn store_old_times(&mut self, time_index: usize) -> bool {
        self.old_time.store_old_times(time_index, &self.values)
    }

    /// 无条件保存当前值
    pub fn store_old_time(&mut self) {
        self.old_time.store_old_time(&self.values);
    }

    // ========================================================================
    // 网格变化
    // ========================================================================

    /// 按直接映射重排（粒子注入、删除）；映射后尺寸须与网格一致，失败时场不变
    pub fn map_direct(&mut self, map: &DirectMap) -> FoamResult<()> {
        let n = G::size(&self.mesh.borrow());
        let name = self.io.name();
        let values = sized(name, n, map.apply(&self.values, &T::zero())?)?;
        self.old_time.try_map_levels(|v| {
            map.apply(v, &T::zero())
                .and_then(|m| sized(name, n, m))
                .map(Some)
        })?;
        self.values = values;
        Ok(())
    }

    pub(crate) fn apply_topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        let mesh = self.mesh.borrow();
        let (name, n) = (self.io.name(), G::size(&mesh));
        let Some(values) = G::map_topo_change(&mesh, map, &self.values)? else {
            return Ok(MapStatus::Unaffected);
        };
        let values = sized(name, n, values)?;
        self.old_time.try_map_levels(|v| {
            G::map_topo_change(&mesh, map, v)?
                .map(|m| sized(name, n, m))
                .transpose()
        })?;
        self.values = values;
        Ok(MapStatus::Handled)
    }

    pub(crate) fn apply_map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<MapStatus> {
        let mesh = self.mesh.borrow();
        let Some(values) = G::map_mesh(&mesh, map, &self.values)? else {
            return Ok(MapStatus::Unaffected);
        };
        let values = sized(self.io.name(), G::size(&mesh), values)?;
        // 网格间映射后的旧时间层没有意义
        self.old_time.clear();
        self.values = values;
        Ok(MapStatus::Handled)
    }

    pub(crate) fn apply_distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        let mesh = self.mesh.borrow();
        let (name, n) = (self.io.name(), G::size(&mesh));
        let Some(values) = G::distribute(&mesh, map, &self.values)? else {
            return Ok(MapStatus::Unaffected);
        };
        let values = sized(name, n, values)?;
        self.old_time.try_map_levels(|v| {
            G::distribute(&mesh, map, v)?
                .map(|m| sized(name, n, m))
                .transpose()
        })?;
        self.values = values;
        Ok(MapStatus::Handled)
    }

    /// 场类型名，如 `volScalarField::Internal`
    pub fn field_type_name() -> String {
        format!("{}{}Field::Internal", G::NAME, capitalised_type_name::<T>())
    }

    /// 写出为 JSON
    pub fn to_value(&self) -> serde_json::Value {
        json!({
            "dimensions": self.dimensions,
            "value": FieldEntry::from_values(&self.values),
        })
    }

    pub(crate) fn io_ref(&self) -> &IoObject {
        &self.io
    }

    pub(crate) fn io_ref_mut(&mut self) -> &mut IoObject {
        &mut self.io
    }
}

/// 同位置、同读写选项的新身份
pub(crate) fn clone_io(io: &IoObject, name: impl Into<String>) -> IoObject {
    IoObject::new(name, io.instance(), io.location())
        .with_local(io.local())
        .with_read(io.read_opt())
        .with_write(io.write_opt())
}

impl<T: FieldValue, G: GeoMesh> fmt::Debug for DimensionedField<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionedField")
            .field("name", &self.io.name())
            .field("type", &Self::field_type_name())
            .field("dimensions", &self.dimensions.to_string())
            .field("size", &self.values.len())
            .finish()
    }
}

// ============================================================
// 运算符
// ============================================================

impl<T: FieldValue, G: GeoMesh> AddAssign<&DimensionedField<T, G>> for DimensionedField<T, G> {
    fn add_assign(&mut self, rhs: &DimensionedField<T, G>) {
        self.combine_assign(rhs, "+=", |a, b| *a += b);
    }
}

impl<T: FieldValue, G: GeoMesh> SubAssign<&DimensionedField<T, G>> for DimensionedField<T, G> {
    fn sub_assign(&mut self, rhs: &DimensionedField<T, G>) {
        self.combine_assign(rhs, "-=", |a, b| *a -= b);
    }
}

impl<T: FieldValue, G: GeoMesh> MulAssign<&DimensionedField<f64, G>> for DimensionedField<T, G> {
    fn mul_assign(&mut self, rhs: &DimensionedField<f64, G>) {
        if let Err(e) = self.check_compatible(rhs, "*=") {
            fatal(e);
        }
        self.dimensions = self.dimensions * rhs.dimensions;
        for (a, s) in self.values.iter_mut().zip(&rhs.values) {
            *a = a.scale(*s);
        }
    }
}

impl<T: FieldValue, G: GeoMesh> MulAssign<&DimensionedScalar> for DimensionedField<T, G> {
    fn mul_assign(&mut self, rhs: &DimensionedScalar) {
        self.dimensions = self.dimensions * rhs.dimensions;
        for a in &mut self.values {
            *a = a.scale(rhs.value);
        }
    }
}

impl<T: FieldValue, G: GeoMesh> MulAssign<f64> for DimensionedField<T, G> {
    fn mul_assign(&mut self, rhs: f64) {
        for a in &mut self.values {
            *a = a.scale(rhs);
        }
    }
}

// ============================================================
// 注册
// ============================================================

impl<T: FieldValue, G: GeoMesh> RegIoObject for DimensionedField<T, G> {
    fn io(&self) -> &IoObject {
        &self.io
    }

    fn io_mut(&mut self) -> &mut IoObject {
        &mut self.io
    }

    fn type_name(&self) -> String {
        Self::field_type_name()
    }

    fn write_data(&self) -> FoamResult<serde_json::Value> {
        Ok(self.to_value())
    }

    fn move_points(&mut self) -> FoamResult<MapStatus> {
        self.check_size()?;
        Ok(MapStatus::Unaffected)
    }

    fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        self.apply_topo_change(map)
    }

    fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<MapStatus> {
        self.apply_map_mesh(map)
    }

    fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        self.apply_distribute(map)
    }
}

/// 映射结果须有 `n` 个值
fn sized<T>(name: &str, n: usize, values: Vec<T>) -> FoamResult<Vec<T>> {
    FoamError::check_size(name, n, values.len())?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_config::BlockMeshSpec;
    use fc_foundation::dimension_set::{DIM_LENGTH, DIM_PRESSURE, DIM_TIME, DIM_VELOCITY};
    use fc_mesh::{BlockMesh, PolyMesh, VolMesh};
    use glam::DVec3;

    fn mesh() -> Rc<RefCell<PolyMesh>> {
        Rc::new(RefCell::new(
            BlockMesh::new(BlockMeshSpec::default()).generate("region0").unwrap(),
        ))
    }

    fn field(mesh: &Rc<RefCell<PolyMesh>>, name: &str, v: f64) -> DimensionedField<f64, VolMesh> {
        DimensionedField::uniform(IoObject::detached(name), mesh.clone(), DIM_PRESSURE, v)
    }

    #[test]
    fn test_size_follows_mesh() {
        let m = mesh();
        let f = field(&m, "p", 1.0);
        assert_eq!(f.size(), 8);
        let err = DimensionedField::<f64, VolMesh>::new(
            IoObject::detached("q"),
            m.clone(),
            DIM_PRESSURE,
            vec![0.0; 3],
        )
        .unwrap_err();
        assert!(matches!(err, FoamError::SizeMismatch { .. }));
        assert_eq!(DimensionedField::<f64, VolMesh>::field_type_name(), "volScalarField::Internal");
    }

    #[test]
    fn test_add_assign_ignores_dimensions_by_default() {
        let m = mesh();
        let mut a = field(&m, "a", 1.0);
        let mut b = field(&m, "b", 2.0);
        b.set_dimensions(DIM_VELOCITY);
        a += &b;
        assert!(a.values().iter().all(|v| *v == 3.0));
        assert!(a.checked_add_assign(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "FOAM FATAL ERROR")]
    fn test_add_assign_with_check_is_fatal() {
        let m = mesh();
        let mut a = field(&m, "a", 1.0).with_dimension_check(true);
        let mut b = field(&m, "b", 2.0);
        b.set_dimensions(DIM_VELOCITY);
        a += &b;
    }

    #[test]
    #[should_panic(expected = "FOAM FATAL ERROR")]
    fn test_add_assign_on_different_meshes_is_fatal() {
        let mut a = field(&mesh(), "a", 1.0);
        let b = field(&mesh(), "b", 1.0);
        a -= &b;
    }

    #[test]
    fn test_component_and_replace() {
        let m = mesh();
        let mut u = DimensionedField::<DVec3, VolMesh>::uniform(
            IoObject::detached("U"),
            m.clone(),
            DIM_VELOCITY,
            DVec3::new(1.0, 2.0, 3.0),
        );
        let mut uy = u.component(1).unwrap();
        assert_eq!(uy.name(), "U.component(y)");
        assert!(uy.values().iter().all(|v| *v == 2.0));
        uy.fill(-1.0);
        // 复制，不共享存储
        assert_eq!(u.values()[0].y, 2.0);
        u.replace(1, &uy).unwrap();
        assert_eq!(u.values()[0], DVec3::new(1.0, -1.0, 3.0));
        assert!(u.component(3).is_err());
    }

    #[test]
    fn test_reductions() {
        let m = mesh();
        let mut f = field(&m, "p", 0.0);
        for (i, v) in f.values_mut().iter_mut().enumerate() {
            *v = i as f64;
        }
        assert_eq!(f.min().value, 0.0);
        assert_eq!(f.max().value, 7.0);
        assert_eq!(f.sum().value, 28.0);
        assert_eq!(f.average().value, 3.5);
        let w = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert_eq!(f.weighted_average(&w).unwrap().value, 7.0);
        assert_eq!(f.sum().dimensions, DIM_PRESSURE);
    }

    #[test]
    fn test_mul_assign_dimensions() {
        let m = mesh();
        let mut u = field(&m, "u", 2.0);
        u.set_dimensions(DIM_VELOCITY);
        let t = DimensionedScalar::new("dt", DIM_TIME, 0.5);
        u *= &t;
        assert_eq!(*u.dimensions(), DIM_LENGTH);
        assert!(u.values().iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_reset_keeps_old_times() {
        let m = mesh();
        let mut f = field(&m, "p", 1.0);
        f.store_old_times(1);
        f.reset(vec![5.0; 8]).unwrap();
        assert_eq!(f.old_time(1).unwrap()[0], 1.0);
        assert!(f.reset(vec![0.0; 2]).is_err());
    }

    #[test]
    fn test_failed_map_leaves_field_unchanged() {
        let m = mesh();
        let mut f = field(&m, "p", 1.0);
        f.store_old_times(1);
        f.values_mut()[0] = 2.0;

        let shrink = DirectMap::new(8, vec![Some(0), Some(1), Some(2)]).unwrap();
        assert!(f.map_direct(&shrink).is_err());
        assert_eq!(f.size(), 8);
        assert_eq!(f.values()[0], 2.0);
        assert_eq!(f.old_time(1).map(<[f64]>::len), Some(8));

        let reverse = DirectMap::new(8, (0..8).rev().map(Some).collect()).unwrap();
        f.map_direct(&reverse).unwrap();
        assert_eq!(f.values()[7], 2.0);
        assert_eq!(f.old_time(1).unwrap()[7], 1.0);
    }
}
