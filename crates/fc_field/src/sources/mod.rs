// crates/fc_field/src/sources/mod.rs

//! 场源
//!
//! 场源为方程提供体积源项闭合：注入流量为正的单元上，注入值为
//!
//! ```text
//! φ_src = source_coeff·source_value + internal_coeff·φ_P,   source_coeff = 1 - internal_coeff
//! ```
//!
//! 一个场的全部场源按名字保存在 [`GeometricFieldSources`] 中；未声明任何场源的场
//! 持有 [`NoFieldSource`] 哨兵，它对任意名字都给出空操作的场源。
//!
//! 场源类型的选择没有 generic 回退：未知类型立即报错。

pub mod basic;
pub mod distribution_group_fraction;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult, Tensor};
use fc_registry::AsAny;
use glam::DVec3;

use crate::patch_fields::PatchFieldTable;

pub use basic::{InternalSource, UniformFixedValueSource, UniformInletOutletSource, UniformValue};
pub use distribution_group_fraction::DistributionGroupFractionSource;

// ============================================================
// 求值上下文
// ============================================================

/// 场源求值所需的数据
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a, T> {
    /// 源所在单元
    pub cells: &'a [usize],
    /// 完整内部场
    pub internal: &'a [T],
    /// 各源单元的体积流量（正为注入）
    pub rate: &'a [f64],
    /// 时间值
    pub time: f64,
}

impl<'a, T: FieldValue> SourceContext<'a, T> {
    /// 构造并检查 `cells` 与 `rate` 等长、单元编号有效
    pub fn new(cells: &'a [usize], internal: &'a [T], rate: &'a [f64], time: f64) -> FoamResult<Self> {
        FoamError::check_size("rate", cells.len(), rate.len())?;
        for &c in cells {
            FoamError::check_index("cell", c, internal.len())?;
        }
        Ok(Self {
            cells,
            internal,
            rate,
            time,
        })
    }

    /// 源单元数
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// 源单元上的内部值
    pub fn cell_values(&self) -> Vec<T> {
        self.cells.iter().map(|&c| self.internal[c]).collect()
    }
}

// ============================================================
// 接口
// ============================================================

/// 场源
pub trait FieldSource<T: FieldValue>: AsAny + fmt::Debug {
    /// 运行时类型名
    fn type_name(&self) -> &str;

    /// 注入值
    fn source_value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>>;

    /// 注入值中取自内部场的比例
    fn internal_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>>;

    /// 注入值中取自 `source_value` 的比例
    fn source_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>> {
        Ok(self
            .internal_coeff(ctx)?
            .into_iter()
            .map(|ic| 1.0 - ic)
            .collect())
    }

    /// 注入的场值
    fn value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>> {
        let sv = self.source_value(ctx)?;
        let ic = self.internal_coeff(ctx)?;
        FoamError::check_size(self.type_name(), ctx.size(), sv.len())?;
        FoamError::check_size(self.type_name(), ctx.size(), ic.len())?;
        Ok(sv
            .iter()
            .zip(&ic)
            .zip(ctx.cells)
            .map(|((s, i), &c)| s.scale(1.0 - i) + ctx.internal[c].scale(*i))
            .collect())
    }

    /// 复制
    fn clone_box(&self) -> Box<dyn FieldSource<T>>;

    /// 丢弃按需缓存（网格或参数变化后）
    fn clear_cache(&mut self) {}

    /// 写出
    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", self.type_name())?;
        Ok(())
    }
}

// ============================================================
// NoFieldSource
// ============================================================

/// 空操作场源：源值为零，全部取自内部场
pub struct NoFieldSource<T> {
    _value: PhantomData<T>,
}

impl<T> NoFieldSource<T> {
    /// 类型名
    pub const TYPE_NAME: &'static str = "noFieldSource";

    /// 构造
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<T> Default for NoFieldSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NoFieldSource<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NoFieldSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoFieldSource")
    }
}

impl<T: FieldValue> FieldSource<T> for NoFieldSource<T> {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn source_value(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<T>> {
        Ok(vec![T::zero(); ctx.size()])
    }

    fn internal_coeff(&self, ctx: &SourceContext<'_, T>) -> FoamResult<Vec<f64>> {
        Ok(vec![1.0; ctx.size()])
    }

    fn clone_box(&self) -> Box<dyn FieldSource<T>> {
        Box::new(Self::new())
    }
}

// ============================================================
// 选择表
// ============================================================

/// 场源构造函数
pub type FieldSourceCtor<T> = fn(&Dictionary) -> FoamResult<Box<dyn FieldSource<T>>>;

/// 场源选择表
pub struct FieldSourceTable<T: FieldValue> {
    ctors: BTreeMap<String, FieldSourceCtor<T>>,
}

impl<T: FieldValue> fmt::Debug for FieldSourceTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ctors.keys()).finish()
    }
}

impl<T: FieldValue> FieldSourceTable<T> {
    /// 空表
    pub fn new() -> Self {
        Self {
            ctors: BTreeMap::new(),
        }
    }

    /// 对所有值类型通用的内建类型
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.add(InternalSource::<T>::TYPE_NAME, |d| {
            Ok(Box::new(InternalSource::<T>::from_dictionary(d)?))
        });
        table.add(UniformFixedValueSource::<T>::TYPE_NAME, |d| {
            Ok(Box::new(UniformFixedValueSource::<T>::from_dictionary(d)?))
        });
        table.add(UniformInletOutletSource::<T>::TYPE_NAME, |d| {
            Ok(Box::new(UniformInletOutletSource::<T>::from_dictionary(d)?))
        });
        table
    }

    /// 注册或替换构造函数
    pub fn add(&mut self, type_name: impl Into<String>, ctor: FieldSourceCtor<T>) {
        self.ctors.insert(type_name.into(), ctor);
    }

    /// 是否有该类型
    pub fn contains(&self, type_name: &str) -> bool {
        self.ctors.contains_key(type_name)
    }

    /// 已注册类型名（有序）
    pub fn type_names(&self) -> Vec<String> {
        self.ctors.keys().cloned().collect()
    }

    /// 按字典 `type` 构造；未知类型立即报错
    pub fn select(&self, dict: &Dictionary) -> FoamResult<Box<dyn FieldSource<T>>> {
        let type_name = dict.type_name()?;
        match self.ctors.get(&type_name) {
            Some(ctor) => ctor(dict),
            None => Err(FoamError::unknown_type(
                "fieldSource",
                type_name,
                self.type_names(),
            )),
        }
    }
}

impl<T: FieldValue> Default for FieldSourceTable<T> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 各值类型可用的边界与场源类型
pub trait SelectableValue: FieldValue {
    /// 补丁场选择表
    fn patch_field_table() -> PatchFieldTable<Self> {
        PatchFieldTable::with_defaults()
    }

    /// 场源选择表
    fn field_source_table() -> FieldSourceTable<Self> {
        FieldSourceTable::with_defaults()
    }
}

impl SelectableValue for f64 {
    fn field_source_table() -> FieldSourceTable<f64> {
        let mut table = FieldSourceTable::with_defaults();
        table.add(DistributionGroupFractionSource::TYPE_NAME, |d| {
            Ok(Box::new(DistributionGroupFractionSource::from_dictionary(d)?))
        });
        table
    }
}

impl SelectableValue for DVec3 {}

impl SelectableValue for Tensor {}

// ============================================================
// GeometricFieldSources
// ============================================================

/// 一个场的全部场源
pub enum GeometricFieldSources<T: FieldValue> {
    /// 未声明场源：任意名字都得到空操作场源
    NoFieldSource(NoFieldSource<T>),
    /// 按名字声明的场源
    Sources(BTreeMap<String, Box<dyn FieldSource<T>>>),
}

impl<T: FieldValue> GeometricFieldSources<T> {
    /// 空操作哨兵
    pub fn none() -> Self {
        Self::NoFieldSource(NoFieldSource::new())
    }

    /// 从 `sources` 子字典构造，每个条目是一个场源字典
    pub fn from_dictionary(dict: &Dictionary, table: &FieldSourceTable<T>) -> FoamResult<Self> {
        let mut sources = BTreeMap::new();
        for name in dict.keys() {
            let sub = dict.sub_dict(&name)?;
            sources.insert(name, table.select(&sub)?);
        }
        Ok(Self::Sources(sources))
    }

    /// 是否为哨兵
    pub fn is_none(&self) -> bool {
        matches!(self, Self::NoFieldSource(_))
    }

    /// 声明的场源数
    pub fn len(&self) -> usize {
        match self {
            Self::NoFieldSource(_) => 0,
            Self::Sources(map) => map.len(),
        }
    }

    /// 是否没有声明场源
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 名字到类型名
    pub fn types(&self) -> BTreeMap<String, String> {
        match self {
            Self::NoFieldSource(_) => BTreeMap::new(),
            Self::Sources(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.type_name().to_string()))
                .collect(),
        }
    }

    /// 按名字查找；声明了场源时缺失的名字是错误
    pub fn get(&self, name: &str) -> FoamResult<&dyn FieldSource<T>> {
        match self {
            Self::NoFieldSource(sentinel) => Ok(sentinel),
            Self::Sources(map) => map.get(name).map(|s| s.as_ref()).ok_or_else(|| {
                FoamError::not_found("sources", name, "fieldSource", map.keys().cloned().collect())
            }),
        }
    }

    /// 加入场源
    pub fn insert(&mut self, name: impl Into<String>, source: Box<dyn FieldSource<T>>) {
        if let Self::NoFieldSource(_) = self {
            *self = Self::Sources(BTreeMap::new());
        }
        if let Self::Sources(map) = self {
            map.insert(name.into(), source);
        }
    }

    /// 丢弃全部按需缓存
    pub fn clear_caches(&mut self) {
        if let Self::Sources(map) = self {
            for source in map.values_mut() {
                source.clear_cache();
            }
        }
    }

    /// 写出为 `sources` 子字典；哨兵不写出
    pub fn to_dictionary(&self, scope: &str) -> FoamResult<Option<Dictionary>> {
        let Self::Sources(map) = self else {
            return Ok(None);
        };
        let mut dict = Dictionary::new(scope);
        for (name, source) in map {
            let mut sub = Dictionary::new(format!("{scope}::{name}"));
            source.write(&mut sub)?;
            dict.add_sub_dict(name.clone(), sub);
        }
        Ok(Some(dict))
    }
}

impl<T: FieldValue> Clone for GeometricFieldSources<T> {
    fn clone(&self) -> Self {
        match self {
            Self::NoFieldSource(s) => Self::NoFieldSource(s.clone()),
            Self::Sources(map) => Self::Sources(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone_box()))
                    .collect(),
            ),
        }
    }
}

impl<T: FieldValue> fmt::Debug for GeometricFieldSources<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFieldSource(_) => f.write_str("NoFieldSource"),
            Self::Sources(_) => f.debug_map().entries(self.types()).finish(),
        }
    }
}

impl<T: FieldValue> Default for GeometricFieldSources<T> {
    fn default() -> Self {
        Self::none()
    }
}
