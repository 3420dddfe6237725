// crates/fc_field/src/patch_fields/table.rs

//! 补丁场运行时选择表
//!
//! 类型名到构造函数的显式映射，在启动阶段确定性地填充。选择规则：
//!
//! 1. 按字典 `type` 查表；未找到时，允许回退则构造 `generic` 并警告，否则报错
//! 2. 除非 `patchType` 与补丁类型一致，若补丁场的约束类型与补丁的约束类型不同，
//!    改用补丁类型名对应的构造函数（例如 empty 补丁上写了 zeroGradient）
//! 3. 补丁场类型与补丁类型不同且表中有补丁类型时，标记为覆盖约束

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use fc_config::Dictionary;
use fc_foundation::{FieldValue, FoamError, FoamResult};
use fc_mesh::PolyPatch;
use fc_registry::ObjectId;

use super::basic::{
    CalculatedPatchField, FixedGradientPatchField, FixedValuePatchField, MixedPatchField,
    ZeroGradientPatchField,
};
use super::constraint::{CyclicPatchField, EmptyPatchField, SymmetryPatchField};
use super::generic::GenericPatchField;
use super::PatchField;

/// 构造补丁场所需的信息
#[derive(Debug, Clone)]
pub struct PatchInit<'a, T> {
    /// 补丁
    pub patch: &'a PolyPatch,
    /// 所属内部场
    pub internal_id: ObjectId,
    /// 补丁元素数
    pub size: usize,
    /// 相邻内部值（面场为 `None`）
    pub patch_internal: Option<Vec<T>>,
}

impl<T: FieldValue> PatchInit<'_, T> {
    /// 未给出 `value` 时的初值：相邻内部值，否则为零
    pub fn default_values(&self) -> Vec<T> {
        match &self.patch_internal {
            Some(v) if v.len() == self.size => v.clone(),
            _ => vec![T::zero(); self.size],
        }
    }
}

/// 补丁场构造函数
pub type PatchFieldCtor<T> =
    fn(&PatchInit<'_, T>, &Dictionary) -> FoamResult<Box<dyn PatchField<T>>>;

/// 补丁场选择表
pub struct PatchFieldTable<T: FieldValue> {
    ctors: BTreeMap<String, PatchFieldCtor<T>>,
    disallow_generic: bool,
}

impl<T: FieldValue> fmt::Debug for PatchFieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchFieldTable")
            .field("types", &self.type_names())
            .field("disallow_generic", &self.disallow_generic)
            .finish()
    }
}

impl<T: FieldValue> Default for PatchFieldTable<T> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn boxed<T: FieldValue, P: PatchField<T> + 'static>(
    ctor: fn(&PatchInit<'_, T>, &Dictionary) -> FoamResult<P>,
    init: &PatchInit<'_, T>,
    dict: &Dictionary,
) -> FoamResult<Box<dyn PatchField<T>>> {
    Ok(Box::new(ctor(init, dict)?))
}

impl<T: FieldValue> PatchFieldTable<T> {
    /// 空表
    pub fn new() -> Self {
        Self {
            ctors: BTreeMap::new(),
            disallow_generic: false,
        }
    }

    /// 含全部内建类型的表
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.add(CalculatedPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(CalculatedPatchField::from_dictionary, i, d)
        });
        table.add(FixedValuePatchField::<T>::TYPE_NAME, |i, d| {
            boxed(FixedValuePatchField::from_dictionary, i, d)
        });
        table.add(ZeroGradientPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(ZeroGradientPatchField::from_dictionary, i, d)
        });
        table.add(FixedGradientPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(FixedGradientPatchField::from_dictionary, i, d)
        });
        table.add(MixedPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(MixedPatchField::from_dictionary, i, d)
        });
        table.add(EmptyPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(EmptyPatchField::from_dictionary, i, d)
        });
        table.add("symmetryPlane", |i, d| {
            boxed(SymmetryPatchField::symmetry_plane, i, d)
        });
        table.add("symmetry", |i, d| boxed(SymmetryPatchField::symmetry, i, d));
        table.add("wedge", |i, d| boxed(SymmetryPatchField::wedge, i, d));
        table.add(CyclicPatchField::<T>::TYPE_NAME, |i, d| {
            boxed(CyclicPatchField::from_dictionary, i, d)
        });
        table
    }

    /// 未知类型时报错而不回退到 generic
    pub fn disallow_generic(mut self, disallow: bool) -> Self {
        self.disallow_generic = disallow;
        self
    }

    /// 注册或替换构造函数
    pub fn add(&mut self, type_name: impl Into<String>, ctor: PatchFieldCtor<T>) {
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

    /// 按类型名构造，不读取额外条目
    pub fn new_patch_field(
        &self,
        type_name: &str,
        init: &PatchInit<'_, T>,
    ) -> FoamResult<Box<dyn PatchField<T>>> {
        let mut dict = Dictionary::new(format!("boundaryField::{}", init.patch.name()));
        dict.set("type", type_name)?;
        self.select(init, &dict)
    }

    /// 按字典选择并构造
    pub fn select(
        &self,
        init: &PatchInit<'_, T>,
        dict: &Dictionary,
    ) -> FoamResult<Box<dyn PatchField<T>>> {
        let patch = init.patch;
        let type_name = dict.type_name()?;
        let actual_patch_type: Option<String> = dict.lookup_opt("patchType")?;

        let mut pf = match self.ctors.get(&type_name) {
            Some(ctor) => ctor(init, dict)?,
            None if self.disallow_generic => {
                return Err(FoamError::unknown_type(
                    "patchField",
                    &type_name,
                    self.type_names(),
                ));
            }
            None => {
                warn!(
                    "补丁 {} 的边界类型 {} 未知，回退到 generic（可用类型: {}）",
                    patch.name(),
                    type_name,
                    self.type_names().join(", ")
                );
                Box::new(GenericPatchField::from_dictionary(init, dict)?)
            }
        };

        if actual_patch_type.as_deref() != Some(patch.type_name())
            && pf.constraint_type() != patch.kind().constraint_type()
        {
            let Some(ctor) = self.ctors.get(patch.type_name()) else {
                return Err(FoamError::invalid_entry(
                    dict.scope(),
                    "type",
                    format!(
                        "补丁场类型 {} 与补丁类型 {} 不一致",
                        pf.type_name(),
                        patch.type_name()
                    ),
                ));
            };
            pf = ctor(init, dict)?;
        }

        let overrides = pf.type_name() != patch.type_name() && self.contains(patch.type_name());
        pf.set_overrides_constraint(overrides);
        Ok(pf)
    }
}
