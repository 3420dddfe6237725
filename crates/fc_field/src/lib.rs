// crates/fc_field/src/lib.rs

//! FoamCore Field Layer
//!
//! 网格上的带量纲场：内部场、补丁场、场源，以及边界条件与场源的
//! 字典驱动运行时选择。
//!
//! # 模块概览
//!
//! - [`dimensioned_field`]: 带量纲、带旧时间层的内部场
//! - [`geometric_field`]: 内部场 + 补丁场 + 场源
//! - [`patch_fields`]: 补丁场接口、基本与约束边界条件、选择表
//! - [`sources`]: 场源接口、`NoFieldSource` 哨兵、选择表
//! - [`field_entry`]: `uniform` / `nonuniform` 条目读写
//! - [`old_time`]: 旧时间层
//! - [`types`]: 常用场类型别名
//!
//! # 示例
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use fc_config::BlockMeshSpec;
//! use fc_field::VolScalarField;
//! use fc_foundation::dimension_set::DIM_PRESSURE;
//! use fc_mesh::BlockMesh;
//! use fc_registry::IoObject;
//!
//! let mesh = BlockMesh::new(BlockMeshSpec::default()).generate("region0").unwrap();
//! let mesh = Rc::new(RefCell::new(mesh));
//! let mut p = VolScalarField::new_calculated(IoObject::detached("p"), mesh, DIM_PRESSURE, 1.0)
//!     .unwrap();
//! p.correct_boundary_conditions().unwrap();
//! assert_eq!(p.values().len(), 8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dimensioned_field;
pub mod field_entry;
pub mod geometric_field;
pub mod old_time;
pub mod patch_fields;
pub mod sources;
pub mod types;

pub use dimensioned_field::DimensionedField;
pub use field_entry::{read_values, read_values_opt, write_values, FieldEntry};
pub use geometric_field::{GeometricField, PatchCoeffs};
pub use old_time::OldTimeField;
pub use patch_fields::{
    CalculatedPatchField, CyclicPatchField, EmptyPatchField, FixedGradientPatchField,
    FixedValuePatchField, GenericPatchField, MixedPatchField, PatchContext, PatchFaceMapper,
    PatchField, PatchFieldBase, PatchFieldCtor, PatchFieldState, PatchFieldTable, PatchInit,
    SymmetryPatchField, ZeroGradientPatchField,
};
pub use sources::{
    DistributionGroupFractionSource, FieldSource, FieldSourceCtor, FieldSourceTable,
    GeometricFieldSources, InternalSource, NoFieldSource, SelectableValue, SourceContext,
    UniformFixedValueSource, UniformInletOutletSource, UniformValue,
};
pub use types::*;
