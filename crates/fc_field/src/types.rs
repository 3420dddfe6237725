// crates/fc_field/src/types.rs

//! 常用场类型别名

use fc_foundation::Tensor;
use fc_mesh::{LagrangianGeoMesh, PointMesh, SurfaceMesh, VolMesh};
use glam::DVec3;

use crate::dimensioned_field::DimensionedField;
use crate::geometric_field::GeometricField;

/// 体标量场
pub type VolScalarField = GeometricField<f64, VolMesh>;
/// 体矢量场
pub type VolVectorField = GeometricField<DVec3, VolMesh>;
/// 体张量场
pub type VolTensorField = GeometricField<Tensor, VolMesh>;

/// 面标量场（通量）
pub type SurfaceScalarField = GeometricField<f64, SurfaceMesh>;
/// 面矢量场
pub type SurfaceVectorField = GeometricField<DVec3, SurfaceMesh>;

/// 点标量场
pub type PointScalarField = GeometricField<f64, PointMesh>;
/// 点矢量场（位移）
pub type PointVectorField = GeometricField<DVec3, PointMesh>;

/// 体标量内部场
pub type VolScalarInternalField = DimensionedField<f64, VolMesh>;
/// 体矢量内部场
pub type VolVectorInternalField = DimensionedField<DVec3, VolMesh>;

/// 粒子标量场
pub type LagrangianScalarField = DimensionedField<f64, LagrangianGeoMesh>;
/// 粒子矢量场
pub type LagrangianVectorField = DimensionedField<DVec3, LagrangianGeoMesh>;
