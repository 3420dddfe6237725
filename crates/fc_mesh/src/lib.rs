// crates/fc_mesh/src/lib.rs

//! FoamCore Mesh Layer
//!
//! 多面体有限体积网格：面-单元拓扑、边界补丁、区域、按需几何与寻址，
//! 以及点移动、拓扑变化、网格映射、重分布时的网格侧更新。
//!
//! # 模块概览
//!
//! - [`face`]: 多边形面与面几何
//! - [`patch`] / [`boundary_mesh`]: 边界补丁
//! - [`zones`]: 点、面、单元区域
//! - [`poly_mesh`]: 网格本体与按需缓存
//! - [`geo_mesh`]: 场所在实体的标记类型
//! - [`mesh_region`]: 网格与其对象注册表
//! - [`block_mesh`]: 结构化块网格生成
//! - [`sync`]: 耦合边界同步
//! - [`lagrangian`]: 粒子网格
//!
//! # 示例
//!
//! ```
//! use fc_config::BlockMeshSpec;
//! use fc_mesh::BlockMesh;
//!
//! let mesh = BlockMesh::new(BlockMeshSpec::default()).generate("region0").unwrap();
//! assert_eq!(mesh.n_cells(), 8);
//! let volume: f64 = mesh.cell_volumes().iter().sum();
//! assert!((volume - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block_mesh;
pub mod boundary_mesh;
pub mod cell_shape;
pub mod error;
pub mod face;
pub mod geo_mesh;
pub mod lagrangian;
pub mod mesh_region;
pub mod patch;
pub mod poly_mesh;
pub mod sync;
pub mod zones;

pub use block_mesh::BlockMesh;
pub use boundary_mesh::PolyBoundaryMesh;
pub use cell_shape::{CellModel, CellShape};
pub use error::{MeshError, MeshResult};
pub use face::Face;
pub use geo_mesh::{BoundaryGeoMesh, GeoMesh, PointMesh, SurfaceMesh, VolMesh};
pub use lagrangian::{LagrangianGeoMesh, LagrangianHandle, LagrangianMesh, Particle};
pub use mesh_region::{MeshHandle, MeshRegion};
pub use patch::{PatchKind, PolyPatch};
pub use poly_mesh::{BoundBox, MeshCheck, MeshGeometry, MeshStatistics, PolyMesh};
pub use sync::{Pstream, SerialPstream, SyncTools};
pub use zones::{Zone, ZoneKind, ZoneMesh};
