// crates/fc_foundation/src/lib.rs

//! FoamCore Foundation Layer
//!
//! 基础层，提供整个项目共享的抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型与致命错误路径
//! - [`dimension_set`]: 七元量纲指数向量
//! - [`dimensioned`]: 带量纲的量
//! - [`field_value`]: 标量/矢量/张量场值类型
//! - [`demand`]: 显式状态的按需缓存
//! - [`mapping`]: 拓扑变化、网格间映射与重分布的映射对象
//!
//! # 示例
//!
//! ```
//! use fc_foundation::{Dimensioned, dimension_set::{DIM_MASS, DIM_VOLUME, DIM_DENSITY}};
//!
//! let m = Dimensioned::new("m", DIM_MASS, 2.0);
//! let v = Dimensioned::new("V", DIM_VOLUME, 4.0);
//! let rho = m / v;
//! assert_eq!(rho.dimensions, DIM_DENSITY);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod demand;
pub mod dimension_set;
pub mod dimensioned;
pub mod error;
pub mod field_value;
pub mod mapping;

// 重导出常用类型
pub use demand::{CacheState, Demand};
pub use dimension_set::{DimensionSet, DimensionType, DIMLESS};
pub use dimensioned::{Dimensioned, DimensionedScalar};
pub use error::{fatal, FoamError, FoamResult, OrFatal};
pub use field_value::{FieldValue, Tensor};
pub use mapping::{
    DirectMap, DistributionSchedule, OldMeshSizes, PolyDistributionMap, PolyMeshMap,
    PolyTopoChangeMap,
};

/// 常用 glam 类型
pub use glam::{DMat3, DVec3};

/// 一般小量
pub const SMALL: f64 = 1e-15;

/// 极小量
pub const VSMALL: f64 = 1e-300;

/// 大数
pub const GREAT: f64 = 1e15;

/// 极大数
pub const VGREAT: f64 = 1e300;
