// crates/fc_distribution/src/lib.rs

//! FoamCore Distribution Layer
//!
//! 尺寸分布的字典驱动选择与可重放采样。
//!
//! # 模块概览
//!
//! - [`random`]: 带检查点的随机数发生器
//! - [`distribution`]: `Distribution` 接口与运行时选择
//! - [`continuous`]: 连续分布的数值表与通用实现
//! - [`densities`]: 参数化密度（uniform、normal、lognormal、RosinRammler、exponential）
//! - [`tabulated`]: 表格密度与表格累积分布
//! - [`discrete`]: fixedValue 与 multiFixedValue
//!
//! # 尺寸指数
//!
//! ```text
//! 字典参数定义的密度 (Q) ──x^q──> 采样密度 (sampleQ),  q = sampleQ - Q
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod continuous;
pub mod densities;
pub mod discrete;
pub mod distribution;
pub mod random;
pub mod tabulated;

pub use continuous::{Continuous, Density, N_TABLE_INTERVALS};
pub use densities::{Exponential, Lognormal, MassRosinRammler, Normal, RosinRammler, Uniform};
pub use discrete::{FixedValue, MultiFixedValue};
pub use distribution::{linspace, new_distribution, Distribution, DISTRIBUTION_TYPES};
pub use random::RandomGenerator;
pub use tabulated::{TabulatedCumulative, TabulatedDensity};
