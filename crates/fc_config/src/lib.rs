// crates/fc_config/src/lib.rs

//! FoamCore Config Layer
//!
//! 配置层，提供运行时选择所读取的字典、调试开关和算例配置。
//!
//! # 模块概览
//!
//! - [`dictionary`]: 带作用域的层级键值字典
//! - [`switches`]: 调试开关与依赖重读策略
//! - [`case_config`]: 算例配置（时间、网格、场）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: fc_cli        ─> CaseConfig
//! Layer 4: fc_field      ─> Dictionary, DebugSwitches
//! Layer 3: fc_mesh       ─> BlockMeshSpec
//! Layer 2: fc_registry   ─> ReadPropagation
//! Layer 1: fc_config / fc_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case_config;
pub mod dictionary;
pub mod error;
pub mod switches;

// 重导出核心类型
pub use case_config::{BlockMeshSpec, BoxSide, CaseConfig, PatchSpec};
pub use dictionary::Dictionary;
pub use error::{ConfigError, ConfigResult};
pub use switches::{DebugSwitches, ReadPropagation};
