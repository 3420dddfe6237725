// crates/fc_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `FoamError` 枚举和 `FoamResult` 类型别名，以及致命错误路径。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，网格/配置层的错误通过 `From` 汇入
//! 2. **快速失败**: 配置错误、未知类型、严格量纲检查失败走 [`fatal`]，打印诊断后终止
//! 3. **警告不是错误**: 可恢复的异常（重复 checkOut、事件计数溢出）只记录 `tracing::warn!`
//!
//! # 示例
//!
//! ```
//! use fc_foundation::error::{FoamError, FoamResult};
//!
//! fn select(type_name: &str) -> FoamResult<()> {
//!     Err(FoamError::unknown_type("patchField", type_name, vec!["fixedValue".into()]))
//! }
//!
//! assert!(select("bogusType").unwrap_err().to_string().contains("bogusType"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type FoamResult<T> = Result<T, FoamError>;

/// FoamCore 错误类型
#[derive(Error, Debug)]
pub enum FoamError {
    // ========================================================================
    // IO 与解析
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 解析错误
    #[error("解析错误: {context}: {message}")]
    Parse {
        /// 被解析的内容（文件名或字典作用域）
        context: String,
        /// 错误信息
        message: String,
    },

    /// 字典条目无效
    #[error("字典条目无效: {scope}::{key}, 原因: {reason}")]
    InvalidEntry {
        /// 字典作用域
        scope: String,
        /// 条目名
        key: String,
        /// 无效原因
        reason: String,
    },

    // ========================================================================
    // 运行时选择
    // ========================================================================

    /// 未知的运行时选择类型
    #[error("未知的 {category} 类型 '{type_name}', 可用类型: {valid:?}")]
    UnknownType {
        /// 类别（patchField、fieldSource、distribution 等）
        category: String,
        /// 请求的类型名
        type_name: String,
        /// 已注册的类型名（有序）
        valid: Vec<String>,
    },

    // ========================================================================
    // 数值与量纲
    // ========================================================================

    /// 量纲不一致
    #[error("量纲不一致: {operation}, 左 {lhs}, 右 {rhs}")]
    DimensionMismatch {
        /// 运算描述
        operation: String,
        /// 左操作数量纲
        lhs: String,
        /// 右操作数量纲
        rhs: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 注册表
    // ========================================================================

    /// 对象未找到
    #[error("注册表 '{registry}' 中找不到 {type_name} '{name}', 可用对象: {available:?}")]
    NotFound {
        /// 注册表名
        registry: String,
        /// 对象名
        name: String,
        /// 期望类型
        type_name: String,
        /// 注册表中已有对象（有序）
        available: Vec<String>,
    },

    /// 对象类型不符
    #[error("对象 '{name}' 类型为 {actual}, 期望 {expected}")]
    WrongType {
        /// 对象名
        name: String,
        /// 期望类型
        expected: String,
        /// 实际类型
        actual: String,
    },

    // ========================================================================
    // 网格与映射
    // ========================================================================

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 无效的拓扑映射
    #[error("无效的拓扑映射: {message}")]
    InvalidMap {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 其他
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 功能未实现
    #[error("功能未实现: {feature}")]
    NotImplemented {
        /// 未实现的功能描述
        feature: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl FoamError {
    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// 字典条目无效
    pub fn invalid_entry(
        scope: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEntry {
            scope: scope.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// 未知类型
    pub fn unknown_type(
        category: impl Into<String>,
        type_name: impl Into<String>,
        valid: Vec<String>,
    ) -> Self {
        Self::UnknownType {
            category: category.into(),
            type_name: type_name.into(),
            valid,
        }
    }

    /// 量纲不一致
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        lhs: impl std::fmt::Display,
        rhs: impl std::fmt::Display,
    ) -> Self {
        Self::DimensionMismatch {
            operation: operation.into(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 对象未找到
    pub fn not_found(
        registry: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::NotFound {
            registry: registry.into(),
            name: name.into(),
            type_name: type_name.into(),
            available,
        }
    }

    /// 对象类型不符
    pub fn wrong_type(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongType {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 无效映射
    pub fn invalid_map(message: impl Into<String>) -> Self {
        Self::InvalidMap {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 功能未实现
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &str, expected: usize, actual: usize) -> FoamResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> FoamResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for FoamError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for FoamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            context: "json".into(),
            message: err.to_string(),
        }
    }
}

// ========================================================================
// 致命错误路径
// ========================================================================

/// 报告致命错误并终止
///
/// 打印诊断后 panic；发布构建中 `panic = "abort"`，即终止进程。
/// 仅用于无法返回 `Result` 的调用点（运算符重载）或调用方明确要求快速失败的地方。
#[cold]
#[track_caller]
pub fn fatal(err: impl Into<FoamError>) -> ! {
    let err = err.into();
    let location = std::panic::Location::caller();
    tracing::error!(%location, "--> FOAM FATAL ERROR: {}", err);
    panic!("FOAM FATAL ERROR: {err}");
}

/// 将 `Result` 转入致命错误路径
pub trait OrFatal<T> {
    /// 成功时返回值，失败时调用 [`fatal`]
    fn or_fatal(self) -> T;
}

impl<T, E: Into<FoamError>> OrFatal<T> for Result<T, E> {
    #[track_caller]
    fn or_fatal(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => fatal(e),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FoamError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_unknown_type_names_request() {
        let err = FoamError::unknown_type(
            "fieldSource",
            "bogusType",
            vec!["internal".into(), "uniformFixedValue".into()],
        );
        let msg = err.to_string();
        assert!(msg.contains("bogusType"));
        assert!(msg.contains("internal"));
    }

    #[test]
    fn test_not_found_lists_available() {
        let err = FoamError::not_found("region0", "p", "volScalarField", vec!["U".into()]);
        let msg = err.to_string();
        assert!(msg.contains("region0"));
        assert!(msg.contains("'p'"));
        assert!(msg.contains("\"U\""));
    }

    #[test]
    fn test_check_size() {
        assert!(FoamError::check_size("test", 10, 10).is_ok());
        assert!(FoamError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(FoamError::check_index("Cell", 5, 10).is_ok());
        assert!(FoamError::check_index("Cell", 10, 10).is_err());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: FoamError = io_err.into();
        assert!(matches!(err, FoamError::Io { .. }));
    }

    #[test]
    fn test_or_fatal_passes_ok() {
        let r: FoamResult<i32> = Ok(3);
        assert_eq!(r.or_fatal(), 3);
    }

    #[test]
    #[should_panic(expected = "FOAM FATAL ERROR")]
    fn test_or_fatal_panics_on_err() {
        let r: FoamResult<i32> = Err(FoamError::internal("boom"));
        r.or_fatal();
    }
}
