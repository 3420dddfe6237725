// crates/fc_mesh/src/error.rs

//! 网格层错误
//!
//! 网格构造、校验和拓扑变化中的错误。跨层传播时转换为 [`FoamError`]。

use thiserror::Error;

use fc_foundation::FoamError;

/// 网格层结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格层错误
#[derive(Debug, Error)]
pub enum MeshError {
    /// 拓扑不合法
    #[error("拓扑错误 ({operation}): {details}")]
    InvalidTopology {
        /// 操作
        operation: &'static str,
        /// 详情
        details: String,
    },

    /// 尺寸不匹配
    #[error("{what} 尺寸不匹配: 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数据名
        what: String,
        /// 期望
        expected: usize,
        /// 实际
        actual: usize,
    },

    /// 边界定义不合法
    #[error("边界定义错误: {details}")]
    InvalidBoundary {
        /// 详情
        details: String,
    },

    /// 补丁不存在
    #[error("补丁 '{name}' 不存在，可用补丁: {available:?}")]
    PatchNotFound {
        /// 补丁名
        name: String,
        /// 可用补丁
        available: Vec<String>,
    },

    /// 未知补丁类型
    #[error("未知补丁类型 '{type_name}'")]
    UnknownPatchType {
        /// 类型名
        type_name: String,
    },
}

impl MeshError {
    /// 拓扑错误
    pub fn topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 边界错误
    pub fn boundary(details: impl Into<String>) -> Self {
        Self::InvalidBoundary {
            details: details.into(),
        }
    }

    /// 检查尺寸
    pub fn check_size(what: &str, expected: usize, actual: usize) -> MeshResult<()> {
        if expected != actual {
            return Err(Self::SizeMismatch {
                what: what.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl From<MeshError> for FoamError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::SizeMismatch {
                what,
                expected,
                actual,
            } => FoamError::size_mismatch(what, expected, actual),
            MeshError::UnknownPatchType { type_name } => FoamError::unknown_type(
                "polyPatch",
                type_name,
                crate::patch::PatchKind::ALL
                    .iter()
                    .map(|k| k.type_name().to_string())
                    .collect(),
            ),
            other => FoamError::invalid_mesh(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size() {
        assert!(MeshError::check_size("points", 3, 3).is_ok());
        let err = MeshError::check_size("points", 3, 4).unwrap_err();
        assert!(err.to_string().contains("points"));
    }

    #[test]
    fn test_into_foam_error() {
        let err: FoamError = MeshError::UnknownPatchType {
            type_name: "bogus".into(),
        }
        .into();
        assert!(matches!(err, FoamError::UnknownType { .. }));
        assert!(err.to_string().contains("bogus"));

        let err: FoamError = MeshError::boundary("gap").into();
        assert!(matches!(err, FoamError::InvalidMesh { .. }));
    }
}
