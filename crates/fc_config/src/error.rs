// crates/fc_config/src/error.rs

//! 配置层错误类型

use fc_foundation::FoamError;

/// 配置层结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键（含作用域）
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: 字典 '{scope}' 中没有条目 '{key}'")]
    Missing {
        /// 字典作用域
        scope: String,
        /// 条目名
        key: String,
    },
}

impl ConfigError {
    /// 无效值
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 缺失条目
    pub fn missing(scope: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Missing {
            scope: scope.into(),
            key: key.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ConfigError> for FoamError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => FoamError::io_with_source("读取配置失败", e),
            ConfigError::Parse(msg) => FoamError::parse("dictionary", msg),
            ConfigError::InvalidValue { key, value, reason } => {
                FoamError::config(format!("'{key}' = {value}: {reason}"))
            }
            ConfigError::Missing { scope, key } => {
                FoamError::invalid_entry(scope, key, "缺少必需条目")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid_value("deltaT", "-1", "必须为正");
        assert!(err.to_string().contains("deltaT"));
    }

    #[test]
    fn test_missing_into_foam_error() {
        let err: FoamError = ConfigError::missing("p::boundaryField::inlet", "type").into();
        let msg = err.to_string();
        assert!(msg.contains("p::boundaryField::inlet"));
        assert!(msg.contains("type"));
    }
}
