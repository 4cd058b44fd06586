//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。

use std::path::PathBuf;

use thiserror::Error;

use crate::value::ValueKind;

/// 补间执行错误
///
/// 只在目标数据与 `to` / `from` 的结构不一致时产生。
/// 配置缺失（无目标、时长为 0 等）不算错误，对应的帧直接跳过。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 目标上缺少 `to` 中声明的属性
    #[error("目标上不存在属性 '{path}'")]
    MissingProperty { path: String },

    /// 结构不匹配（一边是数值，另一边是嵌套映射）
    #[error("属性 '{path}' 结构不匹配：期望 {expected}，实际 {found}")]
    ShapeMismatch {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// 目标拒绝写入该属性
    #[error("属性 '{path}' 拒绝写入数值")]
    PropertyRejected { path: String },
}

impl TweenError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::MissingProperty {
            path: key.to_string(),
        }
    }

    pub(crate) fn mismatch(key: &str, expected: ValueKind, found: ValueKind) -> Self {
        Self::ShapeMismatch {
            path: key.to_string(),
            expected,
            found,
        }
    }

    pub(crate) fn rejected(key: &str) -> Self {
        Self::PropertyRejected {
            path: key.to_string(),
        }
    }

    /// 出错的属性路径（点分隔）
    pub fn path(&self) -> &str {
        match self {
            Self::MissingProperty { path }
            | Self::ShapeMismatch { path, .. }
            | Self::PropertyRejected { path } => path,
        }
    }

    /// 错误从嵌套层向外冒泡时，在路径前补上父级键
    pub(crate) fn nested(mut self, parent: &str) -> Self {
        let path = match &mut self {
            Self::MissingProperty { path }
            | Self::ShapeMismatch { path, .. }
            | Self::PropertyRejected { path } => path,
        };
        *path = format!("{parent}.{path}");
        self
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取失败
    #[error("读取配置 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Invalid(String),
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;
