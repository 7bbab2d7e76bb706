//! 配置模块，负责翻译选项以及从JSON配置文件加载

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 默认的最大嵌套深度
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(String),
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("无法解析JSON配置文件 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("max_depth 必须大于 0")]
    ZeroDepth,
}

/// 翻译选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// 为 true 时调用方保证独占输入, 翻译器直接移出输入内容而不做深拷贝
    pub assume_exclusive_ownership: bool,
    /// 嵌套 include scope 与 and/or 组合的最大层数
    pub max_depth: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            assume_exclusive_ownership: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TranslateOptions {
    /// 调用方独占输入时使用的选项
    pub fn exclusive() -> Self {
        Self {
            assume_exclusive_ownership: true,
            ..Default::default()
        }
    }

    /// 从JSON文件加载翻译选项, 缺省字段取默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let display = path_ref.display().to_string();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(display));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: display,
                source,
            },
            other => other,
        })
    }

    /// 从JSON字符串解析翻译选项
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let options: TranslateOptions =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;

        if options.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(options)
    }
}
