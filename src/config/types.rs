//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::application::UploadPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 上传配置
    #[serde(default)]
    pub upload: UploadConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/isl_admin.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 单个 USFM 文件的最大字节数，默认 10MB
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,

    /// 允许的文件扩展名（不区分大小写，不带点）
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_size_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["usfm".to_string(), "sfm".to_string()]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadConfig {
    /// 转换为应用层的上传策略
    pub fn to_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_size_bytes: self.max_size_bytes,
            allowed_extensions: self
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别（RUST_LOG 优先）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
