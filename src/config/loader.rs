//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "ISL_ADMIN";

/// 加载应用配置
///
/// # 环境变量示例
/// - `ISL_ADMIN_SERVER__PORT=8080`
/// - `ISL_ADMIN_DATABASE__PATH=/data/isl_admin.db`
/// - `ISL_ADMIN_UPLOAD__MAX_SIZE_BYTES=20971520`
/// - `ISL_ADMIN_LOG__JSON=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，`None` 时搜索默认文件名
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("database.path", "data/isl_admin.db")?
        .set_default("database.max_connections", 5)?
        .set_default("upload.max_size_bytes", 10 * 1024 * 1024)?
        .set_default("upload.allowed_extensions", vec!["usfm", "sfm"])?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 层级分隔符为双下划线，列表以逗号分隔
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("upload.allowed_extensions")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "Database max_connections cannot be 0".to_string(),
        ));
    }

    if config.upload.max_size_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Upload size limit cannot be 0".to_string(),
        ));
    }

    if config
        .upload
        .allowed_extensions
        .iter()
        .all(|ext| ext.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "At least one upload extension must be allowed".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Upload Limit: {} bytes", config.upload.max_size_bytes);
    tracing::info!(
        "Upload Extensions: {}",
        config.upload.allowed_extensions.join(", ")
    );
    tracing::info!("Log Level: {} (json: {})", config.log.level, config.log.json);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_database_path() {
        let mut config = AppConfig::default();
        config.database.path = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_upload_limits() {
        let mut config = AppConfig::default();
        config.upload.max_size_bytes = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.upload.allowed_extensions.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let file = write_config(
            r#"
            [server]
            port = 9100

            [database]
            path = "/tmp/bible.db"

            [upload]
            max_size_bytes = 2048
            allowed_extensions = ["usfm"]
            "#,
        );

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, "/tmp/bible.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.upload.max_size_bytes, 2048);
        assert_eq!(config.upload.allowed_extensions, vec!["usfm"]);
        assert!(!config.log.json);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let file = write_config("[server]\nport = 0\n");
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_required_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_config_from_path(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
