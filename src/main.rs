//! ISL Bible Admin - 经文导入与导航服务
//!
//! - Domain: scripture/（USFM/USJ 解析与经节分解）, navigation
//! - Application: commands, queries, ports, navigation resolver
//! - Infrastructure: http, memory, persistence

use std::sync::Arc;

use isl_admin::config::{load_config, print_config, LogConfig};
use isl_admin::infrastructure::http::{AppState, HttpServer};
use isl_admin::infrastructure::memory::InMemoryIngestLocks;
use isl_admin::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBibleRepository, SqliteBookLookup,
    SqliteNavigationReader, SqliteResourceRepository, SqliteVerseStore,
};
use tracing_subscriber::EnvFilter;

/// 初始化日志，RUST_LOG 优先于配置
fn init_tracing(log: &LogConfig) {
    let log_filter = format!(
        "{},isl_admin={},tower_http=debug,sqlx=warn",
        log.level, log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("ISL Bible Admin");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.path, config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let resources = Arc::new(SqliteResourceRepository::new(pool.clone()));
    let books = Arc::new(SqliteBookLookup::new(pool.clone()));
    let bible = Arc::new(SqliteBibleRepository::new(pool.clone()));
    let verses = Arc::new(SqliteVerseStore::new(pool.clone()));
    let navigation_reader = Arc::new(SqliteNavigationReader::new(pool));

    // 同一书卷的导入串行执行
    let locks = InMemoryIngestLocks::new().arc();

    let state = AppState::new(
        resources,
        books,
        bible,
        verses,
        navigation_reader,
        locks,
        config.upload.to_policy(),
    );

    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
