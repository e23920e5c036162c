//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/resource/create   POST  创建资源
//! - /api/resource/list     GET   列出资源
//! - /api/bible/upload      POST  上传 USFM 书卷（multipart: resource_id, usfm）
//! - /api/bible/update      POST  覆盖书卷（multipart: bible_book_id, usfm）
//! - /api/bible/delete      POST  批量删除书卷
//! - /api/bible/books       POST  书卷列表
//! - /api/bible/content     POST  整卷正文（json | usfm）
//! - /api/bible/chapter     POST  章经文 + 章级导航
//! - /api/bible/verse       POST  节经文 + 节级导航

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/resource", resource_routes())
        .nest("/bible", bible_routes())
}

/// Resource 路由
fn resource_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_resource))
        .route("/list", get(handlers::list_resources))
}

/// Bible 路由
fn bible_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload_bible_book))
        .route("/update", post(handlers::update_bible_book))
        .route("/delete", post(handlers::delete_bible_books))
        .route("/books", post(handlers::list_bible_books))
        .route("/content", post(handlers::get_bible_book_content))
        .route("/chapter", post(handlers::get_chapter))
        .route("/verse", post(handlers::get_verse))
}
