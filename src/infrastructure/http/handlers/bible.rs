//! Bible HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    ContentFormat, DeleteBibleBooks, GetBibleBookContent, GetChapter, GetVerse, ListBibleBooks,
    UpdateBibleBook, UploadBibleBook,
};
use crate::infrastructure::http::dto::{
    ApiResponse, BibleBooksResponse, BookContentRequest, BookContentResponse,
    ChapterContentResponse, ChapterRequest, DeleteBibleBooksRequest, DeleteBooksResponse,
    IngestResponse, ListBibleBooksRequest, VerseContentResponse, VerseRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// multipart 中携带的 USFM 文件
struct UsfmUpload {
    id: i64,
    filename: String,
    content: Vec<u8>,
}

/// 读取 `{id_field}` 文本字段与 `usfm` 文件字段
async fn read_usfm_upload(mut multipart: Multipart, id_field: &str) -> Result<UsfmUpload, ApiError> {
    let mut id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == id_field {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", id_field, e)))?;
            id = Some(text.trim().parse().map_err(|_| {
                ApiError::BadRequest(format!("{} must be an integer, got '{}'", id_field, text))
            })?);
        } else if field_name == "usfm" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            file = Some((filename, bytes.to_vec()));
        }
    }

    let id = id.ok_or_else(|| ApiError::BadRequest(format!("{} is required", id_field)))?;
    let (filename, content) =
        file.ok_or_else(|| ApiError::BadRequest("usfm file is required".to_string()))?;

    Ok(UsfmUpload {
        id,
        filename,
        content,
    })
}

/// 上传 USFM 书卷
pub async fn upload_bible_book(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<IngestResponse>>, ApiError> {
    let upload = read_usfm_upload(multipart, "resource_id").await?;

    tracing::info!(
        resource_id = upload.id,
        filename = %upload.filename,
        size = upload.content.len(),
        "Bible book upload received"
    );

    let command = UploadBibleBook {
        resource_id: upload.id,
        filename: upload.filename,
        content: upload.content,
    };

    let result = state.upload_bible_book_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 以新的 USFM 覆盖已有书卷
pub async fn update_bible_book(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<IngestResponse>>, ApiError> {
    let upload = read_usfm_upload(multipart, "bible_book_id").await?;

    let command = UpdateBibleBook {
        bible_book_id: upload.id,
        filename: upload.filename,
        content: upload.content,
    };

    let result = state.update_bible_book_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 批量删除书卷
pub async fn delete_bible_books(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteBibleBooksRequest>,
) -> Result<Json<ApiResponse<DeleteBooksResponse>>, ApiError> {
    let command = DeleteBibleBooks {
        resource_id: request.resource_id,
        book_codes: request.book_codes,
    };

    let result = state.delete_bible_books_handler.handle(command).await?;
    if result.all_failed() {
        return Err(ApiError::NotFound(result.errors.join("; ")));
    }

    Ok(Json(ApiResponse::success(result.into())))
}

/// 书卷列表（按资源分组）
pub async fn list_bible_books(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ListBibleBooksRequest>>,
) -> Result<Json<ApiResponse<Vec<BibleBooksResponse>>>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let groups = state
        .list_bible_books_handler
        .handle(ListBibleBooks {
            resource_id: request.resource_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        groups.into_iter().map(Into::into).collect(),
    )))
}

/// 整卷正文（USJ 或 USFM）
pub async fn get_bible_book_content(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookContentRequest>,
) -> Result<Json<ApiResponse<BookContentResponse>>, ApiError> {
    let format = ContentFormat::from_str(&request.format).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unsupported format '{}', expected 'json' or 'usfm'",
            request.format
        ))
    })?;

    let query = GetBibleBookContent {
        resource_id: request.resource_id,
        book_code: request.book_code,
        format,
    };

    let result = state.get_bible_book_content_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 一章经节及章级导航
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<ChapterContentResponse>>, ApiError> {
    let query = GetChapter {
        resource_id: request.resource_id,
        book_code: request.book_code,
        chapter: request.chapter,
    };

    let result = state.get_chapter_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 单节经文及节级导航
pub async fn get_verse(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerseRequest>,
) -> Result<Json<ApiResponse<VerseContentResponse>>, ApiError> {
    let query = GetVerse {
        resource_id: request.resource_id,
        book_code: request.book_code,
        chapter: request.chapter,
        verse: request.verse,
    };

    let result = state.get_verse_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(result.into())))
}
