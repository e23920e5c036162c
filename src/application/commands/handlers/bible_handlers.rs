//! Bible Command Handlers

use std::collections::HashSet;
use std::sync::Arc;

use super::ingestion::{prepare_book, UploadPolicy};
use crate::application::commands::{DeleteBibleBooks, UpdateBibleBook, UploadBibleBook};
use crate::application::error::ApplicationError;
use crate::application::lookup::{ensure_bible_resource, resolve_book};
use crate::application::ports::{
    BibleRepositoryPort, BookLookupPort, IngestLockPort, NewBibleBook, ResourceRepositoryPort,
};

/// 上传/更新响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestBibleBookResponse {
    pub bible_book_id: i64,
    pub book_code: String,
    pub chapters: u32,
    pub verse_count: usize,
}

// ============================================================================
// UploadBibleBook
// ============================================================================

/// UploadBibleBook Handler
pub struct UploadBibleBookHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    books: Arc<dyn BookLookupPort>,
    bible: Arc<dyn BibleRepositoryPort>,
    locks: Arc<dyn IngestLockPort>,
    policy: UploadPolicy,
}

impl UploadBibleBookHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        bible: Arc<dyn BibleRepositoryPort>,
        locks: Arc<dyn IngestLockPort>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            resources,
            books,
            bible,
            locks,
            policy,
        }
    }

    pub async fn handle(
        &self,
        command: UploadBibleBook,
    ) -> Result<IngestBibleBookResponse, ApplicationError> {
        let usfm = self.policy.validate(&command.filename, &command.content)?;
        let prepared = prepare_book(&usfm)?;

        ensure_bible_resource(&self.resources, command.resource_id).await?;

        let book = resolve_book(&self.books, &prepared.code).await?;

        let _guard = self.locks.acquire(command.resource_id, book.book_id).await;

        if self
            .bible
            .find_by_resource_and_book(command.resource_id, book.book_id)
            .await?
            .is_some()
        {
            return Err(ApplicationError::conflict(format!(
                "Book {} already exists for resource {}",
                book.code, command.resource_id
            )));
        }

        if prepared.chapters > book.max_chapter {
            return Err(ApplicationError::validation(format!(
                "Invalid chapter count {} for book {}. Max allowed: {}",
                prepared.chapters, book.code, book.max_chapter
            )));
        }

        let new_book = NewBibleBook {
            resource_id: command.resource_id,
            book_id: book.book_id,
            usfm,
            usj: prepared.usj,
            chapters: prepared.chapters,
        };
        let record = self
            .bible
            .create_with_verses(&new_book, &prepared.verses)
            .await?;

        tracing::info!(
            resource_id = command.resource_id,
            bible_book_id = record.bible_book_id,
            book_code = %book.code,
            chapters = prepared.chapters,
            verses = prepared.verses.len(),
            "Bible book uploaded"
        );

        Ok(IngestBibleBookResponse {
            bible_book_id: record.bible_book_id,
            book_code: book.code,
            chapters: prepared.chapters,
            verse_count: prepared.verses.len(),
        })
    }
}

// ============================================================================
// UpdateBibleBook
// ============================================================================

/// UpdateBibleBook Handler
pub struct UpdateBibleBookHandler {
    books: Arc<dyn BookLookupPort>,
    bible: Arc<dyn BibleRepositoryPort>,
    locks: Arc<dyn IngestLockPort>,
    policy: UploadPolicy,
}

impl UpdateBibleBookHandler {
    pub fn new(
        books: Arc<dyn BookLookupPort>,
        bible: Arc<dyn BibleRepositoryPort>,
        locks: Arc<dyn IngestLockPort>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            books,
            bible,
            locks,
            policy,
        }
    }

    pub async fn handle(
        &self,
        command: UpdateBibleBook,
    ) -> Result<IngestBibleBookResponse, ApplicationError> {
        let existing = self
            .bible
            .find_by_id(command.bible_book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Bible book", command.bible_book_id))?;

        let usfm = self.policy.validate(&command.filename, &command.content)?;
        let prepared = prepare_book(&usfm)?;

        let book = self
            .books
            .find_by_id(existing.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", existing.book_id))?;

        if !book.code.eq_ignore_ascii_case(&prepared.code) {
            return Err(ApplicationError::validation(format!(
                "Book code mismatch: {} != {}",
                prepared.code, book.code
            )));
        }

        if prepared.chapters > book.max_chapter {
            return Err(ApplicationError::validation(format!(
                "Invalid chapter count {} for book {}. Max allowed: {}",
                prepared.chapters, book.code, book.max_chapter
            )));
        }

        let _guard = self.locks.acquire(existing.resource_id, book.book_id).await;

        let new_book = NewBibleBook {
            resource_id: existing.resource_id,
            book_id: book.book_id,
            usfm,
            usj: prepared.usj,
            chapters: prepared.chapters,
        };
        let record = self
            .bible
            .update_with_verses(command.bible_book_id, &new_book, &prepared.verses)
            .await?;

        tracing::info!(
            resource_id = record.resource_id,
            bible_book_id = record.bible_book_id,
            book_code = %book.code,
            chapters = prepared.chapters,
            verses = prepared.verses.len(),
            "Bible book updated"
        );

        Ok(IngestBibleBookResponse {
            bible_book_id: record.bible_book_id,
            book_code: book.code,
            chapters: prepared.chapters,
            verse_count: prepared.verses.len(),
        })
    }
}

// ============================================================================
// DeleteBibleBooks
// ============================================================================

/// 批量删除结果，逐个书卷报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBibleBooksResponse {
    pub deleted: Vec<String>,
    pub errors: Vec<String>,
}

impl DeleteBibleBooksResponse {
    pub fn all_failed(&self) -> bool {
        self.deleted.is_empty() && !self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn message(&self) -> String {
        if self.deleted.is_empty() {
            "No books were deleted".to_string()
        } else {
            format!("Successfully deleted {} book(s)", self.deleted.len())
        }
    }
}

/// DeleteBibleBooks Handler
pub struct DeleteBibleBooksHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    books: Arc<dyn BookLookupPort>,
    bible: Arc<dyn BibleRepositoryPort>,
    locks: Arc<dyn IngestLockPort>,
}

impl DeleteBibleBooksHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        bible: Arc<dyn BibleRepositoryPort>,
        locks: Arc<dyn IngestLockPort>,
    ) -> Self {
        Self {
            resources,
            books,
            bible,
            locks,
        }
    }

    pub async fn handle(
        &self,
        command: DeleteBibleBooks,
    ) -> Result<DeleteBibleBooksResponse, ApplicationError> {
        if command.book_codes.is_empty() {
            return Err(ApplicationError::validation("No book codes given"));
        }

        ensure_bible_resource(&self.resources, command.resource_id).await?;

        let mut response = DeleteBibleBooksResponse::default();
        let mut processed = HashSet::new();

        for code in &command.book_codes {
            if !processed.insert(code.to_ascii_lowercase()) {
                response.errors.push(format!("Duplicate book code: {}", code));
                continue;
            }

            // 单个书卷的存储错误记入 errors，其余书卷继续处理
            let book = match self.books.resolve(code).await {
                Ok(Some(book)) => book,
                Ok(None) => {
                    response
                        .errors
                        .push(format!("Book code '{}' not found in lookup", code));
                    continue;
                }
                Err(e) => {
                    tracing::warn!(code = %code, error = %e, "Book lookup failed during delete");
                    response
                        .errors
                        .push(format!("Failed to delete book '{}': {}", code, e));
                    continue;
                }
            };

            let _guard = self.locks.acquire(command.resource_id, book.book_id).await;
            match self
                .bible
                .delete_with_verses(command.resource_id, book.book_id)
                .await
            {
                Ok(true) => response.deleted.push(code.clone()),
                Ok(false) => response.errors.push(format!(
                    "Book '{}' not found for resource {}",
                    code, command.resource_id
                )),
                Err(e) => {
                    tracing::warn!(
                        resource_id = command.resource_id,
                        code = %code,
                        error = %e,
                        "Bible book delete failed"
                    );
                    response
                        .errors
                        .push(format!("Failed to delete book '{}': {}", code, e));
                }
            }
        }

        tracing::info!(
            resource_id = command.resource_id,
            deleted = response.deleted.len(),
            errors = response.errors.len(),
            "Bible books deleted"
        );

        Ok(response)
    }
}
