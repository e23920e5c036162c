//! Bible Query Handlers

use std::sync::Arc;

use serde_json::Value;

use crate::application::error::ApplicationError;
use crate::application::lookup::{ensure_bible_resource, resolve_book};
use crate::application::navigation::NavigationResolver;
use crate::application::ports::{
    BibleBookSummary, BibleRepositoryPort, BookLookupPort, ResourceRepositoryPort, VerseStorePort,
};
use crate::application::queries::{
    ContentFormat, GetBibleBookContent, GetChapter, GetVerse, ListBibleBooks,
};
use crate::domain::Navigation;

// ============================================================================
// Response DTOs
// ============================================================================

/// 按资源分组的书卷列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibleBooksGroup {
    pub resource_id: i64,
    pub books: Vec<BibleBookSummary>,
}

/// 书卷正文
#[derive(Debug, Clone, PartialEq)]
pub enum BookContent {
    Usj(Value),
    Usfm(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BibleBookContentResponse {
    pub resource_id: i64,
    pub bible_book_id: i64,
    pub book_id: i64,
    pub book_code: String,
    pub book_name: String,
    pub chapters: u32,
    pub content: BookContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterVerse {
    pub verse: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterResponse {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verses: Vec<ChapterVerse>,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseResponse {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub navigation: Navigation,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListBibleBooks Handler
pub struct ListBibleBooksHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    bible: Arc<dyn BibleRepositoryPort>,
}

impl ListBibleBooksHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        bible: Arc<dyn BibleRepositoryPort>,
    ) -> Self {
        Self { resources, bible }
    }

    pub async fn handle(&self, query: ListBibleBooks) -> Result<Vec<BibleBooksGroup>, ApplicationError> {
        if let Some(resource_id) = query.resource_id {
            ensure_bible_resource(&self.resources, resource_id).await?;
        }

        let summaries = self.bible.list_summaries(query.resource_id).await?;

        // 已按 (resource_id, book_id) 排序，相邻分组即可
        let mut groups: Vec<BibleBooksGroup> = Vec::new();
        for summary in summaries {
            match groups.last_mut() {
                Some(group) if group.resource_id == summary.resource_id => group.books.push(summary),
                _ => groups.push(BibleBooksGroup {
                    resource_id: summary.resource_id,
                    books: vec![summary],
                }),
            }
        }

        Ok(groups)
    }
}

/// GetBibleBookContent Handler
pub struct GetBibleBookContentHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    books: Arc<dyn BookLookupPort>,
    bible: Arc<dyn BibleRepositoryPort>,
}

impl GetBibleBookContentHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        bible: Arc<dyn BibleRepositoryPort>,
    ) -> Self {
        Self {
            resources,
            books,
            bible,
        }
    }

    pub async fn handle(
        &self,
        query: GetBibleBookContent,
    ) -> Result<BibleBookContentResponse, ApplicationError> {
        ensure_bible_resource(&self.resources, query.resource_id).await?;
        let book = resolve_book(&self.books, &query.book_code).await?;

        let record = self
            .bible
            .find_by_resource_and_book(query.resource_id, book.book_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found(
                    "Bible book",
                    format!("{} in resource {}", book.code, query.resource_id),
                )
            })?;

        let content = match query.format {
            ContentFormat::Json => BookContent::Usj(
                record
                    .usj
                    .to_value()
                    .map_err(|e| ApplicationError::internal(e.to_string()))?,
            ),
            ContentFormat::Usfm => BookContent::Usfm(record.usfm),
        };

        Ok(BibleBookContentResponse {
            resource_id: record.resource_id,
            bible_book_id: record.bible_book_id,
            book_id: book.book_id,
            book_code: book.code,
            book_name: book.name,
            chapters: record.chapters,
            content,
        })
    }
}

/// GetChapter Handler
pub struct GetChapterHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    books: Arc<dyn BookLookupPort>,
    verses: Arc<dyn VerseStorePort>,
    navigation: Arc<NavigationResolver>,
}

impl GetChapterHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        verses: Arc<dyn VerseStorePort>,
        navigation: Arc<NavigationResolver>,
    ) -> Self {
        Self {
            resources,
            books,
            verses,
            navigation,
        }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterResponse, ApplicationError> {
        ensure_bible_resource(&self.resources, query.resource_id).await?;
        let book = resolve_book(&self.books, &query.book_code).await?;

        let records = self
            .verses
            .list_chapter(query.resource_id, book.book_id, query.chapter)
            .await?;
        if records.is_empty() {
            return Err(ApplicationError::not_found(
                "Chapter",
                format!("{} {}", book.code, query.chapter),
            ));
        }

        let navigation = self
            .navigation
            .chapter_navigation(query.resource_id, &book.code, query.chapter)
            .await?;

        Ok(ChapterResponse {
            resource_id: query.resource_id,
            book_code: book.code,
            chapter: query.chapter,
            verses: records
                .into_iter()
                .map(|r| ChapterVerse {
                    verse: r.verse,
                    text: r.text,
                })
                .collect(),
            navigation,
        })
    }
}

/// GetVerse Handler
pub struct GetVerseHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
    books: Arc<dyn BookLookupPort>,
    verses: Arc<dyn VerseStorePort>,
    navigation: Arc<NavigationResolver>,
}

impl GetVerseHandler {
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        verses: Arc<dyn VerseStorePort>,
        navigation: Arc<NavigationResolver>,
    ) -> Self {
        Self {
            resources,
            books,
            verses,
            navigation,
        }
    }

    pub async fn handle(&self, query: GetVerse) -> Result<VerseResponse, ApplicationError> {
        ensure_bible_resource(&self.resources, query.resource_id).await?;
        let book = resolve_book(&self.books, &query.book_code).await?;

        let record = self
            .verses
            .get(query.resource_id, book.book_id, query.chapter, query.verse)
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found(
                    "Verse",
                    format!("{} {}:{}", book.code, query.chapter, query.verse),
                )
            })?;

        let navigation = self
            .navigation
            .verse_navigation(query.resource_id, &book.code, query.chapter, query.verse)
            .await?;

        Ok(VerseResponse {
            resource_id: query.resource_id,
            book_code: book.code,
            chapter: query.chapter,
            verse: query.verse,
            text: record.text,
            navigation,
        })
    }
}
