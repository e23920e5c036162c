//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateResourceHandler, DeleteBibleBooksHandler, UpdateBibleBookHandler,
    UploadBibleBookHandler, UploadPolicy,
    // Query handlers
    GetBibleBookContentHandler, GetChapterHandler, GetVerseHandler, ListBibleBooksHandler,
    ListResourcesHandler, NavigationResolver,
    // Ports
    BibleRepositoryPort, BookLookupPort, IngestLockPort, NavigationReadPort, ResourceRepositoryPort,
    VerseStorePort,
};

/// 应用状态
pub struct AppState {
    /// 上传限制，同时决定 HTTP 请求体上限
    pub upload_policy: UploadPolicy,

    // ========== Command Handlers ==========
    pub create_resource_handler: CreateResourceHandler,
    pub upload_bible_book_handler: UploadBibleBookHandler,
    pub update_bible_book_handler: UpdateBibleBookHandler,
    pub delete_bible_books_handler: DeleteBibleBooksHandler,

    // ========== Query Handlers ==========
    pub list_resources_handler: ListResourcesHandler,
    pub list_bible_books_handler: ListBibleBooksHandler,
    pub get_bible_book_content_handler: GetBibleBookContentHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub get_verse_handler: GetVerseHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        resources: Arc<dyn ResourceRepositoryPort>,
        books: Arc<dyn BookLookupPort>,
        bible: Arc<dyn BibleRepositoryPort>,
        verses: Arc<dyn VerseStorePort>,
        navigation_reader: Arc<dyn NavigationReadPort>,
        locks: Arc<dyn IngestLockPort>,
        upload_policy: UploadPolicy,
    ) -> Self {
        let navigation = Arc::new(NavigationResolver::new(books.clone(), navigation_reader));

        Self {
            upload_policy: upload_policy.clone(),

            // Command handlers
            create_resource_handler: CreateResourceHandler::new(resources.clone()),
            upload_bible_book_handler: UploadBibleBookHandler::new(
                resources.clone(),
                books.clone(),
                bible.clone(),
                locks.clone(),
                upload_policy.clone(),
            ),
            update_bible_book_handler: UpdateBibleBookHandler::new(
                books.clone(),
                bible.clone(),
                locks.clone(),
                upload_policy,
            ),
            delete_bible_books_handler: DeleteBibleBooksHandler::new(
                resources.clone(),
                books.clone(),
                bible.clone(),
                locks,
            ),

            // Query handlers
            list_resources_handler: ListResourcesHandler::new(resources.clone()),
            list_bible_books_handler: ListBibleBooksHandler::new(resources.clone(), bible.clone()),
            get_bible_book_content_handler: GetBibleBookContentHandler::new(
                resources.clone(),
                books.clone(),
                bible,
            ),
            get_chapter_handler: GetChapterHandler::new(
                resources.clone(),
                books.clone(),
                verses.clone(),
                navigation.clone(),
            ),
            get_verse_handler: GetVerseHandler::new(resources, books, verses, navigation),
        }
    }
}
