//! Navigation Resolver - 读取时计算前后位置
//!
//! 章级导航只看书卷目录；节级导航还要查询经节存储：
//! - previous 在章内按算术退一节，不检查该节是否存在
//! - next 在章内先确认 verse + 1 存在，否则进入下一章第 1 节
//!
//! 目录与经节在同一个只读快照中读取。

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::lookup::resolve_book;
use crate::application::ports::{BookLookupPort, BookRecord, NavigationReadPort, NavigationSnapshot};
use crate::domain::navigation::chapter_navigation;
use crate::domain::{BookCatalog, Navigation, NavigationLink};

pub struct NavigationResolver {
    books: Arc<dyn BookLookupPort>,
    reader: Arc<dyn NavigationReadPort>,
}

impl NavigationResolver {
    pub fn new(books: Arc<dyn BookLookupPort>, reader: Arc<dyn NavigationReadPort>) -> Self {
        Self { books, reader }
    }

    /// 章级导航
    ///
    /// 书卷代码未知时返回 NotFound；书卷不在该资源目录中时不跨书卷。
    pub async fn chapter_navigation(
        &self,
        resource_id: i64,
        book_code: &str,
        chapter: u32,
    ) -> Result<Navigation, ApplicationError> {
        let book = resolve_book(&self.books, book_code).await?;

        let mut snapshot = self.reader.snapshot().await?;
        let catalog = BookCatalog::new(snapshot.list_ordered(resource_id).await?);
        snapshot.finish().await?;

        Ok(chapter_navigation(&catalog, resource_id, &book.code, chapter))
    }

    /// 节级导航
    pub async fn verse_navigation(
        &self,
        resource_id: i64,
        book_code: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<Navigation, ApplicationError> {
        // 快照打开后不再访问连接池，单连接池下不会自锁
        let book = resolve_book(&self.books, book_code).await?;

        let mut snapshot = self.reader.snapshot().await?;
        let catalog = BookCatalog::new(snapshot.list_ordered(resource_id).await?);

        let previous = previous_verse(
            snapshot.as_mut(),
            &catalog,
            resource_id,
            &book,
            chapter,
            verse,
        )
        .await?;
        let next = next_verse(
            snapshot.as_mut(),
            &catalog,
            resource_id,
            &book,
            chapter,
            verse,
        )
        .await?;

        snapshot.finish().await?;

        Ok(Navigation { previous, next })
    }
}

async fn previous_verse(
    snapshot: &mut dyn NavigationSnapshot,
    catalog: &BookCatalog,
    resource_id: i64,
    book: &BookRecord,
    chapter: u32,
    verse: u32,
) -> Result<Option<NavigationLink>, ApplicationError> {
    if verse > 1 {
        return Ok(Some(NavigationLink::verse(
            resource_id,
            book.code.as_str(),
            chapter,
            verse - 1,
        )));
    }

    if chapter > 1 {
        // 上一章无记录时不再继续向前
        let last = snapshot
            .max_verse(resource_id, book.book_id, chapter - 1)
            .await?;
        return Ok(last.map(|v| {
            NavigationLink::verse(resource_id, book.code.as_str(), chapter - 1, v)
        }));
    }

    let Some(prev_book) = catalog.previous_book(&book.code) else {
        return Ok(None);
    };

    let last = snapshot
        .max_verse(resource_id, prev_book.book_id, prev_book.chapter_count)
        .await?;
    Ok(last.map(|v| {
        NavigationLink::verse(
            resource_id,
            prev_book.code.as_str(),
            prev_book.chapter_count,
            v,
        )
    }))
}

async fn next_verse(
    snapshot: &mut dyn NavigationSnapshot,
    catalog: &BookCatalog,
    resource_id: i64,
    book: &BookRecord,
    chapter: u32,
    verse: u32,
) -> Result<Option<NavigationLink>, ApplicationError> {
    if let Some(following) = verse.checked_add(1) {
        if snapshot
            .verse_exists(resource_id, book.book_id, chapter, following)
            .await?
        {
            return Ok(Some(NavigationLink::verse(
                resource_id,
                book.code.as_str(),
                chapter,
                following,
            )));
        }
    }

    if chapter < catalog.chapter_count(&book.code) {
        return Ok(Some(NavigationLink::verse(
            resource_id,
            book.code.as_str(),
            chapter + 1,
            1,
        )));
    }

    Ok(catalog
        .next_book(&book.code)
        .map(|next| NavigationLink::verse(resource_id, next.code.as_str(), 1, 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        BibleRepositoryPort, ContentType, NewBibleBook, ResourceRepositoryPort,
    };
    use crate::domain::scripture::{UsjDocument, Verse};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteBibleRepository, SqliteBookLookup,
        SqliteNavigationReader, SqliteResourceRepository,
    };

    struct Fixture {
        resolver: NavigationResolver,
        resource_id: i64,
    }

    async fn store_book(
        bible: &SqliteBibleRepository,
        resource_id: i64,
        book_id: i64,
        chapters: u32,
        verses: &[(u32, u32)],
    ) {
        let book = NewBibleBook {
            resource_id,
            book_id,
            usfm: String::new(),
            usj: UsjDocument::new(Vec::new()),
            chapters,
        };
        let verses: Vec<Verse> = verses
            .iter()
            .map(|(c, v)| Verse::new(*c, *v, format!("{}:{}", c, v)))
            .collect();
        bible.create_with_verses(&book, &verses).await.unwrap();
    }

    /// GEN 2 章（1:1-3, 2:1-2），EXO 1 章（1:1）
    async fn fixture() -> Fixture {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let resources = SqliteResourceRepository::new(pool.clone());
        let resource = resources
            .create("Test Bible", ContentType::Bible)
            .await
            .unwrap();

        let bible = SqliteBibleRepository::new(pool.clone());
        store_book(
            &bible,
            resource.resource_id,
            1,
            2,
            &[(1, 1), (1, 2), (1, 3), (2, 1), (2, 2)],
        )
        .await;
        store_book(&bible, resource.resource_id, 2, 1, &[(1, 1)]).await;

        let resolver = NavigationResolver::new(
            Arc::new(SqliteBookLookup::new(pool.clone())),
            Arc::new(SqliteNavigationReader::new(pool)),
        );

        Fixture {
            resolver,
            resource_id: resource.resource_id,
        }
    }

    #[tokio::test]
    async fn test_verse_next_crosses_book() {
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "GEN", 2, 2)
            .await
            .unwrap();

        assert_eq!(nav.next, Some(NavigationLink::verse(f.resource_id, "EXO", 1, 1)));
        assert_eq!(nav.previous, Some(NavigationLink::verse(f.resource_id, "GEN", 2, 1)));
    }

    #[tokio::test]
    async fn test_verse_previous_crosses_book_to_max_verse() {
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "exo", 1, 1)
            .await
            .unwrap();

        assert_eq!(
            nav.previous,
            Some(NavigationLink::verse(f.resource_id, "GEN", 2, 2))
        );
        assert_eq!(nav.next, None);
    }

    #[tokio::test]
    async fn test_verse_next_crosses_chapter() {
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "GEN", 1, 3)
            .await
            .unwrap();

        assert_eq!(nav.next, Some(NavigationLink::verse(f.resource_id, "GEN", 2, 1)));
    }

    #[tokio::test]
    async fn test_verse_previous_crosses_chapter_to_max_verse() {
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "GEN", 2, 1)
            .await
            .unwrap();

        assert_eq!(
            nav.previous,
            Some(NavigationLink::verse(f.resource_id, "GEN", 1, 3))
        );
    }

    #[tokio::test]
    async fn test_first_verse_has_no_previous() {
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "GEN", 1, 1)
            .await
            .unwrap();

        assert_eq!(nav.previous, None);
        assert_eq!(nav.next, Some(NavigationLink::verse(f.resource_id, "GEN", 1, 2)));
    }

    #[tokio::test]
    async fn test_previous_verse_is_not_existence_checked() {
        // 已知缺口：章内 previous 只做算术减一
        let f = fixture().await;
        let nav = f
            .resolver
            .verse_navigation(f.resource_id, "GEN", 1, 9)
            .await
            .unwrap();

        assert_eq!(
            nav.previous,
            Some(NavigationLink::verse(f.resource_id, "GEN", 1, 8))
        );
    }

    #[tokio::test]
    async fn test_chapter_navigation() {
        let f = fixture().await;

        let nav = f
            .resolver
            .chapter_navigation(f.resource_id, "GEN", 1)
            .await
            .unwrap();
        assert_eq!(nav.previous, None);
        assert_eq!(nav.next, Some(NavigationLink::chapter(f.resource_id, "GEN", 2)));

        let nav = f
            .resolver
            .chapter_navigation(f.resource_id, "GEN", 2)
            .await
            .unwrap();
        assert_eq!(nav.next, Some(NavigationLink::chapter(f.resource_id, "EXO", 1)));

        let nav = f
            .resolver
            .chapter_navigation(f.resource_id, "EXO", 1)
            .await
            .unwrap();
        assert_eq!(
            nav.previous,
            Some(NavigationLink::chapter(f.resource_id, "GEN", 2))
        );
        assert_eq!(nav.next, None);
    }

    #[tokio::test]
    async fn test_book_outside_catalog_does_not_cross_books() {
        let f = fixture().await;
        let nav = f
            .resolver
            .chapter_navigation(f.resource_id, "LEV", 1)
            .await
            .unwrap();

        assert_eq!(nav, Navigation::default());
    }

    #[tokio::test]
    async fn test_unknown_book_code() {
        let f = fixture().await;
        let err = f
            .resolver
            .chapter_navigation(f.resource_id, "XYZ", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
