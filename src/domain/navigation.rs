//! Navigation - 章/节导航
//!
//! 位置空间为 (书卷序号, 章, 节?)。章级导航只依赖书卷目录，
//! 节级导航还需要查询经节存储，见 `application::navigation`。

/// 目录中的书卷（某资源下实际存在的书卷）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBook {
    pub book_id: i64,
    pub code: String,
    /// 该资源中此书卷实际存在的章数
    pub chapter_count: u32,
}

/// 按正典顺序（book_id 升序）排列的书卷目录
#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: Vec<CatalogBook>,
}

impl BookCatalog {
    pub fn new(mut books: Vec<CatalogBook>) -> Self {
        books.sort_by_key(|b| b.book_id);
        Self { books }
    }

    pub fn books(&self) -> &[CatalogBook] {
        &self.books
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// 书卷在目录中的位置（代码不区分大小写）
    pub fn position(&self, code: &str) -> Option<usize> {
        self.books
            .iter()
            .position(|b| b.code.eq_ignore_ascii_case(code))
    }

    pub fn find(&self, code: &str) -> Option<&CatalogBook> {
        self.position(code).map(|idx| &self.books[idx])
    }

    /// 不在目录中的书卷视为 0 章
    pub fn chapter_count(&self, code: &str) -> u32 {
        self.find(code).map(|b| b.chapter_count).unwrap_or(0)
    }

    /// 前一卷书；书卷不在目录中时为 None
    pub fn previous_book(&self, code: &str) -> Option<&CatalogBook> {
        let idx = self.position(code)?;
        idx.checked_sub(1).and_then(|prev| self.books.get(prev))
    }

    /// 后一卷书；书卷不在目录中时为 None
    pub fn next_book(&self, code: &str) -> Option<&CatalogBook> {
        let idx = self.position(code)?;
        self.books.get(idx + 1)
    }
}

/// 导航目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    pub resource_id: i64,
    pub book_code: String,
    pub chapter: u32,
    /// 章级导航时为 None
    pub verse: Option<u32>,
}

impl NavigationLink {
    pub fn chapter(resource_id: i64, book_code: impl Into<String>, chapter: u32) -> Self {
        Self {
            resource_id,
            book_code: book_code.into(),
            chapter,
            verse: None,
        }
    }

    pub fn verse(resource_id: i64, book_code: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            resource_id,
            book_code: book_code.into(),
            chapter,
            verse: Some(verse),
        }
    }
}

/// 前/后导航结果，缺失表示已到边界（不是错误）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub previous: Option<NavigationLink>,
    pub next: Option<NavigationLink>,
}

/// 章级 previous
///
/// chapter > 1 时退一章；否则跳到前一卷书的最后一章。
pub fn previous_chapter(
    catalog: &BookCatalog,
    resource_id: i64,
    book_code: &str,
    chapter: u32,
) -> Option<NavigationLink> {
    if chapter > 1 {
        return Some(NavigationLink::chapter(resource_id, book_code, chapter - 1));
    }

    catalog
        .previous_book(book_code)
        .map(|prev| NavigationLink::chapter(resource_id, prev.code.as_str(), prev.chapter_count))
}

/// 章级 next
///
/// 未到本书最后一章时进一章；否则跳到后一卷书的第 1 章。
pub fn next_chapter(
    catalog: &BookCatalog,
    resource_id: i64,
    book_code: &str,
    chapter: u32,
) -> Option<NavigationLink> {
    if chapter < catalog.chapter_count(book_code) {
        return Some(NavigationLink::chapter(resource_id, book_code, chapter + 1));
    }

    catalog
        .next_book(book_code)
        .map(|next| NavigationLink::chapter(resource_id, next.code.as_str(), 1))
}

/// 章级导航
pub fn chapter_navigation(
    catalog: &BookCatalog,
    resource_id: i64,
    book_code: &str,
    chapter: u32,
) -> Navigation {
    Navigation {
        previous: previous_chapter(catalog, resource_id, book_code, chapter),
        next: next_chapter(catalog, resource_id, book_code, chapter),
    }
}
