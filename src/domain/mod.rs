//! Domain Layer - 领域层
//!
//! 包含两个部分:
//! - Scripture Context: USFM/USJ 解析与经节分解
//! - Navigation: 章/节级别的前后导航计算

pub mod navigation;
pub mod scripture;

pub use navigation::{BookCatalog, CatalogBook, Navigation, NavigationLink};
