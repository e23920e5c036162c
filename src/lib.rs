//! ISL Bible Admin - USFM 书卷导入、经节分解与章节导航
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Scripture Context: USFM 解析、USJ 模型、结构节点、经节分解
//! - Navigation: 书卷目录与章级前后导航
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BookLookup, Resource, Bible, VerseStore, IngestLock）
//! - Commands: 书卷上传/更新/删除、资源创建
//! - Queries: 书卷列表、正文、章、节
//! - Navigation: 结合经节存储的章/节导航解析
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: 书卷导入锁
//! - Persistence: SQLite 存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
