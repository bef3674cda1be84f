//! sekaiscrape: list, read, and save novels from NeoSekai Translations.

pub mod cli;
pub mod config;
pub mod joiner;
pub mod model;
pub mod scraper;
pub mod writer;

// Re-exports for CLI and consumers.
pub use joiner::{join_chapter_content, PARAGRAPH_SEPARATOR};
pub use model::{ChapterContent, ChapterSummary, NovelInfo, NovelSummary};
pub use crate::scraper::{
    open_source, parse_service, FetchClient, FetchClientBuilder, NovelSource, ScraperError,
    Service,
};
pub use writer::{ChapterFormat, NovelWriter, WriteError, WriteOptions, WriteSummary};
