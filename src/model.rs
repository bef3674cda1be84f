//! Data model for scraped novels.
//!
//! The scraper produces these shapes; the CLI prints them and the writer persists them.

use serde::{Deserialize, Serialize};

/// One card from the service's novel catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelSummary {
    pub title: String,
    /// URL slug identifying the novel, e.g. `the-villainess-is-retiring`.
    pub path: String,
    /// Thumbnail image URL. Empty when the card has no image.
    pub thumb: String,
}

/// Novel metadata and its chapter list, in the order the detail page lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelInfo {
    pub title: String,
    pub path: String,
    pub chapters: Vec<ChapterSummary>,
}

impl NovelInfo {
    pub fn chapter(&self, id: &str) -> Option<&ChapterSummary> {
        self.chapters.iter().find(|c| c.id == id)
    }
}

/// One entry of a novel's chapter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub title: String,
    /// Service-assigned id, unique within the novel. Used to fetch the chapter page.
    pub id: String,
}

/// Body text of one chapter as paragraphs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterContent {
    paragraphs: Vec<String>,
}

impl ChapterContent {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.paragraphs.iter()
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl From<Vec<String>> for ChapterContent {
    fn from(paragraphs: Vec<String>) -> Self {
        Self::new(paragraphs)
    }
}

impl<'a> IntoIterator for &'a ChapterContent {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paragraphs.iter()
    }
}
