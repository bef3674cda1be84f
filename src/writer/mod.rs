//! Local writer: saves a novel's chapters to `{base_dir}/{novel_path}/` for the reading frontend.
//!
//! Which chapters to fetch is decided from the novel's manifest (see [manifest]).
//! The manifest is saved after every chapter, so an aborted run leaves it listing
//! exactly the chapters that reached disk.

pub mod manifest;

use crate::joiner::join_chapter_content;
use crate::model::{ChapterContent, ChapterSummary};
use crate::scraper::{NovelSource, ScraperError};
use manifest::{Manifest, ManifestStore};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from [NovelWriter::write_all].
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Novel not found: {path}")]
    NovelNotFound { path: String },

    #[error("Chapter not found: {chapter} (novel {novel})")]
    ChapterNotFound { novel: String, chapter: String },

    #[error(transparent)]
    Source(#[from] ScraperError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {path} belongs to novel '{found}', not '{expected}'")]
    ManifestMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk format of one chapter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterFormat {
    /// `chapters/{id}.json`: id, title, and the paragraph array.
    #[default]
    Json,
    /// `chapters/{id}.txt`: joined chapter text.
    Text,
}

impl ChapterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChapterFormat::Json => "json",
            ChapterFormat::Text => "txt",
        }
    }
}

/// Options for one save run.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Rewrite every target chapter even if the manifest already records it.
    pub write_all: bool,
    /// Restrict the run to these chapter ids. `None` targets every chapter.
    pub include_chapters: Option<Vec<String>>,
}

/// Outcome of a save run: chapter ids written and skipped, in chapter-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub title: String,
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Serialize)]
struct ChapterFile<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a ChapterContent,
}

pub const CHAPTERS_DIR: &str = "chapters";

/// Map an identifier to a file stem, reversibly: `[A-Za-z0-9_-]` is kept and every other
/// byte becomes `%XX`, so distinct ids never share a file. The empty id maps to `%`.
pub fn encode_file_stem(id: &str) -> String {
    if id.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Writes novels under one base directory.
#[derive(Debug, Clone)]
pub struct NovelWriter {
    base_dir: PathBuf,
    format: ChapterFormat,
}

impl NovelWriter {
    pub fn new(base_dir: impl Into<PathBuf>, format: ChapterFormat) -> Self {
        Self {
            base_dir: base_dir.into(),
            format,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn novel_dir(&self, novel_path: &str) -> PathBuf {
        self.base_dir.join(encode_file_stem(novel_path))
    }

    /// Chapter files live in their own subdirectory so no id can land on the manifest.
    pub fn chapter_file(&self, novel_path: &str, chapter_id: &str) -> PathBuf {
        self.novel_dir(novel_path).join(CHAPTERS_DIR).join(format!(
            "{}.{}",
            encode_file_stem(chapter_id),
            self.format.extension()
        ))
    }

    /// Fetch and write every target chapter of `novel_path` that is not yet on disk.
    ///
    /// `progress` receives `(done, total)` after each target chapter is handled.
    /// The first failure aborts the run; chapters written before it stay recorded.
    pub fn write_all(
        &self,
        source: &mut dyn NovelSource,
        novel_path: &str,
        options: &WriteOptions,
        progress: Option<&dyn Fn(u32, u32)>,
    ) -> Result<WriteSummary, WriteError> {
        let info = source
            .get_novel_info(novel_path)?
            .ok_or_else(|| WriteError::NovelNotFound {
                path: novel_path.to_string(),
            })?;

        let novel_dir = self.novel_dir(&info.path);
        let store = ManifestStore::open(&novel_dir);
        let mut manifest = match store.load()? {
            Some(m) if m.path != info.path => {
                return Err(WriteError::ManifestMismatch {
                    path: store.path().to_path_buf(),
                    expected: info.path.clone(),
                    found: m.path,
                })
            }
            Some(m) => m,
            None => Manifest::new(&info.title, &info.path),
        };

        let targets: Vec<&ChapterSummary> = match &options.include_chapters {
            Some(include) => {
                let wanted: HashSet<&str> = include.iter().map(|s| s.trim()).collect();
                if let Some(missing) = wanted.iter().find(|id| info.chapter(id).is_none()) {
                    return Err(WriteError::ChapterNotFound {
                        novel: info.path.clone(),
                        chapter: missing.to_string(),
                    });
                }
                info.chapters
                    .iter()
                    .filter(|c| wanted.contains(c.id.as_str()))
                    .collect()
            }
            None => info.chapters.iter().collect(),
        };

        let chapters_dir = novel_dir.join(CHAPTERS_DIR);
        std::fs::create_dir_all(&chapters_dir).map_err(|e| WriteError::Io {
            path: chapters_dir.clone(),
            source: e,
        })?;

        let total = targets.len() as u32;
        let mut summary = WriteSummary {
            title: info.title.clone(),
            ..Default::default()
        };
        for (done, chapter) in targets.into_iter().enumerate() {
            let file = self.chapter_file(&info.path, &chapter.id);
            if !options.write_all && manifest.contains(&chapter.id) && file.exists() {
                log::debug!("skip chapter {} (already at {})", chapter.id, file.display());
                summary.skipped.push(chapter.id.clone());
            } else {
                let content = source
                    .get_chapter_content(&info.path, &chapter.id)?
                    .ok_or_else(|| WriteError::ChapterNotFound {
                        novel: info.path.clone(),
                        chapter: chapter.id.clone(),
                    })?;
                self.write_chapter(&file, chapter, &content)?;
                log::debug!("wrote chapter {} to {}", chapter.id, file.display());

                manifest.record(&info, chapter);
                store.save(&mut manifest)?;
                summary.written.push(chapter.id.clone());
            }
            if let Some(p) = progress {
                p(done as u32 + 1, total);
            }
        }

        Ok(summary)
    }

    fn write_chapter(
        &self,
        file: &Path,
        chapter: &ChapterSummary,
        content: &ChapterContent,
    ) -> Result<(), WriteError> {
        let body = match self.format {
            ChapterFormat::Json => {
                let record = ChapterFile {
                    id: &chapter.id,
                    title: &chapter.title,
                    content,
                };
                serde_json::to_string_pretty(&record).map_err(|e| WriteError::Io {
                    path: file.to_path_buf(),
                    source: e.into(),
                })?
            }
            ChapterFormat::Text => join_chapter_content(content),
        };
        std::fs::write(file, body).map_err(|e| WriteError::Io {
            path: file.to_path_buf(),
            source: e,
        })
    }
}
