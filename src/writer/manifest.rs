//! Per-novel manifest: which chapters have been written to the novel directory.
//!
//! One `manifest.json` per novel directory. [ManifestStore] owns access to it for one
//! invocation; each load or save opens the file only for that operation. Saves go
//! through a temp file and rename so a crash never leaves a half-written manifest.

use crate::model::{ChapterSummary, NovelInfo};
use crate::writer::WriteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Persisted record of one novel and its written chapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,
    pub path: String,
    /// Written chapters, in the novel's chapter-list order.
    pub chapters: Vec<ChapterSummary>,
    /// Seconds since the Unix epoch of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl Manifest {
    pub fn new(title: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            path: path.to_string(),
            chapters: Vec::new(),
            updated_at: None,
        }
    }

    pub fn contains(&self, chapter_id: &str) -> bool {
        self.chapters.iter().any(|c| c.id == chapter_id)
    }

    pub fn chapter_ids(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.id.as_str()).collect()
    }

    /// Record `chapter` as written and refresh metadata from `info`.
    ///
    /// Chapters are kept in `info`'s order; recorded ids no longer listed by the
    /// service keep their relative order after the listed ones.
    pub fn record(&mut self, info: &NovelInfo, chapter: &ChapterSummary) {
        self.title = info.title.clone();
        self.path = info.path.clone();
        match self.chapters.iter_mut().find(|c| c.id == chapter.id) {
            Some(existing) => existing.title = chapter.title.clone(),
            None => self.chapters.push(chapter.clone()),
        }
        let positions: HashMap<&str, usize> = info
            .chapters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();
        // Stable sort keeps unlisted ids in their previous relative order.
        self.chapters
            .sort_by_key(|c| positions.get(c.id.as_str()).copied().unwrap_or(usize::MAX));
    }
}

/// Repository object owning one novel directory's manifest file.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Manifest store for `novel_dir`. The directory is not created until [ManifestStore::save].
    pub fn open(novel_dir: &Path) -> Self {
        Self {
            path: novel_dir.join(MANIFEST_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest, or `None` when it does not exist yet.
    pub fn load(&self) -> Result<Option<Manifest>, WriteError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(WriteError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let manifest: Manifest =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| WriteError::Manifest {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(Some(manifest))
    }

    /// Persist `manifest`, stamping `updated_at`.
    pub fn save(&self, manifest: &mut Manifest) -> Result<(), WriteError> {
        manifest.updated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| WriteError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| WriteError::Io {
            path: tmp.clone(),
            source,
        };
        {
            let file = File::create(&tmp).map_err(io_err)?;
            let mut w = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut w, manifest).map_err(|e| WriteError::Manifest {
                path: tmp.clone(),
                source: e,
            })?;
            w.flush().map_err(io_err)?;
        }
        std::fs::rename(&tmp, &self.path).map_err(|e| WriteError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        log::debug!(
            "saved manifest {} ({} chapters)",
            self.path.display(),
            manifest.chapters.len()
        );
        Ok(())
    }
}
