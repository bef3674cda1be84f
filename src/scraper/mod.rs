//! Novel sources and scraping. Source trait, service selection, shared client, and the NeoSekai adapter.

mod client;
mod error;

pub mod neosekai;
pub mod parse;

pub use client::{FetchClient, FetchClientBuilder};
pub use error::ScraperError;

use crate::model::{ChapterContent, NovelInfo, NovelSummary};

/// Strip known site suffix from the end of a page title (e.g. " - NeoSekai Translations")
/// so that titles containing " - " or " | " in the actual title are preserved.
pub fn strip_title_site_suffix(s: &str, suffixes: &[&str]) -> String {
    let mut t = s.trim();
    for suffix in suffixes {
        if t.ends_with(suffix) {
            t = t[..t.len() - suffix.len()].trim();
            break;
        }
    }
    t.to_string()
}

/// Supported novel service. Used for dispatch from the CLI `service` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    NeoSekai,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Service::NeoSekai => "neosekai",
        }
    }
}

/// Resolve a service name as typed on the command line. Case-insensitive.
pub fn parse_service(s: &str) -> Result<Service, String> {
    match s.trim().to_lowercase().as_str() {
        "neosekai" | "ns" => Ok(Service::NeoSekai),
        _ => Err(format!("Invalid service: '{}'. Supported: neosekai.", s)),
    }
}

/// Capability interface for a novel service.
///
/// Lookups return `Ok(None)` when the service has no such novel or chapter; `Err` is
/// reserved for transport failures and non-404 HTTP errors.
pub trait NovelSource {
    /// Catalog of novels, in the service's listing order.
    fn get_novel_list(&mut self) -> Result<Vec<NovelSummary>, ScraperError>;

    /// Metadata and chapter list for the novel identified by `novel_path`.
    fn get_novel_info(&mut self, novel_path: &str) -> Result<Option<NovelInfo>, ScraperError>;

    /// Paragraphs of one chapter.
    fn get_chapter_content(
        &mut self,
        novel_path: &str,
        chapter_id: &str,
    ) -> Result<Option<ChapterContent>, ScraperError>;
}

/// Build the source for `service`. `base_url` overrides the service's default origin.
pub fn open_source<'a>(
    service: Service,
    client: &'a FetchClient,
    base_url: Option<&str>,
) -> Result<Box<dyn NovelSource + 'a>, ScraperError> {
    match service {
        Service::NeoSekai => {
            let adapter = match base_url {
                Some(base) => neosekai::NeoSekaiScraper::with_base_url(client, base)?,
                None => neosekai::NeoSekaiScraper::new(client),
            };
            Ok(Box::new(adapter))
        }
    }
}

/// Ensure an identifier is usable as exactly one URL path segment.
pub(crate) fn validate_segment(kind: &'static str, value: &str) -> Result<(), ScraperError> {
    let v = value.trim();
    let bad = v.is_empty()
        || v == "."
        || v == ".."
        || v.contains(['/', '\\', '?', '#'])
        || v.chars().any(char::is_whitespace);
    if bad {
        return Err(ScraperError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}
