//! NeoSekai Translations adapter. One GET per call against the catalog, novel, or chapter page.
//!
//! URL layout: `{base}/novel/` (catalog), `{base}/novel/{path}/` (novel),
//! `{base}/novel/{path}/{chapter}/` (chapter).

use crate::model::{ChapterContent, NovelInfo, NovelSummary};
use crate::scraper::error::ScraperError;
use crate::scraper::{parse, validate_segment, FetchClient, NovelSource};
use reqwest::Url;

pub const NEOSEKAI_BASE: &str = "https://www.neosekaitranslations.com";

/// NeoSekai scraper. Holds a reference to the shared fetch client.
pub struct NeoSekaiScraper<'a> {
    client: &'a FetchClient,
    base: String,
}

impl<'a> NeoSekaiScraper<'a> {
    pub fn new(client: &'a FetchClient) -> Self {
        Self {
            client,
            base: NEOSEKAI_BASE.to_string(),
        }
    }

    /// Use a different origin (mirror or local test server). Must be an absolute http(s) URL.
    pub fn with_base_url(client: &'a FetchClient, base: &str) -> Result<Self, ScraperError> {
        let parsed = Url::parse(base).map_err(|e| ScraperError::InvalidBaseUrl {
            input: base.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidBaseUrl {
                input: base.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/novel/", self.base)
    }

    pub fn novel_url(&self, novel_path: &str) -> String {
        format!("{}/novel/{}/", self.base, novel_path.trim())
    }

    pub fn chapter_url(&self, novel_path: &str, chapter_id: &str) -> String {
        format!(
            "{}/novel/{}/{}/",
            self.base,
            novel_path.trim(),
            chapter_id.trim()
        )
    }

    /// Fetch a page, treating HTTP 404 as absent.
    fn fetch_optional(&self, url: &str) -> Result<Option<String>, ScraperError> {
        match self.client.fetch(url) {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl NovelSource for NeoSekaiScraper<'_> {
    fn get_novel_list(&mut self) -> Result<Vec<NovelSummary>, ScraperError> {
        let html = self.client.fetch(&self.catalog_url())?;
        let novels = parse::parse_novel_list(&html)?;
        if novels.is_empty() {
            log::warn!("catalog page at {} listed no novels", self.catalog_url());
        }
        Ok(novels)
    }

    fn get_novel_info(&mut self, novel_path: &str) -> Result<Option<NovelInfo>, ScraperError> {
        validate_segment("novel path", novel_path)?;
        let url = self.novel_url(novel_path);
        let Some(html) = self.fetch_optional(&url)? else {
            return Ok(None);
        };
        let info = parse::parse_novel_info(novel_path.trim(), &html)?;
        if info.is_none() {
            log::debug!("no novel title or chapter list at {}", url);
        }
        Ok(info)
    }

    fn get_chapter_content(
        &mut self,
        novel_path: &str,
        chapter_id: &str,
    ) -> Result<Option<ChapterContent>, ScraperError> {
        validate_segment("novel path", novel_path)?;
        validate_segment("chapter id", chapter_id)?;
        let url = self.chapter_url(novel_path, chapter_id);
        let Some(html) = self.fetch_optional(&url)? else {
            return Ok(None);
        };
        let content = parse::parse_chapter_content(&html)?;
        if content.is_none() {
            log::debug!("no reader container at {}", url);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FetchClient {
        FetchClient::builder()
            .timeout_secs(2)
            .build()
            .expect("client builds")
    }

    #[test]
    fn default_urls() {
        let c = client();
        let s = NeoSekaiScraper::new(&c);
        assert_eq!(s.catalog_url(), "https://www.neosekaitranslations.com/novel/");
        assert_eq!(
            s.novel_url("otome-game-mob"),
            "https://www.neosekaitranslations.com/novel/otome-game-mob/"
        );
        assert_eq!(
            s.chapter_url("otome-game-mob", "chapter-1"),
            "https://www.neosekaitranslations.com/novel/otome-game-mob/chapter-1/"
        );
    }

    #[test]
    fn custom_base_trims_trailing_slash() -> Result<(), ScraperError> {
        let c = client();
        let s = NeoSekaiScraper::with_base_url(&c, "http://127.0.0.1:8080/")?;
        assert_eq!(s.catalog_url(), "http://127.0.0.1:8080/novel/");
        Ok(())
    }

    #[test]
    fn custom_base_rejects_non_http_scheme() {
        let c = client();
        assert!(matches!(
            NeoSekaiScraper::with_base_url(&c, "ftp://example.com"),
            Err(ScraperError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn invalid_identifiers_fail_before_fetching() {
        let c = client();
        let mut s = NeoSekaiScraper::new(&c);
        assert!(matches!(
            s.get_novel_info("../etc"),
            Err(ScraperError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            s.get_chapter_content("novel", "a/b"),
            Err(ScraperError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn http_404_means_absent() -> Result<(), ScraperError> {
        let (base, server) =
            crate::scraper::test_server::serve(vec!["404 Not Found", "404 Not Found"]);
        let c = client();
        let mut s = NeoSekaiScraper::with_base_url(&c, &base)?;
        assert!(s.get_novel_info("gone-novel")?.is_none());
        assert!(s.get_chapter_content("gone-novel", "chapter-1")?.is_none());
        let requests = server.join().expect("server thread");
        assert_eq!(
            requests,
            [
                "GET /novel/gone-novel/ HTTP/1.1",
                "GET /novel/gone-novel/chapter-1/ HTTP/1.1"
            ]
        );
        Ok(())
    }

    #[test]
    fn http_500_is_an_error_not_absence() {
        let (base, server) = crate::scraper::test_server::serve(vec!["500 Internal Server Error"]);
        let c = client();
        let mut s = NeoSekaiScraper::with_base_url(&c, &base).expect("valid base");
        let result = s.get_novel_info("some-novel");
        server.join().expect("server thread");
        assert!(matches!(
            result,
            Err(ScraperError::HttpStatus { status: 500, .. })
        ));
    }
}
