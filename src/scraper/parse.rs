//! HTML extraction for the NeoSekai (Madara theme) catalog, novel, and chapter pages.
//!
//! Missing anchors are not errors: the catalog parser returns an empty list and the
//! novel/chapter parsers return `None`. The only error is an invalid built-in selector.

use crate::model::{ChapterContent, ChapterSummary, NovelInfo, NovelSummary};
use crate::scraper::error::ScraperError;
use crate::scraper::strip_title_site_suffix;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const TITLE_SUFFIXES: &[&str] = &[
    " - NeoSekai Translations",
    " | NeoSekai Translations",
    " – NeoSekai Translations",
];

fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Collapse runs of whitespace into single spaces and trim.
fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

/// Text of the element's direct text children only (skips badges like `<span>HOT</span>`).
fn own_text(el: ElementRef<'_>) -> String {
    let own: String = el
        .children()
        .filter_map(|n| n.value().as_text().map(|t| String::from(&**t)))
        .collect();
    normalize_text(&own)
}

/// Text nodes under `el`, skipping anything inside `script`, `style` or `noscript`.
fn visible_text(el: ElementRef<'_>) -> Vec<&str> {
    el.descendants()
        .filter_map(|n| {
            let text = n.value().as_text()?;
            let hidden = n
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| matches!(a.value().name(), "script" | "style" | "noscript"));
            (!hidden).then_some(&**text)
        })
        .collect()
}

/// Non-empty path segments of an absolute or site-relative href.
fn path_segments(href: &str) -> Vec<String> {
    let url = Url::parse(href)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(href)));
    match url {
        Ok(u) => u
            .path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Novel slug from a novel link: the segment after `/novel/`, or the last segment.
pub fn novel_path_from_href(href: &str) -> Option<String> {
    let segs = path_segments(href);
    if let Some(pos) = segs.iter().position(|s| s == "novel") {
        return segs.get(pos + 1).cloned();
    }
    segs.last().cloned()
}

/// Chapter id from a chapter link: the last non-empty path segment.
pub fn chapter_id_from_href(href: &str) -> Option<String> {
    path_segments(href).pop()
}

/// Extract catalog cards in document order. Cards without a resolvable path are skipped
/// and duplicate paths keep the first occurrence.
pub fn parse_novel_list(html: &str) -> Result<Vec<NovelSummary>, ScraperError> {
    let doc = Html::parse_document(html);
    let card_sel = parse_selector("div.page-item-detail")?;
    let title_link_sel = parse_selector(".post-title a")?;
    let thumb_link_sel = parse_selector(".item-thumb a")?;
    let img_sel = parse_selector("img")?;

    let mut seen = HashSet::new();
    let mut novels = Vec::new();
    for card in doc.select(&card_sel) {
        let title_link = card.select(&title_link_sel).next();
        let thumb_link = card.select(&thumb_link_sel).next();

        let href = title_link
            .or(thumb_link)
            .and_then(|a| a.value().attr("href"));
        let Some(path) = href.and_then(novel_path_from_href) else {
            continue;
        };
        if !seen.insert(path.clone()) {
            continue;
        }

        let title = title_link
            .map(element_text)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                thumb_link
                    .and_then(|a| a.value().attr("title"))
                    .map(normalize_text)
            })
            .unwrap_or_else(|| path.clone());

        let thumb = card
            .select(&img_sel)
            .next()
            .and_then(|img| {
                let attrs = img.value();
                attrs
                    .attr("data-src")
                    .or_else(|| attrs.attr("data-lazy-src"))
                    .or_else(|| attrs.attr("src"))
            })
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        novels.push(NovelSummary { title, path, thumb });
    }
    Ok(novels)
}

/// Extract title and chapter list from a novel detail page.
///
/// `None` when the page has neither a title nor a chapter list (not a novel page).
/// A novel that exists but lists no chapters yields `Some` with an empty list.
pub fn parse_novel_info(path: &str, html: &str) -> Result<Option<NovelInfo>, ScraperError> {
    let doc = Html::parse_document(html);
    let h1_sel = parse_selector(".post-title h1")?;
    let og_title_sel = parse_selector("meta[property=\"og:title\"]")?;
    let list_sel = parse_selector("ul.version-chap, div.listing-chapters_wrap")?;
    let chapter_sel = parse_selector("li.wp-manga-chapter > a")?;

    let title = doc
        .select(&h1_sel)
        .next()
        .map(|h1| {
            let own = own_text(h1);
            if own.is_empty() {
                element_text(h1)
            } else {
                own
            }
        })
        .filter(|s| !s.is_empty())
        .or_else(|| {
            doc.select(&og_title_sel)
                .next()
                .and_then(|m| m.value().attr("content"))
                .map(|s| strip_title_site_suffix(s, TITLE_SUFFIXES))
                .filter(|s| !s.is_empty())
        });
    let has_list = doc.select(&list_sel).next().is_some();

    let chapters_iter = doc.select(&chapter_sel);
    let mut seen = HashSet::new();
    let mut chapters = Vec::new();
    for a in chapters_iter {
        let Some(id) = a.value().attr("href").and_then(chapter_id_from_href) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        let title = Some(element_text(a))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());
        chapters.push(ChapterSummary { title, id });
    }

    if title.is_none() && !has_list && chapters.is_empty() {
        return Ok(None);
    }

    Ok(Some(NovelInfo {
        title: title.unwrap_or_else(|| path.to_string()),
        path: path.to_string(),
        chapters,
    }))
}

/// Extract paragraph text from the reader container, dropping markup and empty paragraphs.
///
/// `None` when the reader container is absent.
pub fn parse_chapter_content(html: &str) -> Result<Option<ChapterContent>, ScraperError> {
    let doc = Html::parse_document(html);
    let container_sel = parse_selector("div.reading-content, div.text-left")?;
    let p_sel = parse_selector("p")?;

    let Some(container) = doc.select(&container_sel).next() else {
        return Ok(None);
    };

    let mut paragraphs: Vec<String> = container
        .select(&p_sel)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();

    // Some chapters are posted as bare text with <br> breaks instead of paragraphs.
    if paragraphs.is_empty() {
        paragraphs = visible_text(container)
            .into_iter()
            .flat_map(|t| t.lines())
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .collect();
    }

    Ok(Some(ChapterContent::new(paragraphs)))
}
