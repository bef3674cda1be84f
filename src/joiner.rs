//! Flatten chapter paragraphs into display text.

use crate::model::ChapterContent;

/// Blank line between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Join paragraphs with [PARAGRAPH_SEPARATOR]. An empty chapter yields an empty string.
pub fn join_chapter_content(content: &ChapterContent) -> String {
    content.paragraphs().join(PARAGRAPH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(ps: &[&str]) -> ChapterContent {
        ChapterContent::new(ps.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_is_empty_string() {
        assert_eq!(join_chapter_content(&ChapterContent::default()), "");
    }

    #[test]
    fn single_paragraph_has_no_separator() {
        assert_eq!(join_chapter_content(&content(&["only"])), "only");
    }

    #[test]
    fn blank_line_between_paragraphs() {
        assert_eq!(join_chapter_content(&content(&["a", "b"])), "a\n\nb");
    }

    #[test]
    fn splitting_recovers_paragraphs() {
        let paragraphs = ["He opened the door.", "\"Who's there?\"", "Silence."];
        let joined = join_chapter_content(&content(&paragraphs));
        let split: Vec<&str> = joined.split(PARAGRAPH_SEPARATOR).collect();
        assert_eq!(split, paragraphs);
    }
}
