//! Text-anchor resolution against the document's full text.

use super::SegmentPolicy;
use crate::layout::TextSegment;

/// Character-indexed view over a document's full text.
///
/// Text anchors index characters, not bytes, so the byte position of every
/// character boundary is computed once per document.
#[derive(Debug, Clone)]
pub struct FullText<'a> {
    text: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> FullText<'a> {
    /// Index the given text.
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Characters `[start, end)`, clamped to the text. Inverted spans are empty.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.min(len);
        if start >= end {
            return "";
        }
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }

    /// Resolve one segment, or `None` if the policy drops it.
    ///
    /// A missing start is 0, the proto3 default for omitted integers.
    pub fn segment(&self, segment: &TextSegment, policy: SegmentPolicy) -> Option<&'a str> {
        let start = segment.start_index.unwrap_or(0);
        let end = match (segment.end_index, policy) {
            (Some(end), _) => end,
            (None, SegmentPolicy::DocumentEnd) => self.char_len(),
            (None, SegmentPolicy::Skip) => {
                log::debug!("Skipping open-ended text segment starting at {}", start);
                return None;
            }
        };
        Some(self.slice(start, end))
    }

    /// Concatenate all segments and trim surrounding whitespace.
    pub fn resolve(&self, segments: &[TextSegment], policy: SegmentPolicy) -> String {
        let mut joined = String::new();
        for segment in segments {
            if let Some(part) = self.segment(segment, policy) {
                joined.push_str(part);
            }
        }
        joined.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_ended(start: usize) -> TextSegment {
        TextSegment {
            start_index: Some(start),
            end_index: None,
        }
    }

    #[test]
    fn test_slice_ascii() {
        let text = FullText::new("Hello world");
        assert_eq!(text.slice(0, 5), "Hello");
        assert_eq!(text.slice(6, 100), "world");
        assert_eq!(text.slice(8, 3), "");
    }

    #[test]
    fn test_slice_multibyte() {
        let text = FullText::new("ሰላም world");
        assert_eq!(text.char_len(), 9);
        assert_eq!(text.slice(0, 3), "ሰላም");
        assert_eq!(text.slice(4, 9), "world");
    }

    #[test]
    fn test_resolve_concatenates_and_trims() {
        let text = FullText::new("  Alpha \n Beta  ");
        let segments = [TextSegment::new(0, 8), TextSegment::new(8, 16)];
        assert_eq!(
            text.resolve(&segments, SegmentPolicy::DocumentEnd),
            "Alpha \n Beta"
        );
    }

    #[test]
    fn test_missing_start_is_zero() {
        let text = FullText::new("abcdef");
        let segment = TextSegment {
            start_index: None,
            end_index: Some(3),
        };
        assert_eq!(text.resolve(&[segment], SegmentPolicy::Skip), "abc");
    }

    #[test]
    fn test_missing_end_policy() {
        let text = FullText::new("abcdef");
        assert_eq!(
            text.resolve(&[open_ended(2)], SegmentPolicy::DocumentEnd),
            "cdef"
        );
        assert_eq!(text.resolve(&[open_ended(2)], SegmentPolicy::Skip), "");
    }

    #[test]
    fn test_empty_text() {
        let text = FullText::new("");
        assert_eq!(text.char_len(), 0);
        assert_eq!(text.resolve(&[TextSegment::new(0, 10)], SegmentPolicy::DocumentEnd), "");
    }
}
