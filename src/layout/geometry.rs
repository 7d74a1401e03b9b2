//! Layout, text anchors and bounding polygons.

use serde::{Deserialize, Deserializer, Serialize};

/// Visual and textual placement shared by every layout element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Spans of the document text covered by this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<TextAnchor>,

    /// Detection confidence in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Bounding polygon on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
}

impl Layout {
    /// Create a layout anchored to the given segments.
    pub fn with_segments(segments: Vec<TextSegment>) -> Self {
        Self {
            text_anchor: Some(TextAnchor {
                text_segments: segments,
            }),
            ..Default::default()
        }
    }

    /// Set the confidence and return self.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the bounding polygon from pixel vertices and return self.
    pub fn vertices(mut self, points: &[(i32, i32)]) -> Self {
        self.bounding_poly = Some(BoundingPoly {
            vertices: points
                .iter()
                .map(|&(x, y)| Vertex {
                    x: Some(x),
                    y: Some(y),
                })
                .collect(),
            normalized_vertices: Vec::new(),
        });
        self
    }

    /// Text segments, empty when there is no anchor.
    pub fn segments(&self) -> &[TextSegment] {
        self.text_anchor
            .as_ref()
            .map(|a| a.text_segments.as_slice())
            .unwrap_or(&[])
    }
}

/// References from an element into the document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnchor {
    /// Half-open spans, in order
    #[serde(default)]
    pub text_segments: Vec<TextSegment>,
}

/// Half-open `[start, end)` span of character offsets.
///
/// Offsets are kept as `Option` so that "absent" stays distinguishable from
/// an explicit zero; see [`crate::flatten::SegmentPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    /// Start offset
    #[serde(
        default,
        deserialize_with = "deserialize_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_index: Option<usize>,

    /// End offset (exclusive)
    #[serde(
        default,
        deserialize_with = "deserialize_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_index: Option<usize>,
}

impl TextSegment {
    /// Create a segment with both offsets present.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start_index: Some(start),
            end_index: Some(end),
        }
    }
}

/// int64 fields arrive as JSON strings under the proto3 mapping, but plain
/// numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Number(u64),
    Text(String),
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IndexRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IndexRepr::Number(n)) => usize::try_from(n)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(IndexRepr::Text(s)) => s
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Bounding polygon in pixel and/or normalized coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    /// Pixel vertices
    #[serde(default)]
    pub vertices: Vec<Vertex>,

    /// Vertices normalized to `[0, 1]` page coordinates
    #[serde(default)]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

/// Pixel vertex; omitted coordinates are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Y coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

/// Normalized vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVertex {
    /// X coordinate
    #[serde(default)]
    pub x: f32,
    /// Y coordinate
    #[serde(default)]
    pub y: f32,
}
