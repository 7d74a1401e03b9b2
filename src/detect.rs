//! PDF sanity checks run before files are submitted.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Whether the file declares itself linearized (fast web view)
    pub linearized: bool,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// How far from the end `%%EOF` is searched for.
const EOF_WINDOW: usize = 1024;

/// How far from the start the linearization dictionary is searched for.
const LINEARIZED_WINDOW: usize = 1024;

/// Detect PDF format from bytes.
///
/// Returns `None` if the data does not start with a `%PDF-x.y` header.
pub fn detect_format_from_bytes(data: &[u8]) -> Option<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return None;
    }

    let head = &data[..data.len().min(LINEARIZED_WINDOW)];
    Some(PdfFormat {
        version,
        linearized: contains(head, b"/Linearized"),
    })
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_some()
}

/// Result of inspecting one PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfCheck {
    /// Inspected file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Header information, `None` if the header is missing
    pub format: Option<PdfFormat>,
    /// First bytes of the file, kept when the header is missing
    pub leading_bytes: Vec<u8>,
    /// `%%EOF` found near the end
    pub has_eof_marker: bool,
    /// An `/Encrypt` dictionary is present
    pub encrypted: bool,
    /// Cross-reference and trailer keywords are present
    pub has_xref_trailer: bool,
}

impl PdfCheck {
    /// Inspect a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(path, &data))
    }

    /// Inspect file contents.
    pub fn from_bytes(path: impl Into<PathBuf>, data: &[u8]) -> Self {
        let format = detect_format_from_bytes(data);
        let tail = &data[data.len().saturating_sub(EOF_WINDOW)..];
        Self {
            path: path.into(),
            size: data.len() as u64,
            leading_bytes: if format.is_none() {
                data.iter().take(20).copied().collect()
            } else {
                Vec::new()
            },
            format,
            has_eof_marker: contains(tail, b"%%EOF"),
            encrypted: contains(data, b"/Encrypt"),
            has_xref_trailer: contains(data, b"xref") && contains(data, b"trailer"),
        }
    }

    /// The file has a PDF header and can be submitted.
    pub fn is_valid(&self) -> bool {
        self.format.is_some()
    }

    /// Size in MiB.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }

    /// Non-fatal findings, in check order.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.size > crate::service::SYNC_SIZE_LIMIT {
            warnings.push("file exceeds the 20 MiB synchronous processing limit");
        }
        if !self.has_eof_marker {
            warnings.push("file might not have a proper PDF ending");
        }
        if self.encrypted {
            warnings.push("PDF might be password protected");
        }
        if !self.has_xref_trailer {
            warnings.push("PDF might have structural issues (no xref/trailer)");
        }
        warnings
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\nxref\n0 1\ntrailer\n<<>>\nstartxref\n9\n%%EOF\n";

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(format.version, "1.7");
        assert!(!format.linearized);
    }

    #[test]
    fn test_detect_pdf_2_0() {
        let data = b"%PDF-2.0\n%\xe2\xe3\xcf\xd3";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(format.version, "2.0");
        assert_eq!(format.to_string(), "PDF 2.0");
    }

    #[test]
    fn test_detect_linearized() {
        let data = b"%PDF-1.6\n1 0 obj\n<< /Linearized 1 /L 1234 >>\nendobj";
        assert!(detect_format_from_bytes(data).unwrap().linearized);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(detect_format_from_bytes(b"<!DOCTYPE html>").is_none());
        assert!(detect_format_from_bytes(b"%PDF").is_none());
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
    }

    #[test]
    fn test_check_well_formed() {
        let check = PdfCheck::from_bytes("a.pdf", MINIMAL);
        assert!(check.is_valid());
        assert!(check.has_eof_marker);
        assert!(check.has_xref_trailer);
        assert!(!check.encrypted);
        assert!(check.warnings().is_empty());
    }

    #[test]
    fn test_check_html_disguised_as_pdf() {
        let check = PdfCheck::from_bytes("a.pdf", b"<html><body>Access denied</body></html>");
        assert!(!check.is_valid());
        assert_eq!(check.leading_bytes, b"<html><body>Access d".to_vec());
    }

    #[test]
    fn test_check_encrypted_truncated() {
        let check = PdfCheck::from_bytes("a.pdf", b"%PDF-1.7\n<< /Encrypt 5 0 R >>\n");
        assert!(check.is_valid());
        assert!(check.encrypted);
        assert_eq!(check.warnings().len(), 3);
    }

    #[test]
    fn test_check_missing_file() {
        assert!(matches!(
            PdfCheck::from_path("/nonexistent/a.pdf"),
            Err(Error::InputNotFound(_))
        ));
    }
}
