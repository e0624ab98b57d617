//! Text extraction boundary: turns an uploaded document into raw text for the parser.

use std::path::Path;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

/// Decides how to decode a document from its declared content type, then its file extension.
pub fn detect_kind(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<DocumentKind, AppError> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("application/pdf") => return Ok(DocumentKind::Pdf),
        Some("text/plain") | Some("text/markdown") => return Ok(DocumentKind::PlainText),
        _ => {}
    }

    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => Ok(DocumentKind::Pdf),
        Some("txt") | Some("md") => Ok(DocumentKind::PlainText),
        _ => Err(AppError::UnsupportedFormat(format!(
            "cannot extract text from '{}' ({})",
            file_name.unwrap_or("upload"),
            content_type.unwrap_or("unknown content type")
        ))),
    }
}

/// Extracts raw text. Fails with `UnsupportedFormat` for anything that is not a PDF or UTF-8 text.
///
/// PDF decoding is CPU-bound; async callers should run this on a blocking thread.
pub fn extract_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    match detect_kind(file_name, content_type)? {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::UnsupportedFormat(format!("unreadable PDF: {e}"))),
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::UnsupportedFormat("text upload is not valid UTF-8".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wins_over_extension() {
        assert_eq!(
            detect_kind(Some("resume.bin"), Some("application/pdf")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            detect_kind(Some("resume.pdf"), Some("text/plain; charset=utf-8")).unwrap(),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(
            detect_kind(Some("Resume.PDF"), Some("application/octet-stream")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(detect_kind(Some("cv.txt"), None).unwrap(), DocumentKind::PlainText);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = detect_kind(Some("photo.png"), Some("image/png")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert!(matches!(
            detect_kind(None, None),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_plain_text_round_trips() {
        let text = extract_text(Some("cv.txt"), None, "Jane Roe\nPune".as_bytes()).unwrap();
        assert_eq!(text, "Jane Roe\nPune");
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let err = extract_text(Some("cv.txt"), None, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_garbage_pdf_is_rejected() {
        let err = extract_text(Some("cv.pdf"), None, b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }
}
