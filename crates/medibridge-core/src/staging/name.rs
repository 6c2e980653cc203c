//! Destination filename validation.

use crate::error::{BridgeError, BridgeResult};

/// Characters that are not allowed in a filename on a Windows share.
pub const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\0'];

/// Reduces `name` to a bare, safe filename.
///
/// - Keeps only the last path segment (`/` and `\` both separate), which
///   drops `../`, drive prefixes and `\\server\share\` prefixes
/// - Trims whitespace, then leading/trailing dots
/// - Rejects empty results and names with [`FORBIDDEN_CHARS`]
pub fn safe_name(name: &str) -> BridgeResult<String> {
    if name.is_empty() {
        return Err(BridgeError::invalid("dest_name is invalid"));
    }

    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let base = base.trim().trim_matches('.');
    if base.is_empty() {
        return Err(BridgeError::invalid("dest_name is invalid"));
    }

    if base.contains(FORBIDDEN_CHARS) {
        return Err(BridgeError::invalid("dest_name contains forbidden characters"));
    }

    Ok(base.to_string())
}

/// Only `.pdf` files (any case) are staged.
pub fn require_pdf(name: &str) -> BridgeResult<()> {
    if name.to_ascii_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(BridgeError::invalid("only .pdf files are allowed"))
    }
}

/// Full upload-name check: [`safe_name`] then [`require_pdf`].
pub fn validate_upload_name(name: &str) -> BridgeResult<String> {
    let safe = safe_name(name)?;
    require_pdf(&safe)?;
    Ok(safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_accepted() {
        assert_eq!(validate_upload_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(validate_upload_name("report.PDF").unwrap(), "report.PDF");
        assert_eq!(
            validate_upload_name("3-1001-CC-7-12.pdf").unwrap(),
            "3-1001-CC-7-12.pdf"
        );
    }

    #[test]
    fn non_pdf_rejected() {
        assert!(validate_upload_name("report.txt").is_err());
        assert!(validate_upload_name("../../etc/passwd").is_err());
        assert!(validate_upload_name("report.pdf.exe").is_err());
    }

    #[test]
    fn directory_components_stripped() {
        assert_eq!(safe_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(safe_name("..\\..\\x.pdf").unwrap(), "x.pdf");
        assert_eq!(safe_name("\\\\server\\share\\doc.pdf").unwrap(), "doc.pdf");
        assert_eq!(safe_name("C:\\Users\\me\\doc.pdf").unwrap(), "doc.pdf");
    }

    #[test]
    fn dot_and_blank_names_rejected() {
        for bad in ["", " ", ".", "..", " .. ", "dir/", "dir/..", "..."] {
            assert!(safe_name(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn trims_whitespace_then_dots() {
        assert_eq!(safe_name("  ..report.pdf.. ").unwrap(), "report.pdf");
    }

    #[test]
    fn forbidden_characters_rejected() {
        for bad in ["a<b.pdf", "a>b.pdf", "C:doc.pdf", "a\"b.pdf", "a|b.pdf", "a?.pdf", "a*.pdf", "a\0.pdf"] {
            let err = safe_name(bad).unwrap_err();
            assert!(err.to_string().contains("forbidden"), "{:?}", bad);
        }
    }
}
