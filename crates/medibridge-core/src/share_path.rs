//! Network-share (UNC) path normalization.
//!
//! Clients send share paths with forward slashes, with a single leading
//! backslash lost to escaping, or with no leading separator at all. Everything
//! is coerced into `\\host\share\...`.

const SHARE_PREFIX: &str = "\\\\";

/// Normalizes a share path so it starts with exactly the `\\` prefix.
///
/// - Trims surrounding whitespace; empty input stays empty
/// - Replaces `/` with `\`
/// - `\x` becomes `\\x`, `x` becomes `\\x`
pub fn normalize_share_path(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }

    let s = s.replace('/', "\\");
    if s.starts_with(SHARE_PREFIX) {
        s
    } else if s.starts_with('\\') {
        format!("\\{}", s)
    } else {
        format!("{}{}", SHARE_PREFIX, s)
    }
}

/// Cleans a `rutima` value as returned by the upstream (right-padded with
/// spaces) and normalizes it into share form.
pub fn clean_rutima(raw: &str) -> String {
    normalize_share_path(raw.trim_end())
}

/// True when the path looks like a local drive path (`C:...`).
pub fn looks_like_local_drive(path: &str) -> bool {
    path.chars().nth(1) == Some(':')
}
