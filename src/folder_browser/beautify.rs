use crate::vcs::is_valid_url;

/// Longest label shown for a bookmark before it is shortened.
pub const MAX_LABEL_LEN: usize = 35;
const ELLIPSIS: &str = "...";

/// Shorten `path` to exactly [`MAX_LABEL_LEN`] characters for display.
///
/// Keeps the scheme or drive prefix (drive letters uppercased) and the
/// separator run after it, then an ellipsis and the tail of the path.
/// Paths that already fit are returned unchanged.
pub fn beautify_path(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= MAX_LABEL_LEN {
        return path.to_string();
    }

    let mut prefix = String::new();
    let mut pos = 0;
    if let Some(colon) = chars.iter().position(|c| *c == ':') {
        pos = colon + 1;
        let is_url = is_valid_url(path);
        prefix.extend(chars[..pos].iter().map(|c| {
            if is_url { *c } else { c.to_ascii_uppercase() }
        }));
    }
    while let Some(separator) = chars.get(pos).filter(|c| matches!(**c, '/' | '\\')) {
        prefix.push(*separator);
        pos += 1;
    }
    prefix.push_str(ELLIPSIS);

    let prefix_len = prefix.chars().count();
    if prefix_len >= MAX_LABEL_LEN {
        prefix = ELLIPSIS.to_string();
    }
    let keep = MAX_LABEL_LEN - prefix.chars().count();
    prefix.extend(&chars[chars.len() - keep..]);
    prefix
}
