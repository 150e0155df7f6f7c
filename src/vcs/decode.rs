use super::VcsError;

/// Decode client output, trying UTF-8 first and falling back to charset
/// detection for localized consoles.
pub fn auto_decode(input: &[u8]) -> Result<String, VcsError> {
    if let Ok(text) = std::str::from_utf8(input) {
        return Ok(text.trim().to_string());
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(input, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(input);
    if had_errors {
        return Err(VcsError::Decode(format!(
            "{} bytes not valid {}",
            input.len(),
            encoding.name()
        )));
    }
    Ok(decoded.trim().to_string())
}
