//! Shared utility functions.

/// Normalize a `#RGB` or `#RRGGBB` colour to upper-case `#RRGGBB`.
///
/// Returns `None` for anything else.
/// "#0af" -> "#00AAFF"
/// "#007aff" -> "#007AFF"
pub fn normalize_hex_color(s: &str) -> Option<String> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return None,
    };

    Some(format!("#{}", expanded.to_ascii_uppercase()))
}

/// File extension for image bytes, sniffed from their magic number.
pub fn image_extension(bytes: &[u8]) -> &'static str {
    match infer::get(bytes) {
        Some(kind) if kind.mime_type().starts_with("image/") => kind.extension(),
        _ => "bin",
    }
}

/// Split plain text into paragraphs on blank lines.
///
/// Lines inside a paragraph are joined with a single space.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                result.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        result.push(current.join(" "));
    }

    result
}
