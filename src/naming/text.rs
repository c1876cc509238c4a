//! Text helpers for building field names.
use rand::Rng;
use regex::Regex;

/// Collapses runs of whitespace (newlines included) into one space and trims.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Reduces a caption to alphanumerics and underscores.
/// Returns None when nothing usable is left.
pub fn sanitize_caption(caption: &str) -> Option<String> {
    let separators = Regex::new(r"[\s_]+").expect("Hardcode regex pattern");
    let invalid = Regex::new(r"[^\p{Alphabetic}\p{Nd}_]").expect("Hardcode regex pattern");
    let caption = separators.replace_all(caption.trim(), "_");
    let caption = invalid.replace_all(&caption, "");
    let caption = separators.replace_all(&caption, "_");
    let caption = caption.trim_matches('_');
    if caption.is_empty() {
        None
    } else {
        Some(caption.to_owned())
    }
}

/// Random lowercase ASCII name of the given length.
pub fn random_name<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}
