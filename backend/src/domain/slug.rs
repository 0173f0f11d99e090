//! Article slug derivation.
//!
//! A slug is the title lowercased, with each run of spaces replaced by a
//! single hyphen and the punctuation `. , ! ? : ; ' "` removed, followed by
//! `-N` where `N` is the smallest positive index not already taken.

const STRIPPED: &[char] = &['.', ',', '!', '?', ':', ';', '\'', '"'];

/// Normalise `title` into the slug stem (without the numeric suffix).
///
/// # Examples
/// ```
/// use conduit::domain::slug::normalize_title;
///
/// assert_eq!(normalize_title("How to  train, your Dragon!"), "how-to-train-your-dragon");
/// ```
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut stem = String::with_capacity(lowered.len());
    let mut in_space_run = false;
    for ch in lowered.chars() {
        if ch == ' ' {
            if !in_space_run {
                stem.push('-');
            }
            in_space_run = true;
            continue;
        }
        in_space_run = false;
        if !STRIPPED.contains(&ch) {
            stem.push(ch);
        }
    }
    stem
}

/// Candidate slug for `stem` at `index` (1-based).
pub fn candidate(stem: &str, index: u32) -> String {
    format!("{stem}-{index}")
}
