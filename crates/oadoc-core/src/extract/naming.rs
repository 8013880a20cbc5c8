use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static UNDERSCORE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Lower-case `text`, collapse every run of characters outside `[a-z0-9]`
/// into one `_`, and trim underscores from both ends.
///
/// - `"Pet Store!!"` → `"pet_store"`
/// - `"   "` → `""`
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced = NON_SLUG_RUN.replace_all(&lowered, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Slug of an optional text; absent text has no slug.
pub fn slugify_opt(text: Option<&str>) -> Option<String> {
    text.map(slugify)
}

/// Title-case `text`: the first letter of every run of letters is upper-cased
/// and the remaining letters of the run lower-cased. Anything that is not a
/// letter starts a new run, so `"pet's"` becomes `"Pet'S"`.
pub fn titlecase(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(ch);
            in_word = false;
        }
    }

    result
}
