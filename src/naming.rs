use regex::Regex;
use std::sync::LazyLock;

use crate::inflection::pluralize;

static SPLIT_LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Ll}0-9])(\p{Lu})").expect("valid split pattern"));
static SPLIT_UPPER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Lu})(\p{Lu}\p{Ll})").expect("valid split pattern"));
static STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}0-9]+").expect("valid strip pattern"));

const WORD_BREAK: &str = "\u{0}";

/// Camel-case an attribute or collection name.
///
/// Words are split at lower→upper transitions, before the last capital of an
/// acronym, and at any run of non-alphanumeric characters. Words after the
/// first that begin with a digit are prefixed with `_`.
pub fn normalize_name(raw: &str) -> String {
    let split = SPLIT_LOWER_UPPER.replace_all(raw, "${1}\u{0}${2}");
    let split = SPLIT_UPPER_UPPER.replace_all(&split, "${1}\u{0}${2}");
    let split = STRIP.replace_all(&split, WORD_BREAK);

    split
        .split(WORD_BREAK)
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(index, word)| camel_word(index, word))
        .collect()
}

/// Target collection identifier: camel-cased, then pluralized.
pub fn normalize_slug(raw: &str) -> String {
    pluralize(&normalize_name(raw))
}

fn camel_word(index: usize, word: &str) -> String {
    if index == 0 {
        return word.to_lowercase();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => {
            format!("_{}{}", first, chars.as_str().to_lowercase())
        }
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase()),
        None => String::new(),
    }
}
