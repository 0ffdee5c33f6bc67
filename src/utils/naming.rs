//! Story naming rules shared by full extraction and indexing
//!
//! - `derive_id` folds a story name into an identifier-like id
//! - `id_suffix` disambiguates colliding generated ids
//! - `export_name_from_name` / `name_from_export_name` convert between the
//!   display name and the module export name of a story

use crate::extractors::base::IdHash;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// A run of non-word characters plus the character following it (or the end)
static NON_WORD_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+(.|$)").unwrap());

/// Collapse non-word runs and upper-case the character after each run
///
/// `"My story!!"` becomes `"MyStory"`.
pub fn derive_id(name: &str) -> String {
    NON_WORD_RUN_RE
        .replace_all(name, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// 32-bit multiply-by-31 fold over UTF-16 code units, absolute value in hex
///
/// Bit-compatible with ids generated by earlier tooling.
pub fn fold_hash(input: &str) -> String {
    let folded = input
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)));
    format!("{:x}", i64::from(folded).abs())
}

/// Suffix appended to a generated id that collided with an earlier one
pub fn id_suffix(name: &str, hash: IdHash) -> String {
    match hash {
        IdHash::Fold => fold_hash(name),
        IdHash::Md5 => {
            let digest = format!("{:x}", md5::compute(name.as_bytes()));
            digest[..8].to_string()
        }
    }
}

/// Split an identifier or phrase into words
///
/// Boundaries: non-alphanumeric runs, lower→upper transitions, letter↔digit
/// transitions, and the last capital of an acronym followed by lower case
/// (`"HTMLParser"` → `HTML`, `Parser`).
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() != c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && chars.get(i + 1).is_some_and(|next| next.is_lowercase()));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `"Primary CTA"` → `"primaryCta"`
///
/// Returns `None` when the name holds no alphanumeric characters.
pub fn export_name_from_name(name: &str) -> Option<String> {
    let words = split_words(name);
    let (first, rest) = words.split_first()?;

    let mut export_name = first.to_lowercase();
    for word in rest {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            export_name.extend(head.to_uppercase());
            export_name.push_str(&chars.as_str().to_lowercase());
        }
    }

    if export_name.starts_with(|c: char| c.is_ascii_digit()) {
        export_name.insert(0, '_');
    }
    Some(export_name)
}

/// `"primaryButton"` → `"Primary Button"`
pub fn name_from_export_name(export_name: &str) -> String {
    split_words(export_name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(head) => head.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
