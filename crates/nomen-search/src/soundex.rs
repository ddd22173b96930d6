//! Phonetic codes for taxonomic epithets.
//!
//! A soundex variant tuned for Latinised names: leading consonant clusters
//! are simplified, vowels and soundalike consonants are folded, repeated
//! letters collapse, and common species endings (-is, -im, -as) are unified.
//! Codes computed here must agree with the codes stored in the index.

use once_cell::sync::Lazy;
use regex::Regex;

/// Angle-bracketed markup such as `<i>` left in names copied from HTML.
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.+?>").expect("valid markup regex"));

/// Leading clusters replaced before folding, tried in order.
const LEADING: [(&str, &str); 18] = [
    ("AE", "E"),
    ("CN", "N"),
    ("CT", "T"),
    ("CZ", "C"),
    ("DJ", "J"),
    ("EA", "E"),
    ("EU", "U"),
    ("GN", "N"),
    ("KN", "N"),
    ("MC", "MAC"),
    ("MN", "N"),
    ("OE", "E"),
    ("QU", "Q"),
    ("PS", "S"),
    ("PT", "T"),
    ("TS", "S"),
    ("WR", "R"),
    ("X", "Z"),
];

/// Replacements applied after the leading letter, in order.
const FOLDS: [(&str, &str); 12] = [
    ("AE", "I"),
    ("IA", "A"),
    ("OE", "I"),
    ("OI", "A"),
    ("SC", "S"),
    ("E", "I"),
    ("O", "A"),
    ("U", "I"),
    ("Y", "I"),
    ("K", "C"),
    ("Z", "C"),
    ("H", ""),
];

/// Which part of a name is being encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Genus,
    /// Specific or infraspecific epithet; endings are unified
    Species,
}

fn fold_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}

/// Upper-cases, strips markup, folds accents and drops everything but
/// letters, spaces and full stops. Returns `None` when nothing is left.
pub fn normalize(word: &str) -> Option<String> {
    let upper = word.to_uppercase().replace(" &AMP; ", " & ");
    let stripped = MARKUP.replace_all(&upper, "");
    let folded: String = stripped
        .replace('Æ', "AE")
        .chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '.')
        .collect();
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn collapse_repeats(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last: Option<char> = None;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() && last == Some(c) {
            continue;
        }
        out.push(c);
        last = Some(c);
    }
    out
}

/// Computes the phonetic code of a single name part.
///
/// # Example
/// ```
/// use nomen_search::soundex::{treat_word, WordKind};
///
/// assert_eq!(treat_word("Macropus", WordKind::Genus), treat_word("Macropis", WordKind::Genus));
/// assert_eq!(treat_word("rufus", WordKind::Species), treat_word("rufa", WordKind::Species));
/// ```
pub fn treat_word(word: &str, kind: WordKind) -> Option<String> {
    let mut temp = normalize(word)?;

    for (prefix, replacement) in LEADING {
        if let Some(rest) = temp.strip_prefix(prefix) {
            temp = format!("{}{}", replacement, rest);
            break;
        }
    }

    let mut chars = temp.chars();
    let lead = chars.next()?;
    let mut tail: String = chars.collect();
    for (from, to) in FOLDS {
        tail = tail.replace(from, to);
    }

    let mut code = collapse_repeats(&format!("{}{}", lead, tail));

    if kind == WordKind::Species {
        for ending in ["IS", "IM", "AS"] {
            if code.len() > ending.len() && code.ends_with(ending) {
                code.truncate(code.len() - ending.len());
                code.push('A');
                break;
            }
        }
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_markup_and_accents() {
        assert_eq!(normalize("<i>Acácia</i>").as_deref(), Some("ACACIA"));
        assert_eq!(normalize("Æsculus").as_deref(), Some("AESCULUS"));
        assert_eq!(normalize(" 123 "), None);
    }

    #[test]
    fn test_leading_cluster_replacement() {
        assert_eq!(treat_word("Pseudomys", WordKind::Genus).unwrap().chars().next(), Some('S'));
        assert_eq!(treat_word("Knightia", WordKind::Genus).unwrap().chars().next(), Some('N'));
        assert!(treat_word("Mcdonaldia", WordKind::Genus).unwrap().starts_with("MAC"));
    }

    #[test]
    fn test_x_prefix_keeps_remaining_letters() {
        assert_eq!(treat_word("Xanthorrhoea", WordKind::Genus).as_deref(), Some("ZANTARIA"));
    }

    #[test]
    fn test_vowel_folding() {
        assert_eq!(treat_word("Macropus", WordKind::Genus).as_deref(), Some("MACRAPIS"));
        assert_eq!(
            treat_word("Eucalyptus", WordKind::Genus),
            treat_word("Eucaliptus", WordKind::Genus)
        );
    }

    #[test]
    fn test_repeated_letters_collapse() {
        assert_eq!(treat_word("Hippotion", WordKind::Genus), treat_word("Hipotion", WordKind::Genus));
    }

    #[test]
    fn test_species_endings_unified() {
        let a = treat_word("australis", WordKind::Species);
        let b = treat_word("australa", WordKind::Species);
        assert_eq!(a, b);
        assert_eq!(
            treat_word("rufum", WordKind::Species),
            treat_word("rufus", WordKind::Species)
        );
    }

    #[test]
    fn test_genus_endings_not_unified() {
        assert_ne!(
            treat_word("Poais", WordKind::Genus),
            treat_word("Poaa", WordKind::Genus)
        );
    }

    #[test]
    fn test_empty_word() {
        assert_eq!(treat_word("", WordKind::Genus), None);
    }
}
