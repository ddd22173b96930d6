//! Default regex-based name parser.
//!
//! Recognises the name shapes the searcher needs to tell apart:
//!
//! - scientific names: monomials, binomials, trinomials with optional rank
//!   marker and authorship (`Poa annua var. supina Link`)
//! - phrase names: `Genus sp. Location (Voucher) Party`, including the
//!   cleaned phrase and voucher text the index stores
//! - cultivars: `Grevillea 'Red Hooks'` or `Grevillea cv. Red Hooks`
//! - informal names: `Acacia sp.`, `Acacia sp. 1`, `Aus cf. bus`
//! - hybrids formulae and viruses, reported as unparsable with their type
//! - doubtful names: recognisable genus but unexpected characters

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use nomen_core::{NameParser, NameType, ParsedName, PhraseName, Unparsable};

const RANK_MARKERS: &str = "sp|spp|ssp|subsp|supersp|infrasp|var|subvar|f|fm|forma|subf|cv|agg|\
    gen|subgen|subg|sect|ser|fam|subfam|trib|ord|cl|phyl|regn|morph|ab|nm";

/// A name consisting only of a rank marker, such as `sp.` or `nothosubsp.`
pub static RANK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:notho)? *(?:{})\.?$", RANK_MARKERS)).expect("valid rank marker regex")
});

static VIRUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:virus|viruses|ictv|phage|viroid)\b").expect("valid virus regex")
});

static HYBRID_FORMULA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}\S* .*\s[x×]\s+\S").expect("valid hybrid regex"));

/// Group 1 genus (with optional epithet), 2 rank, 3 location, 4 voucher, 5 nominating party.
static PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\p{Lu}\p{Ll}+(?: \p{Ll}[\p{Ll}-]+)?) +(sp|subsp|ssp|var)\.? +((?:\p{Lu}|\d|['"])[\p{L}\d '"_.-]*?) *(\([^)]*\))? *([^()]*)$"#,
    )
    .expect("valid phrase regex")
});

/// `Genus sp. epithet ...` where dropping the marker may leave a well-formed name.
static POTENTIAL_SPECIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Lu}\p{Ll}+) sp\.? (\p{Ll}{3,}) *(.*)$").expect("valid potential species regex")
});

static CULTIVAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\p{Lu}\p{Ll}+)(?: (\p{Ll}[\p{Ll}-]+))?(?: (?:cv\.? *'([^']+)'|'([^']+)'|cv\.? +(.+)))$",
    )
    .expect("valid cultivar regex")
});

static INFORMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Lu}\p{Ll}+)(?: (\p{Ll}[\p{Ll}-]+))? (sp\. ?nov\.?|spp\.?|sp\.?)(?: [\p{L}\d .-]*)?$")
        .expect("valid informal regex")
});

static CONFER_AFFINITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Lu}\p{Ll}+) (?:cf|aff)\.? (\p{Ll}[\p{Ll}-]+)(?: .*)?$").expect("valid cf regex")
});

static SCIENTIFIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<genus>\p{Lu}\p{Ll}+)(?: \((?P<subgenus>\p{Lu}\p{Ll}+)\))?(?: (?P<species>\p{Ll}[\p{Ll}-]+))?(?: (?P<marker>(?:notho)?(?:subsp|ssp|var|subvar|f|forma|subf)\.?))?(?: (?P<infra>\p{Ll}[\p{Ll}-]+))?(?: (?P<author>(?:\(|\p{Lu}|d[eu] |van |von ).*))?$",
    )
    .expect("valid scientific regex")
});

static MULTIPLE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid space regex"));

static PHRASE_BLACKLIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&| AND | and |Stn\.|Stn|Station|Mt |Mt\.|Mount").expect("valid phrase blacklist")
});

static VOUCHER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z][A-Z]{1,3} [0-9]").expect("valid voucher id regex"));

static VOUCHER_BLACKLIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" and | AND | And | s\.n\.| sn ").expect("valid voucher blacklist"));

static INITIALS_DOTTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[A-Z]\.){1,3}").expect("valid initials regex"));

static INITIALS_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z][A-Z]{1,3} ").expect("valid initials regex"));

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").expect("valid non-word regex"));

static UNEXPECTED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L} .()'&,\-]").expect("valid unexpected chars regex"));

/// Returns true when the whole name is a rank marker.
pub fn is_rank_marker(name: &str) -> bool {
    RANK_MARKER.is_match(name.trim())
}

/// Normalises the location part of a phrase name so that spelling variants
/// of the same place compare equal.
pub fn clean_phrase(location: &str) -> Option<String> {
    let padded = format!(" {}", location);
    let replaced = PHRASE_BLACKLIST.replace_all(&padded, " ");
    let unquoted = replaced.trim().replace(['\'', '"'], "");
    let collapsed = MULTIPLE_SPACES.replace_all(&unquoted, " ").trim().to_string();
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Reduces a voucher such as `(D.E.Albrecht 9192)` to its collector surname
/// and number (`Albrecht9192`).
pub fn clean_voucher(voucher: &str) -> Option<String> {
    let mut cleaned = voucher.to_string();
    if let Some(m) = VOUCHER_ID.find(&cleaned) {
        let despaced = format!(" {}", m.as_str().replace(' ', ""));
        cleaned.replace_range(m.range(), &despaced);
    }
    let cleaned = VOUCHER_BLACKLIST.replace_all(&cleaned, " ");
    let cleaned = INITIALS_DOTTED.replace_all(&cleaned, " ");
    let cleaned = INITIALS_PLAIN.replace_all(&cleaned, " ");
    let cleaned = NON_WORD.replace_all(&cleaned, "");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.into_owned())
    }
}

fn capture(caps: &regex::Captures<'_>, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn named(caps: &regex::Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Name parser for scientific, phrase, cultivar and informal names.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseNameParser;

impl PhraseNameParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_scientific(name: &str) -> Option<ParsedName> {
        let caps = SCIENTIFIC.captures(name)?;
        let mut pn = ParsedName::new(NameType::Scientific);
        pn.genus_or_above = named(&caps, "genus");
        pn.specific_epithet = named(&caps, "species");
        pn.rank_marker = named(&caps, "marker");
        pn.infraspecific_epithet = named(&caps, "infra");
        pn.authorship = named(&caps, "author");
        if pn.rank_marker.is_some() && pn.infraspecific_epithet.is_none() {
            return None;
        }
        if pn.infraspecific_epithet.is_some() && pn.specific_epithet.is_none() {
            return None;
        }
        Some(pn)
    }

    fn parse_phrase(name: &str) -> Option<ParsedName> {
        let caps = PHRASE.captures(name)?;
        let head = capture(&caps, 1)?;
        let rank = capture(&caps, 2)?;
        let location = capture(&caps, 3)?;
        let voucher = capture(&caps, 4);

        let mut words = head.split_whitespace();
        let genus = words.next()?.to_string();
        let epithet = words.next().map(str::to_string);
        let specific_epithet = if rank == "sp" { None } else { epithet };

        let mut pn = ParsedName::new(NameType::Phrase);
        pn.genus_or_above = Some(genus.clone());
        pn.specific_epithet = specific_epithet.clone();
        pn.rank_marker = Some(format!("{}.", rank));
        pn.authors_parsed = false;
        pn.phrase = Some(PhraseName {
            genus,
            clean_phrase: clean_phrase(&location),
            clean_voucher: voucher.as_deref().and_then(clean_voucher),
            specific_epithet,
            rank_marker: pn.rank_marker.clone(),
        });
        Some(pn)
    }

    fn parse_cultivar(name: &str) -> Option<ParsedName> {
        let caps = CULTIVAR.captures(name)?;
        let mut pn = ParsedName::new(NameType::Cultivar);
        pn.genus_or_above = capture(&caps, 1);
        pn.specific_epithet = capture(&caps, 2);
        pn.cultivar = capture(&caps, 3)
            .or_else(|| capture(&caps, 4))
            .or_else(|| capture(&caps, 5));
        pn.rank_marker = Some("cv.".to_string());
        Some(pn)
    }

    fn parse_informal(name: &str) -> Option<ParsedName> {
        if let Some(caps) = INFORMAL.captures(name) {
            let mut pn = ParsedName::new(NameType::Informal);
            pn.genus_or_above = capture(&caps, 1);
            pn.specific_epithet = capture(&caps, 2);
            pn.rank_marker = capture(&caps, 3);
            return Some(pn);
        }
        let caps = CONFER_AFFINITY.captures(name)?;
        let mut pn = ParsedName::new(NameType::Informal);
        pn.genus_or_above = capture(&caps, 1);
        pn.specific_epithet = capture(&caps, 2);
        Some(pn)
    }

    fn parse_doubtful(name: &str) -> Option<ParsedName> {
        let cleaned = UNEXPECTED_CHARS.replace_all(name, "");
        let cleaned = MULTIPLE_SPACES.replace_all(cleaned.trim(), " ");
        if let Some(mut pn) = Self::parse_scientific(&cleaned) {
            pn.name_type = NameType::Doubtful;
            return Some(pn);
        }
        let first = cleaned.split_whitespace().next()?;
        let mut chars = first.chars();
        let looks_like_genus = chars.next().map(char::is_uppercase).unwrap_or(false)
            && chars.clone().count() > 0
            && chars.all(char::is_lowercase);
        if !looks_like_genus {
            return None;
        }
        let mut pn = ParsedName::new(NameType::Doubtful);
        pn.genus_or_above = Some(first.to_string());
        Some(pn)
    }
}

impl NameParser for PhraseNameParser {
    fn parse(&self, name: &str) -> Result<ParsedName, Unparsable> {
        let normalized = MULTIPLE_SPACES.replace_all(name.trim(), " ").into_owned();
        if normalized.is_empty() {
            return Err(Unparsable::new(name, NameType::Unparsable));
        }
        if VIRUS.is_match(&normalized) {
            return Err(Unparsable::new(name, NameType::Virus));
        }
        if HYBRID_FORMULA.is_match(&normalized) {
            return Err(Unparsable::new(name, NameType::Hybrid));
        }

        if let Some(caps) = POTENTIAL_SPECIES.captures(&normalized) {
            let epithet = &caps[2];
            if epithet != "nov" {
                let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                let reparsed = format!("{} {} {}", &caps[1], epithet, rest);
                if let Some(pn) = Self::parse_scientific(reparsed.trim()) {
                    return Ok(pn);
                }
            }
        }

        let parsed = Self::parse_phrase(&normalized)
            .or_else(|| Self::parse_cultivar(&normalized))
            .or_else(|| Self::parse_informal(&normalized))
            .or_else(|| Self::parse_scientific(&normalized))
            .or_else(|| Self::parse_doubtful(&normalized));

        match parsed {
            Some(pn) => {
                trace!(name = %normalized, name_type = %pn.name_type, "Parsed name");
                Ok(pn)
            }
            None => Err(Unparsable::new(name, NameType::Doubtful)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomen_core::RankType;

    fn parse(name: &str) -> ParsedName {
        PhraseNameParser::new().parse(name).unwrap()
    }

    // ========== SCIENTIFIC NAMES ==========

    #[test]
    fn test_monomial() {
        let pn = parse("Macropus");
        assert_eq!(pn.name_type, NameType::Scientific);
        assert_eq!(pn.genus_or_above.as_deref(), Some("Macropus"));
        assert!(!pn.is_binomial());
        assert_eq!(pn.canonical_name().as_deref(), Some("Macropus"));
    }

    #[test]
    fn test_binomial_with_author() {
        let pn = parse("Macropus rufus (Desmarest, 1822)");
        assert_eq!(pn.name_type, NameType::Scientific);
        assert_eq!(pn.specific_epithet.as_deref(), Some("rufus"));
        assert_eq!(pn.authorship.as_deref(), Some("(Desmarest, 1822)"));
        assert_eq!(pn.canonical_name().as_deref(), Some("Macropus rufus"));
    }

    #[test]
    fn test_trinomial_with_marker() {
        let pn = parse("Poa annua var. supina Link");
        assert_eq!(pn.infraspecific_epithet.as_deref(), Some("supina"));
        assert_eq!(pn.rank(), Some(RankType::Variety));
        assert_eq!(pn.authorship.as_deref(), Some("Link"));
        assert_eq!(pn.canonical_name().as_deref(), Some("Poa annua supina"));
    }

    #[test]
    fn test_trinomial_without_marker() {
        let pn = parse("Macropus rufus pallidus");
        assert_eq!(pn.specific_epithet.as_deref(), Some("rufus"));
        assert_eq!(pn.infraspecific_epithet.as_deref(), Some("pallidus"));
        assert_eq!(pn.rank(), None);
    }

    #[test]
    fn test_extra_whitespace() {
        let pn = parse("  Acacia   dealbata ");
        assert_eq!(pn.canonical_name().as_deref(), Some("Acacia dealbata"));
    }

    // ========== PHRASE NAMES ==========

    #[test]
    fn test_phrase_name() {
        let pn = parse("Marsilea sp. Neutral Junction (D.E.Albrecht 9192)");
        assert_eq!(pn.name_type, NameType::Phrase);
        let phrase = pn.phrase.unwrap();
        assert_eq!(phrase.genus, "Marsilea");
        assert_eq!(phrase.clean_phrase.as_deref(), Some("Neutral Junction"));
        assert_eq!(phrase.clean_voucher.as_deref(), Some("Albrecht9192"));
        assert_eq!(phrase.specific_epithet, None);
    }

    #[test]
    fn test_phrase_name_with_species() {
        let pn = parse("Prostanthera sp. Bundjalung Nat. Pk. (B.J.Conn 3471)");
        assert_eq!(pn.name_type, NameType::Phrase);
        let pn = parse("Acacia dealbata subsp. Mt Buller (A.B.Smith 12)");
        assert_eq!(pn.name_type, NameType::Phrase);
        let phrase = pn.phrase.unwrap();
        assert_eq!(phrase.specific_epithet.as_deref(), Some("dealbata"));
        assert_eq!(phrase.clean_phrase.as_deref(), Some("Buller"));
    }

    #[test]
    fn test_clean_phrase_blacklist() {
        assert_eq!(clean_phrase("Mt Buller").as_deref(), Some("Buller"));
        assert_eq!(clean_phrase("'Kings Park'").as_deref(), Some("Kings Park"));
        assert_eq!(clean_phrase("Jervis Bay & Station").as_deref(), Some("Jervis Bay"));
    }

    #[test]
    fn test_clean_voucher() {
        assert_eq!(clean_voucher("(D.E.Albrecht 9192)").as_deref(), Some("Albrecht9192"));
        assert_eq!(clean_voucher("(NT 123)").as_deref(), Some("NT123"));
    }

    #[test]
    fn test_sp_with_lowercase_epithet_is_reparsed() {
        let pn = parse("Acacia sp. dealbata");
        assert_eq!(pn.name_type, NameType::Scientific);
        assert_eq!(pn.canonical_name().as_deref(), Some("Acacia dealbata"));
    }

    // ========== CULTIVARS, INFORMAL, DOUBTFUL ==========

    #[test]
    fn test_cultivar_quoted() {
        let pn = parse("Grevillea 'Red Hooks'");
        assert_eq!(pn.name_type, NameType::Cultivar);
        assert_eq!(pn.cultivar.as_deref(), Some("Red Hooks"));
        assert_eq!(pn.canonical_name().as_deref(), Some("Grevillea 'Red Hooks'"));
    }

    #[test]
    fn test_cultivar_marker() {
        let pn = parse("Grevillea cv. Robyn Gordon");
        assert_eq!(pn.name_type, NameType::Cultivar);
        assert_eq!(pn.cultivar.as_deref(), Some("Robyn Gordon"));
    }

    #[test]
    fn test_informal_sp() {
        let pn = parse("Acacia sp.");
        assert_eq!(pn.name_type, NameType::Informal);
        assert_eq!(pn.genus_or_above.as_deref(), Some("Acacia"));
        assert_eq!(pn.canonical_name(), None);

        assert_eq!(parse("Acacia sp. 1").name_type, NameType::Informal);
    }

    #[test]
    fn test_confer_is_informal_binomial() {
        let pn = parse("Macropus cf. rufus");
        assert_eq!(pn.name_type, NameType::Informal);
        assert!(pn.is_binomial());
    }

    #[test]
    fn test_doubtful_question_mark() {
        let pn = parse("Macropus rufus?");
        assert_eq!(pn.name_type, NameType::Doubtful);
        assert_eq!(pn.genus_or_above.as_deref(), Some("Macropus"));
        assert_eq!(pn.canonical_name(), None);
    }

    #[test]
    fn test_unparsable_types() {
        let parser = PhraseNameParser::new();
        assert_eq!(
            parser.parse("Tobacco mosaic virus").unwrap_err().name_type,
            NameType::Virus
        );
        assert_eq!(
            parser.parse("Eucalyptus globulus x Eucalyptus nitens").unwrap_err().name_type,
            NameType::Hybrid
        );
        assert_eq!(parser.parse("   ").unwrap_err().name_type, NameType::Unparsable);
        assert_eq!(parser.parse("12345").unwrap_err().name_type, NameType::Doubtful);
    }

    #[test]
    fn test_rank_marker_detection() {
        assert!(is_rank_marker("sp."));
        assert!(is_rank_marker("ssp"));
        assert!(is_rank_marker("nothosubsp."));
        assert!(is_rank_marker(" var. "));
        assert!(!is_rank_marker("Macropus"));
        assert!(!is_rank_marker("sp. nov."));
    }
}
