//! Data models for taxon concepts, query classifications and match results.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// RANKS
// =============================================================================

/// Taxonomic rank with a numeric level.
///
/// Multiples of 1000 denote the major Linnaean ranks. Infraspecific ranks sit
/// at or just above 8000 so that "species or below" is a single id range.
///
/// # Example
/// ```
/// use nomen_core::RankType;
///
/// assert_eq!(RankType::Genus.id(), 6000);
/// assert_eq!(RankType::from_marker("subsp."), Some(RankType::Subspecies));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Subspecies,
    Variety,
    Form,
    Cultivar,
    Unranked,
}

impl RankType {
    /// Linnaean levels from kingdom down to species, most general first.
    pub const LINNAEAN: [RankType; 7] = [
        RankType::Kingdom,
        RankType::Phylum,
        RankType::Class,
        RankType::Order,
        RankType::Family,
        RankType::Genus,
        RankType::Species,
    ];

    /// Levels above genus used to disambiguate homonyms, most general first.
    pub const HIGHER: [RankType; 5] = [
        RankType::Kingdom,
        RankType::Phylum,
        RankType::Class,
        RankType::Order,
        RankType::Family,
    ];

    /// Numeric rank level.
    pub const fn id(self) -> u32 {
        match self {
            Self::Kingdom => 1000,
            Self::Phylum => 2000,
            Self::Class => 3000,
            Self::Order => 4000,
            Self::Family => 5000,
            Self::Genus => 6000,
            Self::Species => 7000,
            Self::Subspecies => 8000,
            Self::Variety => 8010,
            Self::Form => 8020,
            Self::Cultivar => 8050,
            Self::Unranked => 0,
        }
    }

    /// Lower-case label, also the index field name for Linnaean levels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
            Self::Subspecies => "subspecies",
            Self::Variety => "variety",
            Self::Form => "form",
            Self::Cultivar => "cultivar",
            Self::Unranked => "unranked",
        }
    }

    /// Parses a rank label or an abbreviated rank marker such as `subsp.`,
    /// `ssp`, `var.`, `f.` or `cv.`. A leading `notho` is ignored.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let lower = marker.trim().to_lowercase();
        let lower = lower.trim_end_matches('.');
        let lower = lower.strip_prefix("notho").unwrap_or(lower).trim();
        match lower {
            "kingdom" | "regnum" => Some(Self::Kingdom),
            "phylum" | "division" | "divisio" => Some(Self::Phylum),
            "class" | "classis" => Some(Self::Class),
            "order" | "ordo" => Some(Self::Order),
            "family" | "familia" | "fam" => Some(Self::Family),
            "genus" | "gen" => Some(Self::Genus),
            "species" | "sp" => Some(Self::Species),
            "subspecies" | "subsp" | "ssp" => Some(Self::Subspecies),
            "variety" | "var" => Some(Self::Variety),
            "form" | "forma" | "f" => Some(Self::Form),
            "cultivar" | "cv" => Some(Self::Cultivar),
            "unranked" => Some(Self::Unranked),
            _ => None,
        }
    }

}

impl fmt::Display for RankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RankType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_marker(s).ok_or_else(|| format!("Invalid rank: {}", s))
    }
}

// =============================================================================
// SYNONYMY
// =============================================================================

/// Relationship of a synonym record to its accepted concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynonymType {
    Homonym,
    InvalidPublication,
    /// Name has been misapplied to the accepted concept in the past
    Misapplied,
    Replaced,
    TradeName,
    Variant,
    /// Name is excluded from the checklist
    Excludes,
    Synonym,
    ObjectiveSynonym,
    OriginalSpelling,
    ReplacementName,
    SubjectiveSynonym,
    SubsequentMisspelling,
}

// =============================================================================
// MATCH AND ERROR TAGS
// =============================================================================

/// How a result was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Canonical,
    Phrase,
    /// Phonetic match on genus/species/infraspecific codes
    Soundex,
    /// Matched after widening the query to a higher rank
    Recursive,
    Vernacular,
    TaxonId,
}

impl MatchType {
    /// Title used in reports and logs.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Exact => "exactMatch",
            Self::Canonical => "canonicalMatch",
            Self::Phrase => "phraseMatch",
            Self::Soundex => "fuzzyMatch",
            Self::Recursive => "higherMatch",
            Self::Vernacular => "vernacularMatch",
            Self::TaxonId => "taxonIdMatch",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Issue flags accumulated during one resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Homonym,
    Misapplied,
    MatchMisapplied,
    ParentChildSynonym,
    Excluded,
    AssociatedExcluded,
    AffinitySpecies,
    ConferSpecies,
    QuestionSpecies,
    Generic,
    None,
}

impl ErrorType {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Homonym => "homonym",
            Self::Misapplied => "misappliedName",
            Self::MatchMisapplied => "matchedToMisappliedName",
            Self::ParentChildSynonym => "parentChildSynonym",
            Self::Excluded => "excludedSpecies",
            Self::AssociatedExcluded => "associatedNameExcluded",
            Self::AffinitySpecies => "affinitySpecies",
            Self::ConferSpecies => "conferSpecies",
            Self::QuestionSpecies => "questionSpecies",
            Self::Generic => "genericError",
            Self::None => "noIssue",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Classification of a raw name string produced by a name parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameType {
    Scientific,
    Hybrid,
    Virus,
    Informal,
    Doubtful,
    Cultivar,
    Phrase,
    Unparsable,
}

impl NameType {
    /// Name types for which a parser yields structured name parts.
    pub const fn is_parsable(self) -> bool {
        matches!(
            self,
            Self::Scientific | Self::Informal | Self::Doubtful | Self::Cultivar | Self::Phrase
        )
    }
}

impl fmt::Display for NameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scientific => write!(f, "scientific"),
            Self::Hybrid => write!(f, "hybrid"),
            Self::Virus => write!(f, "virus"),
            Self::Informal => write!(f, "informal"),
            Self::Doubtful => write!(f, "doubtful"),
            Self::Cultivar => write!(f, "cultivar"),
            Self::Phrase => write!(f, "phrase"),
            Self::Unparsable => write!(f, "unparsable"),
        }
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// A partial Linnaean classification.
///
/// Used both for the caller's query (any subset of levels, plus optional
/// rank, authorship and scientific name) and for the higher classification
/// stored on a taxon concept.
///
/// `species` holds the binomial ("Macropus rufus"); `specific_epithet` holds
/// the bare epithet ("rufus").
///
/// # Example
/// ```
/// use nomen_core::{Classification, RankType};
///
/// let query = Classification::new()
///     .with_kingdom("Animalia")
///     .with_genus("Macropus");
/// assert_eq!(query.get(RankType::Kingdom), Some("Animalia"));
/// assert_eq!(query.get(RankType::Family), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    #[serde(rename = "class")]
    pub klass: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub specific_epithet: Option<String>,
    pub subspecies: Option<String>,
    pub infraspecific_epithet: Option<String>,
    pub authorship: Option<String>,
    pub rank: Option<RankType>,
    pub scientific_name: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for a bare scientific name.
    pub fn for_name(name: impl Into<String>) -> Self {
        Self {
            scientific_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_kingdom(mut self, kingdom: impl Into<String>) -> Self {
        self.kingdom = Some(kingdom.into());
        self
    }

    pub fn with_phylum(mut self, phylum: impl Into<String>) -> Self {
        self.phylum = Some(phylum.into());
        self
    }

    pub fn with_class(mut self, klass: impl Into<String>) -> Self {
        self.klass = Some(klass.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_genus(mut self, genus: impl Into<String>) -> Self {
        self.genus = Some(genus.into());
        self
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn with_specific_epithet(mut self, epithet: impl Into<String>) -> Self {
        self.specific_epithet = Some(epithet.into());
        self
    }

    pub fn with_subspecies(mut self, subspecies: impl Into<String>) -> Self {
        self.subspecies = Some(subspecies.into());
        self
    }

    pub fn with_infraspecific_epithet(mut self, epithet: impl Into<String>) -> Self {
        self.infraspecific_epithet = Some(epithet.into());
        self
    }

    pub fn with_authorship(mut self, authorship: impl Into<String>) -> Self {
        self.authorship = Some(authorship.into());
        self
    }

    pub fn with_rank(mut self, rank: RankType) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Value at a Linnaean level, ignoring blank strings. Subspecies and the
    /// other infraspecific ranks read the `subspecies` field.
    pub fn get(&self, rank: RankType) -> Option<&str> {
        match rank {
            RankType::Kingdom => non_empty(&self.kingdom),
            RankType::Phylum => non_empty(&self.phylum),
            RankType::Class => non_empty(&self.klass),
            RankType::Order => non_empty(&self.order),
            RankType::Family => non_empty(&self.family),
            RankType::Genus => non_empty(&self.genus),
            RankType::Species => non_empty(&self.species),
            RankType::Subspecies | RankType::Variety | RankType::Form => {
                non_empty(&self.subspecies)
            }
            RankType::Cultivar | RankType::Unranked => None,
        }
    }

    /// Sets the value at a Linnaean level. Ranks without a field are ignored.
    pub fn set(&mut self, rank: RankType, value: Option<String>) {
        match rank {
            RankType::Kingdom => self.kingdom = value,
            RankType::Phylum => self.phylum = value,
            RankType::Class => self.klass = value,
            RankType::Order => self.order = value,
            RankType::Family => self.family = value,
            RankType::Genus => self.genus = value,
            RankType::Species => self.species = value,
            RankType::Subspecies | RankType::Variety | RankType::Form => self.subspecies = value,
            RankType::Cultivar | RankType::Unranked => {}
        }
    }

    pub fn specific_epithet(&self) -> Option<&str> {
        non_empty(&self.specific_epithet)
    }

    pub fn infraspecific_epithet(&self) -> Option<&str> {
        non_empty(&self.infraspecific_epithet)
    }

    pub fn authorship(&self) -> Option<&str> {
        non_empty(&self.authorship)
    }

    pub fn scientific_name(&self) -> Option<&str> {
        non_empty(&self.scientific_name)
    }

    /// Checks that every level of `self` populated at or above `level` agrees
    /// (case-insensitively) with `other`.
    ///
    /// Levels absent from `self` are not compared; a level present in `self`
    /// but absent from `other` is a mismatch.
    pub fn has_identical_classification(&self, other: &Classification, level: RankType) -> bool {
        let checked = [
            RankType::Kingdom,
            RankType::Phylum,
            RankType::Class,
            RankType::Order,
            RankType::Family,
            RankType::Genus,
            RankType::Species,
            RankType::Subspecies,
        ];
        checked
            .into_iter()
            .filter(|rank| rank.id() <= level.id())
            .all(|rank| match self.get(rank) {
                Some(mine) => other
                    .get(rank)
                    .map(|theirs| theirs.eq_ignore_ascii_case(mine))
                    .unwrap_or(false),
                None => true,
            })
    }

    /// Minimal classification holding only the genus, plus the species when
    /// `rank` is species. Starting point for homonym lookups.
    pub fn homonym_key(&self, rank: RankType) -> Classification {
        let mut key = Classification {
            genus: self.get(RankType::Genus).map(str::to_string),
            ..Default::default()
        };
        if rank == RankType::Species {
            key.species = self.get(RankType::Species).map(str::to_string);
        }
        key
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rank in RankType::LINNAEAN {
            if let Some(value) = self.get(rank) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", rank, value)?;
                first = false;
            }
        }
        if let Some(author) = self.authorship() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "authorship={}", author)?;
        }
        Ok(())
    }
}

/// Identifiers of the higher taxa in a stored classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationIds {
    pub kingdom_id: Option<String>,
    pub phylum_id: Option<String>,
    pub class_id: Option<String>,
    pub order_id: Option<String>,
    pub family_id: Option<String>,
    pub genus_id: Option<String>,
    pub species_id: Option<String>,
}

// =============================================================================
// TAXON CONCEPTS
// =============================================================================

/// Phonetic codes of the name parts, as produced by the taxon soundex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneticCodes {
    pub genus: Option<String>,
    pub species: Option<String>,
    pub infraspecific: Option<String>,
}

/// Cleaned placeholder-name fields stored for phrase names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseFields {
    pub phrase: Option<String>,
    pub voucher: Option<String>,
    pub specific_epithet: Option<String>,
}

/// A record of the taxonomic index. Immutable at query time.
///
/// A record is either accepted (`accepted_lsid` is `None`) or a synonym
/// pointing at exactly one accepted record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonConcept {
    pub id: String,
    pub lsid: Option<String>,
    /// Other identifiers merged into this record
    pub alternative_lsids: Vec<String>,
    pub accepted_lsid: Option<String>,
    pub synonym_type: Option<SynonymType>,
    pub scientific_name: String,
    pub canonical_name: Option<String>,
    pub authorship: Option<String>,
    pub rank: Option<RankType>,
    pub classification: Classification,
    pub classification_ids: ClassificationIds,
    /// Nested-set bounds; a descendant's `left` lies strictly between its
    /// ancestor's `left` and `right`
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub phonetic: PhoneticCodes,
    pub phrase: Option<PhraseFields>,
    /// Added by the index builder rather than a source checklist
    pub externally_added: bool,
}

impl TaxonConcept {
    pub fn is_synonym(&self) -> bool {
        self.accepted_lsid.is_some()
    }

    pub fn is_misapplied(&self) -> bool {
        self.synonym_type == Some(SynonymType::Misapplied)
    }

    pub fn is_excluded(&self) -> bool {
        self.synonym_type == Some(SynonymType::Excludes)
    }

    /// LSID, falling back to the record id.
    pub fn stable_id(&self) -> &str {
        self.lsid.as_deref().unwrap_or(&self.id)
    }

    /// Identifier of the accepted concept; the record's own for accepted names.
    pub fn accepted_stable_id(&self) -> &str {
        self.accepted_lsid.as_deref().unwrap_or_else(|| self.stable_id())
    }

    /// Canonical name, falling back to the stored scientific name.
    pub fn canonical(&self) -> &str {
        self.canonical_name.as_deref().unwrap_or(&self.scientific_name)
    }

    /// Scientific name followed by authorship, when one is recorded.
    pub fn complete_name(&self) -> String {
        match self.authorship.as_deref() {
            Some(author) if !author.trim().is_empty() => {
                format!("{} {}", self.scientific_name, author.trim())
            }
            _ => self.scientific_name.clone(),
        }
    }

    /// True when `other` lies strictly inside this record's nested-set span.
    pub fn contains(&self, other: &TaxonConcept) -> bool {
        match (self.left, self.right, other.left) {
            (Some(left), Some(right), Some(inner)) => inner > left && inner < right,
            _ => false,
        }
    }
}

/// A taxon concept returned by a search, tagged with how it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub concept: Arc<TaxonConcept>,
    pub match_type: MatchType,
    /// Match quality in `[0, 1]` assigned by the scorer
    pub score: f64,
}

impl MatchResult {
    pub fn new(concept: Arc<TaxonConcept>, match_type: MatchType) -> Self {
        Self {
            concept,
            match_type,
            score: 0.0,
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn is_synonym(&self) -> bool {
        self.concept.is_synonym()
    }

    pub fn stable_id(&self) -> &str {
        self.concept.stable_id()
    }

    pub fn id(&self) -> &str {
        &self.concept.id
    }

    pub fn rank(&self) -> Option<RankType> {
        self.concept.rank
    }
}

// =============================================================================
// PARSED NAMES
// =============================================================================

/// Cleaned components of a phrase (placeholder) name such as
/// `Marsilea sp. Neutral Junction (D.E.Albrecht 9192)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseName {
    pub genus: String,
    pub clean_phrase: Option<String>,
    pub clean_voucher: Option<String>,
    /// Specific epithet for names like `Aus bus subsp. Location`; `None` for `sp.`
    pub specific_epithet: Option<String>,
    pub rank_marker: Option<String>,
}

/// Structured parse of a raw name string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub name_type: NameType,
    pub genus_or_above: Option<String>,
    pub specific_epithet: Option<String>,
    pub infraspecific_epithet: Option<String>,
    pub authorship: Option<String>,
    pub rank_marker: Option<String>,
    pub cultivar: Option<String>,
    pub phrase: Option<PhraseName>,
    /// Whether the authorship tail was recognised
    pub authors_parsed: bool,
}

impl ParsedName {
    pub fn new(name_type: NameType) -> Self {
        Self {
            name_type,
            genus_or_above: None,
            specific_epithet: None,
            infraspecific_epithet: None,
            authorship: None,
            rank_marker: None,
            cultivar: None,
            phrase: None,
            authors_parsed: true,
        }
    }

    pub fn is_binomial(&self) -> bool {
        self.genus_or_above.is_some() && self.specific_epithet.is_some()
    }

    /// Rank implied by the rank marker, if any.
    pub fn rank(&self) -> Option<RankType> {
        self.rank_marker.as_deref().and_then(RankType::from_marker)
    }

    /// The name without authorship and rank-marker noise.
    ///
    /// Only produced for parsable names that are neither informal nor
    /// doubtful.
    pub fn canonical_name(&self) -> Option<String> {
        if !self.name_type.is_parsable()
            || matches!(self.name_type, NameType::Informal | NameType::Doubtful)
        {
            return None;
        }
        let mut parts: Vec<String> = Vec::new();
        parts.push(self.genus_or_above.clone()?);
        if let Some(species) = &self.specific_epithet {
            parts.push(species.clone());
        }
        if let Some(infra) = &self.infraspecific_epithet {
            parts.push(infra.clone());
        }
        if let Some(cultivar) = &self.cultivar {
            parts.push(format!("'{}'", cultivar));
        }
        Some(parts.join(" "))
    }
}

/// Raised by a name parser that cannot produce structured parts. Still
/// carries a best-guess name type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to parse {name:?} as a {name_type} name")]
pub struct Unparsable {
    pub name: String,
    pub name_type: NameType,
}

impl Unparsable {
    pub fn new(name: impl Into<String>, name_type: NameType) -> Self {
        Self {
            name: name.into(),
            name_type,
        }
    }
}

/// Returns true for the specific-epithet placeholders `sp`, `sp.` and `sp. nov.`.
pub fn is_specific_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.eq_ignore_ascii_case("sp")
        || trimmed.eq_ignore_ascii_case("sp.")
        || trimmed.replace(' ', "").eq_ignore_ascii_case("sp.nov.")
}

/// Returns true for the infraspecific placeholders `spp` and `spp.`.
pub fn is_infraspecific_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.eq_ignore_ascii_case("spp") || trimmed.eq_ignore_ascii_case("spp.")
}
