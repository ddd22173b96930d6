//! Structured queries against the taxonomic index.
//!
//! Queries are plain values: the search engine builds them with pure
//! functions and hands them to a [`TaxonIndex`](crate::TaxonIndex)
//! implementation, which evaluates them and returns scored hits.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{RankType, TaxonConcept};

// =============================================================================
// FIELDS
// =============================================================================

/// Searchable fields of a taxon concept record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexField {
    Id,
    Lsid,
    /// Scientific name, canonical name or name with authorship
    Name,
    Rank,
    RankId,
    IsSynonym,
    /// Record added by the index builder rather than a checklist
    ExternallyAdded,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Specific,
    Phrase,
    Voucher,
    Author,
    GenusSoundex,
    SpeciesSoundex,
    InfraSoundex,
}

impl IndexField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Lsid => "lsid",
            Self::Name => "name",
            Self::Rank => "rank",
            Self::RankId => "rank_id",
            Self::IsSynonym => "is_synonym",
            Self::ExternallyAdded => "ala",
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
            Self::Specific => "specific",
            Self::Phrase => "phrase",
            Self::Voucher => "voucher",
            Self::Author => "author",
            Self::GenusSoundex => "genus_ex",
            Self::SpeciesSoundex => "species_ex",
            Self::InfraSoundex => "infra_ex",
        }
    }

    /// Classification field for a Linnaean rank.
    pub fn for_rank(rank: RankType) -> Option<Self> {
        match rank {
            RankType::Kingdom => Some(Self::Kingdom),
            RankType::Phylum => Some(Self::Phylum),
            RankType::Class => Some(Self::Class),
            RankType::Order => Some(Self::Order),
            RankType::Family => Some(Self::Family),
            RankType::Genus => Some(Self::Genus),
            RankType::Species => Some(Self::Species),
            _ => None,
        }
    }
}

impl fmt::Display for IndexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// CLAUSES AND QUERIES
// =============================================================================

/// Value written for boolean flag fields.
pub const FLAG_TRUE: &str = "T";

/// One constraint in an index query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Clause {
    /// Case-insensitive, whitespace-normalized equality
    Term { field: IndexField, value: String },
    /// Inclusive numeric range
    Range { field: IndexField, min: u32, max: u32 },
    /// Satisfied when any nested clause is
    AnyOf { clauses: Vec<Clause> },
    /// Approximate string match
    Fuzzy { field: IndexField, value: String },
}

impl Clause {
    pub fn term(field: IndexField, value: impl Into<String>) -> Self {
        Self::Term {
            field,
            value: value.into(),
        }
    }

    pub fn flag(field: IndexField) -> Self {
        Self::term(field, FLAG_TRUE)
    }

    pub fn range(field: IndexField, min: u32, max: u32) -> Self {
        Self::Range { field, min, max }
    }

    pub fn any_of(clauses: Vec<Clause>) -> Self {
        Self::AnyOf { clauses }
    }

    pub fn fuzzy(field: IndexField, value: impl Into<String>) -> Self {
        Self::Fuzzy {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term { field, value } if value == FLAG_TRUE => write!(f, "{}:{}", field, value),
            Self::Term { field, value } => write!(f, "{}:\"{}\"", field, value),
            Self::Range { field, min, max } => write!(f, "{}:[{} TO {}]", field, min, max),
            Self::AnyOf { clauses } => {
                write!(f, "(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "{}", clause)?;
                }
                write!(f, ")")
            }
            Self::Fuzzy { field, value } => write!(f, "{}:\"{}\"~", field, value),
        }
    }
}

/// A boolean index query: every required clause must match, optional
/// clauses only raise the hit score.
///
/// # Example
/// ```
/// use nomen_core::{Clause, IndexField, IndexQuery};
///
/// let query = IndexQuery::new(10)
///     .require(Clause::term(IndexField::Name, "Macropus"))
///     .boost(Clause::term(IndexField::Kingdom, "Animalia"));
///
/// assert_eq!(query.to_string(), "+name:\"Macropus\" kingdom:\"Animalia\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<Clause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<Clause>,
    pub limit: usize,
}

impl IndexQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
            limit,
        }
    }

    /// Adds a clause every hit must satisfy.
    pub fn require(mut self, clause: Clause) -> Self {
        self.required.push(clause);
        self
    }

    /// Adds a clause that raises the score of hits satisfying it.
    pub fn boost(mut self, clause: Clause) -> Self {
        self.optional.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

impl fmt::Display for IndexQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .required
            .iter()
            .map(|c| format!("+{}", c))
            .chain(self.optional.iter().map(|c| c.to_string()))
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// A scored record returned by the taxonomic index.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub concept: Arc<TaxonConcept>,
    pub score: f32,
}
