//! Collaborator traits consumed by the resolution engine.
//!
//! The engine never owns storage or parsing: it talks to a taxonomic index,
//! a homonym reference index, a vernacular index and a name parser through
//! these traits. All of them are read-only and shared across threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Classification, ParsedName, RankType, TaxonConcept, Unparsable};
use crate::search::{IndexHit, IndexQuery};

// =============================================================================
// TAXONOMIC INDEX
// =============================================================================

/// Field-searchable store of taxon concept records.
pub trait TaxonIndex: Send + Sync {
    /// False until the index has been opened. Searches against an index that
    /// is not ready report "no index" rather than "no match".
    fn is_ready(&self) -> bool;

    /// Evaluates a query, returning at most `query.limit` hits ordered by
    /// descending score. Ties keep index order.
    fn search(&self, query: &IndexQuery) -> Result<Vec<IndexHit>>;

    /// Looks up a record by its internal identifier.
    fn get_by_id(&self, id: &str) -> Result<Option<Arc<TaxonConcept>>>;

    /// Looks up a record by its stable identifier (LSID).
    fn get_by_lsid(&self, lsid: &str) -> Result<Option<Arc<TaxonConcept>>>;

    /// Maps an identifier that may have been merged into another record to
    /// the primary identifier now carrying it.
    fn primary_lsid(&self, lsid: &str) -> Result<Option<String>>;
}

// =============================================================================
// HOMONYM REFERENCE INDEX
// =============================================================================

/// Secondary index of genus and species classification paths, used only to
/// count how many higher taxa share a name.
pub trait HomonymIndex: Send + Sync {
    /// Number of reference records of `rank` whose classification agrees with
    /// every populated level of `classification`.
    fn count_matches(&self, classification: &Classification, rank: RankType) -> Result<usize>;
}

// =============================================================================
// VERNACULAR INDEX
// =============================================================================

/// A common-name record pointing at a scientific name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VernacularHit {
    pub lsid: String,
    pub scientific_name: String,
}

/// Index of common names.
pub trait VernacularIndex: Send + Sync {
    /// Looks up records whose normalized common name equals `normalized`
    /// (upper-case letters and digits only).
    fn search(&self, normalized: &str, limit: usize) -> Result<Vec<VernacularHit>>;
}

// =============================================================================
// NAME PARSER
// =============================================================================

/// Splits a raw scientific name into structured parts.
///
/// A name that cannot be split still yields a best-guess name type through
/// [`Unparsable`].
pub trait NameParser: Send + Sync {
    fn parse(&self, name: &str) -> std::result::Result<ParsedName, Unparsable>;
}
