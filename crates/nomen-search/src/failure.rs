//! Typed match failures.
//!
//! A failure is not a bare error code: each kind carries the results that
//! caused it, so callers can still pull out the best available match. The
//! recursive controller turns every failure into an [`ErrorType`] flag plus
//! that best result; the single-shot lookups return the failure as is.

use nomen_core::{ErrorType, MatchResult};
use thiserror::Error;

/// Result type alias for searches that can end in a typed match failure.
pub type SearchResult<T> = std::result::Result<T, SearchFailure>;

/// Why a search was rejected before any matching took place.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericReason {
    #[error("Null value supplied for the name")]
    NullName,
    #[error("Supplied scientific name is a rank marker")]
    RankMarker,
    /// "spp." applies to several species of a genus, not to one taxon
    #[error("Can not match to a subset of species within a genus")]
    SubsetOfSpecies,
}

/// A match attempt that found something it cannot return as a clean result.
#[derive(Error, Debug)]
pub enum SearchFailure {
    #[error("Unable to perform search. {0}")]
    Generic(GenericReason),

    /// Unresolved ambiguity at genus, species or across ranks
    #[error("Homonym: {message}")]
    Homonym {
        message: String,
        results: Vec<MatchResult>,
    },

    /// Match resolves to an excluded name, possibly alongside a usable one
    #[error("{}", excluded_message(.non_excluded))]
    Excluded {
        excluded: MatchResult,
        non_excluded: Option<MatchResult>,
    },

    /// Match is a misapplied usage. `misapplied` holds the accepted target of
    /// the misapplication when a usable match exists alongside it; otherwise
    /// `matched` holds that target, or nothing when misapplications disagree.
    #[error("{}", misapplied_message(.misapplied))]
    Misapplied {
        matched: Option<MatchResult>,
        misapplied: Option<MatchResult>,
    },

    /// An accepted parent and a synonym whose accepted concept is its child
    #[error("Parent-child synonym: {} contains {}", .parent.concept.scientific_name, .child.concept.scientific_name)]
    ParentChildSynonym {
        parent: MatchResult,
        child: MatchResult,
    },

    /// Index access failed
    #[error(transparent)]
    Index(#[from] nomen_core::Error),
}

fn excluded_message(non_excluded: &Option<MatchResult>) -> &'static str {
    if non_excluded.is_some() {
        "One of the results was excluded. Use the non-excluded name for your match."
    } else {
        "The result is a name that has been excluded"
    }
}

fn misapplied_message(misapplied: &Option<MatchResult>) -> &'static str {
    if misapplied.is_some() {
        "The name has been misapplied to another concept in addition to the matched concept"
    } else {
        "The name is a misapplied name"
    }
}

impl SearchFailure {
    pub fn homonym(message: impl Into<String>, results: Vec<MatchResult>) -> Self {
        Self::Homonym {
            message: message.into(),
            results,
        }
    }

    /// Issue flag recorded for this failure.
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::Generic(_) | Self::Index(_) => ErrorType::Generic,
            Self::Homonym { .. } => ErrorType::Homonym,
            Self::Excluded {
                non_excluded: Some(_),
                ..
            } => ErrorType::AssociatedExcluded,
            Self::Excluded { .. } => ErrorType::Excluded,
            Self::Misapplied {
                matched: Some(_),
                misapplied: Some(_),
            } => ErrorType::MatchMisapplied,
            Self::Misapplied { .. } => ErrorType::Misapplied,
            Self::ParentChildSynonym { .. } => ErrorType::ParentChildSynonym,
        }
    }

    /// The result a caller should fall back to, if the failure carries one.
    ///
    /// Homonyms and generic failures have none: picking one of several
    /// homonyms would be a guess.
    pub fn best_result(&self) -> Option<&MatchResult> {
        match self {
            Self::Excluded {
                excluded,
                non_excluded,
            } => Some(non_excluded.as_ref().unwrap_or(excluded)),
            Self::Misapplied { matched, .. } => matched.as_ref(),
            Self::ParentChildSynonym { child, .. } => Some(child),
            Self::Homonym { .. } | Self::Generic(_) | Self::Index(_) => None,
        }
    }

    /// Results attached to a homonym failure.
    pub fn homonym_results(&self) -> Option<&[MatchResult]> {
        match self {
            Self::Homonym { results, .. } => Some(results),
            _ => None,
        }
    }
}
