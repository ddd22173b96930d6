//! Stateless construction of index queries.
//!
//! Every function here is pure: it turns a name, rank and classification into
//! an [`IndexQuery`] value. Nothing is cached between calls, so the builders
//! can be used from any number of threads at once.

use once_cell::sync::Lazy;
use regex::Regex;

use nomen_core::defaults::{NO_INFRA_SOUNDEX, SPECIES_RANK_ID_MAX, SPECIES_RANK_ID_MIN};
use nomen_core::{Classification, Clause, IndexField, IndexQuery, PhraseName, RankType};

/// Levels added as optional clauses to name queries.
const BOOSTED_LEVELS: [RankType; 6] = [
    RankType::Kingdom,
    RankType::Phylum,
    RankType::Class,
    RankType::Order,
    RankType::Family,
    RankType::Genus,
];

static COMMON_NAME_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z0-9ÏËÖÜÄÉÈČÁÀÆŒ]").expect("valid common name regex"));

/// Rank constraint for name queries.
///
/// At species level or below the constraint is widened to the whole
/// infraspecific id range, and synonyms and externally added records always
/// pass, since their stored rank is often stale.
pub fn rank_clause(rank: RankType) -> Clause {
    let rank_match = if rank.id() >= SPECIES_RANK_ID_MIN {
        Clause::range(IndexField::RankId, SPECIES_RANK_ID_MIN, SPECIES_RANK_ID_MAX)
    } else {
        Clause::term(IndexField::Rank, rank.label())
    };
    Clause::any_of(vec![
        rank_match,
        Clause::flag(IndexField::IsSynonym),
        Clause::flag(IndexField::ExternallyAdded),
    ])
}

/// Adds the supplied higher classification as optional clauses. A wrong
/// higher level lowers a hit's score but never removes it.
fn with_classification(mut query: IndexQuery, cl: Option<&Classification>) -> IndexQuery {
    let Some(cl) = cl else {
        return query;
    };
    for level in BOOSTED_LEVELS {
        if let (Some(value), Some(field)) = (cl.get(level), IndexField::for_rank(level)) {
            query = query.boost(Clause::term(field, value));
        }
    }
    if let Some(author) = cl.authorship() {
        query = query.boost(Clause::fuzzy(IndexField::Author, author));
    }
    query
}

/// Query on the primary name field, used by the exact and canonical stages.
///
/// # Example
/// ```
/// use nomen_core::{Classification, RankType};
/// use nomen_search::query::name_query;
///
/// let cl = Classification::new().with_kingdom("Animalia");
/// let query = name_query("Macropus", Some(RankType::Genus), Some(&cl), 10);
/// assert_eq!(
///     query.to_string(),
///     "+name:\"Macropus\" +(rank:\"genus\" OR is_synonym:T OR ala:T) kingdom:\"Animalia\""
/// );
/// ```
pub fn name_query(
    name: &str,
    rank: Option<RankType>,
    cl: Option<&Classification>,
    limit: usize,
) -> IndexQuery {
    let mut query = IndexQuery::new(limit).require(Clause::term(IndexField::Name, name));
    if let Some(rank) = rank {
        query = query.require(rank_clause(rank));
    }
    with_classification(query, cl)
}

/// Query on the cleaned phrase-name fields. Absent parts are left out.
pub fn phrase_query(phrase: &PhraseName, limit: usize) -> IndexQuery {
    let mut query = IndexQuery::new(limit).require(Clause::term(IndexField::Genus, &phrase.genus));
    if let Some(location) = &phrase.clean_phrase {
        query = query.require(Clause::term(IndexField::Phrase, location));
    }
    if let Some(voucher) = &phrase.clean_voucher {
        query = query.require(Clause::term(IndexField::Voucher, voucher));
    }
    if let Some(specific) = &phrase.specific_epithet {
        query = query.require(Clause::term(IndexField::Specific, specific));
    }
    query
}

/// Phrase-style query for a cultivar epithet within a genus.
pub fn cultivar_query(genus: &str, cultivar: &str, limit: usize) -> IndexQuery {
    IndexQuery::new(limit)
        .require(Clause::term(IndexField::Genus, genus))
        .require(Clause::term(IndexField::Phrase, cultivar))
}

/// Query on the phonetic code fields. A missing infraspecific code searches
/// for records that have none.
pub fn soundex_query(
    genus_code: &str,
    species_code: &str,
    infra_code: Option<&str>,
    rank: Option<RankType>,
    cl: Option<&Classification>,
    limit: usize,
) -> IndexQuery {
    let mut query = IndexQuery::new(limit)
        .require(Clause::term(IndexField::GenusSoundex, genus_code))
        .require(Clause::term(IndexField::SpeciesSoundex, species_code))
        .require(Clause::term(
            IndexField::InfraSoundex,
            infra_code.unwrap_or(NO_INFRA_SOUNDEX),
        ));
    if let Some(rank) = rank {
        query = query.require(rank_clause(rank));
    }
    with_classification(query, cl)
}

/// Normalises a common name to the form stored in the vernacular index:
/// upper case, letters and digits only.
pub fn normalize_common_name(name: &str) -> String {
    COMMON_NAME_STRIP
        .replace_all(&name.to_uppercase(), "")
        .into_owned()
}
