//! Test helpers for name resolution integration tests.
//!
//! Builds searchers over the JSON fixtures and provides assertions on
//! results and typed failures.

use std::io::Cursor;
use std::sync::Arc;

use nomen_search::{
    load_name_set, ErrorType, MatchResult, MatchType, MemoryHomonymIndex, MemoryTaxonIndex,
    MemoryVernacularIndex, NameSearcher, SearchFailure,
};

use crate::fixtures;

/// Searcher over the fixture checklist with the vernacular index and the
/// cross-rank homonym list loaded.
pub fn fixture_searcher() -> NameSearcher {
    nomen_search::logging::init_tracing();
    let index = MemoryTaxonIndex::from_json_reader(Cursor::new(fixtures::TAXA_JSON))
        .expect("fixture taxa load");
    let homonyms = MemoryHomonymIndex::from_json_reader(Cursor::new(fixtures::HOMONYMS_JSON))
        .expect("fixture homonyms load");
    let vernacular = MemoryVernacularIndex::from_json_reader(Cursor::new(fixtures::VERNACULAR_JSON))
        .expect("fixture vernacular load");
    let cross_rank = load_name_set(Cursor::new(fixtures::CROSS_RANK_HOMONYMS))
        .expect("fixture cross rank names load");

    NameSearcher::builder(Arc::new(index), Arc::new(homonyms))
        .with_vernacular_index(Arc::new(vernacular))
        .with_cross_rank_homonyms(cross_rank)
        .build()
        .expect("fixture searcher builds")
}

/// Asserts a list holds exactly one result with the given id.
pub fn assert_single(results: &[MatchResult], id: &str) {
    assert_eq!(
        results.len(),
        1,
        "expected one result, got {:?}",
        result_ids(results)
    );
    assert_eq!(results[0].id(), id);
}

/// Asserts a result was matched by one of the given match types.
pub fn assert_match_type(result: &MatchResult, expected: &[MatchType]) {
    assert!(
        expected.contains(&result.match_type),
        "match type {} not in {:?}",
        result.match_type,
        expected
    );
}

/// Asserts the failure kind and returns the id of its best result.
pub fn assert_failure(failure: &SearchFailure, expected: ErrorType) -> Option<String> {
    assert_eq!(
        failure.error_type(),
        expected,
        "unexpected failure: {}",
        failure
    );
    failure.best_result().map(|r| r.id().to_string())
}

pub fn result_ids(results: &[MatchResult]) -> Vec<&str> {
    results.iter().map(|r| r.id()).collect()
}
