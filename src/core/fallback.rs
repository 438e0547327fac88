use crate::models::{Criteria, MatchKind, RankedCandidate};

/// How many candidates the broadened "similar profiles" re-run returns.
pub const SIMILAR_LIMIT: usize = 6;

/// The criteria and labeling the immediate query should run with.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub criteria: Criteria,
    pub kind: MatchKind,
}

/// Final, labeled result of one search submission.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub kind: MatchKind,
    pub results: Vec<RankedCandidate>,
}

/// Decide the first query to run.
///
/// Empty criteria (extraction produced nothing usable) is substituted with
/// the implicit `{status: Available}` filter so the user is never shown an
/// unconditioned dump nor a hard failure.
pub fn plan(normalized: &Criteria) -> QueryPlan {
    if normalized.is_empty() {
        QueryPlan {
            criteria: Criteria::available_only(),
            kind: MatchKind::DefaultAvailable,
        }
    } else {
        QueryPlan {
            criteria: normalized.clone(),
            kind: MatchKind::Matched,
        }
    }
}

/// Whether a zero-result outcome should be broadened into a "similar
/// profiles" re-run. Fires only for the criteria-constrained first pass
/// when `position` was one of the supplied constraints, and at most once
/// per submission (the broadened run never re-enters here).
pub fn should_broaden(kind: MatchKind, normalized: &Criteria, result_count: usize) -> bool {
    kind == MatchKind::Matched && result_count == 0 && normalized.position.is_some()
}

/// Attach the final label. A list that ends up empty is the true empty
/// state regardless of how it was produced.
pub fn finalize(kind: MatchKind, results: Vec<RankedCandidate>) -> SearchOutcome {
    let kind = if results.is_empty() { MatchKind::Empty } else { kind };
    SearchOutcome { kind, results }
}
