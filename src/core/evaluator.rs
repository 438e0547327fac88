use crate::core::query::satisfies;
use crate::models::{CandidateProfile, SearchStatus, StandingSearch};

/// Find every active standing search the profile satisfies.
///
/// Uses the same evaluation rules as the immediate query path. Expired
/// searches never match, whatever their criteria. Duplicate suppression
/// for repeated invocations is not this function's job; the dispatcher's
/// uniqueness constraint guarantees it.
pub fn matching_searches<'a>(
    profile: &CandidateProfile,
    searches: &'a [StandingSearch],
) -> Vec<&'a StandingSearch> {
    searches
        .iter()
        .filter(|search| search.status == SearchStatus::Active)
        .filter(|search| satisfies(profile, &search.criteria))
        .collect()
}
