use crate::models::{CandidateProfile, Criteria, RankedCandidate};

/// Hard cap on candidates returned per query. Keeps loose criteria from
/// producing unbounded result sets.
pub const RESULT_CAP: usize = 20;

/// Test whether a candidate satisfies every present criteria field.
///
/// Present fields narrow the set via conjunction; absent fields impose no
/// constraint. String fields match by case-insensitive substring
/// containment (the criteria value contained in the candidate value), so
/// "Armador" tolerates "Armador Central" and spelling variance in
/// external data. Numeric fields use inclusive bounds.
pub fn satisfies(profile: &CandidateProfile, criteria: &Criteria) -> bool {
    if let Some(position) = &criteria.position {
        if !contains_ci(&profile.position, position.as_str()) {
            return false;
        }
    }

    if let Some(nationality) = &criteria.nationality {
        if !contains_ci(&profile.nationality, nationality) {
            return false;
        }
    }

    if let Some(min) = criteria.height_min {
        if profile.height_cm < min {
            return false;
        }
    }

    if let Some(max) = criteria.height_max {
        if profile.height_cm > max {
            return false;
        }
    }

    if let Some(status) = &criteria.status {
        if !contains_ci(&profile.status, status.as_str()) {
            return false;
        }
    }

    if let Some(min) = criteria.experience_min {
        if profile.experience_years < min {
            return false;
        }
    }

    true
}

/// Case-insensitive substring containment.
#[inline]
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter candidates against the criteria, preserving repository order,
/// and attach presentation ranks.
///
/// The score is a deterministic, strictly decreasing function of the
/// result index. It only affects presentation order, never inclusion.
pub fn rank(candidates: Vec<CandidateProfile>, criteria: &Criteria, cap: usize) -> Vec<RankedCandidate> {
    candidates
        .into_iter()
        .filter(|profile| satisfies(profile, criteria))
        .take(cap)
        .enumerate()
        .map(|(index, profile)| RankedCandidate {
            candidate_id: profile.id,
            name: profile.name,
            avatar_url: profile.avatar_url,
            position: profile.position,
            nationality: profile.nationality,
            height_cm: profile.height_cm,
            status: profile.status,
            experience_years: profile.experience_years,
            contact: profile.contact_email,
            rank: index + 1,
            score: rank_score(index),
        })
        .collect()
}

/// Linear decay from 100 by result index.
#[inline]
fn rank_score(index: usize) -> f64 {
    100.0 - (index as f64) * (100.0 / RESULT_CAP as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityStatus, Position};

    fn candidate(id: &str, position: &str, nationality: &str, height_cm: u16, status: &str) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            name: format!("Athlete {}", id),
            avatar_url: None,
            position: position.to_string(),
            nationality: nationality.to_string(),
            height_cm,
            status: status.to_string(),
            experience_years: 5,
            contact_email: Some(format!("{}@example.com", id)),
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let profile = candidate("1", "Pivô", "Argentina", 175, "UnderContract");
        assert!(satisfies(&profile, &Criteria::default()));
    }

    #[test]
    fn test_conjunction_of_present_fields() {
        let criteria = Criteria {
            position: Some(Position::ArmadorCentral),
            nationality: Some("Brasil".to_string()),
            height_min: Some(190),
            status: Some(AvailabilityStatus::Available),
            ..Criteria::default()
        };

        let good = candidate("1", "Armador Central", "Brasil", 192, "Available");
        assert!(satisfies(&good, &criteria));

        let wrong_nationality = candidate("2", "Armador Central", "Argentina", 192, "Available");
        assert!(!satisfies(&wrong_nationality, &criteria));

        let too_short = candidate("3", "Armador Central", "Brasil", 185, "Available");
        assert!(!satisfies(&too_short, &criteria));
    }

    #[test]
    fn test_substring_containment() {
        let criteria = Criteria {
            nationality: Some("brasil".to_string()),
            ..Criteria::default()
        };
        let profile = candidate("1", "Pivô", "Brasileiro", 190, "Available");
        assert!(satisfies(&profile, &criteria));
    }

    #[test]
    fn test_inclusive_bounds() {
        let criteria = Criteria {
            height_min: Some(190),
            height_max: Some(200),
            experience_min: Some(5),
            ..Criteria::default()
        };

        let at_min = candidate("1", "Pivô", "Brasil", 190, "Available");
        let at_max = candidate("2", "Pivô", "Brasil", 200, "Available");
        assert!(satisfies(&at_min, &criteria));
        assert!(satisfies(&at_max, &criteria));

        let below = candidate("3", "Pivô", "Brasil", 189, "Available");
        assert!(!satisfies(&below, &criteria));
    }

    #[test]
    fn test_rank_preserves_repository_order_and_caps() {
        let candidates: Vec<CandidateProfile> = (0..30)
            .map(|i| candidate(&i.to_string(), "Pivô", "Brasil", 190, "Available"))
            .collect();

        let ranked = rank(candidates, &Criteria::default(), RESULT_CAP);

        assert_eq!(ranked.len(), RESULT_CAP);
        for (i, r) in ranked.iter().enumerate() {
            assert_eq!(r.candidate_id, i.to_string());
            assert_eq!(r.rank, i + 1);
        }
    }

    #[test]
    fn test_scores_strictly_decreasing() {
        let candidates: Vec<CandidateProfile> = (0..10)
            .map(|i| candidate(&i.to_string(), "Pivô", "Brasil", 190, "Available"))
            .collect();

        let ranked = rank(candidates, &Criteria::default(), RESULT_CAP);

        for pair in ranked.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }
    }

    #[test]
    fn test_score_never_affects_inclusion() {
        let criteria = Criteria {
            position: Some(Position::Pivo),
            ..Criteria::default()
        };
        let candidates = vec![
            candidate("keep", "Pivô", "Brasil", 190, "Available"),
            candidate("drop", "Goleiro", "Brasil", 190, "Available"),
        ];

        let ranked = rank(candidates, &criteria, RESULT_CAP);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate_id, "keep");
    }
}
