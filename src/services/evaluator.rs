use std::sync::Arc;

use crate::core::evaluator::matching_searches;
use crate::models::{CandidateProfile, EvaluationReport, StandingSearch};
use crate::services::notifications::{NotificationDispatcher, NotifyOutcome};
use crate::services::registry::StandingSearchRegistry;

/// Drives match evaluation for profile create/update events.
///
/// Tolerates at-least-once event delivery (re-evaluation cannot duplicate
/// notifications; that is the dispatcher's uniqueness invariant) and
/// concurrent invocation for different profiles. Failures never propagate
/// back to the event source.
pub struct MatchEvaluator {
    registry: Arc<StandingSearchRegistry>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl MatchEvaluator {
    pub fn new(registry: Arc<StandingSearchRegistry>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Evaluate one created/updated profile against every active standing
    /// search. Always returns a report; a registry fault is logged and
    /// reported as a failure, never raised.
    pub async fn on_profile_event(&self, profile: &CandidateProfile) -> EvaluationReport {
        let searches = match self.registry.all_active().await {
            Ok(searches) => searches,
            Err(e) => {
                tracing::error!("Failed to load active standing searches for {}: {}", profile.id, e);
                return EvaluationReport {
                    failures: 1,
                    ..EvaluationReport::default()
                };
            }
        };

        evaluate_against(profile, &searches, &self.dispatcher).await
    }
}

/// Evaluate a profile against the given standing searches and dispatch a
/// notification per satisfying one. A dispatch fault on one search is
/// isolated: logged, counted, and the remaining searches still evaluated.
pub async fn evaluate_against(
    profile: &CandidateProfile,
    searches: &[StandingSearch],
    dispatcher: &NotificationDispatcher,
) -> EvaluationReport {
    let matched = matching_searches(profile, searches);

    let mut report = EvaluationReport {
        evaluated: searches.len(),
        matched: matched.len(),
        ..EvaluationReport::default()
    };

    for search in matched {
        match dispatcher.notify(search, &profile.id).await {
            Ok(NotifyOutcome::Created { .. }) => report.notified += 1,
            Ok(NotifyOutcome::Duplicate) => report.duplicates += 1,
            Err(e) => {
                report.failures += 1;
                tracing::error!(
                    "Notification for search {} about candidate {} failed: {}",
                    search.id,
                    profile.id,
                    e
                );
            }
        }
    }

    if report.matched > 0 {
        tracing::info!(
            "Profile {} matched {} standing searches ({} notified, {} duplicates, {} failures)",
            profile.id,
            report.matched,
            report.notified,
            report.duplicates,
            report.failures
        );
    }

    report
}
