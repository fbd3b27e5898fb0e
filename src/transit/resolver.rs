//! Stop + line to arrival estimates
//!
//! One feed fetch per call. Without an operator the distinct operators
//! running the line at the stop decide the outcome: none is a failure, one
//! is used directly, several require the user to choose.

use crate::i18n::Language;
use crate::reference::OperatorDirectory;
use crate::transit::visits::{self, VehicleVisit};
use crate::transit::{Clock, FailureKind, FeedClient, ResolutionResult, TransitQuery};
use std::sync::Arc;

/// Resolves transit queries against the real-time feed
#[derive(Clone)]
pub struct TransitResolver {
    feed: Arc<dyn FeedClient>,
    operators: Arc<OperatorDirectory>,
    clock: Arc<dyn Clock>,
}

impl TransitResolver {
    /// Create a resolver
    pub fn new(
        feed: Arc<dyn FeedClient>,
        operators: Arc<OperatorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feed,
            operators,
            clock,
        }
    }

    /// Operator directory used for labels
    pub fn operators(&self) -> &OperatorDirectory {
        &self.operators
    }

    /// Resolve `query` into arrivals, an operator choice, or a failure
    ///
    /// `language` only affects the failure reason text.
    pub async fn resolve(&self, query: &TransitQuery, language: Language) -> ResolutionResult {
        let messages = language.messages();

        let snapshot = match self.feed.stop_monitoring(&query.stop_number).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "Feed unavailable for stop {}: {}",
                    query.stop_number,
                    e
                );
                return ResolutionResult::Failure {
                    kind: FailureKind::FeedUnavailable,
                    reason: messages.feed_unavailable.to_string(),
                };
            }
        };

        let all_visits = visits::monitored_visits(&snapshot);
        tracing::debug!(
            "Stop {} snapshot holds {} visits",
            query.stop_number,
            all_visits.len()
        );

        let operator = match &query.operator_id {
            Some(operator) => operator.clone(),
            None => {
                let candidates =
                    visits::operators_for_line(&all_visits, &query.stop_number, &query.line_number);
                match candidates.len() {
                    0 => {
                        tracing::info!(
                            "No operator runs line {} at stop {}",
                            query.line_number,
                            query.stop_number
                        );
                        return ResolutionResult::Failure {
                            kind: FailureKind::NoOperatorFound,
                            reason: messages.no_operator.to_string(),
                        };
                    }
                    1 => candidates[0].1.clone(),
                    n => {
                        tracing::info!(
                            "{} operators run line {} at stop {}",
                            n,
                            query.line_number,
                            query.stop_number
                        );
                        let display_options = candidates
                            .iter()
                            .enumerate()
                            .map(|(idx, (_, operator))| {
                                self.operators.option_label(idx + 1, operator)
                            })
                            .collect();
                        return ResolutionResult::AmbiguousOperator {
                            candidates,
                            display_options,
                        };
                    }
                }
            }
        };

        let matched: Vec<&VehicleVisit> = visits::visits_for(
            &all_visits,
            &query.stop_number,
            &query.line_number,
            &operator,
        );
        let now = self.clock.now();
        let etas = matched
            .iter()
            .map(|visit| {
                visit
                    .expected_arrival_time
                    .as_deref()
                    .and_then(|raw| visits::eta_minutes(raw, now))
            })
            .collect();

        ResolutionResult::Success {
            stop: query.stop_number.clone(),
            line: query.line_number.clone(),
            operator_label: self.operators.label(&operator),
            operator,
            line_ref: matched.first().and_then(|visit| visit.line_ref.clone()),
            etas,
        }
    }
}
