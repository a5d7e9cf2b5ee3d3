//! One-shot submission pipeline for the final wizard step.
//!
//! `Idle -> Validating -> {Idle-rejected | Submitting} -> {Submitted |
//! Idle-with-error}`. Validation covers every step, not just the current
//! one, so a user who deep-linked to the last step cannot bypass earlier
//! gates. The store lock is released across the one await point; a
//! generation check on re-lock discards responses that arrive after the
//! wizard was reset.

use async_trait::async_trait;

use crate::notifications::{Notifier, WizardEvent};

use super::error::{SubmitError, SubmitReceipt};
use super::payload::{build_payload, StaffPayload};
use super::rules::FieldErrors;
use super::steps::StepId;
use super::store::SharedStore;

/// External submit collaborator. Transport, retries, and authentication
/// live behind this seam.
#[async_trait]
pub trait SubmitService: Send + Sync {
    async fn submit(&self, payload: &StaffPayload) -> Result<SubmitReceipt, SubmitError>;
}

/// Result of one submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted by the server; the draft has been cleared.
    Submitted(SubmitReceipt),
    /// An earlier step failed validation; the collaborator was never
    /// called. Carries the first failing step so the user can be routed
    /// back.
    RejectedInvalid { step: StepId, errors: FieldErrors },
    /// The collaborator reported a failure; draft and errors stay intact.
    Failed(SubmitError),
    /// A submission is already in flight; this request was dropped.
    InFlight,
    /// The wizard was reset while the request was in flight; the response
    /// was discarded.
    Superseded,
}

pub struct SubmissionPipeline<S, N> {
    service: S,
    notifier: N,
}

impl<S: SubmitService, N: Notifier> SubmissionPipeline<S, N> {
    pub fn new(service: S, notifier: N) -> Self {
        Self { service, notifier }
    }

    pub async fn submit(&self, store: &SharedStore) -> SubmitOutcome {
        let (payload, generation) = {
            let mut guard = store.lock().expect("onboarding store lock poisoned");

            if guard.is_loading() {
                tracing::debug!("Submission already in flight, ignoring request");
                return SubmitOutcome::InFlight;
            }

            if let Err(failure) = guard.validate_all_steps() {
                self.notifier.notify(&WizardEvent::SubmissionRejected {
                    step: failure.step.ordinal(),
                    error_count: failure.errors.len(),
                });
                return SubmitOutcome::RejectedInvalid {
                    step: failure.step,
                    errors: failure.errors,
                };
            }

            guard.begin_submission();
            (build_payload(guard.draft()), guard.generation())
        };

        let result = self.service.submit(&payload).await;

        let mut guard = store.lock().expect("onboarding store lock poisoned");

        // The wizard was reset or torn down while we were waiting; a stale
        // success must not resurrect a cleared draft, a stale failure must
        // not attach errors to an abandoned one.
        if guard.generation() != generation {
            tracing::debug!("Discarding stale submission response");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(receipt) => {
                guard.complete_submission();
                self.notifier.notify(&WizardEvent::SubmissionSucceeded {
                    record_id: receipt.record_id.clone(),
                });
                SubmitOutcome::Submitted(receipt)
            }
            Err(error) => {
                guard.fail_submission();
                self.notifier.notify(&WizardEvent::SubmissionFailed {
                    message: error.user_message(),
                });
                SubmitOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::draft::{Draft, SectionId};
    use crate::wizard::persist::DraftStore;
    use crate::wizard::store::OnboardingStore;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ─── Mock collaborators ─────────────────────────────────────────────────

    struct MockSubmit {
        calls: Arc<Mutex<Vec<StaffPayload>>>,
        response: Result<SubmitReceipt, SubmitError>,
        /// When set, the mock resets this store before responding,
        /// simulating a teardown racing the in-flight request.
        reset_store: Option<SharedStore>,
    }

    impl MockSubmit {
        fn succeeding(calls: Arc<Mutex<Vec<StaffPayload>>>) -> Self {
            Self {
                calls,
                response: Ok(SubmitReceipt {
                    record_id: "staff-77".into(),
                    message: None,
                }),
                reset_store: None,
            }
        }

        fn failing(calls: Arc<Mutex<Vec<StaffPayload>>>, error: SubmitError) -> Self {
            Self {
                calls,
                response: Err(error),
                reset_store: None,
            }
        }
    }

    #[async_trait]
    impl SubmitService for MockSubmit {
        async fn submit(&self, payload: &StaffPayload) -> Result<SubmitReceipt, SubmitError> {
            self.calls.lock().unwrap().push(payload.clone());
            if let Some(store) = &self.reset_store {
                store.lock().unwrap().reset();
            }
            self.response.clone()
        }
    }

    struct CapturingNotifier {
        events: Arc<Mutex<Vec<WizardEvent>>>,
    }

    impl Notifier for CapturingNotifier {
        fn notify(&self, event: &WizardEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    // ─── Fixtures ───────────────────────────────────────────────────────────

    fn fill_all_steps(store: &mut OnboardingStore) {
        store.update_section(
            SectionId::BasicInfo,
            json!({"name": "Ada", "email": "ada@clinic.test", "password": "longenough1"})
                .as_object()
                .unwrap()
                .clone(),
        );
        store.update_section(
            SectionId::PersonalInfo,
            json!({"phone": "+1 555 0100", "age": "34", "address": {"city": "Springfield"}})
                .as_object()
                .unwrap()
                .clone(),
        );
        store.update_section(
            SectionId::ProfessionalInfo,
            json!({"specialization": "Cardiology", "licenseNumber": "L-1"})
                .as_object()
                .unwrap()
                .clone(),
        );
        store.update_section(
            SectionId::Identification,
            json!({"idType": "passport", "idNumber": "P1"})
                .as_object()
                .unwrap()
                .clone(),
        );
    }

    fn pipeline_fixtures() -> (
        Arc<Mutex<Vec<StaffPayload>>>,
        Arc<Mutex<Vec<WizardEvent>>>,
    ) {
        (
            Arc::new(Mutex::new(Vec::new())),
            Arc::new(Mutex::new(Vec::new())),
        )
    }

    // ─── Tests ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_successful_submit_clears_draft_and_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("staff-onboarding.json");
        let mut store = OnboardingStore::new(DraftStore::at_path(path.clone()));
        fill_all_steps(&mut store);
        assert!(path.exists());
        let store = store.into_shared();

        let (calls, events) = pipeline_fixtures();
        let pipeline = SubmissionPipeline::new(
            MockSubmit::succeeding(calls.clone()),
            CapturingNotifier {
                events: events.clone(),
            },
        );

        let outcome = pipeline.submit(&store).await;
        assert!(matches!(outcome, SubmitOutcome::Submitted(ref r) if r.record_id == "staff-77"));

        let guard = store.lock().unwrap();
        assert_eq!(guard.draft(), &Draft::empty());
        assert!(guard.is_submitted());
        assert!(!guard.is_loading());
        assert!(!path.exists());

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(
            events.lock().unwrap()[0].event_type(),
            "submission.succeeded"
        );
    }

    #[tokio::test]
    async fn test_invalid_earlier_step_never_calls_collaborator() {
        // Only step 1 is filled; the user deep-linked to the review step
        let mut store = OnboardingStore::new(DraftStore::disabled());
        store.update_section(
            SectionId::BasicInfo,
            json!({"name": "Ada", "email": "ada@clinic.test", "password": "longenough1"})
                .as_object()
                .unwrap()
                .clone(),
        );
        let store = store.into_shared();

        let (calls, events) = pipeline_fixtures();
        let pipeline = SubmissionPipeline::new(
            MockSubmit::succeeding(calls.clone()),
            CapturingNotifier {
                events: events.clone(),
            },
        );

        let outcome = pipeline.submit(&store).await;
        match outcome {
            SubmitOutcome::RejectedInvalid { step, errors } => {
                assert_eq!(step, StepId::PersonalInfo);
                assert_eq!(step.ordinal(), 2);
                assert!(errors.contains_key("personalInfo.phone"));
            }
            other => panic!("expected RejectedInvalid, got {other:?}"),
        }

        assert!(calls.lock().unwrap().is_empty());
        assert!(!store.lock().unwrap().is_loading());
        assert_eq!(
            events.lock().unwrap()[0].event_type(),
            "submission.rejected"
        );
    }

    #[tokio::test]
    async fn test_server_failure_keeps_draft_intact() {
        let mut store = OnboardingStore::new(DraftStore::disabled());
        fill_all_steps(&mut store);
        let draft_before = store.draft().clone();
        let store = store.into_shared();

        let (calls, events) = pipeline_fixtures();
        let pipeline = SubmissionPipeline::new(
            MockSubmit::failing(calls.clone(), SubmitError::message("service unavailable")),
            CapturingNotifier {
                events: events.clone(),
            },
        );

        let outcome = pipeline.submit(&store).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SubmitError::message("service unavailable"))
        );

        let guard = store.lock().unwrap();
        assert_eq!(guard.draft(), &draft_before);
        assert!(!guard.is_submitted());
        assert!(!guard.is_loading());

        assert_eq!(events.lock().unwrap()[0].event_type(), "submission.failed");
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_dropped() {
        let mut store = OnboardingStore::new(DraftStore::disabled());
        fill_all_steps(&mut store);
        let store = store.into_shared();
        // Simulate an in-flight submission
        store.lock().unwrap().begin_submission();

        let (calls, events) = pipeline_fixtures();
        let pipeline = SubmissionPipeline::new(
            MockSubmit::succeeding(calls.clone()),
            CapturingNotifier { events },
        );

        assert_eq!(pipeline.submit(&store).await, SubmitOutcome::InFlight);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_success_does_not_resurrect_cleared_draft() {
        let mut store = OnboardingStore::new(DraftStore::disabled());
        fill_all_steps(&mut store);
        let store = store.into_shared();

        let (calls, events) = pipeline_fixtures();
        let mut service = MockSubmit::succeeding(calls);
        service.reset_store = Some(store.clone());
        let pipeline = SubmissionPipeline::new(
            service,
            CapturingNotifier {
                events: events.clone(),
            },
        );

        assert_eq!(pipeline.submit(&store).await, SubmitOutcome::Superseded);

        let guard = store.lock().unwrap();
        assert_eq!(guard.draft(), &Draft::empty());
        assert!(!guard.is_submitted());
        assert!(!guard.is_loading());
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_attach_errors_to_abandoned_draft() {
        let mut store = OnboardingStore::new(DraftStore::disabled());
        fill_all_steps(&mut store);
        let store = store.into_shared();

        let (calls, events) = pipeline_fixtures();
        let mut service = MockSubmit::failing(calls, SubmitError::message("timed out"));
        service.reset_store = Some(store.clone());
        let pipeline = SubmissionPipeline::new(
            service,
            CapturingNotifier {
                events: events.clone(),
            },
        );

        assert_eq!(pipeline.submit(&store).await, SubmitOutcome::Superseded);

        let guard = store.lock().unwrap();
        assert!(guard.errors().is_empty());
        assert!(!guard.is_loading());
        assert_eq!(guard.draft(), &Draft::empty());
        assert!(events.lock().unwrap().is_empty());
    }
}
