//! Staff-onboarding wizard: draft state, per-step validation, navigation,
//! draft persistence, and the submission pipeline.
//!
//! The pieces compose around a [`SharedStore`]: UI code mutates the draft
//! through [`OnboardingStore`] methods, the [`NavigationController`] gates
//! forward movement on [`OnboardingStore::validate_step`], and the
//! [`SubmissionPipeline`] runs the final validate-everything-and-submit
//! sequence against a [`SubmitService`] collaborator.

pub mod draft;
pub mod error;
pub mod nav;
pub mod path;
pub mod payload;
pub mod persist;
pub mod pipeline;
pub mod rules;
pub mod steps;
pub mod store;

pub use draft::{Attachment, AttachmentRegistry, Draft, SectionId};
pub use error::{FieldIssue, SubmitError, SubmitReceipt};
pub use nav::{current_step, LocationPort, NavigationController};
pub use path::{FieldPath, PathParseError, PathSegment};
pub use payload::{build_payload, QualificationPayload, StaffPayload};
pub use persist::{DraftStore, STAFF_ONBOARDING_KEY};
pub use pipeline::{SubmissionPipeline, SubmitOutcome, SubmitService};
pub use rules::{validate_step, FieldErrors};
pub use steps::StepId;
pub use store::{OnboardingStore, SharedStore, StepValidationFailure};
