//! Navigation control for the wizard.
//!
//! The addressable location (URL, route, deep link) is the single source of
//! truth for the current step: reloading must land on the same step. The
//! controller only reads validation results and requests location changes;
//! it never touches the draft or error map itself.

use once_cell::sync::Lazy;
use regex::Regex;

use super::steps::StepId;
use super::store::OnboardingStore;

static STEP_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[?&])step=(\d+)").expect("valid step param regex"));

/// External location collaborator: read the current location, request
/// navigation to a step ordinal. Routing mechanics live outside this crate.
pub trait LocationPort {
    fn location(&self) -> String;
    fn navigate_to(&mut self, ordinal: usize);
}

/// Resolve the current step from a location string.
///
/// Recognizes a `step=N` query parameter or a trailing numeric path
/// segment; anything absent or out of range falls back to the first step.
pub fn current_step(location: &str) -> StepId {
    let ordinal = STEP_PARAM_RE
        .captures(location)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| {
            let path = location.split(['?', '#']).next().unwrap_or(location);
            path.trim_end_matches('/').rsplit('/').next()
        })
        .and_then(|raw| raw.parse::<usize>().ok());

    ordinal
        .and_then(StepId::from_ordinal)
        .unwrap_or_else(StepId::first)
}

/// Validation-gated step transitions.
pub struct NavigationController;

impl NavigationController {
    pub fn current_step(&self, port: &impl LocationPort) -> StepId {
        current_step(&port.location())
    }

    /// Advance to the next step if the current one validates.
    ///
    /// Returns true when navigation was requested. No-op at the terminal
    /// step; on validation failure the errors stay visible via the store
    /// and the location is untouched.
    pub fn go_next(&self, port: &mut impl LocationPort, store: &mut OnboardingStore) -> bool {
        let current = current_step(&port.location());
        if current.is_terminal() {
            return false;
        }
        if !store.validate_step(current) {
            tracing::debug!(step = current.ordinal(), "Forward navigation blocked by validation");
            return false;
        }
        port.navigate_to(current.ordinal() + 1);
        true
    }

    /// Go back one step unconditionally, floored at the first step.
    pub fn go_previous(&self, port: &mut impl LocationPort) -> bool {
        let current = current_step(&port.location());
        match current.previous() {
            Some(previous) => {
                port.navigate_to(previous.ordinal());
                true
            }
            None => false,
        }
    }
}
