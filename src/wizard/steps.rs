//! The fixed, ordered step sequence of the staff-onboarding wizard.

use serde::{Deserialize, Serialize};

use super::draft::SectionId;

/// Steps in the onboarding wizard, in order. The last step is the
/// review-only terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    BasicInfo,
    PersonalInfo,
    ProfessionalInfo,
    Identification,
    Review,
}

impl StepId {
    pub fn all() -> &'static [StepId] {
        &[
            StepId::BasicInfo,
            StepId::PersonalInfo,
            StepId::ProfessionalInfo,
            StepId::Identification,
            StepId::Review,
        ]
    }

    /// 1-based position in the wizard.
    pub fn ordinal(self) -> usize {
        match self {
            StepId::BasicInfo => 1,
            StepId::PersonalInfo => 2,
            StepId::ProfessionalInfo => 3,
            StepId::Identification => 4,
            StepId::Review => 5,
        }
    }

    pub fn from_ordinal(ordinal: usize) -> Option<StepId> {
        StepId::all().iter().copied().find(|s| s.ordinal() == ordinal)
    }

    pub fn first() -> StepId {
        StepId::BasicInfo
    }

    pub fn is_terminal(self) -> bool {
        self == StepId::Review
    }

    pub fn next(self) -> Option<StepId> {
        StepId::from_ordinal(self.ordinal() + 1)
    }

    pub fn previous(self) -> Option<StepId> {
        self.ordinal().checked_sub(1).and_then(StepId::from_ordinal)
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::BasicInfo => "Account Basics",
            StepId::PersonalInfo => "Personal Details",
            StepId::ProfessionalInfo => "Professional Background",
            StepId::Identification => "Identification",
            StepId::Review => "Review & Submit",
        }
    }

    /// Draft sections this step validates.
    pub fn sections(self) -> &'static [SectionId] {
        match self {
            StepId::BasicInfo => &[SectionId::BasicInfo],
            StepId::PersonalInfo => &[SectionId::PersonalInfo],
            StepId::ProfessionalInfo => &[SectionId::ProfessionalInfo],
            StepId::Identification => &[SectionId::Identification],
            StepId::Review => &[],
        }
    }
}
