//! Wizard steps and the transition table between them.

use super::validation::Field;
use std::fmt;

/// A page of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Media selection and metadata entry (step 0).
    #[default]
    Details,
    /// Terms acceptance and submit (step 1).
    Terms,
}

/// Commands that move the wizard between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    Advance,
    Retreat,
    Submit,
}

impl Step {
    pub const INITIAL: Step = Step::Details;

    /// Every step in display order.
    pub const ALL: [Step; 2] = [Step::Details, Step::Terms];

    /// Zero-based position of the step.
    pub fn index(self) -> usize {
        match self {
            Step::Details => 0,
            Step::Terms => 1,
        }
    }

    /// The transition table. `None` means the command is not allowed from
    /// this step. A successful submit lands back on the first step.
    pub fn transition(self, nav: Navigation) -> Option<Step> {
        match (self, nav) {
            (Step::Details, Navigation::Advance) => Some(Step::Terms),
            (Step::Terms, Navigation::Retreat) => Some(Step::Details),
            (Step::Terms, Navigation::Submit) => Some(Step::INITIAL),
            _ => None,
        }
    }

    /// Fields that must pass validation before leaving this step forward.
    pub fn gated_fields(self) -> &'static [Field] {
        match self {
            Step::Details => &[Field::Title, Field::Media],
            Step::Terms => &[Field::TermsAccepted],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Details => write!(f, "details"),
            Step::Terms => write!(f, "terms"),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Advance => write!(f, "advance"),
            Navigation::Retreat => write!(f, "retreat"),
            Navigation::Submit => write!(f, "submit"),
        }
    }
}

/// Read-only view of the wizard exposed to the presentation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WizardState {
    pub current_step: Step,
    pub submission_in_flight: bool,
    /// Always within `0..=100`.
    pub upload_progress_percent: u8,
}
