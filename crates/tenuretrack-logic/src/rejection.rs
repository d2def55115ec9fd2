//! Reasons an action is refused.
//!
//! Handlers return `Result<(), Rejection>` and only mutate state after
//! every check has passed. The reducer turns an `Err` into the previous
//! state plus, for non-silent variants, one log line.

use thiserror::Error;

use crate::content::ProjectTier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("action not available on this screen")]
    WrongScreen,
    #[error("unknown action")]
    UnknownAction,
    #[error("no random events left this term")]
    QuotaExhausted,
    #[error("invalid skill assignment")]
    InvalidSkill,
    #[error("not enough skill points")]
    SkillBudgetExceeded,
    #[error("Unknown school: {0}")]
    UnknownSchool(String),

    #[error("Handle this term's fixed panel first.")]
    FixedPanelPending,
    #[error("{0} random event(s) remain; trigger them all before leaving the event stage.")]
    RandomEventsPending(u32),
    #[error("This fixed event is not available this term.")]
    BlockOutOfTerm,
    #[error("This fixed event has already been handled this term.")]
    BlockAlreadyDone,
    #[error("Not enough resources to {0}.")]
    Unaffordable(&'static str),

    #[error("No project specified; nothing submitted.")]
    MissingProjectId,
    #[error("Project configuration missing; cannot submit {0}.")]
    UnknownProject(String),
    #[error("{project} can only be submitted during the {term}.")]
    OutOfSubmissionWindow { project: String, term: String },
    #[error("You already hold a {}; not applying again.", .0.name().to_lowercase())]
    AlreadyWon(ProjectTier),
    #[error("The national project result is still pending; cannot switch to a provincial application.")]
    BlockedByPendingNational,
    #[error("You already hold a national project; not applying for a provincial one.")]
    BlockedByNationalWin,
    #[error("{0} has already been submitted; waiting for the result.")]
    AlreadyPending(String),

    #[error("Select a paper first.")]
    NoPaperSelected,
    #[error("The selected paper must be an unpublished draft.")]
    PaperNotDraft,
    #[error("{0} has used all submission attempts this turn (max 3).")]
    AttemptsExhausted(String),
}

impl Rejection {
    /// Silent rejections leave the log untouched.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Rejection::WrongScreen
                | Rejection::UnknownAction
                | Rejection::QuotaExhausted
                | Rejection::InvalidSkill
                | Rejection::SkillBudgetExceeded
        )
    }
}
