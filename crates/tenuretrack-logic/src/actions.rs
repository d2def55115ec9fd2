//! Player actions: ids, payloads and the enumerated legal-action record.

use serde::{Deserialize, Serialize};

/// Built-in action ids. Fixed-panel blocks add their own ids from content.
pub mod ids {
    pub const START: &str = "START";
    pub const SET_SKILL: &str = "SET_SKILL";
    pub const CONFIRM_SKILLS: &str = "CONFIRM_SKILLS";
    pub const CHOOSE_SCHOOL: &str = "CHOOSE_SCHOOL";

    pub const GO_EVENT: &str = "GO_EVENT";
    pub const GO_ACTION: &str = "GO_ACTION";
    pub const TO_ACTION: &str = "TO_ACTION";
    pub const BACK_MAIN: &str = "BACK_MAIN";
    pub const OPEN_PAPERS: &str = "OPEN_PAPERS";
    pub const OPEN_REQ: &str = "OPEN_REQ";
    pub const END_TURN: &str = "END_TURN";

    pub const RANDOM_EVENT: &str = "RANDOM_EVENT";
    pub const PROJECT_SUBMIT: &str = "PROJECT_SUBMIT";
    pub const APPLY_NATIONAL: &str = "APPLY_NATIONAL";
    pub const APPLY_PROVINCIAL: &str = "APPLY_PROVINCIAL";

    pub const WRITE_PAPER: &str = "WRITE_PAPER";
    pub const SELECT_PAPER: &str = "SELECT_PAPER";
    pub const UPGRADE_PAPER: &str = "UPGRADE_PAPER";
    pub const SUBMIT_PAPER: &str = "SUBMIT_PAPER";
    pub const PREP_CLASS: &str = "PREP_CLASS";
    pub const SLACK_OFF: &str = "SLACK_OFF";

    pub const RESTART: &str = "RESTART";

    /// Ids that never resolve against a fixed panel even if a block uses them.
    pub const PROJECT_ACTIONS: [&str; 3] = [APPLY_NATIONAL, APPLY_PROVINCIAL, PROJECT_SUBMIT];
}

/// Optional action arguments. Unused fields are ignored by handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Payload {
    /// Chosen repeat count for counter blocks.
    pub count: Option<i64>,
    /// Skill name for `SET_SKILL`.
    pub key: Option<String>,
    /// Skill level for `SET_SKILL`.
    pub value: Option<i64>,
    pub paper_id: Option<String>,
    pub project_id: Option<String>,
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: None,
        }
    }

    pub fn with_payload(id: impl Into<String>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            payload: Some(payload),
        }
    }

    /// Counter-block action with a chosen count.
    pub fn count(id: impl Into<String>, count: i64) -> Self {
        Self::with_payload(
            id,
            Payload {
                count: Some(count),
                ..Payload::default()
            },
        )
    }

    pub fn payload(&self) -> Payload {
        self.payload.clone().unwrap_or_default()
    }
}

/// One entry of the screen-contextual legal-action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableAction {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    /// Payload to send back with the action, for entries that share an id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl AvailableAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The action a caller dispatches for this entry.
    pub fn to_action(&self) -> Action {
        Action {
            id: self.id.clone(),
            payload: self.payload.clone(),
        }
    }
}
