//! Year-end tenure assessment.

use serde::Serialize;

use crate::state::{ProjectMode, RunState};

/// Leadership satisfaction must strictly exceed this.
pub const LEADER_THRESHOLD: u32 = 20;

/// Outcome of each of the five tenure criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub teach_ok: bool,
    pub paper_ok: bool,
    pub project_ok: bool,
    pub top_ok: bool,
    pub leader_ok: bool,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.teach_ok && self.paper_ok && self.project_ok && self.top_ok && self.leader_ok
    }
}

/// Projects counted toward the requirement under the current mode.
pub fn project_count(state: &RunState) -> u32 {
    match state.req.project_mode {
        ProjectMode::Either => state.results.national + state.results.provincial,
        ProjectMode::National => state.results.national,
    }
}

pub fn evaluate(state: &RunState) -> Evaluation {
    let req = &state.req;
    let results = &state.results;
    Evaluation {
        teach_ok: state.teaching_this_year >= req.teach_per_year,
        paper_ok: results.qualified_papers >= req.paper_need,
        project_ok: project_count(state) >= req.project_need,
        top_ok: req.top_extra == 0 || results.top_papers >= 1,
        leader_ok: results.leader > LEADER_THRESHOLD,
    }
}

/// One line per failed criterion, in a fixed order.
pub fn failure_reasons(state: &RunState, eval: &Evaluation) -> Vec<String> {
    let req = &state.req;
    let results = &state.results;
    let mut reasons = Vec::new();

    if !eval.teach_ok {
        reasons.push(format!(
            "Teaching short: {}/{} courses this year",
            state.teaching_this_year, req.teach_per_year
        ));
    }
    if !eval.paper_ok {
        reasons.push(format!(
            "Research short: {}/{} qualified papers",
            results.qualified_papers, req.paper_need
        ));
    }
    if !eval.project_ok {
        let what = match req.project_mode {
            ProjectMode::Either => "national + provincial projects",
            ProjectMode::National => "national projects",
        };
        reasons.push(format!(
            "Projects short: {}/{} {}",
            project_count(state),
            req.project_need,
            what
        ));
    }
    if !eval.top_ok {
        reasons.push(format!("Top-journal requirement unmet: {}/1 top papers", results.top_papers));
    }
    if !eval.leader_ok {
        reasons.push(format!(
            "Service short: leadership satisfaction {}/{} (must exceed {})",
            results.leader,
            LEADER_THRESHOLD + 1,
            LEADER_THRESHOLD
        ));
    }
    reasons
}
