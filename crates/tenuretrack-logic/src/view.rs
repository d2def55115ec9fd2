//! Read-only projections for a presentation layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::actions::{ids, AvailableAction, Payload};
use crate::content::{Content, FixedBlock, FixedPanel, NATIONAL_PROJECT_ID, PROVINCIAL_PROJECT_ID};
use crate::economy::{can_afford, Skill, Skills, Stats, SKILL_MAX};
use crate::fixed_panel::check_block;
use crate::papers::MAX_ATTEMPTS_PER_TURN;
use crate::projects::check_submission;
use crate::reducer::check_leave_event;
use crate::rejection::Rejection;
use crate::state::{term_name, Paper, PaperStage, Phase, Requirements, RunState, Screen};

/// Results the player is allowed to see. Leadership satisfaction is not
/// among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleResults {
    pub qualified_papers: u32,
    pub top_papers: u32,
    pub national: u32,
    pub provincial: u32,
}

/// Display-ready snapshot with no hidden fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub screen: Screen,
    pub school_name: String,
    pub year: u32,
    pub term: String,
    pub phase: Phase,
    pub roll_total: u32,
    pub skill_points: u32,
    pub stats: Stats,
    pub skills: Skills,
    pub results: VisibleResults,
    pub req: Requirements,
    pub teaching_this_year: u32,
    pub random_quota: u32,
    pub fixed_done: bool,
    pub fixed_choices: BTreeMap<String, u32>,
    /// Ids of applications awaiting a decision.
    pub pending_projects: Vec<String>,
    pub selected_paper_id: Option<String>,
    pub papers: Vec<Paper>,
    pub fixed_panel: Option<FixedPanel>,
    pub log: Vec<String>,
}

pub fn get_view_model(state: &RunState, content: &Content) -> ViewModel {
    let school_name = state
        .school_id
        .as_deref()
        .map(|id| content.school(Some(id)).map_or(id, |s| s.name.as_str()))
        .unwrap_or_default()
        .to_string();

    ViewModel {
        screen: state.screen,
        school_name,
        year: state.time.year,
        term: term_name(state.time.term),
        phase: state.time.phase,
        roll_total: state.roll_total,
        skill_points: state.skill_points,
        stats: state.stats.clone(),
        skills: state.skills.clone(),
        results: VisibleResults {
            qualified_papers: state.results.qualified_papers,
            top_papers: state.results.top_papers,
            national: state.results.national,
            provincial: state.results.provincial,
        },
        req: state.req.clone(),
        teaching_this_year: state.teaching_this_year,
        random_quota: state.random_quota,
        fixed_done: state.fixed_done,
        fixed_choices: state.fixed_choices.clone(),
        pending_projects: state.pending_projects.keys().cloned().collect(),
        selected_paper_id: state.selected_paper_id.clone(),
        papers: state.papers.clone(),
        fixed_panel: content.fixed_panel(state.time.term).cloned(),
        log: state.log.iter().cloned().collect(),
    }
}

/// Legal actions for the current screen. Disabled entries are listed so a
/// caller can show why they are unavailable.
pub fn get_available_actions(state: &RunState, content: &Content) -> Vec<AvailableAction> {
    let mut out = Vec::new();
    let in_event_phase = state.time.phase == Phase::Event;

    match state.screen {
        Screen::Intro => out.push(AvailableAction::new(ids::START, "Start (PhD)", true)),
        Screen::Character => {
            for skill in Skill::ALL {
                let level = state.skills.get(skill);
                let raise = Payload {
                    key: Some(skill.key().to_string()),
                    value: Some(level as i64 + 1),
                    ..Payload::default()
                };
                out.push(
                    AvailableAction::new(
                        ids::SET_SKILL,
                        format!("Raise {} to {}", skill.key(), level + 1),
                        state.skill_points > 0 && level < SKILL_MAX,
                    )
                    .with_payload(raise),
                );
            }
            out.push(AvailableAction::new(ids::CONFIRM_SKILLS, "Confirm and go on the job market", true));
        }
        Screen::Job => {
            for school in &content.schools {
                let pick = Payload {
                    school_id: Some(school.id.clone()),
                    ..Payload::default()
                };
                out.push(
                    AvailableAction::new(ids::CHOOSE_SCHOOL, format!("Join {}", school.name), true)
                        .with_payload(pick),
                );
            }
        }
        Screen::Main => {
            out.push(AvailableAction::new(ids::GO_EVENT, "Enter event stage", in_event_phase));
            let can_skip = in_event_phase && check_leave_event(state, content).is_ok();
            out.push(AvailableAction::new(ids::GO_ACTION, "Enter action stage", can_skip));
            out.push(AvailableAction::new(ids::END_TURN, "End turn", !in_event_phase));
            out.push(AvailableAction::new(ids::OPEN_PAPERS, "Open papers", true));
            out.push(AvailableAction::new(ids::OPEN_REQ, "View tenure requirements", true));
        }
        Screen::Event => event_actions(state, content, &mut out),
        Screen::Action => {
            let affordable = |id: &str| can_afford(&state.stats, &content.actions.get(id).cost);
            out.push(AvailableAction::new(
                ids::WRITE_PAPER,
                "Write paper (+1 progress)",
                affordable(ids::WRITE_PAPER),
            ));
            out.push(AvailableAction::new(ids::PREP_CLASS, "Prepare class", affordable(ids::PREP_CLASS)));
            out.push(AvailableAction::new(ids::SLACK_OFF, "Slack off", affordable(ids::SLACK_OFF)));
            out.push(AvailableAction::new(ids::OPEN_PAPERS, "Open papers", true));
            out.push(AvailableAction::new(ids::BACK_MAIN, "Back to main", true));
        }
        Screen::Papers => paper_actions(state, content, &mut out),
        Screen::Requirements => out.push(AvailableAction::new(ids::BACK_MAIN, "Back to main", true)),
        Screen::End => out.push(AvailableAction::new(ids::RESTART, "Play again", true)),
    }
    out
}

/// Selection, upgrade and submission of unpublished papers. Upgrade and
/// submit act on the selected paper.
fn paper_actions(state: &RunState, content: &Content, out: &mut Vec<AvailableAction>) {
    for paper in state.papers.iter().filter(|p| !p.published) {
        let pick = Payload {
            paper_id: Some(paper.id.clone()),
            ..Payload::default()
        };
        out.push(
            AvailableAction::new(
                ids::SELECT_PAPER,
                format!("Select {} ({})", paper.id, paper.level.name()),
                true,
            )
            .with_payload(pick),
        );
    }

    let selected = state
        .selected_paper_id
        .as_deref()
        .and_then(|id| state.paper(id))
        .filter(|p| !p.published && p.stage == PaperStage::Draft);
    let upgrade_cost = content.actions.get(ids::UPGRADE_PAPER).cost;
    out.push(AvailableAction::new(
        ids::UPGRADE_PAPER,
        "Upgrade paper",
        selected.is_some() && can_afford(&state.stats, &upgrade_cost),
    ));
    out.push(AvailableAction::new(
        ids::SUBMIT_PAPER,
        "Submit paper",
        selected.is_some_and(|p| p.attempts_this_turn < MAX_ATTEMPTS_PER_TURN),
    ));
    out.push(AvailableAction::new(ids::BACK_MAIN, "Back to main", true));
}

fn event_actions(state: &RunState, content: &Content, out: &mut Vec<AvailableAction>) {
    if let Some(panel) = content.fixed_panel(state.time.term) {
        for block in &panel.blocks {
            let enabled = if ids::PROJECT_ACTIONS.contains(&block.action_id.as_str()) {
                block_project_id(block).is_some_and(|id| check_submission(state, content, id).is_ok())
            } else {
                check_block(state, block).is_ok()
            };
            out.push(AvailableAction::new(block.action_id.as_str(), block.label(), enabled));
        }
    }

    out.push(AvailableAction::new(
        ids::RANDOM_EVENT,
        format!("Trigger random event ({} left)", state.random_quota),
        state.random_quota > 0,
    ));

    let gate = check_leave_event(state, content);
    let suffix = match &gate {
        Err(Rejection::FixedPanelPending) => " (handle the fixed panel first)",
        Err(Rejection::RandomEventsPending(_)) => " (trigger all random events first)",
        _ => "",
    };
    out.push(AvailableAction::new(
        ids::TO_ACTION,
        format!("Enter action stage{}", suffix),
        gate.is_ok(),
    ));
    out.push(AvailableAction::new(
        ids::BACK_MAIN,
        format!("Back to main{}", suffix),
        gate.is_ok(),
    ));
}

/// Project a submission block applies for. `PROJECT_SUBMIT` blocks carry
/// it in their payload.
fn block_project_id(block: &FixedBlock) -> Option<&str> {
    match block.action_id.as_str() {
        ids::APPLY_NATIONAL => Some(NATIONAL_PROJECT_ID),
        ids::APPLY_PROVINCIAL => Some(PROVINCIAL_PROJECT_ID),
        _ => block.payload.as_ref()?.get("projectId")?.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::dispatch;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn panel(blocks: serde_json::Value) -> FixedPanel {
        serde_json::from_value(json!({ "title": "Winter", "blocks": blocks })).unwrap()
    }

    fn find<'a>(actions: &'a [AvailableAction], id: &str) -> &'a AvailableAction {
        actions.iter().find(|a| a.id == id).unwrap()
    }

    #[test]
    fn test_view_model_hides_leader() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.results.leader = 15;
        state.results.national = 1;
        let json = serde_json::to_value(get_view_model(&state, &content)).unwrap();
        assert!(json["results"].get("leader").is_none());
        assert_eq!(json["results"]["national"], 1);
        assert!(json.get("hidden").is_none());
        assert_eq!(json["term"], "Fall term");
    }

    #[test]
    fn test_event_screen_lists_blocks_and_gates() {
        let mut content = Content::with_schools(Vec::new());
        content.fixed_panels.insert(
            1,
            panel(json!([
                {"actionId": "APPLY_NATIONAL", "title": "Apply for national grant"},
                {"actionId": "FP_SKIP", "title": "Skip this year"}
            ])),
        );
        let mut state = RunState::new();
        state.screen = Screen::Event;
        state.time.term = 1;
        state.random_quota = 2;

        let actions = get_available_actions(&state, &content);
        assert!(find(&actions, ids::APPLY_NATIONAL).enabled);
        assert!(find(&actions, "FP_SKIP").enabled);
        assert!(find(&actions, ids::RANDOM_EVENT).label.contains("2 left"));
        let to_action = find(&actions, ids::TO_ACTION);
        assert!(!to_action.enabled);
        assert!(to_action.label.contains("fixed panel"));

        state.results.national = 1;
        state.fixed_choices.insert("FP_SKIP".into(), 1);
        let actions = get_available_actions(&state, &content);
        assert!(!find(&actions, ids::APPLY_NATIONAL).enabled);
        assert!(!find(&actions, "FP_SKIP").enabled);
    }

    #[test]
    fn test_project_submit_block_reads_payload() {
        let mut content = Content::with_schools(Vec::new());
        content.fixed_panels.insert(
            3,
            panel(json!([
                {"actionId": "PROJECT_SUBMIT", "title": "Apply (provincial)", "payload": {"projectId": "provincial"}}
            ])),
        );
        let mut state = RunState::new();
        state.screen = Screen::Event;
        state.time.term = 3;
        let actions = get_available_actions(&state, &content);
        assert!(find(&actions, ids::PROJECT_SUBMIT).enabled);
    }

    #[test]
    fn test_end_screen_offers_restart_only() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.screen = Screen::End;
        let actions = get_available_actions(&state, &content);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].id, ids::RESTART);
    }

    #[test]
    fn test_action_screen_tracks_affordability() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.screen = Screen::Action;
        state.time.phase = Phase::Action;

        let actions = get_available_actions(&state, &content);
        assert!(find(&actions, ids::WRITE_PAPER).enabled);
        assert!(find(&actions, ids::SLACK_OFF).enabled);

        state.stats.time = 0;
        let actions = get_available_actions(&state, &content);
        for id in [ids::WRITE_PAPER, ids::PREP_CLASS, ids::SLACK_OFF] {
            assert!(!find(&actions, id).enabled, "{} should be disabled", id);
        }

        // The reducer agrees: nothing changes but the log.
        let mut rng = StdRng::seed_from_u64(1);
        let next = dispatch(&state, &find(&actions, ids::WRITE_PAPER).to_action(), &content, &mut rng);
        assert_eq!(next.stats, state.stats);
        assert!(next.papers.is_empty());
        assert_eq!(next.log.len(), state.log.len() + 1);
    }

    #[test]
    fn test_character_screen_offers_skill_raises() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.screen = Screen::Character;
        state.roll_total = 12;
        state.skills.talent = 6;
        state.skill_points = 12 - state.skills.total();

        let actions = get_available_actions(&state, &content);
        let raises: Vec<&AvailableAction> = actions.iter().filter(|a| a.id == ids::SET_SKILL).collect();
        assert_eq!(raises.len(), 4);
        let talent = raises
            .iter()
            .find(|a| a.payload.as_ref().and_then(|p| p.key.as_deref()) == Some("talent"))
            .unwrap();
        assert!(!talent.enabled);
        let luck = raises
            .iter()
            .find(|a| a.payload.as_ref().and_then(|p| p.key.as_deref()) == Some("luck"))
            .unwrap();
        assert!(luck.enabled);

        let mut rng = StdRng::seed_from_u64(2);
        let next = dispatch(&state, &luck.to_action(), &content, &mut rng);
        assert_eq!(next.skills.luck, 2);
        assert_eq!(next.skill_points, state.skill_points - 1);

        state.skill_points = 0;
        let actions = get_available_actions(&state, &content);
        assert!(actions.iter().filter(|a| a.id == ids::SET_SKILL).all(|a| !a.enabled));
        assert!(find(&actions, ids::CONFIRM_SKILLS).enabled);
    }

    #[test]
    fn test_papers_screen_selects_unpublished_papers() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.screen = Screen::Papers;
        let mut published = Paper::new("P1".into());
        published.stage = PaperStage::Draft;
        published.published = true;
        let mut draft = Paper::new("P2".into());
        draft.stage = PaperStage::Draft;
        state.papers = vec![published, draft, Paper::new("P3".into())];

        let actions = get_available_actions(&state, &content);
        let selectable: Vec<&str> = actions
            .iter()
            .filter(|a| a.id == ids::SELECT_PAPER)
            .filter_map(|a| a.payload.as_ref()?.paper_id.as_deref())
            .collect();
        assert_eq!(selectable, ["P2", "P3"]);
        assert!(!find(&actions, ids::UPGRADE_PAPER).enabled);
        assert!(!find(&actions, ids::SUBMIT_PAPER).enabled);

        let mut rng = StdRng::seed_from_u64(3);
        let pick = actions
            .iter()
            .find(|a| a.id == ids::SELECT_PAPER && a.label.starts_with("Select P2"))
            .unwrap();
        let state = dispatch(&state, &pick.to_action(), &content, &mut rng);
        assert_eq!(state.selected_paper_id.as_deref(), Some("P2"));
        let actions = get_available_actions(&state, &content);
        assert!(find(&actions, ids::UPGRADE_PAPER).enabled);
        assert!(find(&actions, ids::SUBMIT_PAPER).enabled);
    }

    #[test]
    fn test_block_label_falls_back_to_action_id() {
        let block: FixedBlock = serde_json::from_value(json!({"actionId": "FP_X"})).unwrap();
        assert_eq!(block.label(), "FP_X");
    }
}
