//! The turn/phase state machine.
//!
//! [`dispatch`] is the single entrypoint: it copies the previous state,
//! runs the action handler on the copy and returns it. When a handler
//! rejects the action the previous state is returned instead, with one
//! log line for non-silent rejections. The previous snapshot is never
//! touched.

use rand::Rng;

use crate::actions::{ids, Action};
use crate::character::{choose_school, confirm_skills, set_skill, start_run};
use crate::content::{Content, NATIONAL_PROJECT_ID, PROVINCIAL_PROJECT_ID};
use crate::economy::{apply_delta, Stat};
use crate::evaluation::{evaluate, failure_reasons};
use crate::fixed_panel::{find_block, resolve_block};
use crate::hidden::apply_year_end_rules;
use crate::papers::{select_paper, submit_paper, upgrade_paper, write_paper};
use crate::projects::{expire_stale_national, resolve_due_projects, submit_project};
use crate::random_events::trigger_random_event;
use crate::rejection::Rejection;
use crate::routine::{prep_class, slack_off};
use crate::state::{term_name, Phase, RunState, Screen, TERMS_PER_YEAR};

/// Apply one action and return the next state.
pub fn dispatch(prev: &RunState, action: &Action, content: &Content, rng: &mut impl Rng) -> RunState {
    if action.id == ids::RESTART {
        log::info!("run restarted");
        return RunState::new();
    }

    let mut next = prev.clone();
    match reduce(&mut next, action, content, rng) {
        Ok(()) => next,
        Err(rejection) => {
            log::debug!("{} rejected on {:?}: {:?}", action.id, prev.screen, rejection);
            let mut kept = prev.clone();
            if !rejection.is_silent() {
                kept.push_log(rejection.to_string());
            }
            kept
        }
    }
}

fn require(state: &RunState, screens: &[Screen]) -> Result<(), Rejection> {
    if screens.contains(&state.screen) {
        Ok(())
    } else {
        Err(Rejection::WrongScreen)
    }
}

fn require_phase(state: &RunState, phase: Phase) -> Result<(), Rejection> {
    if state.time.phase == phase {
        Ok(())
    } else {
        Err(Rejection::WrongScreen)
    }
}

/// Screens from which the in-run overlays can be opened.
const IN_RUN: [Screen; 4] = [Screen::Main, Screen::Action, Screen::Papers, Screen::Requirements];
const PAPER_SCREENS: [Screen; 2] = [Screen::Action, Screen::Papers];

fn reduce(state: &mut RunState, action: &Action, content: &Content, rng: &mut impl Rng) -> Result<(), Rejection> {
    if state.is_over() {
        return Err(Rejection::WrongScreen);
    }

    let payload = action.payload();
    if state.screen == Screen::Event {
        if let Some(block) = find_block(state, content, &action.id) {
            return resolve_block(state, block, &payload);
        }
    }

    match action.id.as_str() {
        ids::START => {
            require(state, &[Screen::Intro])?;
            start_run(state, rng);
            Ok(())
        }
        ids::SET_SKILL => {
            require(state, &[Screen::Character])?;
            set_skill(state, &payload)
        }
        ids::CONFIRM_SKILLS => {
            require(state, &[Screen::Character])?;
            confirm_skills(state);
            Ok(())
        }
        ids::CHOOSE_SCHOOL => {
            require(state, &[Screen::Job])?;
            choose_school(state, content, payload.school_id.as_deref())
        }

        ids::GO_EVENT => {
            require(state, &[Screen::Main])?;
            require_phase(state, Phase::Event)?;
            state.screen = Screen::Event;
            resolve_due_projects(state, content, rng);
            Ok(())
        }
        ids::GO_ACTION => {
            require(state, &[Screen::Main])?;
            require_phase(state, Phase::Event)?;
            enter_action_phase(state, content, rng)
        }
        ids::TO_ACTION => {
            require(state, &[Screen::Event])?;
            enter_action_phase(state, content, rng)
        }
        ids::BACK_MAIN => back_to_main(state, content),
        ids::OPEN_PAPERS => {
            require(state, &IN_RUN)?;
            state.screen = Screen::Papers;
            Ok(())
        }
        ids::OPEN_REQ => {
            require(state, &IN_RUN)?;
            state.screen = Screen::Requirements;
            Ok(())
        }

        ids::RANDOM_EVENT => {
            require(state, &[Screen::Event])?;
            trigger_random_event(state, content, rng)
        }
        ids::PROJECT_SUBMIT => {
            require(state, &[Screen::Event])?;
            let project_id = payload.project_id.ok_or(Rejection::MissingProjectId)?;
            submit_project(state, content, &project_id)
        }
        ids::APPLY_NATIONAL => {
            require(state, &[Screen::Event])?;
            submit_project(state, content, NATIONAL_PROJECT_ID)
        }
        ids::APPLY_PROVINCIAL => {
            require(state, &[Screen::Event])?;
            submit_project(state, content, PROVINCIAL_PROJECT_ID)
        }

        ids::WRITE_PAPER => {
            require(state, &[Screen::Action])?;
            write_paper(state, content)
        }
        ids::SELECT_PAPER => {
            require(state, &IN_RUN)?;
            select_paper(state, payload.paper_id);
            Ok(())
        }
        ids::UPGRADE_PAPER => {
            require(state, &PAPER_SCREENS)?;
            upgrade_paper(state, content, payload.paper_id.as_deref())
        }
        ids::SUBMIT_PAPER => {
            require(state, &PAPER_SCREENS)?;
            submit_paper(state, payload.paper_id.as_deref(), rng)
        }
        ids::PREP_CLASS => {
            require(state, &[Screen::Action])?;
            prep_class(state, content)
        }
        ids::SLACK_OFF => {
            require(state, &[Screen::Action])?;
            slack_off(state, content)
        }

        ids::END_TURN => {
            require(state, &[Screen::Main])?;
            require_phase(state, Phase::Action)?;
            end_turn(state, content, rng);
            Ok(())
        }

        _ => Err(Rejection::UnknownAction),
    }
}

/// The fixed panel and (if the rule flag is set) the random quota must
/// both be cleared before the event stage can be left.
pub fn check_leave_event(state: &RunState, content: &Content) -> Result<(), Rejection> {
    if content.fixed_panel(state.time.term).is_some() && !state.fixed_done {
        return Err(Rejection::FixedPanelPending);
    }
    if content.base.rules.must_clear_random_before_leaving_event_stage && state.random_quota > 0 {
        return Err(Rejection::RandomEventsPending(state.random_quota));
    }
    Ok(())
}

fn enter_action_phase(state: &mut RunState, content: &Content, rng: &mut impl Rng) -> Result<(), Rejection> {
    check_leave_event(state, content)?;
    state.time.phase = Phase::Action;
    state.screen = Screen::Action;
    resolve_due_projects(state, content, rng);
    Ok(())
}

fn back_to_main(state: &mut RunState, content: &Content) -> Result<(), Rejection> {
    match state.screen {
        Screen::Event => check_leave_event(state, content)?,
        Screen::Main | Screen::Action | Screen::Papers | Screen::Requirements => {}
        _ => return Err(Rejection::WrongScreen),
    }
    state.screen = Screen::Main;
    Ok(())
}

/// Reset per-term trackers at the start of a term.
fn start_term(state: &mut RunState, content: &Content) {
    state.time.phase = Phase::Event;
    state.fixed_done = false;
    state.fixed_choices.clear();
    state.random_quota = content.quota_for_term(state.time.term);
    state.random_seen_term.clear();
    state.screen = Screen::Main;
}

fn end_turn(state: &mut RunState, content: &Content, rng: &mut impl Rng) {
    let reset = content.time_reset();
    state.stats.time = reset;
    for paper in &mut state.papers {
        paper.attempts_this_turn = 0;
    }

    let ending = state.time.term;
    if let Some(rec) = content.base.turns.recovery_end_of_term.get(&ending).copied() {
        apply_delta(&mut state.stats, &state.skills, Stat::Mood, rec.mood as f64);
        apply_delta(&mut state.stats, &state.skills, Stat::Energy, rec.energy as f64);
        state.push_log(format!(
            "{} over: mood+{}, energy+{}, time reset to {}.",
            term_name(ending),
            rec.mood,
            rec.energy,
            reset
        ));
    }

    if ending + 1 < TERMS_PER_YEAR {
        state.time.term = ending + 1;
        start_term(state, content);
        return;
    }
    end_year(state, content, rng);
}

fn end_year(state: &mut RunState, content: &Content, rng: &mut impl Rng) {
    expire_stale_national(state, content);
    apply_year_end_rules(state, content, rng);

    let eval = evaluate(state);
    if state.time.year >= state.req.max_year {
        state.screen = Screen::End;
        if eval.passed() {
            state.push_log("Passed: tenure granted!");
        } else {
            state.push_log("Failed: did not pass the up-or-out review.");
            let reasons = failure_reasons(state, &eval);
            if !reasons.is_empty() {
                state.push_log("Reasons:");
                for reason in reasons {
                    state.push_log(format!("- {}", reason));
                }
            }
        }
        log::info!(
            "run ended in year {}: {}",
            state.time.year,
            if eval.passed() { "tenured" } else { "failed" }
        );
        return;
    }

    state.time.year += 1;
    state.time.term = 0;
    state.teaching_this_year = 0;
    state.stats.time = content.time_reset();
    start_term(state, content);
    state.push_log(format!("Entering year {}, fall term.", state.time.year));
    log::info!("year {} begins", state.time.year);
}
