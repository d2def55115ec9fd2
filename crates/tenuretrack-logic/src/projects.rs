//! Grant applications: submission and deferred resolution.
//!
//! A submission records a [`PendingProject`] stamped with the current year.
//! The application is decided later, when the game reaches the project's
//! `(term, phase)`, by a single Bernoulli draw. National applications
//! still open at year end are treated as failed.

use rand::Rng;

use crate::content::{submit_term_gate, Content, ProjectDef, ProjectTier};
use crate::economy::{can_afford, effect_summary, StatMap};
use crate::effects::{apply_effects, Effect};
use crate::rejection::Rejection;
use crate::state::{term_name, PendingProject, RunState};

/// Validate a submission without mutating state.
pub fn check_submission<'c>(
    state: &RunState,
    content: &'c Content,
    project_id: &str,
) -> Result<&'c ProjectDef, Rejection> {
    let proj = content
        .project(project_id)
        .ok_or_else(|| Rejection::UnknownProject(project_id.to_string()))?;

    if let Some(term) = submit_term_gate(project_id) {
        if state.time.term != term {
            return Err(Rejection::OutOfSubmissionWindow {
                project: proj.tier.name().to_string(),
                term: term_name(term).to_lowercase(),
            });
        }
    }

    if state.results.get(proj.tier.result_key()) >= 1 {
        return Err(Rejection::AlreadyWon(proj.tier));
    }

    if proj.tier == ProjectTier::Provincial {
        if national_pending(state, content) {
            return Err(Rejection::BlockedByPendingNational);
        }
        if state.results.national >= 1 {
            return Err(Rejection::BlockedByNationalWin);
        }
    }

    if state.pending_projects.contains_key(project_id) {
        return Err(Rejection::AlreadyPending(proj.tier.name().to_string()));
    }

    Ok(proj)
}

/// Whether any national-tier application is in flight.
fn national_pending(state: &RunState, content: &Content) -> bool {
    state.pending_projects.keys().any(|id| {
        content
            .project(id)
            .is_some_and(|p| p.tier == ProjectTier::National)
    })
}

/// Nominal stat cost of the stat entries in a submit-cost effect list.
pub fn submit_cost(effects: &[Effect]) -> StatMap {
    let mut cost = StatMap::new();
    for effect in effects {
        if let Effect::Stat { stat, delta } = effect {
            if *delta < 0.0 {
                *cost.entry(*stat).or_insert(0) += delta.abs().round() as i64;
            }
        }
    }
    cost
}

/// Submit an application for `project_id`.
pub fn submit_project(state: &mut RunState, content: &Content, project_id: &str) -> Result<(), Rejection> {
    let proj = check_submission(state, content, project_id)?;

    if !can_afford(&state.stats, &submit_cost(&proj.submit_cost)) {
        return Err(Rejection::Unaffordable("apply for this project"));
    }

    let before = state.stats.clone();
    apply_effects(state, &proj.submit_cost, 1);

    state.pending_projects.insert(
        project_id.to_string(),
        PendingProject::new(state.time.year),
    );
    let when = match proj.due_at() {
        Some((term, phase)) => format!(
            " (result announced in the {} {} phase)",
            term_name(term).to_lowercase(),
            phase.key()
        ),
        None => String::new(),
    };
    state.push_log(format!("{}: application submitted{}.", proj.tier.name(), when));
    let summary = effect_summary(&before, &state.stats);
    state.push_log(summary);

    state.fixed_done = true;
    state.fixed_choices.insert(format!("apply_{}", project_id), 1);
    log::debug!("submitted project {} in year {}", project_id, state.time.year);
    Ok(())
}

fn is_due(state: &RunState, proj: &ProjectDef) -> bool {
    proj.due_at() == Some((state.time.term, state.time.phase))
}

/// Decide every pending application whose resolution point is now.
///
/// Only applications from the current year are decided. A decided
/// application is removed, so repeated calls decide it at most once.
pub fn resolve_due_projects(state: &mut RunState, content: &Content, rng: &mut impl Rng) {
    for proj in &content.projects {
        let Some(pending) = state.pending_projects.get(&proj.id) else {
            continue;
        };
        if pending.resolved_year.is_some() {
            state.pending_projects.remove(&proj.id);
            continue;
        }
        if !is_due(state, proj) || pending.year_applied != state.time.year {
            continue;
        }

        let success = rng.gen::<f64>() < proj.success_rate;
        if success {
            apply_effects(state, &proj.success_effects(), 1);
            state.push_log(format!("{}: funded!", proj.tier.name()));
        } else {
            state.push_log(format!("{}: not funded.", proj.tier.name()));
            apply_effects(state, &proj.on_fail, 1);
        }
        log::info!(
            "project {} resolved in year {}: {}",
            proj.id,
            state.time.year,
            if success { "funded" } else { "rejected" }
        );

        state.pending_projects.remove(&proj.id);
    }
}

/// Fail any national application still open at year end.
pub fn expire_stale_national(state: &mut RunState, content: &Content) {
    let stale: Vec<String> = state
        .pending_projects
        .keys()
        .filter(|id| {
            content
                .project(id)
                .is_some_and(|p| p.tier == ProjectTier::National)
        })
        .cloned()
        .collect();
    for id in stale {
        state.pending_projects.remove(&id);
        state.push_log("National project: no result announced this year; treated as not funded.");
        log::info!("expired stale national application {}", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ProjectDef, NATIONAL_PROJECT_ID, PROVINCIAL_PROJECT_ID};
    use crate::state::{Phase, ResultKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn content() -> Content {
        Content::with_schools(Vec::new())
    }

    fn in_term(term: u8) -> RunState {
        let mut state = RunState::new();
        state.time.term = term;
        state
    }

    #[test]
    fn test_national_outside_winter_rejected() {
        let mut state = in_term(0);
        let err = submit_project(&mut state, &content(), NATIONAL_PROJECT_ID).unwrap_err();
        assert!(matches!(err, Rejection::OutOfSubmissionWindow { .. }));
        assert!(state.pending_projects.is_empty());
    }

    #[test]
    fn test_submit_records_pending_and_pays() {
        let mut state = in_term(1);
        submit_project(&mut state, &content(), NATIONAL_PROJECT_ID).unwrap();
        assert_eq!(state.pending_projects[NATIONAL_PROJECT_ID].year_applied, 1);
        assert_eq!(state.stats.time, 95);
        assert_eq!(state.stats.energy, 95);
        assert!(state.fixed_done);
        assert_eq!(
            submit_project(&mut state, &content(), NATIONAL_PROJECT_ID),
            Err(Rejection::AlreadyPending("National project".into()))
        );
    }

    #[test]
    fn test_provincial_blocked_by_national() {
        let content = content();
        let mut state = in_term(3);
        state
            .pending_projects
            .insert(NATIONAL_PROJECT_ID.into(), PendingProject::new(1));
        assert_eq!(
            check_submission(&state, &content, PROVINCIAL_PROJECT_ID).unwrap_err(),
            Rejection::BlockedByPendingNational
        );

        state.pending_projects.clear();
        state.results.national = 1;
        assert_eq!(
            check_submission(&state, &content, PROVINCIAL_PROJECT_ID).unwrap_err(),
            Rejection::BlockedByNationalWin
        );
    }

    #[test]
    fn test_already_won_rejected() {
        let mut state = in_term(3);
        state.results.provincial = 1;
        assert_eq!(
            check_submission(&state, &content(), PROVINCIAL_PROJECT_ID).unwrap_err(),
            Rejection::AlreadyWon(ProjectTier::Provincial)
        );
    }

    #[test]
    fn test_unknown_project_rejected() {
        let state = in_term(1);
        assert_eq!(
            check_submission(&state, &content(), "moon_shot").unwrap_err(),
            Rejection::UnknownProject("moon_shot".into())
        );
    }

    #[test]
    fn test_unaffordable_submission() {
        let mut state = in_term(1);
        state.stats.energy = 4;
        assert_eq!(
            submit_project(&mut state, &content(), NATIONAL_PROJECT_ID),
            Err(Rejection::Unaffordable("apply for this project"))
        );
        assert!(state.pending_projects.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut content = content();
        content.projects[0].success_rate = 1.0;
        let mut state = in_term(1);
        submit_project(&mut state, &content, NATIONAL_PROJECT_ID).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        // Not due yet.
        resolve_due_projects(&mut state, &content, &mut rng);
        assert!(state.pending_projects.contains_key(NATIONAL_PROJECT_ID));

        state.time.term = 3;
        state.time.phase = Phase::Event;
        resolve_due_projects(&mut state, &content, &mut rng);
        resolve_due_projects(&mut state, &content, &mut rng);
        assert_eq!(state.results.national, 1);
        assert!(state.pending_projects.is_empty());
    }

    #[test]
    fn test_restored_decided_entry_is_not_rolled_again() {
        let mut content = content();
        content.projects[0].success_rate = 1.0;
        let mut state = in_term(3);
        state.time.phase = Phase::Event;

        let decided: PendingProject = serde_json::from_str(r#"{"yearApplied":1,"resolvedYear":1}"#).unwrap();
        assert_eq!(decided.resolved_year, Some(1));
        state.pending_projects.insert(NATIONAL_PROJECT_ID.into(), decided);
        let log_len = state.log.len();

        resolve_due_projects(&mut state, &content, &mut StdRng::seed_from_u64(4));
        assert_eq!(state.results.national, 0);
        assert!(state.pending_projects.is_empty());
        assert_eq!(state.log.len(), log_len);

        let open: PendingProject = serde_json::from_str(r#"{"yearApplied":1}"#).unwrap();
        assert_eq!(open, PendingProject::new(1));
        assert_eq!(serde_json::to_string(&open).unwrap(), r#"{"yearApplied":1}"#);
    }

    #[test]
    fn test_failure_applies_on_fail() {
        let mut content = content();
        content.projects[1].success_rate = 0.0;
        content.projects[1].on_fail = vec![Effect::result(ResultKey::Leader, 2)];
        let mut state = in_term(3);
        submit_project(&mut state, &content, PROVINCIAL_PROJECT_ID).unwrap();
        state.time.phase = Phase::Action;
        resolve_due_projects(&mut state, &content, &mut StdRng::seed_from_u64(9));
        assert_eq!(state.results.provincial, 0);
        assert_eq!(state.results.leader, 2);
        assert!(state.log[0].contains("not funded"));
    }

    #[test]
    fn test_stale_application_from_prior_year_not_resolved() {
        let mut content = content();
        content.projects[0].success_rate = 1.0;
        let mut state = in_term(3);
        state
            .pending_projects
            .insert(NATIONAL_PROJECT_ID.into(), PendingProject::new(0));
        resolve_due_projects(&mut state, &content, &mut StdRng::seed_from_u64(2));
        assert_eq!(state.results.national, 0);

        expire_stale_national(&mut state, &content);
        assert!(state.pending_projects.is_empty());
        assert!(state.log[0].contains("treated as not funded"));
    }

    #[test]
    fn test_custom_project_has_no_term_gate() {
        let mut content = content();
        content.projects.push(ProjectDef::builtin("youth_fund", ProjectTier::Provincial));
        let mut state = in_term(0);
        submit_project(&mut state, &content, "youth_fund").unwrap();
        assert!(state.pending_projects.contains_key("youth_fund"));
    }
}
