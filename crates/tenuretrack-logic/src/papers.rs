//! Paper pipeline: drafting, upgrading and journal submission.
//!
//! A paper is opened by the first `WRITE_PAPER` click, becomes a `draft`
//! after `draftClicksPerDraft` clicks, may be upgraded one venue level at a
//! time, and is then submitted. Each paper gets three submission attempts
//! per turn.

use rand::Rng;

use crate::actions::ids;
use crate::character::d6;
use crate::content::Content;
use crate::economy::{can_afford, spend};
use crate::rejection::Rejection;
use crate::state::{Paper, PaperLevel, PaperStage, RunState};

/// Submission attempts per paper per turn.
pub const MAX_ATTEMPTS_PER_TURN: u32 = 3;
const DEFAULT_DRAFT_CLICKS: u32 = 3;

/// Spend one writing session on the current drafting paper, opening a new
/// one if there is none.
pub fn write_paper(state: &mut RunState, content: &Content) -> Result<(), Rejection> {
    let def = content.actions.get(ids::WRITE_PAPER);
    if !can_afford(&state.stats, &def.cost) {
        return Err(Rejection::Unaffordable("write a paper"));
    }
    spend(&mut state.stats, &state.skills, &def.cost);

    let needs_new = state
        .papers
        .last()
        .map_or(true, |p| p.published || p.stage != PaperStage::Drafting);
    if needs_new {
        let id = format!("P{}", state.papers.len() + 1);
        state.papers.push(Paper::new(id));
    }

    let clicks_needed = def.draft_clicks_per_draft.unwrap_or(DEFAULT_DRAFT_CLICKS).max(1);
    let Some(paper) = state.papers.last_mut() else {
        return Ok(());
    };
    paper.draft_clicks += 1;
    let msg = if paper.draft_clicks >= clicks_needed {
        paper.stage = PaperStage::Draft;
        paper.draft_clicks = 0;
        format!("Draft finished: {} (ready to upgrade or submit).", paper.id)
    } else {
        format!("Writing: progress +1 on {}.", paper.id)
    };
    state.push_log(msg);
    Ok(())
}

pub fn select_paper(state: &mut RunState, paper_id: Option<String>) {
    state.selected_paper_id = paper_id;
}

/// The explicitly named paper, else the selected one.
fn target_id(state: &RunState, paper_id: Option<&str>) -> Result<String, Rejection> {
    let id = paper_id
        .or(state.selected_paper_id.as_deref())
        .ok_or(Rejection::NoPaperSelected)?;
    let paper = state.paper(id).ok_or(Rejection::NoPaperSelected)?;
    if paper.published || paper.stage != PaperStage::Draft {
        return Err(Rejection::PaperNotDraft);
    }
    Ok(paper.id.clone())
}

/// Raise an unpublished draft by one venue level.
pub fn upgrade_paper(state: &mut RunState, content: &Content, paper_id: Option<&str>) -> Result<(), Rejection> {
    let id = target_id(state, paper_id)?;
    let cost = content.actions.get(ids::UPGRADE_PAPER).cost;
    if !can_afford(&state.stats, &cost) {
        return Err(Rejection::Unaffordable("upgrade the paper"));
    }
    spend(&mut state.stats, &state.skills, &cost);

    let Some(paper) = state.paper_mut(&id) else {
        return Err(Rejection::NoPaperSelected);
    };
    paper.level = paper.level.next();
    let msg = format!("Paper upgraded: {} is now aimed at a {}.", paper.id, paper.level.name());
    state.push_log(msg);
    Ok(())
}

/// Whether a journal accepts, by social skill: 1-2 needs a 6, 3-4 needs
/// 5+, 5-6 needs 5+ with one re-roll.
pub fn acceptance_roll(social: u8, rng: &mut impl Rng) -> bool {
    let roll = d6(rng);
    match social {
        0..=2 => roll == 6,
        3..=4 => roll >= 5,
        _ => roll >= 5 || d6(rng) >= 5,
    }
}

/// Submit an unpublished draft. A rejection by the journal still uses up
/// an attempt.
pub fn submit_paper(
    state: &mut RunState,
    paper_id: Option<&str>,
    rng: &mut impl Rng,
) -> Result<(), Rejection> {
    let id = target_id(state, paper_id)?;
    let social = state.skills.social;
    let Some(paper) = state.paper_mut(&id) else {
        return Err(Rejection::NoPaperSelected);
    };
    if paper.attempts_this_turn >= MAX_ATTEMPTS_PER_TURN {
        return Err(Rejection::AttemptsExhausted(id));
    }
    paper.attempts_this_turn += 1;

    if !acceptance_roll(social, rng) {
        let msg = format!(
            "Submission rejected: {} (attempt {}/{}).",
            paper.id, paper.attempts_this_turn, MAX_ATTEMPTS_PER_TURN
        );
        state.push_log(msg);
        return Ok(());
    }

    paper.published = true;
    let level = paper.level;
    if level.is_qualified() {
        state.results.qualified_papers += 1;
    }
    if level == PaperLevel::Top {
        state.results.top_papers += 1;
    }
    state.push_log(format!("Published: {} ({}).", id, level.name()));
    log::debug!("paper {} published at level {:?}", id, level);
    Ok(())
}
