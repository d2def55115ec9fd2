//! Character creation and school selection.

use rand::Rng;

use crate::actions::Payload;
use crate::content::Content;
use crate::economy::{Skill, Skills, SKILL_MAX, SKILL_MIN};
use crate::rejection::Rejection;
use crate::state::{GameTime, RunState, Screen};

pub fn d6(rng: &mut impl Rng) -> u32 {
    rng.gen_range(1..=6)
}

pub fn roll_4d6(rng: &mut impl Rng) -> u32 {
    (0..4).map(|_| d6(rng)).sum()
}

/// Roll the skill budget and move to the character screen.
pub fn start_run(state: &mut RunState, rng: &mut impl Rng) {
    state.roll_total = roll_4d6(rng);
    state.skills = Skills::default();
    state.skill_points = state.roll_total.saturating_sub(state.skills.total());
    state.screen = Screen::Character;
    state.push_log(format!(
        "PhD begins: {} skill points rolled, {} left to assign.",
        state.roll_total, state.skill_points
    ));
}

/// Set one skill level. The sum of all four may not exceed the roll.
pub fn set_skill(state: &mut RunState, payload: &Payload) -> Result<(), Rejection> {
    let skill = payload
        .key
        .as_deref()
        .and_then(Skill::from_key)
        .ok_or(Rejection::InvalidSkill)?;
    let value = payload.value.ok_or(Rejection::InvalidSkill)?;
    let level = value.clamp(SKILL_MIN as i64, SKILL_MAX as i64) as u8;

    let mut next = state.skills.clone();
    next.set(skill, level);
    if next.total() > state.roll_total {
        return Err(Rejection::SkillBudgetExceeded);
    }
    state.skill_points = state.roll_total - next.total();
    state.skills = next;
    Ok(())
}

pub fn confirm_skills(state: &mut RunState) {
    state.screen = Screen::Job;
}

/// Start the tenure clock at the chosen school (the first one by default).
pub fn choose_school(state: &mut RunState, content: &Content, school_id: Option<&str>) -> Result<(), Rejection> {
    let school = content
        .school(school_id)
        .ok_or_else(|| Rejection::UnknownSchool(school_id.unwrap_or_default().to_string()))?;

    state.school_id = Some(school.id.clone());
    state.req = school.tenure.requirements();

    state.time = GameTime::default();
    state.teaching_this_year = 0;
    state.random_quota = content.quota_for_term(state.time.term);
    state.random_seen_run.clear();
    state.random_seen_term.clear();
    state.pending_projects.clear();
    state.fixed_done = false;
    state.fixed_choices.clear();
    state.stats.time = content.time_reset();

    state.screen = Screen::Main;
    state.push_log(format!("Hired by {}. Year 1, fall term begins.", school.name));
    log::info!("run started at school {}", school.id);
    Ok(())
}
