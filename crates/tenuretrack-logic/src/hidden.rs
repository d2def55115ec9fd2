//! Hidden year-end rule changes.
//!
//! Two mechanisms rewrite the visible requirements at year rollover without
//! ever showing the player a probability:
//!
//! * **Reform**: once per run, only at the end of year 5: achievements are
//!   wiped and the baseline requirements are doubled with six extra years.
//! * **Tightening**: each year end, a small chance to apply one increment of
//!   the run's locked family (TOP or NATIONAL).
//!
//! Reform is checked first; if it fires, tightening is skipped that year.

use rand::Rng;

use crate::content::Content;
use crate::state::{ProjectMode, Results, RunState, TighteningFamily};

/// Year at whose end the reform may fire.
pub const REFORM_YEAR: u32 = 5;
pub const REFORM_CHANCE: f64 = 0.25;
/// Years added to the original `maxYear` by a reform.
pub const REFORM_EXTRA_YEARS: u32 = 6;

pub const TIGHTEN_CHANCE: f64 = 0.20;
/// Increments of `topExtra` allowed per run.
pub const TOP_TIGHTEN_CAP: u8 = 3;

const TIGHTEN_LOG: &str = "(Policy change) The assessment criteria have changed.";
const REFORM_LOG: &str = "(Reform) The up-or-out track has been converted to a pre-tenure track. \
You are reappointed as assistant professor for another six years. \
Prior achievements are cleared and requirements are raised.";

/// Try the year-5 reform. Returns true when it fired.
pub fn try_reform(state: &mut RunState, content: &Content, rng: &mut impl Rng) -> bool {
    if state.hidden.reform_triggered || state.time.year != REFORM_YEAR {
        return false;
    }
    if rng.gen::<f64>() >= REFORM_CHANCE {
        return false;
    }

    state.hidden.reform_triggered = true;
    if state.hidden.original_req.is_none() {
        state.hidden.original_req = Some(state.req.clone());
    }
    let original = state.hidden.original_req.clone().unwrap_or_default();

    state.results = Results::default();
    state.papers.clear();
    state.selected_paper_id = None;
    state.teaching_this_year = 0;
    state.stats.time = content.time_reset();

    state.req.teach_per_year = original.teach_per_year * 2;
    state.req.paper_need = original.paper_need * 2;
    state.req.project_mode = original.project_mode;
    state.req.project_need = original.project_need * 2;
    state.req.max_year = original.max_year + REFORM_EXTRA_YEARS;

    state.push_log(REFORM_LOG);
    log::info!(
        "reform fired at end of year {}; run extended to year {}",
        state.time.year,
        state.req.max_year
    );
    true
}

/// Roll for one tightening increment.
pub fn try_tighten(state: &mut RunState, rng: &mut impl Rng) {
    if rng.gen::<f64>() > TIGHTEN_CHANCE {
        return;
    }

    let lock = match state.hidden.lock {
        Some(family) => family,
        None => {
            let family = if rng.gen_bool(0.5) {
                TighteningFamily::Top
            } else {
                TighteningFamily::National
            };
            state.hidden.lock = Some(family);
            family
        }
    };

    match lock {
        TighteningFamily::Top => {
            if state.hidden.top_tighten_count >= TOP_TIGHTEN_CAP {
                return;
            }
            state.hidden.top_tighten_count += 1;
            state.req.top_extra += 1;
        }
        TighteningFamily::National => {
            if state.hidden.national_tighten_done {
                return;
            }
            state.hidden.national_tighten_done = true;
            state.req.project_mode = ProjectMode::National;
        }
    }
    state.push_log(TIGHTEN_LOG);
    log::info!("tightening applied: {:?} in year {}", lock, state.time.year);
}

/// Run the year-end hidden rules in order: reform, else tightening.
pub fn apply_year_end_rules(state: &mut RunState, content: &Content, rng: &mut impl Rng) {
    if !try_reform(state, content, rng) {
        try_tighten(state, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Paper, Requirements};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn content() -> Content {
        Content::with_schools(Vec::new())
    }

    fn seasoned_state(year: u32) -> RunState {
        let mut state = RunState::new();
        state.time.year = year;
        state.results.qualified_papers = 4;
        state.results.leader = 12;
        state.papers.push(Paper::new("P1".into()));
        state.selected_paper_id = Some("P1".into());
        state.stats.mood = 333;
        state.stats.time = 7;
        state
    }

    /// Find a seed whose first reform draw fires.
    fn reform_firing_rng() -> StdRng {
        (0..1000)
            .map(StdRng::seed_from_u64)
            .find(|rng| rng.clone().gen::<f64>() < REFORM_CHANCE)
            .unwrap()
    }

    #[test]
    fn test_reform_only_in_year_five() {
        let content = content();
        for year in [1, 4, 6] {
            let mut state = seasoned_state(year);
            assert!(!try_reform(&mut state, &content, &mut reform_firing_rng()));
            assert_eq!(state.results.qualified_papers, 4);
        }
    }

    #[test]
    fn test_reform_resets_and_doubles() {
        let content = content();
        let mut state = seasoned_state(REFORM_YEAR);
        state.req.project_mode = ProjectMode::National;
        state.hidden.original_req = Some(Requirements::default());

        assert!(try_reform(&mut state, &content, &mut reform_firing_rng()));
        assert_eq!(state.results, Results::default());
        assert!(state.papers.is_empty());
        assert!(state.selected_paper_id.is_none());
        assert_eq!(state.stats.time, 100);
        assert_eq!(state.stats.mood, 333);
        assert_eq!(state.req.teach_per_year, 4);
        assert_eq!(state.req.paper_need, 12);
        assert_eq!(state.req.project_need, 2);
        assert_eq!(state.req.max_year, 12);
        // Restored from the baseline, undoing the earlier tightening.
        assert_eq!(state.req.project_mode, ProjectMode::Either);
    }

    #[test]
    fn test_reform_fires_at_most_once() {
        let content = content();
        let mut state = seasoned_state(REFORM_YEAR);
        assert!(try_reform(&mut state, &content, &mut reform_firing_rng()));
        let after = state.req.clone();
        assert!(!try_reform(&mut state, &content, &mut reform_firing_rng()));
        assert_eq!(state.req, after);
    }

    #[test]
    fn test_year_end_reform_replaces_tightening() {
        let content = content();
        let mut state = seasoned_state(REFORM_YEAR);
        let original = Requirements {
            teach_per_year: 3,
            paper_need: 5,
            project_need: 1,
            max_year: 7,
            ..Requirements::default()
        };
        state.req = original.clone();
        state.hidden.original_req = Some(original.clone());

        apply_year_end_rules(&mut state, &content, &mut reform_firing_rng());

        assert!(state.hidden.reform_triggered);
        assert_eq!(
            state.req,
            Requirements {
                teach_per_year: 6,
                paper_need: 10,
                project_need: 2,
                max_year: 13,
                ..original
            }
        );
        assert_eq!(state.hidden.lock, None);
        assert_eq!(state.req.top_extra, 0);
        assert_eq!(state.log.len(), 1);
        assert!(!state.log.iter().any(|line| line.contains(TIGHTEN_LOG)));
    }

    #[test]
    fn test_year_end_reform_leaves_locked_family_alone() {
        let content = content();
        let mut state = seasoned_state(REFORM_YEAR);
        state.hidden.lock = Some(TighteningFamily::Top);
        state.hidden.top_tighten_count = 1;
        state.req.top_extra = 1;

        apply_year_end_rules(&mut state, &content, &mut reform_firing_rng());

        assert!(state.hidden.reform_triggered);
        assert_eq!(state.hidden.top_tighten_count, 1);
        assert_eq!(state.req.top_extra, 1);
    }

    #[test]
    fn test_lock_never_switches() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut state = RunState::new();
        let mut first_lock = None;
        for _ in 0..200 {
            try_tighten(&mut state, &mut rng);
            if let Some(lock) = state.hidden.lock {
                assert_eq!(*first_lock.get_or_insert(lock), lock);
            }
        }
        assert!(state.hidden.lock.is_some());
        assert!(state.hidden.top_tighten_count <= TOP_TIGHTEN_CAP);
        match state.hidden.lock {
            Some(TighteningFamily::Top) => {
                assert_eq!(state.req.project_mode, ProjectMode::Either);
                assert_eq!(state.req.top_extra, state.hidden.top_tighten_count as u32);
            }
            Some(TighteningFamily::National) => {
                assert_eq!(state.req.top_extra, 0);
                assert_eq!(state.req.project_mode, ProjectMode::National);
            }
            None => unreachable!(),
        }
    }

    #[test]
    fn test_exhausted_family_stays_locked() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = RunState::new();
        state.hidden.lock = Some(TighteningFamily::National);
        state.hidden.national_tighten_done = true;
        for _ in 0..100 {
            try_tighten(&mut state, &mut rng);
        }
        assert_eq!(state.hidden.lock, Some(TighteningFamily::National));
        assert_eq!(state.req.top_extra, 0);
        assert!(state.log.is_empty());
    }
}
