//! Per-term mandatory panels described by content.
//!
//! A panel is an ordered list of blocks. Button blocks run once; counter
//! blocks run a player-chosen number of times within `[min, max]`. Costs
//! are charged per repetition or once, depending on `costMode`.

use crate::actions::{ids, Payload};
use crate::content::{BlockKind, Content, CostMode, FixedBlock};
use crate::economy::{can_afford, effect_summary, scale, spend, StatMap};
use crate::effects::apply_effects;
use crate::rejection::Rejection;
use crate::state::RunState;

/// The block in the current term's panel bound to `action_id`, if any.
/// Project submission ids are never resolved here.
pub fn find_block<'c>(state: &RunState, content: &'c Content, action_id: &str) -> Option<&'c FixedBlock> {
    if ids::PROJECT_ACTIONS.contains(&action_id) {
        return None;
    }
    content
        .fixed_panel(state.time.term)?
        .blocks
        .iter()
        .find(|b| b.action_id == action_id)
}

/// Repetitions for a block. Counter blocks clamp the requested count to
/// `[min, max]` (a missing count resolves to `min`); buttons run once.
pub fn block_times(block: &FixedBlock, requested: Option<i64>) -> u32 {
    match block.kind {
        BlockKind::Button => 1,
        BlockKind::Counter => {
            let min = block.min.unwrap_or(0).max(0);
            let max = block.max.unwrap_or(min).max(min);
            u32::try_from(requested.unwrap_or(min).clamp(min, max)).unwrap_or(u32::MAX)
        }
    }
}

/// Total cost of running a block `times` times.
pub fn block_cost(block: &FixedBlock, times: u32) -> StatMap {
    let Some(cost) = &block.cost else {
        return StatMap::new();
    };
    match block.cost_mode {
        CostMode::Per => scale(cost, times),
        CostMode::Once => cost.clone(),
    }
}

/// Check the term guard and one-run-per-term rule without mutating.
pub fn check_block(state: &RunState, block: &FixedBlock) -> Result<(), Rejection> {
    if let Some(guard) = &block.guard {
        if !guard.term_in.is_empty() && !guard.term_in.contains(&state.time.term) {
            return Err(Rejection::BlockOutOfTerm);
        }
    }
    if state.fixed_choices.contains_key(block.key()) {
        return Err(Rejection::BlockAlreadyDone);
    }
    Ok(())
}

/// Execute a block: validate, pay, apply effects, record the choice.
pub fn resolve_block(state: &mut RunState, block: &FixedBlock, payload: &Payload) -> Result<(), Rejection> {
    check_block(state, block)?;

    let times = block_times(block, payload.count);
    let cost = block_cost(block, times);
    if !can_afford(&state.stats, &cost) {
        return Err(Rejection::Unaffordable("handle this fixed event"));
    }

    let before = state.stats.clone();
    spend(&mut state.stats, &state.skills, &cost);
    apply_effects(state, &block.effects, times);

    state.fixed_done = true;
    state.fixed_choices.insert(block.key().to_string(), times);

    let title = block
        .log
        .as_deref()
        .or(block.title.as_deref())
        .unwrap_or("Fixed event handled");
    match block.kind {
        BlockKind::Counter => state.push_log(format!("{}: {} time(s).", title, times)),
        BlockKind::Button => state.push_log(format!("{}.", title)),
    }
    let summary = effect_summary(&before, &state.stats);
    state.push_log(summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BlockGuard, FixedPanel};
    use crate::economy::Stat;
    use crate::effects::Effect;
    use crate::state::{CounterKey, ResultKey};

    fn teach_block() -> FixedBlock {
        FixedBlock {
            id: Some("fall_teaching".into()),
            action_id: "FP_TEACH".into(),
            kind: BlockKind::Counter,
            title: Some("Teach courses".into()),
            log: None,
            guard: None,
            cost: Some([(Stat::Time, 20), (Stat::Energy, 10)].into_iter().collect()),
            cost_mode: CostMode::Per,
            min: Some(0),
            max: Some(2),
            effects: vec![
                Effect::Counter {
                    key: CounterKey::TeachingThisYear,
                    delta: 1,
                },
                Effect::result(ResultKey::Leader, 1),
            ],
            payload: None,
        }
    }

    fn count(n: i64) -> Payload {
        Payload {
            count: Some(n),
            ..Payload::default()
        }
    }

    #[test]
    fn test_block_times_clamps() {
        let block = teach_block();
        assert_eq!(block_times(&block, Some(5)), 2);
        assert_eq!(block_times(&block, Some(-3)), 0);
        assert_eq!(block_times(&block, None), 0);
        let mut button = block.clone();
        button.kind = BlockKind::Button;
        assert_eq!(block_times(&button, Some(9)), 1);
    }

    #[test]
    fn test_block_times_saturates_wide_ranges() {
        let mut block = teach_block();
        block.max = Some(i64::MAX);
        assert_eq!(block_times(&block, Some(i64::MAX)), u32::MAX);
        assert_eq!(block_times(&block, Some(7)), 7);
        assert_eq!(block_cost(&block, u32::MAX)[&Stat::Time], 20 * u32::MAX as i64);
    }

    #[test]
    fn test_cost_modes() {
        let mut block = teach_block();
        assert_eq!(block_cost(&block, 2)[&Stat::Time], 40);
        block.cost_mode = CostMode::Once;
        assert_eq!(block_cost(&block, 2)[&Stat::Time], 20);
    }

    #[test]
    fn test_resolve_counter_block() {
        let mut state = RunState::new();
        resolve_block(&mut state, &teach_block(), &count(2)).unwrap();
        assert_eq!(state.teaching_this_year, 2);
        assert_eq!(state.results.leader, 2);
        assert_eq!(state.stats.time, 60);
        assert_eq!(state.stats.energy, 80);
        assert!(state.fixed_done);
        assert_eq!(state.fixed_choices["fall_teaching"], 2);
        assert!(state.log[1].contains("Teach courses: 2 time(s)."));
    }

    #[test]
    fn test_zero_count_completes_without_effects() {
        let mut state = RunState::new();
        resolve_block(&mut state, &teach_block(), &count(0)).unwrap();
        assert!(state.fixed_done);
        assert_eq!(state.teaching_this_year, 0);
        assert_eq!(state.results.leader, 0);
        assert_eq!(state.stats, crate::economy::Stats::default());
        assert_eq!(state.fixed_choices["fall_teaching"], 0);
    }

    #[test]
    fn test_unaffordable_block_rejected() {
        let mut state = RunState::new();
        state.stats.time = 30;
        let err = resolve_block(&mut state, &teach_block(), &count(2)).unwrap_err();
        assert_eq!(err, Rejection::Unaffordable("handle this fixed event"));
        assert!(!state.fixed_done);
    }

    #[test]
    fn test_guard_and_repeat() {
        let mut state = RunState::new();
        let mut block = teach_block();
        block.guard = Some(BlockGuard { term_in: vec![2] });
        assert_eq!(check_block(&state, &block), Err(Rejection::BlockOutOfTerm));

        block.guard = None;
        resolve_block(&mut state, &block, &count(1)).unwrap();
        assert_eq!(
            resolve_block(&mut state, &block, &count(1)),
            Err(Rejection::BlockAlreadyDone)
        );
    }

    #[test]
    fn test_find_block_skips_project_ids() {
        let mut content = Content::with_schools(Vec::new());
        let mut apply = teach_block();
        apply.action_id = ids::APPLY_NATIONAL.into();
        content.fixed_panels.insert(
            0,
            FixedPanel {
                title: None,
                blocks: vec![teach_block(), apply],
            },
        );
        let state = RunState::new();
        assert!(find_block(&state, &content, "FP_TEACH").is_some());
        assert!(find_block(&state, &content, ids::APPLY_NATIONAL).is_none());
    }
}
