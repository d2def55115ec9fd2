//! Random event selection: weighted, capped and luck-biased.
//!
//! The unified event list is tried first. An event is eligible when the
//! current year and term fall inside its window and its run/term caps are
//! not exhausted. Weights are scaled by luck (up for positive events, down
//! for negative ones) and drawn with a cumulative-subtraction walk.
//!
//! Only when no unified event is eligible does the selector fall back to
//! the three unweighted legacy pools, choosing a pool by luck first.

use rand::Rng;

use crate::content::{Content, EventCatalog, LegacyPool, RandomEventDef};
use crate::economy::effect_summary;
use crate::effects::{apply_effects, Effect};
use crate::rejection::Rejection;
use crate::state::RunState;

const LUCK_BIAS_STEP: f64 = 0.06;
const POOL_FLOOR: f64 = 0.05;
const POOL_CEIL: f64 = 0.85;

/// Probability of drawing from each legacy pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolProbs {
    pub good: f64,
    pub mid: f64,
    pub bad: f64,
}

/// Legacy pool probabilities for a luck level.
///
/// Good rises 10% and bad falls 8% per luck level, each clamped to
/// `[0.05, 0.85]`. If that leaves less than 5% for mid, the deficit is
/// taken from bad first, then good, never pushing either below 5%.
pub fn luck_pool_probs(luck: u8) -> PoolProbs {
    let steps = luck.saturating_sub(1) as f64;
    let mut good = (0.15 + 0.10 * steps).clamp(POOL_FLOOR, POOL_CEIL);
    let mut bad = (0.55 - 0.08 * steps).clamp(POOL_FLOOR, POOL_CEIL);
    let mut mid = 1.0 - good - bad;
    if mid < POOL_FLOOR {
        let deficit = POOL_FLOOR - mid;
        let from_bad = deficit.min((bad - POOL_FLOOR).max(0.0));
        bad -= from_bad;
        let remaining = deficit - from_bad;
        let from_good = remaining.min((good - POOL_FLOOR).max(0.0));
        good -= from_good;
        mid = POOL_FLOOR;
    }
    let sum = good + mid + bad;
    PoolProbs {
        good: good / sum,
        mid: mid / sum,
        bad: bad / sum,
    }
}

/// Weight multiplier from luck and the event's tags.
pub fn luck_bias(luck: u8, tags: &[String]) -> f64 {
    let bias = luck.saturating_sub(1) as f64 * LUCK_BIAS_STEP;
    let has = |t: &str| tags.iter().any(|tag| tag == t);
    if has("positive") || has("good") {
        1.0 + bias
    } else if has("negative") || has("bad") {
        1.0 - bias
    } else {
        1.0
    }
}

/// Whether an event may fire now given its window and caps.
pub fn event_allowed(state: &RunState, ev: &RandomEventDef) -> bool {
    let year = state.time.year;
    if ev.min_year.is_some_and(|min| year < min) {
        return false;
    }
    if ev.max_year.is_some_and(|max| year > max) {
        return false;
    }
    if !ev.term_in.is_empty() && !ev.term_in.contains(&state.time.term) {
        return false;
    }
    let seen_run = state.random_seen_run.get(&ev.id).copied().unwrap_or(0);
    let seen_term = state.random_seen_term.get(&ev.id).copied().unwrap_or(0);
    if ev.max_per_run.is_some_and(|cap| seen_run >= cap) {
        return false;
    }
    if ev.max_per_term.is_some_and(|cap| seen_term >= cap) {
        return false;
    }
    true
}

/// Draw one item proportionally to its weight.
///
/// Walks the list subtracting weights from `r ∈ [0, total)` and returns the
/// first item where the remainder drops to zero or below; the last item
/// covers floating-point leftovers. Returns `None` when the total is zero.
pub fn pick_weighted<'a, T>(candidates: &'a [(T, f64)], rng: &mut impl Rng) -> Option<&'a T> {
    let total: f64 = candidates.iter().map(|(_, w)| *w).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let mut r = rng.gen::<f64>() * total;
    for (item, w) in candidates {
        r -= *w;
        if r <= 0.0 {
            return Some(item);
        }
    }
    candidates.last().map(|(item, _)| item)
}

/// Weighted candidates from the unified list with luck applied.
/// Candidates whose adjusted weight is not positive are excluded.
pub fn unified_candidates<'c>(
    state: &RunState,
    events: &'c [RandomEventDef],
) -> Vec<(&'c RandomEventDef, f64)> {
    let luck = state.skills.luck;
    events
        .iter()
        .filter(|ev| !ev.id.is_empty() && event_allowed(state, ev))
        .filter_map(|ev| {
            let w = (ev.weight * luck_bias(luck, &ev.tags)).max(0.0);
            (w > 0.0).then_some((ev, w))
        })
        .collect()
}

/// A drawn event, borrowed from content.
#[derive(Debug, Clone)]
pub struct PickedEvent<'c> {
    pub id: String,
    /// Only unified events count against caps.
    pub tracked: bool,
    pub title: Option<&'c str>,
    pub text: Option<&'c str>,
    pub tags: Vec<String>,
    pub effects: &'c [Effect],
}

fn pick_unified<'c>(
    state: &RunState,
    catalog: &'c EventCatalog,
    rng: &mut impl Rng,
) -> Option<PickedEvent<'c>> {
    let candidates = unified_candidates(state, &catalog.unified);
    let ev = *pick_weighted(&candidates, rng)?;
    Some(PickedEvent {
        id: ev.id.clone(),
        tracked: true,
        title: ev.title.as_deref(),
        text: ev.text.as_deref(),
        tags: ev.tags.clone(),
        effects: &ev.effects,
    })
}

fn pick_legacy<'c>(
    state: &RunState,
    catalog: &'c EventCatalog,
    rng: &mut impl Rng,
) -> Option<PickedEvent<'c>> {
    if catalog.legacy.is_empty() {
        return None;
    }
    let probs = luck_pool_probs(state.skills.luck);
    let r: f64 = rng.gen();
    let which = if r < probs.good {
        LegacyPool::Good
    } else if r < probs.good + probs.mid {
        LegacyPool::Mid
    } else {
        LegacyPool::Bad
    };
    let pool = catalog.legacy.pool(which);
    if pool.is_empty() {
        return None;
    }
    let pick = &pool[rng.gen_range(0..pool.len())];
    Some(PickedEvent {
        id: format!("legacy_{}_{}", which.name(), rng.gen_range(0..1_000_000_000u32)),
        tracked: false,
        title: pick.title.as_deref(),
        text: pick.text.as_deref(),
        tags: vec![which.tag().to_string()],
        effects: &pick.effects,
    })
}

/// Pick from the unified list, falling back to the legacy pools.
pub fn pick_event<'c>(
    state: &RunState,
    catalog: &'c EventCatalog,
    rng: &mut impl Rng,
) -> Option<PickedEvent<'c>> {
    pick_unified(state, catalog, rng).or_else(|| pick_legacy(state, catalog, rng))
}

/// Consume one unit of quota and fire a random event.
///
/// If nothing is eligible the quota is still consumed so the event stage
/// can never stall.
pub fn trigger_random_event(
    state: &mut RunState,
    content: &Content,
    rng: &mut impl Rng,
) -> Result<(), Rejection> {
    if state.random_quota == 0 {
        return Err(Rejection::QuotaExhausted);
    }

    let picked = pick_event(state, &content.events, rng);
    state.random_quota -= 1;

    let Some(ev) = picked else {
        state.push_log("No random events could be triggered this turn.");
        return Ok(());
    };

    let before = state.stats.clone();
    let title = ev.title.unwrap_or("Random event");
    let text = ev.text.unwrap_or("(something happened)");
    state.push_log(format!("[{}] {}", title, text));

    apply_effects(state, ev.effects, 1);
    let summary = effect_summary(&before, &state.stats);
    state.push_log(summary);

    if ev.tracked {
        *state.random_seen_run.entry(ev.id.clone()).or_insert(0) += 1;
        *state.random_seen_term.entry(ev.id).or_insert(0) += 1;
    }
    Ok(())
}
