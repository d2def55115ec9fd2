//! TenureTrack Headless Simulation Harness
//!
//! Validates the bundled content and the pure game logic, then plays seeded
//! autoplay runs to completion while checking invariants after every
//! dispatch. No UI, no I/O beyond stdout.
//!
//! Usage:
//!   cargo run -p tenuretrack-simtest
//!   cargo run -p tenuretrack-simtest -- --verbose
//!   RUST_LOG=tenuretrack_logic=info cargo run -p tenuretrack-simtest

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tenuretrack_logic::actions::{ids, Payload};
use tenuretrack_logic::content::BlockKind;
use tenuretrack_logic::economy::{self, Direction, Skills, Stat, StatMap, Stats, STAT_MAX, STAT_MIN};
use tenuretrack_logic::random_events::luck_pool_probs;
use tenuretrack_logic::state::{PaperLevel, PaperStage, Phase, Screen, TighteningFamily, LOG_CAPACITY};
use tenuretrack_logic::{
    dispatch, get_available_actions, load_content, Action, Content, ContentSources, RunState,
};

const AUTOPLAY_SEEDS: u64 = 200;
const MAX_STEPS_PER_RUN: usize = 20_000;

/// Only the block count matters here; the loader is lenient and would hide
/// a block that failed to parse.
#[derive(Debug, Deserialize)]
struct RawPanel {
    blocks: Vec<serde_json::Value>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("=== TenureTrack Simulation Harness ===\n");

    let sources = ContentSources::bundled();
    let content = match load_content(&sources) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ content_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Bundled content
    results.extend(validate_content(&sources, &content, verbose));

    // 2. Stat economy sweep
    results.extend(validate_economy(verbose));

    // 3. Luck tables
    results.extend(validate_luck_tables(verbose));

    // 4. Seeded autoplay
    results.extend(validate_autoplay(&content, verbose));

    // 5. Determinism
    results.extend(validate_determinism(&content));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Content ──────────────────────────────────────────────────────────

fn validate_content(sources: &ContentSources, content: &Content, verbose: bool) -> Vec<TestResult> {
    println!("--- Content ---");
    let mut results = Vec::new();

    // Every bundled file must be well-formed JSON; the loader would
    // silently fall back to defaults otherwise.
    let mut files: Vec<(&str, &str)> = Vec::new();
    files.extend(sources.base.map(|s| ("rules/base", s)));
    files.extend(sources.actions.map(|s| ("actions", s)));
    files.extend(sources.events.map(|s| ("events", s)));
    files.extend(sources.legacy_good.map(|s| ("random.good", s)));
    files.extend(sources.legacy_mid.map(|s| ("random.mid", s)));
    files.extend(sources.legacy_bad.map(|s| ("random.bad", s)));
    files.extend(sources.projects.map(|s| ("projects", s)));
    let bad: Vec<&str> = files
        .iter()
        .filter(|(_, src)| serde_json::from_str::<serde_json::Value>(src).is_err())
        .map(|(name, _)| *name)
        .collect();
    results.push(TestResult::new(
        "content_files_parse",
        bad.is_empty(),
        if bad.is_empty() {
            format!("{} files well-formed", files.len())
        } else {
            format!("malformed: {:?}", bad)
        },
    ));

    let mut dropped = Vec::new();
    for (term, src) in sources.fixed_panels.iter().enumerate() {
        let raw = (*src)
            .and_then(|s| serde_json::from_str::<RawPanel>(s).ok())
            .map_or(0, |p| p.blocks.len());
        let loaded = content.fixed_panel(term as u8).map_or(0, |p| p.blocks.len());
        if raw != loaded || loaded == 0 {
            dropped.push(format!("term {}: {} raw / {} loaded", term, raw, loaded));
        }
    }
    results.push(TestResult::new(
        "fixed_panels_complete",
        dropped.is_empty(),
        if dropped.is_empty() {
            "every term has a panel and no block was dropped".to_string()
        } else {
            dropped.join("; ")
        },
    ));

    let bad_counters: Vec<String> = content
        .fixed_panels
        .values()
        .flat_map(|p| &p.blocks)
        .filter(|b| b.kind == BlockKind::Counter && b.min.unwrap_or(0) > b.max.unwrap_or(0))
        .map(|b| b.key().to_string())
        .collect();
    results.push(TestResult::new(
        "counter_bounds",
        bad_counters.is_empty(),
        format!("{} counter block(s) with min > max", bad_counters.len()),
    ));

    let unscheduled: Vec<&str> = content
        .projects
        .iter()
        .filter(|p| p.due_at().is_none() || !(0.0..=1.0).contains(&p.success_rate))
        .map(|p| p.id.as_str())
        .collect();
    results.push(TestResult::new(
        "projects_scheduled",
        unscheduled.is_empty(),
        format!("{} project(s), unscheduled or bad rate: {:?}", content.projects.len(), unscheduled),
    ));

    let duplicate_ids = {
        let mut event_ids: Vec<&str> = content.events.unified.iter().map(|e| e.id.as_str()).collect();
        event_ids.sort_unstable();
        let before = event_ids.len();
        event_ids.dedup();
        before - event_ids.len()
    };
    results.push(TestResult::new(
        "event_ids_unique",
        duplicate_ids == 0,
        format!("{} unified events, {} duplicate id(s)", content.events.unified.len(), duplicate_ids),
    ));

    if verbose {
        for ev in &content.events.unified {
            println!(
                "  event {:<20} w={:<4} tags={:?} effects={}",
                ev.id,
                ev.weight,
                ev.tags,
                ev.effects.len()
            );
        }
    }

    results
}

// ── 2. Economy ──────────────────────────────────────────────────────────

fn validate_economy(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stat Economy ---");
    let mut results = Vec::new();

    let mut out_of_range = 0;
    for level in 1..=6u8 {
        let skills = Skills {
            talent: level,
            diligence: level,
            social: level,
            luck: level,
        };
        for delta in [-1.0e9, -1234.5, -1.0, 0.0, 0.4, 7.0, 999.0, 1.0e9] {
            for stat in Stat::ALL {
                let mut stats = Stats::default();
                economy::apply_delta(&mut stats, &skills, stat, delta);
                let v = stats.get(stat);
                if !(STAT_MIN..=STAT_MAX).contains(&v) {
                    out_of_range += 1;
                }
            }
        }
    }
    results.push(TestResult::new(
        "apply_delta_clamped",
        out_of_range == 0,
        format!("{} out-of-range results over 6 levels", out_of_range),
    ));

    let monotone = (1..6u8).all(|l| {
        economy::effective_multiplier(l + 1, Direction::Cost) <= economy::effective_multiplier(l, Direction::Cost)
            && economy::effective_multiplier(l + 1, Direction::Gain) >= economy::effective_multiplier(l, Direction::Gain)
    });
    results.push(TestResult::new(
        "multipliers_monotone",
        monotone,
        "cost falls and gain rises with skill",
    ));

    // Time is governed by luck; a level-6 spend of 20 only removes 15.
    let mut stats = Stats::default();
    let skilled = Skills {
        luck: 6,
        ..Skills::default()
    };
    let cost: StatMap = [(Stat::Time, 20)].into_iter().collect();
    economy::spend(&mut stats, &skilled, &cost);
    results.push(TestResult::new(
        "skilled_spend_discounted",
        stats.time == 85,
        format!("time after spend: {}", stats.time),
    ));

    results
}

// ── 3. Luck ─────────────────────────────────────────────────────────────

fn validate_luck_tables(verbose: bool) -> Vec<TestResult> {
    println!("--- Luck Tables ---");
    let mut results = Vec::new();
    let mut bad = Vec::new();
    let mut prev_good = 0.0;

    for luck in 1..=6u8 {
        let p = luck_pool_probs(luck);
        let sum = p.good + p.mid + p.bad;
        if (sum - 1.0).abs() > 1e-9 || p.mid < 0.05 - 1e-12 || p.good < 0.0 || p.bad < 0.0 {
            bad.push(luck);
        }
        if p.good + 1e-12 < prev_good {
            bad.push(luck);
        }
        prev_good = p.good;
        if verbose {
            println!(
                "  luck {}: good={:.3} mid={:.3} bad={:.3}",
                luck, p.good, p.mid, p.bad
            );
        }
    }
    results.push(TestResult::new(
        "luck_pool_probs",
        bad.is_empty(),
        if bad.is_empty() {
            "sums to 1, mid ≥ 0.05, good non-decreasing".to_string()
        } else {
            format!("bad luck levels: {:?}", bad)
        },
    ));
    results
}

// ── 4. Autoplay ─────────────────────────────────────────────────────────

/// Candidate actions for a simple greedy player, best first. The caller
/// falls through to the next one when an action is refused.
fn choose_actions(state: &RunState, content: &Content) -> Vec<Action> {
    match state.screen {
        Screen::Intro => vec![Action::new(ids::START)],
        Screen::Character => allocate_skill(state)
            .into_iter()
            .chain(std::iter::once(Action::new(ids::CONFIRM_SKILLS)))
            .collect(),
        Screen::Job => vec![Action::new(ids::CHOOSE_SCHOOL)],
        Screen::Main => {
            if state.time.phase == Phase::Event {
                vec![Action::new(ids::GO_EVENT)]
            } else {
                vec![Action::new(ids::END_TURN)]
            }
        }
        Screen::Event => event_candidates(state, content),
        Screen::Action => action_candidates(state, content),
        Screen::Papers | Screen::Requirements => vec![Action::new(ids::BACK_MAIN)],
        Screen::End => vec![Action::new(ids::RESTART)],
    }
}

/// Pour remaining points into social, then talent, diligence, luck.
fn allocate_skill(state: &RunState) -> Option<Action> {
    if state.skill_points == 0 {
        return None;
    }
    let order = [
        ("social", state.skills.social),
        ("talent", state.skills.talent),
        ("diligence", state.skills.diligence),
        ("luck", state.skills.luck),
    ];
    let (key, level) = order.iter().find(|(_, level)| *level < 6)?;
    let value = (*level as u32 + state.skill_points).min(6) as i64;
    Some(Action::with_payload(
        ids::SET_SKILL,
        Payload {
            key: Some(key.to_string()),
            value: Some(value),
            ..Payload::default()
        },
    ))
}

fn event_candidates(state: &RunState, content: &Content) -> Vec<Action> {
    let mut out = Vec::new();
    if !state.fixed_done {
        let enabled: Vec<String> = get_available_actions(state, content)
            .into_iter()
            .filter(|a| a.enabled)
            .map(|a| a.id)
            .collect();
        if let Some(panel) = content.fixed_panel(state.time.term) {
            for block in panel.blocks.iter().filter(|b| enabled.contains(&b.action_id)) {
                match block.kind {
                    BlockKind::Counter => {
                        let max = block.max.unwrap_or(1);
                        let min = block.min.unwrap_or(0);
                        out.extend((min..=max).rev().map(|n| Action::count(block.action_id.as_str(), n)));
                    }
                    BlockKind::Button => out.push(Action::new(block.action_id.as_str())),
                }
            }
        }
    }
    if state.random_quota > 0 {
        out.push(Action::new(ids::RANDOM_EVENT));
    }
    out.push(Action::new(ids::TO_ACTION));
    out
}

fn action_candidates(state: &RunState, content: &Content) -> Vec<Action> {
    let mut out = Vec::new();
    let open_drafts = state
        .papers
        .iter()
        .filter(|p| !p.published && p.stage == PaperStage::Draft && p.attempts_this_turn < 3);
    for paper in open_drafts {
        let payload = Payload {
            paper_id: Some(paper.id.clone()),
            ..Payload::default()
        };
        if paper.level < PaperLevel::First {
            out.push(Action::with_payload(ids::UPGRADE_PAPER, payload.clone()));
        }
        out.push(Action::with_payload(ids::SUBMIT_PAPER, payload));
    }
    out.push(Action::new(ids::WRITE_PAPER));
    if state.stats.energy < 50 {
        out.push(Action::new(ids::SLACK_OFF));
    }
    out.push(Action::new(ids::BACK_MAIN));
    out
}

/// Whether the reducer refused an action: nothing but the log moved.
fn was_refused(prev: &RunState, next: &RunState) -> bool {
    let mut a = prev.clone();
    let mut b = next.clone();
    a.log.clear();
    b.log.clear();
    a == b
}

#[derive(Default)]
struct RunSummary {
    steps: usize,
    tenured: bool,
    final_year: u32,
    reformed: bool,
    lock: Option<TighteningFamily>,
    violations: Vec<String>,
}

/// Invariants that must hold after every dispatch.
fn check_invariants(prev: &RunState, next: &RunState, content: &Content, violations: &mut Vec<String>) {
    for stat in Stat::ALL {
        let v = next.stats.get(stat);
        if !(STAT_MIN..=STAT_MAX).contains(&v) {
            violations.push(format!("{:?} out of range: {}", stat, v));
        }
    }
    if next.log.len() > LOG_CAPACITY {
        violations.push(format!("log grew to {}", next.log.len()));
    }
    if next.random_quota > content.quota_for_term(next.time.term) {
        violations.push(format!("quota {} above term allowance", next.random_quota));
    }
    if let (Some(a), Some(b)) = (prev.hidden.lock, next.hidden.lock) {
        if a != b {
            violations.push(format!("tightening lock switched {:?} -> {:?}", a, b));
        }
    }
    if !prev.hidden.reform_triggered && next.hidden.reform_triggered {
        if prev.time.year != 5 {
            violations.push(format!("reform fired at end of year {}", prev.time.year));
        }
        if next.results.qualified_papers != 0 || !next.papers.is_empty() {
            violations.push("reform left achievements behind".into());
        }
    }
    if prev.hidden.reform_triggered && !next.hidden.reform_triggered && next.screen != Screen::Intro {
        violations.push("reform flag cleared mid-run".into());
    }
    for (id, pending) in &next.pending_projects {
        if pending.year_applied > next.time.year {
            violations.push(format!("{} pending from year {}", id, pending.year_applied));
        }
    }
}

fn autoplay(seed: u64, content: &Content) -> (RunState, RunSummary) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = RunState::new();
    let mut summary = RunSummary::default();

    while summary.steps < MAX_STEPS_PER_RUN {
        if state.screen == Screen::End {
            break;
        }
        let mut next = None;
        for action in choose_actions(&state, content) {
            let candidate = dispatch(&state, &action, content, &mut rng);
            check_invariants(&state, &candidate, content, &mut summary.violations);
            if !was_refused(&state, &candidate) {
                next = Some(candidate);
                break;
            }
        }
        let Some(next) = next else {
            summary.violations.push(format!("no legal move on {:?}", state.screen));
            break;
        };
        state = next;
        summary.steps += 1;
    }

    summary.tenured = state
        .log
        .iter()
        .any(|l| l.ends_with("Passed: tenure granted!"));
    summary.final_year = state.time.year;
    log::debug!(
        "seed {}: {} steps, screen {:?}, year {}",
        seed,
        summary.steps,
        state.screen,
        state.time.year
    );
    summary.reformed = state.hidden.reform_triggered;
    summary.lock = state.hidden.lock;
    (state, summary)
}

fn validate_autoplay(content: &Content, verbose: bool) -> Vec<TestResult> {
    println!("--- Autoplay ({} seeds) ---", AUTOPLAY_SEEDS);
    let mut results = Vec::new();

    let mut unfinished = Vec::new();
    let mut violations = Vec::new();
    let mut tenured = 0;
    let mut reforms = 0;
    let mut top_locks = 0;
    let mut national_locks = 0;
    let mut total_steps = 0;

    for seed in 0..AUTOPLAY_SEEDS {
        let (state, summary) = autoplay(seed, content);
        if state.screen != Screen::End {
            unfinished.push(seed);
        }
        if !summary.violations.is_empty() {
            violations.push(format!("seed {}: {}", seed, summary.violations[0]));
        }
        if summary.reformed && summary.final_year <= 6 {
            violations.push(format!("seed {}: reformed run ended in year {}", seed, summary.final_year));
        }
        tenured += summary.tenured as u32;
        reforms += summary.reformed as u32;
        match summary.lock {
            Some(TighteningFamily::Top) => top_locks += 1,
            Some(TighteningFamily::National) => national_locks += 1,
            None => {}
        }
        total_steps += summary.steps;
        if verbose {
            println!(
                "  seed {:>3}: {:>5} steps, year {:>2}, {}{}",
                seed,
                summary.steps,
                summary.final_year,
                if summary.tenured { "tenured" } else { "failed" },
                if summary.reformed { " (reform)" } else { "" }
            );
        }
    }

    results.push(TestResult::new(
        "autoplay_completes",
        unfinished.is_empty(),
        if unfinished.is_empty() {
            format!(
                "{} runs ended, avg {} steps",
                AUTOPLAY_SEEDS,
                total_steps / AUTOPLAY_SEEDS as usize
            )
        } else {
            format!("runs stuck: {:?}", unfinished)
        },
    ));
    results.push(TestResult::new(
        "autoplay_invariants",
        violations.is_empty(),
        if violations.is_empty() {
            "no invariant violations".to_string()
        } else {
            format!("{} run(s) violated: {}", violations.len(), violations[0])
        },
    ));
    // Reform is a 25% roll reached by every run that survives to year 5.
    results.push(TestResult::new(
        "reform_rate_plausible",
        (20..=90).contains(&reforms),
        format!("{} reforms in {} runs", reforms, AUTOPLAY_SEEDS),
    ));
    results.push(TestResult::new(
        "outcome_mix",
        true,
        format!(
            "{} tenured, {} TOP locks, {} NATIONAL locks",
            tenured, top_locks, national_locks
        ),
    ));
    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(content: &Content) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut mismatched = Vec::new();
    for seed in [1u64, 42, 1234] {
        let (a, _) = autoplay(seed, content);
        let (b, _) = autoplay(seed, content);
        if a != b {
            mismatched.push(seed);
        }
    }
    vec![TestResult::new(
        "same_seed_same_run",
        mismatched.is_empty(),
        if mismatched.is_empty() {
            "replays identical".to_string()
        } else {
            format!("diverged for seeds {:?}", mismatched)
        },
    )]
}
