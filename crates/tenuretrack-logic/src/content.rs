//! Immutable game content: rules, action tables, schools, events,
//! projects and fixed panels.
//!
//! A [`Content`] is built once (see [`crate::loader`]) and passed by
//! reference into every reducer entrypoint. Every section has a compiled-in
//! default so a missing or malformed file never stops a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::economy::{Stat, StatMap};
use crate::effects::{self, Effect};
use crate::state::{term_from_name, Phase, ProjectMode, Requirements, ResultKey};

/// Project id with legacy winter-only submission.
pub const NATIONAL_PROJECT_ID: &str = "national_nssfc";
/// Project id with legacy summer-only submission.
pub const PROVINCIAL_PROJECT_ID: &str = "provincial";

// ── Base rules ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseRules {
    pub turns: TurnRules,
    pub rules: RuleFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TurnRules {
    /// Random events that must fire in each term, keyed by term index.
    pub random_quota_by_term: BTreeMap<u8, u32>,
    /// Value `stats.time` is reset to at every turn end.
    pub time_reset_end_turn: i32,
    /// Mood/energy recovery applied when the keyed term ends.
    pub recovery_end_of_term: BTreeMap<u8, Recovery>,
}

impl Default for TurnRules {
    fn default() -> Self {
        Self {
            random_quota_by_term: [(0, 5), (1, 2), (2, 5), (3, 3)].into_iter().collect(),
            time_reset_end_turn: 100,
            recovery_end_of_term: [(1, Recovery::default()), (3, Recovery::default())]
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recovery {
    pub mood: i64,
    pub energy: i64,
}

impl Default for Recovery {
    fn default() -> Self {
        Self {
            mood: 50,
            energy: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleFlags {
    /// When false, leaving the event stage does not require an empty quota.
    pub must_clear_random_before_leaving_event_stage: bool,
}

impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            must_clear_random_before_leaving_event_stage: true,
        }
    }
}

// ── Action table ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionDef {
    pub cost: StatMap,
    pub gain: StatMap,
    pub draft_clicks_per_draft: Option<u32>,
}

/// Cost/gain definitions keyed by action id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTable(pub BTreeMap<String, ActionDef>);

impl ActionTable {
    /// Definition for an action, falling back to the compiled-in default.
    pub fn get(&self, action_id: &str) -> ActionDef {
        self.0
            .get(action_id)
            .cloned()
            .unwrap_or_else(|| default_action(action_id))
    }
}

fn stat_map(entries: &[(Stat, i64)]) -> StatMap {
    entries.iter().copied().collect()
}

/// Compiled-in cost/gain for the built-in actions.
pub fn default_action(action_id: &str) -> ActionDef {
    use crate::actions::ids;
    match action_id {
        ids::WRITE_PAPER => ActionDef {
            cost: stat_map(&[(Stat::Mood, 10), (Stat::Time, 20), (Stat::Energy, 20)]),
            gain: StatMap::new(),
            draft_clicks_per_draft: Some(3),
        },
        ids::PREP_CLASS => ActionDef {
            cost: stat_map(&[(Stat::Mood, 9), (Stat::Time, 9)]),
            gain: stat_map(&[(Stat::Mood, 3)]),
            draft_clicks_per_draft: None,
        },
        ids::SLACK_OFF => ActionDef {
            cost: stat_map(&[(Stat::Time, 10)]),
            gain: stat_map(&[(Stat::Energy, 10), (Stat::Mood, 5), (Stat::Inspiration, 5)]),
            draft_clicks_per_draft: None,
        },
        ids::UPGRADE_PAPER => ActionDef {
            cost: stat_map(&[(Stat::Inspiration, 50)]),
            ..ActionDef::default()
        },
        _ => ActionDef::default(),
    }
}

// ── Schools ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub name: String,
    pub tenure: Tenure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenure {
    pub max_year: u32,
    pub teach_per_year: u32,
    pub paper_need: u32,
    pub project_mode: ProjectMode,
}

impl Tenure {
    /// Initial visible requirements for a run at this school.
    pub fn requirements(&self) -> Requirements {
        Requirements {
            max_year: self.max_year,
            teach_per_year: self.teach_per_year,
            paper_need: self.paper_need,
            project_mode: self.project_mode,
            project_need: 1,
            top_extra: 0,
        }
    }
}

// ── Random events ──────────────────────────────────────────────────────

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomEventDef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub min_year: Option<u32>,
    #[serde(default)]
    pub max_year: Option<u32>,
    /// Eligible term indices. Empty means every term.
    #[serde(default)]
    pub term_in: Vec<u8>,
    #[serde(default)]
    pub max_per_run: Option<u32>,
    #[serde(default)]
    pub max_per_term: Option<u32>,
    #[serde(default, deserialize_with = "effects::lenient")]
    pub effects: Vec<Effect>,
}

/// Entry of an unweighted legacy pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "msg", alias = "description")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "effects::lenient")]
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyPool {
    Good,
    Mid,
    Bad,
}

impl LegacyPool {
    pub fn name(self) -> &'static str {
        match self {
            LegacyPool::Good => "good",
            LegacyPool::Mid => "mid",
            LegacyPool::Bad => "bad",
        }
    }

    /// Single category tag given to events drawn from this pool.
    pub fn tag(self) -> &'static str {
        match self {
            LegacyPool::Good => "positive",
            LegacyPool::Mid => "neutral",
            LegacyPool::Bad => "negative",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LegacyPools {
    pub good: Vec<LegacyEvent>,
    pub mid: Vec<LegacyEvent>,
    pub bad: Vec<LegacyEvent>,
}

impl LegacyPools {
    pub fn pool(&self, which: LegacyPool) -> &[LegacyEvent] {
        match which {
            LegacyPool::Good => &self.good,
            LegacyPool::Mid => &self.mid,
            LegacyPool::Bad => &self.bad,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.good.is_empty() && self.mid.is_empty() && self.bad.is_empty()
    }
}

/// Canonical event source: the weighted unified list, with the legacy
/// pools as fallback.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    pub unified: Vec<RandomEventDef>,
    pub legacy: LegacyPools,
}

// ── Projects ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectTier {
    National,
    Provincial,
}

impl ProjectTier {
    pub fn result_key(self) -> ResultKey {
        match self {
            ProjectTier::National => ResultKey::National,
            ProjectTier::Provincial => ResultKey::Provincial,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectTier::National => "National project",
            ProjectTier::Provincial => "Provincial project",
        }
    }
}

/// Term reference in content: an index or a season name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermRef {
    Index(u8),
    Name(String),
}

impl TermRef {
    pub fn index(&self) -> Option<u8> {
        match self {
            TermRef::Index(i) => Some(*i),
            TermRef::Name(name) => term_from_name(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveAt {
    pub term: TermRef,
    pub phase: Phase,
}

fn default_submit_cost() -> Vec<Effect> {
    vec![Effect::stat(Stat::Time, -5.0), Effect::stat(Stat::Energy, -5.0)]
}

fn default_success_rate() -> f64 {
    0.25
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDef {
    pub id: String,
    pub tier: ProjectTier,
    #[serde(
        default = "default_submit_cost",
        deserialize_with = "effects::lenient"
    )]
    pub submit_cost: Vec<Effect>,
    #[serde(default)]
    pub resolve_at: Option<ResolveAt>,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default, deserialize_with = "effects::lenient_opt")]
    pub on_success: Option<Vec<Effect>>,
    #[serde(default, deserialize_with = "effects::lenient")]
    pub on_fail: Vec<Effect>,
}

impl ProjectDef {
    /// Built-in description used when no project list is supplied.
    pub fn builtin(id: &str, tier: ProjectTier) -> Self {
        Self {
            id: id.to_string(),
            tier,
            submit_cost: default_submit_cost(),
            resolve_at: None,
            success_rate: default_success_rate(),
            on_success: None,
            on_fail: Vec::new(),
        }
    }

    /// The `(term, phase)` at which a pending application is decided.
    /// Falls back to the legacy summer schedule for the two built-in ids.
    pub fn due_at(&self) -> Option<(u8, Phase)> {
        match &self.resolve_at {
            Some(at) => at.term.index().map(|t| (t, at.phase)),
            None => match self.id.as_str() {
                NATIONAL_PROJECT_ID => Some((3, Phase::Event)),
                PROVINCIAL_PROJECT_ID => Some((3, Phase::Action)),
                _ => None,
            },
        }
    }

    /// Effects on a successful draw: explicit list, or +1 to the tier counter.
    pub fn success_effects(&self) -> Vec<Effect> {
        match &self.on_success {
            Some(effects) => effects.clone(),
            None => vec![Effect::result(self.tier.result_key(), 1)],
        }
    }
}

/// The two built-in projects.
pub fn default_projects() -> Vec<ProjectDef> {
    vec![
        ProjectDef::builtin(NATIONAL_PROJECT_ID, ProjectTier::National),
        ProjectDef::builtin(PROVINCIAL_PROJECT_ID, ProjectTier::Provincial),
    ]
}

/// Legacy term gate for the built-in project ids.
pub fn submit_term_gate(project_id: &str) -> Option<u8> {
    match project_id {
        NATIONAL_PROJECT_ID => Some(1),
        PROVINCIAL_PROJECT_ID => Some(3),
        _ => None,
    }
}

// ── Fixed panels ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    /// Repeat-count block; the player picks a count in `[min, max]`.
    Counter,
    #[default]
    Button,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostMode {
    /// Cost is multiplied by the chosen count.
    #[default]
    Per,
    /// Cost is paid once regardless of count.
    Once,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockGuard {
    pub term_in: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedBlock {
    #[serde(default)]
    pub id: Option<String>,
    pub action_id: String,
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub guard: Option<BlockGuard>,
    #[serde(default)]
    pub cost: Option<StatMap>,
    #[serde(default)]
    pub cost_mode: CostMode,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default, deserialize_with = "effects::lenient")]
    pub effects: Vec<Effect>,
    /// Payload forwarded with the action when the block is clicked.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl FixedBlock {
    /// Key under which the chosen count is recorded.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.action_id)
    }

    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.action_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPanel {
    pub title: Option<String>,
    pub blocks: Vec<FixedBlock>,
}

// ── Content ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Content {
    pub base: BaseRules,
    pub actions: ActionTable,
    pub schools: Vec<School>,
    pub events: EventCatalog,
    pub projects: Vec<ProjectDef>,
    /// Keyed by term index.
    pub fixed_panels: BTreeMap<u8, FixedPanel>,
}

impl Content {
    /// Content with every section at its default and the given schools.
    pub fn with_schools(schools: Vec<School>) -> Self {
        Self {
            base: BaseRules::default(),
            actions: ActionTable::default(),
            schools,
            events: EventCatalog::default(),
            projects: default_projects(),
            fixed_panels: BTreeMap::new(),
        }
    }

    /// School by id, or the first school when no id is given.
    pub fn school(&self, id: Option<&str>) -> Option<&School> {
        match id {
            Some(id) => self.schools.iter().find(|s| s.id == id),
            None => self.schools.first(),
        }
    }

    pub fn project(&self, id: &str) -> Option<&ProjectDef> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// The panel for a term, only if it has at least one block.
    pub fn fixed_panel(&self, term: u8) -> Option<&FixedPanel> {
        self.fixed_panels
            .get(&term)
            .filter(|panel| !panel.blocks.is_empty())
    }

    pub fn quota_for_term(&self, term: u8) -> u32 {
        match self.base.turns.random_quota_by_term.get(&term) {
            Some(q) => *q,
            None => match term {
                0 | 2 => 5,
                1 => 2,
                _ => 3,
            },
        }
    }

    pub fn time_reset(&self) -> i32 {
        self.base.turns.time_reset_end_turn
    }
}
