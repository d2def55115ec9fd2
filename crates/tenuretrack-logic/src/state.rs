//! Run state: the single aggregate the reducer replaces on every dispatch.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::economy::{Skills, Stats};

/// Maximum number of entries kept in the run log.
pub const LOG_CAPACITY: usize = 200;
/// Terms per year: two teaching terms and two breaks.
pub const TERMS_PER_YEAR: u8 = 4;

/// Which screen is active; controls which actions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Intro,
    Character,
    Job,
    Main,
    Event,
    Action,
    Papers,
    Requirements,
    End,
}

/// Sub-stage of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Event,
    Action,
}

impl Phase {
    pub fn key(self) -> &'static str {
        match self {
            Phase::Event => "event",
            Phase::Action => "action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    /// 1-based year.
    pub year: u32,
    /// 0 = fall term, 1 = winter break, 2 = spring term, 3 = summer break.
    pub term: u8,
    pub phase: Phase,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            year: 1,
            term: 0,
            phase: Phase::Event,
        }
    }
}

/// Display name of a term index.
pub fn term_name(term: u8) -> String {
    match term {
        0 => "Fall term".to_string(),
        1 => "Winter break".to_string(),
        2 => "Spring term".to_string(),
        3 => "Summer break".to_string(),
        t => format!("T{}", t),
    }
}

/// Term index for a season name used in content files.
pub fn term_from_name(name: &str) -> Option<u8> {
    match name {
        "fall" => Some(0),
        "winter" => Some(1),
        "spring" => Some(2),
        "summer" => Some(3),
        _ => None,
    }
}

/// Research and service outcomes counted toward tenure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultKey {
    QualifiedPapers,
    TopPapers,
    National,
    Provincial,
    Leader,
}

impl ResultKey {
    pub fn from_key(key: &str) -> Option<ResultKey> {
        match key {
            "qualifiedPapers" => Some(ResultKey::QualifiedPapers),
            "topPapers" => Some(ResultKey::TopPapers),
            "national" => Some(ResultKey::National),
            "provincial" => Some(ResultKey::Provincial),
            "leader" => Some(ResultKey::Leader),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub qualified_papers: u32,
    pub top_papers: u32,
    pub national: u32,
    pub provincial: u32,
    /// Leadership satisfaction. Never shown to the player.
    pub leader: u32,
}

impl Results {
    pub fn get(&self, key: ResultKey) -> u32 {
        match key {
            ResultKey::QualifiedPapers => self.qualified_papers,
            ResultKey::TopPapers => self.top_papers,
            ResultKey::National => self.national,
            ResultKey::Provincial => self.provincial,
            ResultKey::Leader => self.leader,
        }
    }

    /// Add a signed delta, saturating at zero.
    pub fn add(&mut self, key: ResultKey, delta: i64) {
        let slot = match key {
            ResultKey::QualifiedPapers => &mut self.qualified_papers,
            ResultKey::TopPapers => &mut self.top_papers,
            ResultKey::National => &mut self.national,
            ResultKey::Provincial => &mut self.provincial,
            ResultKey::Leader => &mut self.leader,
        };
        *slot = (*slot as i64 + delta).clamp(0, u32::MAX as i64) as u32;
    }
}

/// Generic counters effects may change besides stats and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CounterKey {
    TeachingThisYear,
}

impl CounterKey {
    pub fn from_key(key: &str) -> Option<CounterKey> {
        match key {
            "teachingThisYear" => Some(CounterKey::TeachingThisYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaperStage {
    Drafting,
    Draft,
}

/// Venue level, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaperLevel {
    General,
    Cssci,
    First,
    Top,
}

impl PaperLevel {
    /// Next level up, saturating at `Top`.
    pub fn next(self) -> PaperLevel {
        match self {
            PaperLevel::General => PaperLevel::Cssci,
            PaperLevel::Cssci => PaperLevel::First,
            PaperLevel::First | PaperLevel::Top => PaperLevel::Top,
        }
    }

    /// Whether a publication at this level counts toward the paper requirement.
    pub fn is_qualified(self) -> bool {
        self >= PaperLevel::Cssci
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperLevel::General => "general journal",
            PaperLevel::Cssci => "CSSCI journal",
            PaperLevel::First => "first-class journal",
            PaperLevel::Top => "top journal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    pub stage: PaperStage,
    pub level: PaperLevel,
    pub published: bool,
    pub draft_clicks: u32,
    pub attempts_this_turn: u32,
}

impl Paper {
    pub fn new(id: String) -> Self {
        Self {
            id,
            stage: PaperStage::Drafting,
            level: PaperLevel::General,
            published: false,
            draft_clicks: 0,
            attempts_this_turn: 0,
        }
    }
}

/// An in-flight grant application. Removed as soon as it is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProject {
    pub year_applied: u32,
    /// Year the application was decided. Only ever set on restored saves;
    /// such an entry is cleared without a second roll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_year: Option<u32>,
}

impl PendingProject {
    pub fn new(year_applied: u32) -> Self {
        Self {
            year_applied,
            resolved_year: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectMode {
    /// National and provincial projects both count.
    Either,
    /// Only national projects count.
    National,
}

/// Visible tenure requirements. Rewritten at runtime by hidden rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub max_year: u32,
    pub teach_per_year: u32,
    pub paper_need: u32,
    pub project_mode: ProjectMode,
    pub project_need: u32,
    /// When > 0, at least one top-journal paper is required.
    pub top_extra: u32,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            max_year: 6,
            teach_per_year: 2,
            paper_need: 6,
            project_mode: ProjectMode::Either,
            project_need: 1,
            top_extra: 0,
        }
    }
}

/// Which tightening family a run is locked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TighteningFamily {
    Top,
    National,
}

/// Run-scoped state concealed from the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenState {
    pub lock: Option<TighteningFamily>,
    pub top_tighten_count: u8,
    pub national_tighten_done: bool,
    pub reform_triggered: bool,
    pub original_req: Option<Requirements>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub screen: Screen,
    pub school_id: Option<String>,
    pub time: GameTime,

    pub roll_total: u32,
    pub skill_points: u32,
    pub skills: Skills,
    pub stats: Stats,
    pub results: Results,

    pub teaching_this_year: u32,
    pub random_quota: u32,
    pub random_seen_run: BTreeMap<String, u32>,
    pub random_seen_term: BTreeMap<String, u32>,

    pub fixed_done: bool,
    pub fixed_choices: BTreeMap<String, u32>,

    pub pending_projects: BTreeMap<String, PendingProject>,

    pub papers: Vec<Paper>,
    pub selected_paper_id: Option<String>,

    pub req: Requirements,
    pub hidden: HiddenState,

    /// Newest first, at most `LOG_CAPACITY` entries.
    pub log: VecDeque<String>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Fresh state at the intro screen.
    pub fn new() -> Self {
        Self {
            screen: Screen::Intro,
            school_id: None,
            time: GameTime::default(),
            roll_total: 0,
            skill_points: 0,
            skills: Skills::default(),
            stats: Stats::default(),
            results: Results::default(),
            teaching_this_year: 0,
            random_quota: 0,
            random_seen_run: BTreeMap::new(),
            random_seen_term: BTreeMap::new(),
            fixed_done: false,
            fixed_choices: BTreeMap::new(),
            pending_projects: BTreeMap::new(),
            papers: Vec::new(),
            selected_paper_id: None,
            req: Requirements::default(),
            hidden: HiddenState::default(),
            log: VecDeque::new(),
        }
    }

    /// Prepend a log line stamped with the current year, term and phase.
    pub fn push_log(&mut self, msg: impl AsRef<str>) {
        let line = format!(
            "[Y{}-{}-{}] {}",
            self.time.year,
            term_name(self.time.term),
            self.time.phase.key(),
            msg.as_ref()
        );
        self.log.push_front(line);
        self.log.truncate(LOG_CAPACITY);
    }

    pub fn paper(&self, id: &str) -> Option<&Paper> {
        self.papers.iter().find(|p| p.id == id)
    }

    pub fn paper_mut(&mut self, id: &str) -> Option<&mut Paper> {
        self.papers.iter_mut().find(|p| p.id == id)
    }

    /// Add a signed delta to a generic counter, saturating at zero.
    pub fn add_counter(&mut self, key: CounterKey, delta: i64) {
        let slot = match key {
            CounterKey::TeachingThisYear => &mut self.teaching_this_year,
        };
        *slot = (*slot as i64 + delta).clamp(0, u32::MAX as i64) as u32;
    }

    /// True once the run has reached its terminal screen.
    pub fn is_over(&self) -> bool {
        self.screen == Screen::End
    }
}
