//! Build a [`Content`] from JSON sources.
//!
//! Every source is optional. A missing or malformed file is replaced by its
//! compiled-in default (with a warning); list files are parsed item by item
//! so one bad entry only drops that entry. The one fatal condition is having
//! no usable school, since a run cannot start without tenure requirements.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::content::{
    default_projects, ActionTable, BaseRules, Content, EventCatalog, FixedBlock, FixedPanel,
    LegacyEvent, LegacyPools, ProjectDef, RandomEventDef, School,
};
use crate::state::TERMS_PER_YEAR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("no usable school descriptor")]
    NoSchool,
    #[error("school {id} has invalid tenure terms: {reason}")]
    InvalidTenure { id: String, reason: &'static str },
}

/// Raw JSON text for each content file, `None` where a file is absent.
#[derive(Debug, Clone, Default)]
pub struct ContentSources<'a> {
    pub base: Option<&'a str>,
    pub actions: Option<&'a str>,
    pub schools: Vec<&'a str>,
    /// Unified list, either `{"events": [...]}` or a bare array.
    pub events: Option<&'a str>,
    pub legacy_good: Option<&'a str>,
    pub legacy_mid: Option<&'a str>,
    pub legacy_bad: Option<&'a str>,
    /// Either `{"projects": [...]}` or a bare array.
    pub projects: Option<&'a str>,
    /// Fall, winter, spring, summer.
    pub fixed_panels: [Option<&'a str>; TERMS_PER_YEAR as usize],
}

impl ContentSources<'static> {
    /// The content shipped in the workspace `data/` directory.
    pub fn bundled() -> Self {
        Self {
            base: Some(include_str!("../../../data/rules/base.json")),
            actions: Some(include_str!("../../../data/actions/actions.json")),
            schools: vec![include_str!("../../../data/schools/lipu.json")],
            events: Some(include_str!("../../../data/events/random/events.json")),
            legacy_good: Some(include_str!("../../../data/events/random.good.json")),
            legacy_mid: Some(include_str!("../../../data/events/random.mid.json")),
            legacy_bad: Some(include_str!("../../../data/events/random.bad.json")),
            projects: Some(include_str!("../../../data/projects/projects.json")),
            fixed_panels: [
                Some(include_str!("../../../data/events/fixed/fall.json")),
                Some(include_str!("../../../data/events/fixed/winter.json")),
                Some(include_str!("../../../data/events/fixed/spring.json")),
                Some(include_str!("../../../data/events/fixed/summer.json")),
            ],
        }
    }
}

/// Parse a whole-document source, falling back to `T::default()`.
fn parse_or_default<T: DeserializeOwned + Default>(name: &str, src: Option<&str>) -> T {
    let Some(src) = src else {
        log::debug!("{}: not supplied, using defaults", name);
        return T::default();
    };
    match serde_json::from_str(src) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{}: {}; using defaults", name, e);
            T::default()
        }
    }
}

/// Parse a list source item by item. `None` when the source is absent or
/// is not a list.
fn parse_list<T: DeserializeOwned>(name: &str, src: Option<&str>, key: &str) -> Option<Vec<T>> {
    let value: Value = match serde_json::from_str(src?) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{}: {}; ignoring file", name, e);
            return None;
        }
    };
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove(key) {
            Some(Value::Array(items)) => items,
            _ => {
                log::warn!("{}: missing \"{}\" list; ignoring file", name, key);
                return None;
            }
        },
        _ => {
            log::warn!("{}: expected a list; ignoring file", name);
            return None;
        }
    };

    let parsed = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("{}[{}]: {}; skipped", name, i, e);
                None
            }
        })
        .collect();
    Some(parsed)
}

fn parse_panel(term: usize, src: Option<&str>) -> Option<FixedPanel> {
    let name = format!("fixed panel {}", term);
    let value: Value = match serde_json::from_str(src?) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{}: {}; no panel this term", name, e);
            return None;
        }
    };
    let title = value.get("title").and_then(Value::as_str).map(str::to_string);
    let blocks_src = value.get("blocks").map(Value::to_string);
    let blocks: Vec<FixedBlock> = parse_list(&name, blocks_src.as_deref(), "blocks").unwrap_or_default();
    Some(FixedPanel { title, blocks })
}

fn parse_school(src: &str) -> Result<School, ContentError> {
    let school: School = serde_json::from_str(src).map_err(|e| {
        log::warn!("school: {}", e);
        ContentError::NoSchool
    })?;
    if school.tenure.max_year == 0 {
        return Err(ContentError::InvalidTenure {
            id: school.id,
            reason: "maxYear must be at least 1",
        });
    }
    Ok(school)
}

/// Build the immutable content object.
pub fn load_content(sources: &ContentSources) -> Result<Content, ContentError> {
    let mut schools = Vec::new();
    let mut last_err = ContentError::NoSchool;
    for src in &sources.schools {
        match parse_school(src) {
            Ok(school) => schools.push(school),
            Err(e) => {
                log::warn!("{}", e);
                last_err = e;
            }
        }
    }
    if schools.is_empty() {
        return Err(last_err);
    }

    let base: BaseRules = parse_or_default("rules/base", sources.base);
    let actions: ActionTable = parse_or_default("actions", sources.actions);

    let events = EventCatalog {
        unified: parse_list::<RandomEventDef>("events", sources.events, "events").unwrap_or_default(),
        legacy: LegacyPools {
            good: parse_list::<LegacyEvent>("random.good", sources.legacy_good, "events").unwrap_or_default(),
            mid: parse_list::<LegacyEvent>("random.mid", sources.legacy_mid, "events").unwrap_or_default(),
            bad: parse_list::<LegacyEvent>("random.bad", sources.legacy_bad, "events").unwrap_or_default(),
        },
    };

    let projects = parse_list::<ProjectDef>("projects", sources.projects, "projects")
        .filter(|list| !list.is_empty())
        .unwrap_or_else(default_projects);

    let fixed_panels = sources
        .fixed_panels
        .iter()
        .enumerate()
        .filter_map(|(term, src)| parse_panel(term, *src).map(|panel| (term as u8, panel)))
        .collect();

    log::info!(
        "content loaded: {} school(s), {} unified event(s), {} project(s)",
        schools.len(),
        events.unified.len(),
        projects.len()
    );

    Ok(Content {
        base,
        actions,
        schools,
        events,
        projects,
        fixed_panels,
    })
}
