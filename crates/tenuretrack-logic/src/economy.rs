//! Stat economy: clamped resources and skill-derived multipliers.
//!
//! Every stat (mood, energy, time, inspiration) is governed by one skill.
//! Each skill level above 1 makes gains 5% larger and costs 5% smaller,
//! with costs never dropping below half their nominal size.
//!
//! ```
//! use tenuretrack_logic::economy::{effective_multiplier, Direction};
//!
//! assert_eq!(effective_multiplier(1, Direction::Cost), 1.0);
//! assert!((effective_multiplier(6, Direction::Gain) - 1.25).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowest value a stat can hold.
pub const STAT_MIN: i32 = 0;
/// Highest value a stat can hold.
pub const STAT_MAX: i32 = 1000;
/// Lowest skill level.
pub const SKILL_MIN: u8 = 1;
/// Highest skill level.
pub const SKILL_MAX: u8 = 6;

const SKILL_STEP: f64 = 0.05;
const COST_FLOOR: f64 = 0.5;

/// The four player skills, fixed after character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Talent,
    Diligence,
    Social,
    Luck,
}

impl Skill {
    pub const ALL: [Skill; 4] = [Skill::Talent, Skill::Diligence, Skill::Social, Skill::Luck];

    pub fn from_key(key: &str) -> Option<Skill> {
        match key {
            "talent" => Some(Skill::Talent),
            "diligence" => Some(Skill::Diligence),
            "social" => Some(Skill::Social),
            "luck" => Some(Skill::Luck),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Skill::Talent => "talent",
            Skill::Diligence => "diligence",
            Skill::Social => "social",
            Skill::Luck => "luck",
        }
    }
}

/// Skill levels, each in `SKILL_MIN..=SKILL_MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub talent: u8,
    pub diligence: u8,
    pub social: u8,
    pub luck: u8,
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            talent: SKILL_MIN,
            diligence: SKILL_MIN,
            social: SKILL_MIN,
            luck: SKILL_MIN,
        }
    }
}

impl Skills {
    pub fn get(&self, skill: Skill) -> u8 {
        match skill {
            Skill::Talent => self.talent,
            Skill::Diligence => self.diligence,
            Skill::Social => self.social,
            Skill::Luck => self.luck,
        }
    }

    /// Set a skill level (clamped to `SKILL_MIN..=SKILL_MAX`).
    pub fn set(&mut self, skill: Skill, level: u8) {
        let v = level.clamp(SKILL_MIN, SKILL_MAX);
        match skill {
            Skill::Talent => self.talent = v,
            Skill::Diligence => self.diligence = v,
            Skill::Social => self.social = v,
            Skill::Luck => self.luck = v,
        }
    }

    pub fn total(&self) -> u32 {
        Skill::ALL.iter().map(|s| self.get(*s) as u32).sum()
    }
}

/// Consumable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Mood,
    Energy,
    Time,
    Inspiration,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::Mood, Stat::Energy, Stat::Time, Stat::Inspiration];

    pub fn from_key(key: &str) -> Option<Stat> {
        match key {
            "mood" => Some(Stat::Mood),
            "energy" => Some(Stat::Energy),
            "time" => Some(Stat::Time),
            "inspiration" => Some(Stat::Inspiration),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Stat::Mood => "mood",
            Stat::Energy => "energy",
            Stat::Time => "time",
            Stat::Inspiration => "inspiration",
        }
    }

    /// The skill whose level scales changes to this stat.
    pub fn governing_skill(self) -> Skill {
        match self {
            Stat::Inspiration => Skill::Talent,
            Stat::Energy => Skill::Diligence,
            Stat::Mood => Skill::Social,
            Stat::Time => Skill::Luck,
        }
    }
}

/// Current stat values, each in `STAT_MIN..=STAT_MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub mood: i32,
    pub energy: i32,
    pub time: i32,
    pub inspiration: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            mood: 100,
            energy: 100,
            time: 100,
            inspiration: 100,
        }
    }
}

impl Stats {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Mood => self.mood,
            Stat::Energy => self.energy,
            Stat::Time => self.time,
            Stat::Inspiration => self.inspiration,
        }
    }

    /// Set a stat (clamped to `STAT_MIN..=STAT_MAX`).
    pub fn set(&mut self, stat: Stat, value: i32) {
        let v = value.clamp(STAT_MIN, STAT_MAX);
        match stat {
            Stat::Mood => self.mood = v,
            Stat::Energy => self.energy = v,
            Stat::Time => self.time = v,
            Stat::Inspiration => self.inspiration = v,
        }
    }
}

/// Per-stat amounts. Used both for costs (positive magnitudes) and gains.
pub type StatMap = BTreeMap<Stat, i64>;

/// Whether a delta depletes or replenishes a stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Cost,
    Gain,
}

/// Multiplier applied to a raw delta for a governing skill level.
///
/// * cost: `max(0.5, 1 − 0.05·(level − 1))`
/// * gain: `1 + 0.05·(level − 1)`
pub fn effective_multiplier(level: u8, direction: Direction) -> f64 {
    let steps = level.saturating_sub(1) as f64;
    match direction {
        Direction::Cost => (1.0 - SKILL_STEP * steps).max(COST_FLOOR),
        Direction::Gain => 1.0 + SKILL_STEP * steps,
    }
}

/// Apply a raw delta to one stat, scaled by the governing skill.
pub fn apply_delta(stats: &mut Stats, skills: &Skills, stat: Stat, raw_delta: f64) {
    if !raw_delta.is_finite() {
        return;
    }
    let direction = if raw_delta < 0.0 {
        Direction::Cost
    } else {
        Direction::Gain
    };
    let m = effective_multiplier(skills.get(stat.governing_skill()), direction);
    let next = (stats.get(stat) as f64 + raw_delta * m).round();
    stats.set(stat, next.clamp(STAT_MIN as f64, STAT_MAX as f64) as i32);
}

/// True iff every stat meets its required (nominal) amount.
pub fn can_afford(stats: &Stats, cost: &StatMap) -> bool {
    cost.iter().all(|(stat, amount)| stats.get(*stat) as i64 >= *amount)
}

/// Deduct a cost. Costs go through the cost multiplier, so the effective
/// spend can be less than nominal.
pub fn spend(stats: &mut Stats, skills: &Skills, cost: &StatMap) {
    for (stat, amount) in cost {
        apply_delta(stats, skills, *stat, -(*amount as f64));
    }
}

/// Add gains through the gain multiplier.
pub fn gain(stats: &mut Stats, skills: &Skills, gains: &StatMap) {
    for (stat, amount) in gains {
        apply_delta(stats, skills, *stat, *amount as f64);
    }
}

/// Multiply every entry of a cost by `times`.
pub fn scale(cost: &StatMap, times: u32) -> StatMap {
    cost.iter()
        .map(|(stat, amount)| (*stat, amount.saturating_mul(times as i64)))
        .collect()
}

/// Human-readable summary of stat changes, e.g. `"Effect: mood-10, time-20"`.
pub fn effect_summary(before: &Stats, after: &Stats) -> String {
    let changes: Vec<String> = Stat::ALL
        .iter()
        .filter_map(|stat| {
            let diff = after.get(*stat) - before.get(*stat);
            if diff == 0 {
                None
            } else {
                Some(format!("{}{:+}", stat.key(), diff))
            }
        })
        .collect();
    if changes.is_empty() {
        "Effect: none".to_string()
    } else {
        format!("Effect: {}", changes.join(", "))
    }
}

/// Readable list of amounts, e.g. `"energy+10, mood+5"`.
pub fn describe(map: &StatMap) -> String {
    map.iter()
        .map(|(stat, amount)| format!("{}{:+}", stat.key(), amount))
        .collect::<Vec<_>>()
        .join(", ")
}
