//! Declarative effects applied by events, panels and projects.
//!
//! Content files describe effects as loosely-typed JSON objects
//! (`{"kind": "stat", "stat": "mood", "delta": -5}`). They are parsed into
//! the closed [`Effect`] type once at load; entries with a missing key, an
//! unknown kind or a non-finite delta are dropped individually.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::economy::{apply_delta, Stat};
use crate::state::{CounterKey, ResultKey, RunState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Effect {
    /// Skill-scaled change to a stat.
    Stat { stat: Stat, delta: f64 },
    /// Unscaled change to a result counter.
    Result { key: ResultKey, delta: i64 },
    /// Unscaled change to a generic counter.
    Counter { key: CounterKey, delta: i64 },
}

impl Effect {
    pub fn stat(stat: Stat, delta: f64) -> Self {
        Effect::Stat { stat, delta }
    }

    pub fn result(key: ResultKey, delta: i64) -> Self {
        Effect::Result { key, delta }
    }

    /// Parse one raw effect object. Returns `None` for malformed entries.
    pub fn from_value(value: &Value) -> Option<Effect> {
        let obj = value.as_object()?;
        let kind = obj.get("kind").and_then(Value::as_str).unwrap_or("stat");
        let delta = parse_delta(obj.get("delta"))?;
        match kind {
            "stat" => {
                let stat = Stat::from_key(obj.get("stat")?.as_str()?)?;
                Some(Effect::Stat { stat, delta })
            }
            "result" => {
                let key = ResultKey::from_key(obj.get("key")?.as_str()?)?;
                Some(Effect::Result {
                    key,
                    delta: delta.round() as i64,
                })
            }
            "counter" => {
                let key = CounterKey::from_key(obj.get("key")?.as_str()?)?;
                Some(Effect::Counter {
                    key,
                    delta: delta.round() as i64,
                })
            }
            _ => None,
        }
    }
}

/// Missing delta counts as zero; numeric strings are accepted.
fn parse_delta(value: Option<&Value>) -> Option<f64> {
    let delta = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        Some(_) => return None,
    };
    delta.is_finite().then_some(delta)
}

/// Parse a list of raw effects, skipping malformed entries.
/// Anything other than an array yields an empty list.
pub fn parse_effects(value: &Value) -> Vec<Effect> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let effects: Vec<Effect> = items.iter().filter_map(Effect::from_value).collect();
    if effects.len() < items.len() {
        log::warn!(
            "dropped {} malformed effect(s) out of {}",
            items.len() - effects.len(),
            items.len()
        );
    }
    effects
}

/// `deserialize_with` helper for effect lists in content files.
pub fn lenient<'de, D>(deserializer: D) -> Result<Vec<Effect>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_effects(&value))
}

/// Like [`lenient`], for fields where absence means "use the default".
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<Vec<Effect>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_array() {
        Ok(Some(parse_effects(&value)))
    } else {
        Ok(None)
    }
}

fn apply_effect_once(state: &mut RunState, effect: &Effect) {
    match *effect {
        Effect::Stat { stat, delta } => apply_delta(&mut state.stats, &state.skills, stat, delta),
        Effect::Result { key, delta } => state.results.add(key, delta),
        Effect::Counter { key, delta } => state.add_counter(key, delta),
    }
}

/// Replay the whole effect list `times` times, in list order.
/// A count of zero applies nothing.
pub fn apply_effects(state: &mut RunState, effects: &[Effect], times: u32) {
    for _ in 0..times {
        for effect in effects {
            apply_effect_once(state, effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_defaults_to_stat_kind() {
        let e = Effect::from_value(&json!({"stat": "mood", "delta": -5})).unwrap();
        assert_eq!(e, Effect::stat(Stat::Mood, -5.0));
    }

    #[test]
    fn test_parse_skips_malformed() {
        let raw = json!([
            {"kind": "stat", "stat": "energy", "delta": 10},
            {"kind": "stat", "delta": 3},
            {"kind": "result", "key": "leader", "delta": "2"},
            {"kind": "result", "key": "nonsense", "delta": 1},
            {"kind": "counter", "key": "teachingThisYear", "delta": 1},
            {"kind": "teleport", "key": "leader", "delta": 1},
            {"kind": "stat", "stat": "time", "delta": [1]},
            "not an object"
        ]);
        let effects = parse_effects(&raw);
        assert_eq!(
            effects,
            vec![
                Effect::stat(Stat::Energy, 10.0),
                Effect::result(ResultKey::Leader, 2),
                Effect::Counter {
                    key: CounterKey::TeachingThisYear,
                    delta: 1
                },
            ]
        );
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(parse_effects(&json!({"stat": "mood"})).is_empty());
        assert!(parse_effects(&Value::Null).is_empty());
    }

    #[test]
    fn test_apply_effects_replays_list() {
        let mut state = RunState::new();
        let effects = vec![
            Effect::stat(Stat::Mood, -10.0),
            Effect::result(ResultKey::Leader, 2),
            Effect::Counter {
                key: CounterKey::TeachingThisYear,
                delta: 1,
            },
        ];
        apply_effects(&mut state, &effects, 3);
        assert_eq!(state.stats.mood, 70);
        assert_eq!(state.results.leader, 6);
        assert_eq!(state.teaching_this_year, 3);
    }

    #[test]
    fn test_apply_effects_zero_times_is_noop() {
        let mut state = RunState::new();
        apply_effects(&mut state, &[Effect::stat(Stat::Mood, -10.0)], 0);
        assert_eq!(state, RunState::new());
    }

    #[test]
    fn test_effect_serializes_tagged() {
        let v = serde_json::to_value(Effect::result(ResultKey::National, 1)).unwrap();
        assert_eq!(v, json!({"kind": "result", "key": "national", "delta": 1}));
    }
}
