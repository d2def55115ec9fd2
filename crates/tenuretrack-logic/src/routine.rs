//! Repeatable action-phase activities with a flat cost and gain.

use crate::actions::ids;
use crate::content::Content;
use crate::economy::{can_afford, describe, gain, spend};
use crate::rejection::Rejection;
use crate::state::RunState;

fn pay_and_gain(
    state: &mut RunState,
    content: &Content,
    action_id: &str,
    what: &'static str,
) -> Result<String, Rejection> {
    let def = content.actions.get(action_id);
    if !can_afford(&state.stats, &def.cost) {
        return Err(Rejection::Unaffordable(what));
    }
    spend(&mut state.stats, &state.skills, &def.cost);
    gain(&mut state.stats, &state.skills, &def.gain);
    Ok(describe(&def.gain))
}

pub fn prep_class(state: &mut RunState, content: &Content) -> Result<(), Rejection> {
    let gained = pay_and_gain(state, content, ids::PREP_CLASS, "prepare a class")?;
    state.push_log(format!("Class prepared: {}.", gained));
    Ok(())
}

pub fn slack_off(state: &mut RunState, content: &Content) -> Result<(), Rejection> {
    let gained = pay_and_gain(state, content, ids::SLACK_OFF, "slack off")?;
    state.push_log(format!("Slacked off for a while ({}).", gained));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::Stats;

    #[test]
    fn test_slack_off_trades_time_for_rest() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        slack_off(&mut state, &content).unwrap();
        assert_eq!(state.stats.time, 90);
        assert_eq!(state.stats.energy, 110);
        assert_eq!(state.stats.mood, 105);
        assert_eq!(state.stats.inspiration, 105);
        assert!(state.log[0].contains("energy+10"));
    }

    #[test]
    fn test_prep_class_unaffordable() {
        let content = Content::with_schools(Vec::new());
        let mut state = RunState::new();
        state.stats.time = 8;
        assert_eq!(
            prep_class(&mut state, &content),
            Err(Rejection::Unaffordable("prepare a class"))
        );
        assert_eq!(
            state.stats,
            Stats {
                time: 8,
                ..Stats::default()
            }
        );
    }
}
