//! Pure game logic for TenureTrack.
//!
//! A turn-based career simulation: roll a character, join a university and
//! try to meet its teaching, publication, grant and (hidden) service targets
//! before the tenure clock runs out. Everything here is a pure function over
//! plain data. Content is passed in explicitly and randomness comes from a
//! caller-supplied `rand::Rng`, so a fixed seed replays a run exactly.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actions`] | Action ids, payloads and the available-action entry type |
//! | [`character`] | Dice, skill allocation and school selection |
//! | [`content`] | Immutable rules, tables, events, projects and fixed panels |
//! | [`economy`] | Skill-scaled stat deltas, affordability and spending |
//! | [`effects`] | Closed effect type, lenient parsing and application |
//! | [`evaluation`] | The five tenure criteria and failure reasons |
//! | [`fixed_panel`] | Per-term mandatory panel blocks |
//! | [`hidden`] | Year-end reform and requirement tightening |
//! | [`loader`] | JSON sources to [`content::Content`] with per-file fallback |
//! | [`papers`] | Drafting, upgrading and submitting papers |
//! | [`projects`] | Grant submission and deferred resolution |
//! | [`random_events`] | Weighted, capped, luck-biased event selection |
//! | [`reducer`] | `dispatch` and the turn/phase state machine |
//! | [`rejection`] | Reasons an action is refused |
//! | [`routine`] | Class prep and slacking off |
//! | [`state`] | The run state aggregate |
//! | [`view`] | View model and available actions for a presentation layer |

pub mod actions;
pub mod character;
pub mod content;
pub mod economy;
pub mod effects;
pub mod evaluation;
pub mod fixed_panel;
pub mod hidden;
pub mod loader;
pub mod papers;
pub mod projects;
pub mod random_events;
pub mod reducer;
pub mod rejection;
pub mod routine;
pub mod state;
pub mod view;

pub use actions::{Action, AvailableAction, Payload};
pub use content::Content;
pub use loader::{load_content, ContentError, ContentSources};
pub use reducer::dispatch;
pub use state::RunState;
pub use view::{get_available_actions, get_view_model, ViewModel};
