//! Conversation flow: the step-based recommendation chat.
//!
//! A session walks through four steps: the user gives a name, picks an
//! archetype and a location, asks for restaurants near the suggested
//! experience, then chats freely. `FlowController` applies each user action
//! to an explicit `ConversationState`; `render` projects that state for
//! display.

pub mod controller;
pub mod model;
pub mod prompts;
pub mod render;
pub mod state;

pub use controller::{FlowController, Transition, UserAction};
pub use model::{Archetype, Speaker, TranscriptEntry, UnknownArchetype};
pub use state::{ConversationState, Step};
