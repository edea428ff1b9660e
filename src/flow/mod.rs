//! The guided conversation flow: state enum, wording, and the pure
//! transition machine.

mod machine;
pub mod prompts;
mod state;

pub use machine::{Effect, FlowEvent, FlowMachine, Step};
pub use state::{ConversationState, InputMode};
