pub mod chat;
pub mod knowledge;

use crate::llm::Provider;
use crate::session::Session;

/// Session managed as Tauri state.
pub type AppSession = Session<Provider>;
