//! Conversational dispatch for the recipe assistant.
//!
//! Assistant replies may carry a function call. [`extract_command`] turns it
//! into a typed [`Command`], and a [`CommandRegistry`] routes it to the
//! handler registered for its kind with the caller's [`SessionContext`].

pub mod command;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod session;

pub use command::{extract_command, Command, CommandKind, SourceType};
pub use error::DispatchError;
pub use handlers::{default_registry, Assistant, EditHandler, SearchHandler, SharedRetriever, ShowHandler, SummaryStyle};
pub use registry::{CommandHandler, CommandRegistry, Reply};
pub use session::{ChatTurn, Role, SessionContext};
