use thiserror::Error;

use crate::command::CommandKind;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Invalid arguments for {command}: {reason}")]
    InvalidArguments { command: CommandKind, reason: String },

    #[error("No handler registered for {0}")]
    NoHandler(CommandKind),

    #[error(transparent)]
    Core(#[from] hardtack_core::error::Error),

    #[error("Assistant failed: {0}")]
    Assistant(String),

    #[error("Indexing failed: {0}")]
    Index(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
