use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::command::{extract_command, Command, CommandKind};
use crate::error::{DispatchError, Result};
use crate::session::{Role, SessionContext};

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs `command` and returns the text shown to the user.
    async fn handle(&self, command: Command, session: &mut SessionContext) -> Result<String>;
}

/// What the user sees after an assistant reply has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The reply held no function call and is shown as-is.
    Text(String),
    Command { kind: CommandKind, output: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Command { output, .. } => output,
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, returning the handler it replaced.
    pub fn register(&mut self, kind: CommandKind, handler: Arc<dyn CommandHandler>) -> Option<Arc<dyn CommandHandler>> {
        let previous = self.handlers.insert(kind, handler);
        if previous.is_some() {
            warn!(%kind, "replaced command handler");
        }
        previous
    }

    pub fn contains(&self, kind: CommandKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<CommandKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub async fn dispatch(&self, command: Command, session: &mut SessionContext) -> Result<String> {
        let kind = command.kind();
        let handler = self.handlers.get(&kind).ok_or(DispatchError::NoHandler(kind))?;
        info!(%kind, "dispatching command");
        debug!(?command, "command arguments");
        handler.handle(command, session).await
    }

    /// Processes one assistant reply: runs the embedded function call if there
    /// is one, otherwise passes the text through. The shown text is appended
    /// to the session history.
    pub async fn respond(&self, reply: &str, session: &mut SessionContext) -> Result<Reply> {
        let reply = match extract_command(reply)? {
            Some(command) => {
                let kind = command.kind();
                let output = self.dispatch(command, session).await?;
                Reply::Command { kind, output }
            }
            None => Reply::Text(reply.to_string()),
        };
        session.push(Role::Assistant, reply.text());
        Ok(reply)
    }
}
