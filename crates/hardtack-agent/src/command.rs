//! Function calls embedded in assistant replies.
//!
//! The assistant asks for an action by writing a JSON object of the form
//! `{"function_name": "...", "arguments": {...}}` somewhere in its reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{DispatchError, Result};
use hardtack_core::types::RecipeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Url,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function_name", content = "arguments", rename_all = "snake_case")]
pub enum Command {
    RunRecommendationEngine { user_desire: String },
    FindSingleRecipe { user_desire: String },
    ShowRecipe { recipe_uuid: RecipeId },
    EditRecipe { uuid: RecipeId, changes_to_make: String },
    RunProcessingPipeline {
        source_type: SourceType,
        #[serde(default)]
        url: Option<String>,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::RunRecommendationEngine { .. } => CommandKind::RunRecommendationEngine,
            Command::FindSingleRecipe { .. } => CommandKind::FindSingleRecipe,
            Command::ShowRecipe { .. } => CommandKind::ShowRecipe,
            Command::EditRecipe { .. } => CommandKind::EditRecipe,
            Command::RunProcessingPipeline { .. } => CommandKind::RunProcessingPipeline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    RunRecommendationEngine,
    FindSingleRecipe,
    ShowRecipe,
    EditRecipe,
    RunProcessingPipeline,
}

impl CommandKind {
    pub const ALL: [CommandKind; 5] = [
        CommandKind::RunRecommendationEngine,
        CommandKind::FindSingleRecipe,
        CommandKind::ShowRecipe,
        CommandKind::EditRecipe,
        CommandKind::RunProcessingPipeline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::RunRecommendationEngine => "run_recommendation_engine",
            CommandKind::FindSingleRecipe => "find_single_recipe",
            CommandKind::ShowRecipe => "show_recipe",
            CommandKind::EditRecipe => "edit_recipe",
            CommandKind::RunProcessingPipeline => "run_processing_pipeline",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finds the first function call in `text` and validates it.
///
/// Returns `Ok(None)` when the text holds no object with both `function_name`
/// and `arguments`. Code fences and surrounding prose are ignored.
pub fn extract_command(text: &str) -> Result<Option<Command>> {
    let Some(call) = find_call_object(text) else { return Ok(None) };
    let name = call.get("function_name").and_then(Value::as_str).unwrap_or_default().to_string();
    let kind = CommandKind::from_name(&name).ok_or(DispatchError::UnknownCommand(name))?;
    serde_json::from_value(call).map(Some).map_err(|e| DispatchError::InvalidArguments { command: kind, reason: e.to_string() })
}

fn find_call_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value @ Value::Object(_))) if is_call(&value) => Some(value),
            _ => None,
        }
    })
}

fn is_call(value: &Value) -> bool {
    value.get("function_name").is_some_and(Value::is_string) && value.get("arguments").is_some_and(Value::is_object)
}
