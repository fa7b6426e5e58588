use serde::Serialize;

use hardtack_core::types::{Recipe, RecipeId};
use hardtack_search::RetrievedRecipes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Per-conversation state handed to every command. Nothing here is global.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    pub history: Vec<ChatTurn>,
    pub most_recent_results: Option<RetrievedRecipes>,
    pub selected_recipe: Option<Recipe>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ChatTurn { role, content: content.into() });
    }

    pub fn select(&mut self, recipe: Recipe) {
        self.selected_recipe = Some(recipe);
    }

    pub fn selected_id(&self) -> Option<RecipeId> {
        self.selected_recipe.as_ref().map(|r| r.uuid)
    }
}
