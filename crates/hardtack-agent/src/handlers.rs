//! Default command handlers backed by the retriever, the record store and
//! the vector index. Language-model work is delegated to an [`Assistant`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::command::{Command, CommandKind};
use crate::error::{DispatchError, Result};
use crate::registry::{CommandHandler, CommandRegistry};
use crate::session::SessionContext;
use hardtack_core::query::QuerySpec;
use hardtack_core::traits::{RecordStore, VectorIndexer, VectorStore};
use hardtack_core::types::Recipe;
use hardtack_core::update::RecipeUpdate;
use hardtack_search::{RecipeRetriever, RetrievedRecipes};

pub type SharedRetriever = Arc<RecipeRetriever<Arc<dyn VectorStore>, Arc<dyn RecordStore>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    Recommendations,
    SingleRecipe,
}

/// The language-model side of the conversation.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Turns a free-text wish into a structured query.
    async fn plan_query(&self, user_desire: &str) -> anyhow::Result<QuerySpec>;

    /// Turns a described change into field replacements for `recipe`.
    async fn plan_update(&self, recipe: &Recipe, changes_to_make: &str) -> anyhow::Result<RecipeUpdate>;

    async fn summarize(&self, user_desire: &str, results: &RetrievedRecipes, style: SummaryStyle) -> anyhow::Result<String>;
}

fn assistant_error(e: anyhow::Error) -> DispatchError {
    DispatchError::Assistant(format!("{e:#}"))
}

pub struct SearchHandler {
    retriever: SharedRetriever,
    assistant: Arc<dyn Assistant>,
    style: SummaryStyle,
}

impl SearchHandler {
    pub fn new(retriever: SharedRetriever, assistant: Arc<dyn Assistant>, style: SummaryStyle) -> Self {
        Self { retriever, assistant, style }
    }
}

#[async_trait]
impl CommandHandler for SearchHandler {
    async fn handle(&self, command: Command, session: &mut SessionContext) -> Result<String> {
        let user_desire = match command {
            Command::RunRecommendationEngine { user_desire } | Command::FindSingleRecipe { user_desire } => user_desire,
            other => return Err(DispatchError::NoHandler(other.kind())),
        };
        let spec = self.assistant.plan_query(&user_desire).await.map_err(assistant_error)?;
        let results = self.retriever.retrieve(&spec).await?;
        let summary = self.assistant.summarize(&user_desire, &results, self.style).await.map_err(assistant_error)?;
        session.most_recent_results = Some(results);
        Ok(summary)
    }
}

pub struct ShowHandler {
    records: Arc<dyn RecordStore>,
}

impl ShowHandler {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CommandHandler for ShowHandler {
    async fn handle(&self, command: Command, session: &mut SessionContext) -> Result<String> {
        let Command::ShowRecipe { recipe_uuid } = command else {
            return Err(DispatchError::NoHandler(command.kind()));
        };
        let recipe = self.records.get_record(&recipe_uuid).await?;
        session.select(recipe);
        Ok("Sure! Take a look at this.".to_string())
    }
}

pub struct EditHandler {
    records: Arc<dyn RecordStore>,
    indexer: Arc<dyn VectorIndexer>,
    assistant: Arc<dyn Assistant>,
}

impl EditHandler {
    pub fn new(records: Arc<dyn RecordStore>, indexer: Arc<dyn VectorIndexer>, assistant: Arc<dyn Assistant>) -> Self {
        Self { records, indexer, assistant }
    }
}

#[async_trait]
impl CommandHandler for EditHandler {
    async fn handle(&self, command: Command, session: &mut SessionContext) -> Result<String> {
        let Command::EditRecipe { uuid, changes_to_make } = command else {
            return Err(DispatchError::NoHandler(command.kind()));
        };
        let current = self.records.get_record(&uuid).await?;
        let update = self.assistant.plan_update(&current, &changes_to_make).await.map_err(assistant_error)?;
        let edited = update.apply_to(&current)?;
        // Index first: a failed upsert leaves both stores on the old version.
        self.indexer.upsert(std::slice::from_ref(&edited)).await.map_err(|e| DispatchError::Index(format!("{e:#}")))?;
        if let Err(e) = self.records.put_record(&edited).await {
            error!(%uuid, error = %e, "recipe indexed but record write failed, index is ahead of the record store");
            return Err(e.into());
        }
        info!(%uuid, fields = update.update_params.len(), "recipe updated");
        session.select(edited);
        Ok("The recipe has been updated!".to_string())
    }
}

/// A registry with handlers for every command except the ingestion pipeline,
/// which lives outside this crate.
pub fn default_registry(
    retriever: SharedRetriever,
    records: Arc<dyn RecordStore>,
    indexer: Arc<dyn VectorIndexer>,
    assistant: Arc<dyn Assistant>,
) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandKind::RunRecommendationEngine,
        Arc::new(SearchHandler::new(retriever.clone(), assistant.clone(), SummaryStyle::Recommendations)),
    );
    registry.register(
        CommandKind::FindSingleRecipe,
        Arc::new(SearchHandler::new(retriever, assistant.clone(), SummaryStyle::SingleRecipe)),
    );
    registry.register(CommandKind::ShowRecipe, Arc::new(ShowHandler::new(records.clone())));
    registry.register(CommandKind::EditRecipe, Arc::new(EditHandler::new(records, indexer, assistant)));
    registry
}
