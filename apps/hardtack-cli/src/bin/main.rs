use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use hardtack_core::config::{resolve_with_base, Config, DataSettings};
use hardtack_core::loader::RecipeLoader;
use hardtack_core::query::QuerySpec;
use hardtack_core::records::JsonRecordStore;
use hardtack_core::traits::{Embedder, RecordStore, VectorIndexer};
use hardtack_core::types::{Payload, RecipeId};
use hardtack_core::update::RecipeUpdate;
use hardtack_embed::get_default_embedder;
use hardtack_search::RecipeRetriever;
use hardtack_vector::{LanceRecipeIndexer, LanceVectorStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: hardtack <ingest [dir] | query '<spec json>' [top_n] | show <uuid> | edit <uuid> '<update json>'>";

fn parse_args(args: impl IntoIterator<Item = String>) -> Option<(String, Vec<String>)> {
    let mut args = args.into_iter();
    let cmd = args.next()?;
    Some((cmd, args.collect()))
}

fn required<'a>(args: &'a [String], index: usize, what: &str) -> anyhow::Result<&'a str> {
    args.get(index).map(String::as_str).ok_or_else(|| anyhow!("missing {what}\n{USAGE}"))
}

struct Paths { records: PathBuf, lancedb: PathBuf, table: String }

impl Paths {
    fn resolve(data: DataSettings, base: &Path) -> Self {
        Self { records: resolve_with_base(base, &data.records_dir), lancedb: resolve_with_base(base, &data.lancedb_dir), table: data.table }
    }
}

fn embedder() -> anyhow::Result<Arc<dyn Embedder>> {
    Ok(Arc::from(get_default_embedder()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Usage errors are reported before any config is read.
    let Some((cmd, args)) = parse_args(env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    let config = Config::load().context("loading config")?;
    let paths = Paths::resolve(config.data()?, &env::current_dir()?);
    let records = JsonRecordStore::new(&paths.records);

    match cmd.as_str() {
        "ingest" => {
            let source = args.first().map(PathBuf::from).unwrap_or_else(|| paths.records.clone());
            info!(source = %source.display(), "ingesting recipes");
            let recipes = RecipeLoader::new().load_directory(&source)?;
            for recipe in &recipes { records.put_record(recipe).await?; }
            let indexer = LanceRecipeIndexer::new(&paths.lancedb, &paths.table, embedder()?).await?;
            let indexed = indexer.upsert(&recipes).await?;
            println!("Ingested {} recipes ({} rows in '{}')", indexed, indexer.count().await?, paths.table);
        }
        "query" => {
            let spec = QuerySpec::from_json(required(&args, 0, "query spec")?)?;
            let settings = config.retrieval()?;
            let top_n = match args.get(1) { Some(n) => n.parse().context("top_n must be a number")?, None => settings.top_n };
            let store = LanceVectorStore::with_embedder(&paths.lancedb, &paths.table, embedder()?);
            let retriever = RecipeRetriever::new(store, records).with_settings(settings);
            let results = retriever.retrieve_top(&spec, top_n).await?;
            if results.is_empty() { println!("No matching recipes."); }
            for entry in &results.ranked { println!("#{} score {:.4} {}", entry.rank, entry.score, entry.id); }
            for (label, recipe) in &results.recipes { println!("{label}: {} ({})", recipe.dish_name, recipe.uuid); }
            for warning in &results.warnings { eprintln!("warning: {warning}"); }
        }
        "show" => {
            let id: RecipeId = required(&args, 0, "recipe uuid")?.parse().context("invalid uuid")?;
            let recipe = records.get_record(&id).await?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
        }
        "edit" => {
            let id: RecipeId = required(&args, 0, "recipe uuid")?.parse().context("invalid uuid")?;
            let update_params: Payload = serde_json::from_str(required(&args, 1, "update json")?).context("update must be a JSON object")?;
            let current = records.get_record(&id).await?;
            let edited = RecipeUpdate { uuid: id, update_params }.apply_to(&current)?;
            let indexer = LanceRecipeIndexer::new(&paths.lancedb, &paths.table, embedder()?).await?;
            indexer.upsert(std::slice::from_ref(&edited)).await?;
            records.put_record(&edited).await?;
            println!("{}", serde_json::to_string_pretty(&edited)?);
        }
        _ => { eprintln!("Unknown command: {cmd}\n{USAGE}"); std::process::exit(1); }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_has_no_command() {
        assert!(parse_args(Vec::<String>::new()).is_none());
    }

    #[test]
    fn command_is_split_from_its_arguments() {
        let (cmd, args) = parse_args(["query", "{}", "5"].map(String::from)).expect("command");
        assert_eq!(cmd, "query");
        assert_eq!(args, ["{}", "5"]);
    }
}
