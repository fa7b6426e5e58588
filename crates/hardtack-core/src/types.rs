//! Domain types shared by the retrieval pipeline and its adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type RecipeId = uuid::Uuid;
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A stored recipe.
///
/// - `uuid`: immutable identity, the join key between the vector index and
///   the record store
/// - `dish_name`/`tags`/`shopping_list`/`source_name`/`author`: fields that
///   feed the searchable dimensions
/// - `rating`: the user's rating, `None` until the dish has been cooked
///
/// Everything else is payload that is carried along but never scored.
/// Keys this struct does not know about survive a read/write cycle in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub uuid: RecipeId,
    pub dish_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub shopping_list: Vec<String>,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "user_rating", alias = "rating", default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub ingredients: Payload,
    #[serde(default)]
    pub cooking_steps: Vec<String>,
    #[serde(default)]
    pub active_time: Option<u32>,
    #[serde(default)]
    pub total_time: Option<u32>,
    #[serde(default)]
    pub recipe_notes: Vec<String>,
    #[serde(default)]
    pub user_notes: String,
    #[serde(default)]
    pub cooked_already: bool,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Payload,
}

impl Recipe {
    pub fn new(uuid: RecipeId, dish_name: impl Into<String>) -> Self {
        Self {
            uuid,
            dish_name: dish_name.into(),
            tags: Vec::new(),
            shopping_list: Vec::new(),
            source_name: String::new(),
            author: String::new(),
            rating: None,
            ingredients: Payload::new(),
            cooking_steps: Vec::new(),
            active_time: None,
            total_time: None,
            recipe_notes: Vec::new(),
            user_notes: String::new(),
            cooked_already: false,
            date_added: None,
            url: None,
            extra: Payload::new(),
        }
    }

    /// Text projection of this recipe into `dimension`, as embedded at index time.
    pub fn dimension_text(&self, dimension: Dimension) -> String {
        match dimension {
            Dimension::DishName => self.dish_name.clone(),
            Dimension::Tags => self.tags.join(", "),
            Dimension::ShoppingList => self.shopping_list.join(", "),
            Dimension::SourceAuthor => [self.source_name.as_str(), self.author.as_str()]
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// An independently embedded, independently searchable facet of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    DishName,
    Tags,
    ShoppingList,
    SourceAuthor,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::DishName,
        Dimension::Tags,
        Dimension::ShoppingList,
        Dimension::SourceAuthor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::DishName => "dish_name",
            Dimension::Tags => "tags",
            Dimension::ShoppingList => "shopping_list",
            Dimension::SourceAuthor => "source_author",
        }
    }

    /// Name of the vector column holding this dimension's embedding.
    pub fn vector_column(self) -> &'static str {
        match self {
            Dimension::DishName => "dish_name_vector",
            Dimension::Tags => "tags_vector",
            Dimension::ShoppingList => "shopping_list_vector",
            Dimension::SourceAuthor => "source_author_vector",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a nearest-neighbor answer. Smaller `distance` is more similar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: RecipeId,
    pub distance: f32,
}

impl SearchHit {
    pub fn new(id: RecipeId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// A per-dimension query that did not produce hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionFailure {
    pub dimension: Dimension,
    pub reason: String,
}

impl fmt::Display for DimensionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dimension, self.reason)
    }
}
