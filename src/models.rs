use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::config::Config;
use crate::llm::RecipeGenerator;

/* ---------- App state ---------- */
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub generator: RecipeGenerator,
    pub config: Config,
}

/* ---------- API models ---------- */

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// `[{name, quantity}, ...]` as the model wrote it.
    pub recipe_ingredients: Vec<JsonValue>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<String>,
    pub difficulty: Option<String>,
    pub servings: Option<String>,
    pub created_at: String,
}

/// A recipe as produced by the model, before it has an id.
///
/// `description` must be present in the mapping but may be `null`; the
/// trailing three keys may be missing entirely. Ingredients are kept as
/// opaque JSON; only the outer array shape is checked.
#[derive(Deserialize, Debug)]
pub struct NewRecipe {
    pub title: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    pub recipe_ingredients: Vec<JsonValue>,
    pub instructions: Vec<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub cooking_time: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub servings: Option<String>,
}

/// `"4 people"`, `4` and `true` all become text; objects and arrays don't fit.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

#[derive(Serialize, Debug)]
pub struct RecipeList {
    pub total_recipes: usize,
    pub recipes: Vec<Recipe>,
}

#[derive(Serialize, Debug)]
pub struct LatestRecipe {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

/* ---------- DB row model ---------- */

#[derive(FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub recipe_ingredients: Json<Vec<JsonValue>>,
    pub instructions: Json<Vec<String>>,
    pub cooking_time: Option<String>,
    pub difficulty: Option<String>,
    pub servings: Option<String>,
    pub created_at: String,
}

impl From<RecipeRow> for Recipe {
    fn from(r: RecipeRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            recipe_ingredients: r.recipe_ingredients.0,
            instructions: r.instructions.0,
            cooking_time: r.cooking_time,
            difficulty: r.difficulty,
            servings: r.servings,
            created_at: r.created_at,
        }
    }
}
