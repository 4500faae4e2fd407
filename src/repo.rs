use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{NewRecipe, Recipe, RecipeRow};

/// Keep SELECT/RETURNING columns in one place to avoid drift with structs.
pub const RECIPE_COLS: &str = r"
    id, title, description,
    recipe_ingredients, instructions,
    cooking_time, difficulty, servings,
    created_at
";

// Column widths the recipe table has always enforced.
const TITLE_MAX: usize = 200;
const COOKING_TIME_MAX: usize = 100;
const DIFFICULTY_MAX: usize = 20;
const SERVINGS_MAX: usize = 100;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid recipe: {0}")]
    Invalid(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct RecipeRepo {
    pool: SqlitePool,
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), RepoError> {
    match value {
        Some(v) if v.chars().count() > max => Err(RepoError::Invalid(format!(
            "{field} is longer than {max} characters"
        ))),
        _ => Ok(()),
    }
}

impl NewRecipe {
    /// Build a recipe from the model's mapping, checking required keys and widths.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Invalid` if a required key is missing, has the wrong
    /// shape, or a value doesn't fit its column.
    pub fn from_fields(fields: &Map<String, JsonValue>) -> Result<Self, RepoError> {
        let new: Self = serde_json::from_value(JsonValue::Object(fields.clone()))
            .map_err(|e| RepoError::Invalid(e.to_string()))?;

        if new.title.trim().is_empty() {
            return Err(RepoError::Invalid("title is empty".into()));
        }
        check_len("title", Some(new.title.as_str()), TITLE_MAX)?;
        check_len("cooking_time", new.cooking_time.as_deref(), COOKING_TIME_MAX)?;
        check_len("difficulty", new.difficulty.as_deref(), DIFFICULTY_MAX)?;
        check_len("servings", new.servings.as_deref(), SERVINGS_MAX)?;
        Ok(new)
    }
}

impl RecipeRepo {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a recipe in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns Err if validation fails or any statement fails; the transaction
    /// is rolled back so no row is left behind.
    pub async fn create(&self, fields: &Map<String, JsonValue>) -> Result<Recipe, RepoError> {
        let new = NewRecipe::from_fields(fields)?;

        let ingredients_json = serde_json::to_string(&new.recipe_ingredients)
            .map_err(|e| RepoError::Invalid(e.to_string()))?;
        let instructions_json = serde_json::to_string(&new.instructions)
            .map_err(|e| RepoError::Invalid(e.to_string()))?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let sql = format!(
            r"
            INSERT INTO recipes (title, description, recipe_ingredients, instructions,
                                 cooking_time, difficulty, servings, created_at)
            VALUES (?, ?, json(?), json(?), ?, ?, ?, ?)
            RETURNING {RECIPE_COLS}
            "
        );

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&ingredients_json)
            .bind(&instructions_json)
            .bind(&new.cooking_time)
            .bind(&new.difficulty)
            .bind(&new.servings)
            .bind(&created_at)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(row.into())
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!(error = %rb, "rollback after failed insert also failed");
                }
                Err(e.into())
            }
        }
    }

    /// All recipes, newest first.
    ///
    /// # Errors
    ///
    /// Err if querying the db fails
    pub async fn list_all(&self) -> Result<Vec<Recipe>, RepoError> {
        let sql = format!("SELECT {RECIPE_COLS} FROM recipes ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// The most recently created recipe, if any.
    ///
    /// # Errors
    ///
    /// Err if querying the db fails
    pub async fn latest(&self) -> Result<Option<Recipe>, RepoError> {
        let sql = format!(
            "SELECT {RECIPE_COLS} FROM recipes ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Recipe::from))
    }

    /// # Errors
    ///
    /// Err if querying the db fails
    pub async fn count(&self) -> Result<i64, RepoError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
