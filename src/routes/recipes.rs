use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, LatestRecipe, Recipe, RecipeList};
use crate::repo::RecipeRepo;

const NO_IMAGE: &str = "No image file found in the request";
const GENERATE_FAILED: &str = "Failed to generate recipe, please try again later.";
const SAVE_FAILED: &str = "Internal error while saving the recipe";
const LIST_FAILED: &str = "Failed to fetch recipes";
const LATEST_FAILED: &str = "Failed to fetch latest recipe";

/// Which client uploaded the photo. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    DirectUpload,
    N8nAutomation,
    FlutterApp,
    Other(String),
}

impl From<&str> for UploadSource {
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "direct_upload" => Self::DirectUpload,
            "n8n_automation" => Self::N8nAutomation,
            "flutter_app" => Self::FlutterApp,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUpload => f.write_str("direct upload"),
            Self::N8nAutomation => f.write_str("n8n automation"),
            Self::FlutterApp => f.write_str("flutter app"),
            Self::Other(tag) => write!(f, "direct upload ({tag})"),
        }
    }
}

/// Fields of a generate request, pulled out of the multipart body.
#[derive(Default)]
struct GenerateForm {
    image: Option<Vec<u8>>,
    cooking_style: Option<String>,
    source: Option<String>,
}

async fn read_generate_form(multipart: &mut Multipart) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") if form.image.is_none() => {
                form.image = Some(field.bytes().await?.to_vec());
            }
            Some("cooking_style") => {
                let v = field.text().await?;
                form.cooking_style = Some(v).filter(|s| !s.trim().is_empty());
            }
            Some("source") => {
                form.source = Some(field.text().await?);
            }
            _ => {}
        }
    }
    Ok(form)
}

/// `POST /recipe/generate`: photo in, stored recipe out.
///
/// # Errors
///
/// 400 if there is no `image` part, 500 if generation or saving fails.
pub async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<Recipe>)> {
    // A body that isn't multipart at all can't carry an image either.
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "generate called without a multipart body");
        AppError::bad_request(NO_IMAGE)
    })?;
    let form = read_generate_form(&mut multipart).await?;

    let Some(image) = form.image else {
        return Err(AppError::bad_request(NO_IMAGE));
    };
    let source = UploadSource::from(form.source.as_deref().unwrap_or_default());

    let fields = state
        .generator
        .generate(image, form.cooking_style.as_deref())
        .await
        .map_err(|e| AppError::internal(GENERATE_FAILED, e))?;

    let title = fields
        .get("title")
        .and_then(|t| t.as_str())
        .unwrap_or("<untitled>");
    tracing::info!(%source, %title, "generated recipe, saving");

    let recipe = RecipeRepo::new(state.pool.clone())
        .create(&fields)
        .await
        .map_err(|e| AppError::internal(SAVE_FAILED, e))?;

    tracing::info!(id = recipe.id, %source, "recipe saved");
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// `GET /recipes`: every recipe, newest first.
///
/// # Errors
///
/// Err if querying the db fails
pub async fn list(State(state): State<AppState>) -> AppResult<Json<RecipeList>> {
    let recipes = RecipeRepo::new(state.pool.clone())
        .list_all()
        .await
        .map_err(|e| AppError::internal(LIST_FAILED, e))?;

    Ok(Json(RecipeList {
        total_recipes: recipes.len(),
        recipes,
    }))
}

/// `GET /recipes/latest`
///
/// # Errors
///
/// Err if querying the db fails
pub async fn latest(State(state): State<AppState>) -> AppResult<Response> {
    let latest = RecipeRepo::new(state.pool.clone())
        .latest()
        .await
        .map_err(|e| AppError::internal(LATEST_FAILED, e))?;

    Ok(match latest {
        Some(recipe) => Json(LatestRecipe {
            message: "Latest recipe found",
            recipe: Some(recipe),
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(LatestRecipe {
                message: "No recipes found in database",
                recipe: None,
            }),
        )
            .into_response(),
    })
}

#[cfg(test)]
mod tests {
    use super::UploadSource;

    #[test]
    fn source_tags() {
        assert_eq!(UploadSource::from(""), UploadSource::DirectUpload);
        assert_eq!(UploadSource::from("n8n_automation"), UploadSource::N8nAutomation);
        assert_eq!(UploadSource::from(" flutter_app "), UploadSource::FlutterApp);
        assert_eq!(
            UploadSource::from("cli").to_string(),
            "direct upload (cli)"
        );
    }
}
