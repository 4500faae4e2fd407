use serde_json::json;

use snapcook::llm::{GenerationError, parse_model_output, strip_code_fence};
use snapcook::models::NewRecipe;
use snapcook::prompt::{RECIPE_KEYS, build_prompt};
use snapcook::repo::RepoError;

#[test]
fn prompt_is_deterministic() {
    assert_eq!(build_prompt(None), build_prompt(None));
    assert_eq!(build_prompt(Some("Thai")), build_prompt(Some("Thai")));
}

#[test]
fn prompt_names_every_output_key() {
    let prompt = build_prompt(None);
    for key in RECIPE_KEYS {
        assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
    }
}

#[test]
fn style_clause_only_when_style_given() {
    let plain = build_prompt(None);
    let styled = build_prompt(Some("Japanese"));
    assert!(!plain.contains("Japanese"));
    assert!(styled.contains("Japanese style"));
    assert!(styled.starts_with(&plain[..200]));
    assert_eq!(build_prompt(Some("  ")), plain);
}

#[test]
fn fence_stripping_cases() {
    let inner = r#"{"title":"Soup"}"#;
    let cases = [
        format!("```json\n{inner}\n```"),
        format!("```json{inner}```"),
        format!("```\n{inner}\n```"),
        format!("\n\n{inner}\n"),
        inner.to_string(),
    ];
    for c in &cases {
        assert_eq!(strip_code_fence(c), inner, "case {c:?}");
    }
    // only the trailing fence present
    assert_eq!(strip_code_fence(&format!("{inner}```")), inner);
}

#[test]
fn parsed_mapping_is_identical_across_fences() {
    let inner = json!({
        "title": "Pesto Pasta",
        "description": null,
        "recipe_ingredients": [{"name": "Basil", "quantity": "1 bunch"}],
        "instructions": ["Blend.", "Toss."]
    })
    .to_string();

    let tagged = parse_model_output(&format!("```json\n{inner}\n```")).unwrap();
    let bare = parse_model_output(&format!("```\n{inner}\n```")).unwrap();
    let none = parse_model_output(&inner).unwrap();
    assert_eq!(tagged, bare);
    assert_eq!(bare, none);
}

#[test]
fn malformed_output_is_a_parse_error() {
    for raw in ["", "```json\n```", "Sure! Here is your recipe.", "{\"title\": "] {
        let err = parse_model_output(raw).unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)), "{raw:?}");
    }
}

#[test]
fn description_key_is_required_but_nullable() {
    let with_null = json!({
        "title": "Toast",
        "description": null,
        "recipe_ingredients": [],
        "instructions": []
    });
    let recipe = NewRecipe::from_fields(with_null.as_object().unwrap()).unwrap();
    assert!(recipe.description.is_none());
    assert!(recipe.cooking_time.is_none());

    let missing = json!({
        "title": "Toast",
        "recipe_ingredients": [],
        "instructions": []
    });
    let err = NewRecipe::from_fields(missing.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::Invalid(ref m) if m.contains("description")));
}

#[test]
fn extra_ingredient_keys_survive() {
    let fields = json!({
        "title": "Salad",
        "description": "Crunchy.",
        "recipe_ingredients": [{"name": "Cucumber", "quantity": "1", "note": "peeled"}],
        "instructions": ["Slice."]
    });
    let recipe = NewRecipe::from_fields(fields.as_object().unwrap()).unwrap();
    let back = serde_json::to_value(&recipe.recipe_ingredients).unwrap();
    assert_eq!(back, fields["recipe_ingredients"]);
}

#[test]
fn column_widths_are_enforced() {
    let fields = json!({
        "title": "Stew",
        "description": "Hearty.",
        "recipe_ingredients": [],
        "instructions": [],
        "difficulty": "Somewhere between medium and quite hard"
    });
    let err = NewRecipe::from_fields(fields.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::Invalid(ref m) if m.contains("difficulty")));
}

#[test]
fn ingredients_are_not_normalized() {
    let fields = json!({
        "title": "Toast",
        "description": null,
        "recipe_ingredients": [{"name": "Bread"}, {"name": "Butter", "quantity": null}, "jam"],
        "instructions": ["Toast.", "Spread."]
    });
    let recipe = NewRecipe::from_fields(fields.as_object().unwrap()).unwrap();
    let back = serde_json::to_value(&recipe.recipe_ingredients).unwrap();
    assert_eq!(back, fields["recipe_ingredients"]);

    let not_a_list = json!({
        "title": "Toast",
        "description": null,
        "recipe_ingredients": {"name": "Bread"},
        "instructions": []
    });
    let err = NewRecipe::from_fields(not_a_list.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::Invalid(_)));
}

#[test]
fn scalar_detail_fields_become_text() {
    let fields = json!({
        "title": "Rice",
        "description": "Plain.",
        "recipe_ingredients": [],
        "instructions": [],
        "cooking_time": 25,
        "difficulty": null,
        "servings": 2.5
    });
    let recipe = NewRecipe::from_fields(fields.as_object().unwrap()).unwrap();
    assert_eq!(recipe.cooking_time.as_deref(), Some("25"));
    assert!(recipe.difficulty.is_none());
    assert_eq!(recipe.servings.as_deref(), Some("2.5"));

    let nested = json!({
        "title": "Rice",
        "description": "Plain.",
        "recipe_ingredients": [],
        "instructions": [],
        "servings": {"min": 2, "max": 3}
    });
    let err = NewRecipe::from_fields(nested.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::Invalid(ref m) if m.contains("expected a string or number")));
}
