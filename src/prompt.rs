//! Prompt text sent alongside the ingredient photo.

use std::fmt::Write as _;

const BASE_PROMPT: &str = r"You are a world-class professional chef with years of kitchen experience.
Look carefully at every edible ingredient visible in this photo.

RULES:
1. Use ONLY ingredients that are clearly visible in the photo.
2. Never add ingredients that are not shown.
3. Salt, pepper, oil and water may be included ONLY when cooking the visible ingredients requires them.
4. If a complete dish is impossible with what is visible, say which common household items would be needed.
5. Identify every ingredient: vegetables, meats, seasonings, spices and so on.
6. Take the freshness and cooking suitability of each ingredient into account.
7. Design a tasty, simple, home-style recipe built ONLY from the identified ingredients.
8. Give precise quantities based on common household portions.
9. Write steps that are clear and easy to follow.";

const OUTPUT_FORMAT: &str = r#"

Answer STRICTLY with a single JSON object in the format below, with no extra text and no ```json markers:
{
  "title": "Creative recipe title",
  "description": "One enticing sentence summarising the dish",
  "recipe_ingredients": [
    {"name": "Ingredient name", "quantity": "Exact amount (e.g. 200g, 2 pieces, to taste)"},
    {"name": "Ingredient name", "quantity": "Exact amount"}
  ],
  "instructions": [
    "Step 1 in detail (include timing and heat level)",
    "Step 2 in detail (include timing and heat level)"
  ],
  "cooking_time": "Estimated cooking time",
  "difficulty": "Easy/Medium/Hard",
  "servings": "Recommended servings"
}
"#;

/// Keys the model is told to emit, in prompt order.
pub const RECIPE_KEYS: [&str; 7] = [
    "title",
    "description",
    "recipe_ingredients",
    "instructions",
    "cooking_time",
    "difficulty",
    "servings",
];

/// Build the full instruction prompt. A blank style counts as no style.
#[must_use]
pub fn build_prompt(cooking_style: Option<&str>) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    if let Some(style) = cooking_style.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = write!(
            prompt,
            "\n10. IMPORTANT: Cook in the {style} style. Use traditional {style} techniques, seasonings and flavor profiles."
        );
    }

    prompt.push_str(OUTPUT_FORMAT);
    prompt
}
