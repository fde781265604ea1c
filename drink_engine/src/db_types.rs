use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

use crate::traits::DrinkApiError;

//--------------------------------------     Ingredient       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    /// The relative amount of this ingredient in the drink. Any JSON number is accepted, so half parts are fine.
    pub parts: Number,
}

impl Ingredient {
    pub fn new<S: Into<String>, P: Into<Number>>(name: S, color: S, parts: P) -> Self {
        Self { name: name.into(), color: color.into(), parts: parts.into() }
    }
}

/// The public face of an ingredient. The name is withheld, so only the look of the drink is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: Number,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(ingredient: &Ingredient) -> Self {
        Self { color: ingredient.color.clone(), parts: ingredient.parts.clone() }
    }
}

//--------------------------------------       Recipe         ---------------------------------------------------------
/// An ordered list of ingredients. Recipes are stored as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(pub Vec<Ingredient>);

#[derive(Debug, Clone, Error)]
#[error("Recipe is not a valid list of ingredients. {0}")]
pub struct RecipeConversionError(String);

impl Recipe {
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn summary(&self) -> Vec<IngredientSummary> {
        self.0.iter().map(IngredientSummary::from).collect()
    }

    pub fn to_json(&self) -> Result<String, RecipeConversionError> {
        serde_json::to_string(&self.0).map_err(|e| RecipeConversionError(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, RecipeConversionError> {
        serde_json::from_str(s).map_err(|e| RecipeConversionError(e.to_string()))
    }
}

impl From<Vec<Ingredient>> for Recipe {
    fn from(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }
}

//--------------------------------------        Drink         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    /// The menu view of the drink. Ingredient names are left out.
    pub fn short(&self) -> DrinkSummary {
        DrinkSummary { id: self.id, title: self.title.clone(), recipe: self.recipe.summary() }
    }

    /// The full recipe view of the drink.
    pub fn long(&self) -> DrinkDetail {
        DrinkDetail { id: self.id, title: self.title.clone(), recipe: self.recipe.0.clone() }
    }
}

impl Display for Drink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({})", self.id, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

//--------------------------------------       NewDrink       ---------------------------------------------------------
/// A drink that has not been stored yet. This is also the full replacement value when a drink is updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    pub fn new<S: Into<String>>(title: S, recipe: Recipe) -> Self {
        Self { title: title.into(), recipe }
    }

    pub fn validate(&self) -> Result<(), DrinkApiError> {
        if self.title.trim().is_empty() {
            return Err(DrinkApiError::InvalidDrink("The drink title cannot be empty".to_string()));
        }
        Ok(())
    }
}
