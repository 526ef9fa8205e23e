use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, types::Json};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Ingredient
///
/// One line of a recipe: how many `parts` of a `color`-coded component go into the drink.
/// The optional `name` is what the detail view shows to baristas. Any other field is
/// rejected rather than dropped, so a stored recipe always reads back as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct Ingredient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    #[schema(example = "white")]
    pub color: String,
    #[schema(example = 1)]
    pub parts: u32,
}

/// Drink
///
/// A row of the `drinks` table. The recipe is stored as JSONB and decoded into typed
/// ingredients on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Json<Vec<Ingredient>>,
}

impl Drink {
    /// The public projection: identity and title only.
    pub fn summary(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
        }
    }

    /// The full projection, gated by `get:drinks-detail` on listing routes.
    pub fn detail(&self) -> DrinkDetail {
        DrinkDetail {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.0.clone(),
        }
    }
}

/// --- Response Projections (Output Schemas) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkSummary {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkDetail {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// --- Request Payloads (Input Schemas) ---

/// Longest title the `drinks.title` column accepts, in characters.
pub const MAX_TITLE_LEN: usize = 80;

/// DrinkPayload
///
/// Body of POST /drinks and PATCH /drinks/{id}. Both fields are required: an update
/// replaces the drink wholesale. A lone ingredient object is accepted as a one-line recipe.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkPayload {
    #[schema(example = "Latte", max_length = 80)]
    pub title: String,
    #[serde(deserialize_with = "one_or_many")]
    pub recipe: Vec<Ingredient>,
}

impl DrinkPayload {
    /// Title must carry something other than whitespace and fit the column. Uniqueness is
    /// left to storage.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.title.chars().count() <= MAX_TITLE_LEN
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Ingredient>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Recipe {
        Many(Vec<Ingredient>),
        One(Ingredient),
    }

    Ok(match Recipe::deserialize(deserializer)? {
        Recipe::Many(ingredients) => ingredients,
        Recipe::One(ingredient) => vec![ingredient],
    })
}

/// --- Success Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrinkSummaryList {
    pub success: bool,
    pub drinks: Vec<DrinkSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrinkDetailList {
    pub success: bool,
    pub drinks: Vec<DrinkDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrinkResponse {
    pub success: bool,
    pub drinks: DrinkDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedDrinkResponse {
    pub success: bool,
    pub deleted: DrinkDetail,
}
