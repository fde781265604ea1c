use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use crate::{
    db_types::{Drink, NewDrink, Recipe},
    traits::DrinkApiError,
};

impl FromRow<'_, SqliteRow> for Drink {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let recipe: String = row.try_get("recipe")?;
        let recipe = Recipe::from_json(&recipe)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "recipe".into(), source: Box::new(e) })?;
        Ok(Self { id, title, recipe })
    }
}

fn map_write_error(e: sqlx::Error, title: &str) -> DrinkApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => DrinkApiError::DuplicateTitle(title.to_string()),
        _ => DrinkApiError::DatabaseError(e.to_string()),
    }
}

fn recipe_json(drink: &NewDrink) -> Result<String, DrinkApiError> {
    drink.recipe.to_json().map_err(|e| DrinkApiError::InvalidDrink(e.to_string()))
}

pub async fn fetch_drinks(conn: &mut SqliteConnection) -> Result<Vec<Drink>, DrinkApiError> {
    let drinks =
        sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks ORDER BY id").fetch_all(conn).await?;
    Ok(drinks)
}

pub async fn fetch_drink(id: i64, conn: &mut SqliteConnection) -> Result<Option<Drink>, DrinkApiError> {
    let drink = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(drink)
}

pub async fn insert_drink(drink: NewDrink, conn: &mut SqliteConnection) -> Result<Drink, DrinkApiError> {
    let recipe = recipe_json(&drink)?;
    let result = sqlx::query_as::<_, Drink>(
        "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
    )
    .bind(&drink.title)
    .bind(recipe)
    .fetch_one(conn)
    .await
    .map_err(|e| map_write_error(e, &drink.title))?;
    trace!("🗃️ Inserted drink '{}'", drink.title);
    Ok(result)
}

/// Replaces the title and recipe of the drink. Returns `None` if the drink does not exist.
pub async fn update_drink(
    id: i64,
    drink: NewDrink,
    conn: &mut SqliteConnection,
) -> Result<Option<Drink>, DrinkApiError> {
    let recipe = recipe_json(&drink)?;
    let result = sqlx::query_as::<_, Drink>(
        "UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3 RETURNING id, title, recipe",
    )
    .bind(&drink.title)
    .bind(recipe)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| map_write_error(e, &drink.title))?;
    Ok(result)
}

pub async fn delete_drink(id: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, DrinkApiError> {
    let result = sqlx::query_scalar::<_, i64>("DELETE FROM drinks WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(result)
}
