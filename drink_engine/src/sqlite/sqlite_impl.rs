//! `SqliteDatabase` is a concrete implementation of a drink engine backend.
//!
//! It uses SQLite as the storage engine and implements the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{drinks, new_pool};
use crate::{
    db_types::{Drink, NewDrink},
    traits::{DrinkApiError, DrinkManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl DrinkManagement for SqliteDatabase {
    async fn fetch_drinks(&self) -> Result<Vec<Drink>, DrinkApiError> {
        let mut conn = self.pool.acquire().await?;
        drinks::fetch_drinks(&mut conn).await
    }

    async fn fetch_drink(&self, id: i64) -> Result<Option<Drink>, DrinkApiError> {
        let mut conn = self.pool.acquire().await?;
        drinks::fetch_drink(id, &mut conn).await
    }

    async fn insert_drink(&self, drink: NewDrink) -> Result<Drink, DrinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let drink = drinks::insert_drink(drink, &mut conn).await?;
        debug!("🗃️ Drink {drink} has been saved in the DB");
        Ok(drink)
    }

    /// Looks up the drink and replaces it in a single transaction, so that a concurrent delete cannot slip in between.
    async fn update_drink(&self, id: i64, drink: NewDrink) -> Result<Option<Drink>, DrinkApiError> {
        let mut tx = self.pool.begin().await?;
        if drinks::fetch_drink(id, &mut tx).await?.is_none() {
            trace!("🗃️ Drink #{id} not found. Skipping update");
            return Ok(None);
        }
        let result = drinks::update_drink(id, drink, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn delete_drink(&self, id: i64) -> Result<Option<i64>, DrinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = drinks::delete_drink(id, &mut conn).await?;
        if result.is_some() {
            debug!("🗃️ Drink #{id} has been deleted from the DB");
        }
        Ok(result)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. This is idempotent.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}
