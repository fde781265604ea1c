//! The `DrinkApi` is the entry point for reading and editing the drinks menu.
//!
//! Writes are validated here before they are handed to the backend, so every backend sees the same rules.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Drink, NewDrink},
    traits::{DrinkApiError, DrinkManagement},
};

pub struct DrinkApi<B> {
    db: B,
}

impl<B> Debug for DrinkApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DrinkApi")
    }
}

impl<B> DrinkApi<B>
where B: DrinkManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn drinks(&self) -> Result<Vec<Drink>, DrinkApiError> {
        self.db.fetch_drinks().await
    }

    pub async fn drink(&self, id: i64) -> Result<Option<Drink>, DrinkApiError> {
        self.db.fetch_drink(id).await
    }

    pub async fn create_drink(&self, drink: NewDrink) -> Result<Drink, DrinkApiError> {
        drink.validate()?;
        let drink = self.db.insert_drink(drink).await?;
        info!("🍹️ New drink {drink} added to the menu");
        Ok(drink)
    }

    /// Replaces an existing drink. A missing drink is reported as `None` before the replacement is validated.
    pub async fn update_drink(&self, id: i64, drink: NewDrink) -> Result<Option<Drink>, DrinkApiError> {
        if self.db.fetch_drink(id).await?.is_none() {
            debug!("🍹️ Drink #{id} does not exist. Nothing was updated");
            return Ok(None);
        }
        drink.validate()?;
        let result = self.db.update_drink(id, drink).await?;
        match &result {
            Some(drink) => info!("🍹️ Drink {drink} has been updated"),
            None => debug!("🍹️ Drink #{id} does not exist. Nothing was updated"),
        }
        Ok(result)
    }

    pub async fn delete_drink(&self, id: i64) -> Result<Option<i64>, DrinkApiError> {
        let result = self.db.delete_drink(id).await?;
        match result {
            Some(id) => info!("🍹️ Drink #{id} has been removed from the menu"),
            None => debug!("🍹️ Drink #{id} does not exist. Nothing was deleted"),
        }
        Ok(result)
    }
}
