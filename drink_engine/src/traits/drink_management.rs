use thiserror::Error;

use crate::db_types::{Drink, NewDrink};

#[derive(Debug, Clone, Error)]
pub enum DrinkApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A drink with the title '{0}' already exists")]
    DuplicateTitle(String),
    #[error("Invalid drink: {0}")]
    InvalidDrink(String),
}

impl From<sqlx::Error> for DrinkApiError {
    fn from(e: sqlx::Error) -> Self {
        DrinkApiError::DatabaseError(e.to_string())
    }
}

/// The `DrinkManagement` trait defines behaviour for managing the drinks menu.
///
/// Missing drinks are not errors. Methods that address a single drink return `None` when no drink has the given id.
#[allow(async_fn_in_trait)]
pub trait DrinkManagement {
    /// Fetches every drink on the menu, in id order.
    async fn fetch_drinks(&self) -> Result<Vec<Drink>, DrinkApiError>;

    async fn fetch_drink(&self, id: i64) -> Result<Option<Drink>, DrinkApiError>;

    /// Stores a new drink and returns it with its newly assigned id. If the title is already taken,
    /// [`DrinkApiError::DuplicateTitle`] is returned.
    async fn insert_drink(&self, drink: NewDrink) -> Result<Drink, DrinkApiError>;

    /// Replaces the title and recipe of the drink with the given id. The id does not change.
    async fn update_drink(&self, id: i64, drink: NewDrink) -> Result<Option<Drink>, DrinkApiError>;

    /// Removes the drink and returns its id.
    async fn delete_drink(&self, id: i64) -> Result<Option<i64>, DrinkApiError>;
}
