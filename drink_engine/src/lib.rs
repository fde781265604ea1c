//! Drink Engine
//!
//! The drink engine holds the menu of drink recipes served by the drinks server. It is transport-agnostic: nothing in
//! here knows about HTTP or bearer tokens.
//!
//! The library is divided into three sections:
//! 1. Data types ([`mod@db_types`]). A [`db_types::Drink`] has a unique title and a recipe, which is an ordered list
//!    of ingredients. Drinks can be projected into a short form (ingredient names withheld) or a long form.
//! 2. Backend contracts ([`mod@traits`]). Storage backends implement [`DrinkManagement`] in order to act as a backend
//!    for the drinks server.
//! 3. The public API ([`DrinkApi`]). Callers should go through the API rather than calling a backend directly, since
//!    the API validates new drinks before they reach storage.
//!
//! SQLite is currently the only supported backend. See [`SqliteDatabase`].
mod api;

pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use api::drinks_api::DrinkApi;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{DrinkApiError, DrinkManagement};
