//! # Backend contracts
//!
//! This module defines the behaviour that storage backends need to expose in order to be supported by the drink
//! engine.
//!
//! * [`DrinkManagement`] provides methods for storing, querying, replacing and removing drinks on the menu.
mod drink_management;

pub use drink_management::{DrinkApiError, DrinkManagement};
