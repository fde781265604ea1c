pub mod drinks_api;
