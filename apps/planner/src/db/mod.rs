//! Local JSON-file storage for the catalog, review states and settings.

pub mod error;
pub mod repository;

pub use error::DbError;
pub use repository::{CatalogRepository, JsonRepository, ReviewRepository, SettingsRepository};
