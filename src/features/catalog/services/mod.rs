pub mod catalog_service;

pub use catalog_service::{CatalogService, CatalogView, LiveCatalog, CATALOG_UNAVAILABLE_NOTICE};
