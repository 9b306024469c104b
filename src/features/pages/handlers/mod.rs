pub mod page_handlers;

pub use page_handlers::*;
