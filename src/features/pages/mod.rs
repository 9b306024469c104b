//! Server-rendered site: the public catalog pages, sign-in and the admin panel.

pub mod handlers;
pub mod routes;

pub use handlers::PagesState;
