//! Catalog browsing: filter state, memoized sessions and the live channel.

pub mod dtos;
pub mod handlers;
pub mod memo;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
