pub mod banner_handler;

pub use banner_handler::*;
