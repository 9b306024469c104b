pub mod entry_dto;

pub use entry_dto::*;
