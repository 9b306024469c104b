pub mod admin;
pub mod auth;
pub mod banners;
pub mod catalog;
pub mod entries;
pub mod pages;
