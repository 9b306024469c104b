pub mod banner_service;

pub use banner_service::BannerService;
