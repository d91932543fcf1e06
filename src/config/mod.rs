//! Configuration module

mod loader;

pub use loader::LoaderConfig;
pub use loader::API_BASE_URL_ENV;
