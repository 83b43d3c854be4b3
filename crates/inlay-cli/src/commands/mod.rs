pub mod build;
pub mod version;
