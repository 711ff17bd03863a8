//! Database entities

pub mod file;
pub mod translation;

pub use translation::Entity as Translation;
