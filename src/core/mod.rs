//! Core data models and the credentials store

mod credentials;
mod store;

pub use credentials::*;
pub use store::*;
