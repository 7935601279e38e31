//! Core traits for the service locator.

mod callback;
mod dispose;
mod resolver;

pub use callback::ScopeCallback;
pub use dispose::Dispose;
pub use resolver::{RegistryCore, RegistryRef, Resolver};
