pub mod api;
pub mod abstractions;
pub mod builtin;
mod core;
pub mod translate;

#[cfg(test)]
pub(crate) mod tests;

// We re-export abstractions that are meant to be used publicly.
pub use abstractions::{log, IString};
