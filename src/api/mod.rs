#[cfg(feature = "backend")]
pub mod client;
pub mod types;

#[cfg(feature = "backend")]
pub use client::*;
pub use types::*;
