//! API request handlers.

pub mod extract;
pub mod health;
pub mod webhook;

pub use extract::*;
pub use health::*;
pub use webhook::*;
