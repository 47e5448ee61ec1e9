//! Database models split into domain-specific modules.

pub mod completion;
pub mod habit;
pub mod user;

pub use completion::*;
pub use habit::*;
pub use user::*;
