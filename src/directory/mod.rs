//! User directory module for HTTP communication

mod client;
mod error;
mod traits;

pub use client::{HttpUserDirectory, DEFAULT_ADDRESS};
pub use error::DirectoryError;
pub use traits::{email_taken, UserDirectory};

#[cfg(test)]
pub use traits::MockUserDirectory;
