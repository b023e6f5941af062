//! Trait abstraction for the user directory to enable mocking in tests

use super::DirectoryError;
use crate::state::User;
use async_trait::async_trait;

/// User directory operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a single user record by id
    async fn get_user(&self, id: u32) -> Result<User, DirectoryError>;

    /// List every user registered with the given email address
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DirectoryError>;
}

/// Ask the directory whether `email` already belongs to a user
pub async fn email_taken(
    directory: &dyn UserDirectory,
    email: &str,
) -> Result<bool, DirectoryError> {
    let users = directory.find_by_email(email).await?;
    Ok(!users.is_empty())
}
