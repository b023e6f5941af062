//! Application state module

mod app_state;
pub mod forms;
mod user;

pub use app_state::*;
pub use user::User;
