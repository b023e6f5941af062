//! Form rendering module
//!
//! - `field_renderer`: single-line field rendering
//! - `profile_form`: the profile form screen and its loading placeholder

mod field_renderer;
mod profile_form;

pub use profile_form::{draw_loading, draw_profile_form};
