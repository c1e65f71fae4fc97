//! Interactive wireframe scene viewer.
//!
//! A target-centered [`model::Camera`] is driven by a
//! [`controller::SceneController`] that maps drags, wheel ticks and held keys
//! to orbit, track, dolly and first-person turns, and keeps view and
//! projection matrices ready for upload.

pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use error::{Result, ViewerError};
