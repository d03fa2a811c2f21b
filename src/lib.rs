//! TV Tidy Library
//!
//! A library for organizing TV episode files using TMDB metadata and an
//! optional local dub-cast database.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod ui;

pub use error::{Error, Result};
