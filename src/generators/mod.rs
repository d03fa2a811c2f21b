//! Sidecar document generators.

pub mod nfo;
