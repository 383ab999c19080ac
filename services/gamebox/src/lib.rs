//! Gamebox Service Library Crate
//!
//! Runtime wiring for the gamebox dialog: configuration loading and the
//! speech collaborators for print mode (console) and voice mode (audio
//! devices). The `gamebox` binary is a thin wrapper around this library.

pub mod config;
pub mod console;
pub mod voice;
