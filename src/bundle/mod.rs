//! Helpers for turning compiled assets into files inside the public asset directory.

pub mod styles;
pub mod writer;
