//! Photovoltaic output prediction and advisory service.

pub mod advisor;
pub mod api;
pub mod config;
pub mod features;
pub mod io;
pub mod model;
pub mod predict;
pub mod solar;
/// Dataset loading, training pipeline, and diagnostics.
pub mod train;
pub mod weather;
