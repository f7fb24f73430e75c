//! Instanced-tunnel generative art demo: rings of tube segments placed,
//! stretched, and colored entirely in a shader from one time uniform,
//! rendered with wgpu behind an orbit camera and an egui overlay.

pub mod app;
pub mod config;
pub mod motion;
pub mod palette;
pub mod render;
pub mod ui;
