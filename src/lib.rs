pub mod core;
pub mod params;
pub mod state_snapshot;

mod decoder;
mod encoder;
mod fixed;
mod loader;
mod neuron;
