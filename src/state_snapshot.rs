use serde::{Deserialize, Serialize};

/// Observability view of a core, with fixed-point state converted to f32.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub t: usize,
    pub membrane: f32,
    pub recovery: Option<f32>,
    pub active_params: Vec<u8>,
    pub loader_bits_pending: u8,
}
