/// One cycle's raw external output vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOutput {
    pub primary_out: u8,
    pub secondary_out: u8,
}

impl RawOutput {
    pub fn spike(&self) -> bool {
        self.secondary_out & 0x01 != 0
    }

    pub fn params_ready(&self) -> bool {
        self.secondary_out & 0x02 != 0
    }

    pub fn debug_code(&self) -> u8 {
        (self.secondary_out >> 2) & 0x07
    }
}

/// Internal phase, exposed as the 3-bit debug code. Observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hold = 0,
    Integrating = 1,
    Refractory = 2,
    Loading = 3,
    Ready = 4,
}

/// Packs the cycle outputs: membrane view on the primary bus; spike flag
/// (bit 0), params_ready pulse (bit 1) and debug code (bits 2..4) on the
/// secondary bus. Bits 5..7 are reserved and driven low.
pub fn encode(membrane_out: u8, spike: bool, params_ready: bool, phase: Phase) -> RawOutput {
    RawOutput {
        primary_out: membrane_out,
        secondary_out: spike as u8 | (params_ready as u8) << 1 | (phase as u8) << 2,
    }
}
