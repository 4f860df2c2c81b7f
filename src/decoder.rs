/// One cycle's raw external input vector. `reset_n` is active low, matching
/// the pad-level contract.
#[derive(Debug, Clone, Copy)]
pub struct RawInput {
    pub reset_n: bool,
    pub enable: bool,
    pub primary_in: u8,
    pub secondary_in: u8,
}

impl RawInput {
    pub fn idle() -> Self {
        Self {
            reset_n: true,
            enable: true,
            primary_in: 0,
            secondary_in: 0,
        }
    }
}

/// The typed view of one cycle's input. Load mode and stimulus share the
/// same physical pins, so the decode happens exactly once per cycle and
/// everything downstream works on the tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInput {
    Stimulus(u16),
    LoadBit(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusLayout {
    /// primary: bit 0 input_enable, bit 1 load_mode, bit 2 serial_data,
    /// bits 7:3 chan[4:0]; secondary: bit 0 chan[5].
    DualLeak,
    /// primary: 8-bit stimulus; secondary: bit 0 input_enable,
    /// bit 1 load_mode, bit 2 serial_data.
    Izhikevich,
}

/// Undefined bits decode as zero; a raw vector always yields a defined
/// frame. Load mode takes precedence over the stimulus interpretation.
pub fn decode(layout: BusLayout, input: &RawInput) -> DecodedInput {
    match layout {
        BusLayout::DualLeak => {
            if input.primary_in & 0x02 != 0 {
                DecodedInput::LoadBit(input.primary_in & 0x04 != 0)
            } else if input.primary_in & 0x01 != 0 {
                let chan =
                    (input.primary_in >> 3) as u16 | ((input.secondary_in & 0x01) as u16) << 5;
                DecodedInput::Stimulus(chan)
            } else {
                DecodedInput::Stimulus(0)
            }
        }
        BusLayout::Izhikevich => {
            if input.secondary_in & 0x02 != 0 {
                DecodedInput::LoadBit(input.secondary_in & 0x04 != 0)
            } else if input.secondary_in & 0x01 != 0 {
                DecodedInput::Stimulus(input.primary_in as u16)
            } else {
                DecodedInput::Stimulus(0)
            }
        }
    }
}
