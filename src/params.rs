use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

/// Both model variants expose four 8-bit configuration registers, so the
/// parameter bank has a fixed geometry.
pub const NUM_PARAM_SLOTS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreParams {
    pub model: ModelParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelParams {
    DualLeak(DualLeakParams),
    Izhikevich(IzhikevichParams),
    IzhikevichLite(IzhikevichParams),
}

/// Dual-leak LIF configuration. All values are raw register encodings:
/// `threshold` is in integer membrane units, the leak shifts are arithmetic
/// right-shift amounts (smaller shift = stronger/faster leak), and the
/// decoded 6-bit channel value is shifted left by `stimulus_shift` into the
/// Q23.8 membrane domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualLeakParams {
    pub threshold: u8,
    pub leak_shift_fast: u8,
    pub leak_shift_slow: u8,
    pub stimulus_shift: u8,
}

/// Izhikevich configuration, raw register encodings:
/// a = a_raw / 256, b = b_raw / 256, c = -(c_raw) mV, d = d_raw / 8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IzhikevichParams {
    pub a_raw: u8,
    pub b_raw: u8,
    pub c_raw: u8,
    pub d_raw: u8,
}

impl Default for CoreParams {
    fn default() -> Self {
        Self {
            model: ModelParams::DualLeak(DualLeakParams::default()),
        }
    }
}

impl Default for DualLeakParams {
    fn default() -> Self {
        Self {
            threshold: 200,
            leak_shift_fast: 2,
            leak_shift_slow: 4,
            stimulus_shift: 8,
        }
    }
}

impl Default for IzhikevichParams {
    fn default() -> Self {
        // a = 0.0195, b = 0.199, c = -65, d = 2
        Self {
            a_raw: 5,
            b_raw: 51,
            c_raw: 65,
            d_raw: 16,
        }
    }
}

impl DualLeakParams {
    pub fn to_raw(&self) -> [u8; NUM_PARAM_SLOTS] {
        [
            self.threshold,
            self.leak_shift_fast,
            self.leak_shift_slow,
            self.stimulus_shift,
        ]
    }

    pub fn from_raw(raw: &[u8; NUM_PARAM_SLOTS]) -> Self {
        Self {
            threshold: raw[0],
            leak_shift_fast: raw[1],
            leak_shift_slow: raw[2],
            stimulus_shift: raw[3],
        }
    }
}

impl IzhikevichParams {
    pub fn to_raw(&self) -> [u8; NUM_PARAM_SLOTS] {
        [self.a_raw, self.b_raw, self.c_raw, self.d_raw]
    }

    pub fn from_raw(raw: &[u8; NUM_PARAM_SLOTS]) -> Self {
        Self {
            a_raw: raw[0],
            b_raw: raw[1],
            c_raw: raw[2],
            d_raw: raw[3],
        }
    }
}

/// Double-buffered register bank. The dynamics engine only ever reads
/// `active`; the serial loader only ever writes `staging`. The copies trade
/// places atomically when a load sequence completes, and staging is re-synced
/// to active when a sequence ends without a committed word.
#[derive(Debug, Clone)]
pub struct ParamBank {
    defaults: [u8; NUM_PARAM_SLOTS],
    active: [u8; NUM_PARAM_SLOTS],
    staging: [u8; NUM_PARAM_SLOTS],
}

impl ParamBank {
    pub fn new(defaults: [u8; NUM_PARAM_SLOTS]) -> Self {
        Self {
            defaults,
            active: defaults,
            staging: defaults,
        }
    }

    pub fn active(&self) -> &[u8; NUM_PARAM_SLOTS] {
        &self.active
    }

    pub fn write_staging(&mut self, slot: usize, value: u8) {
        self.staging[slot % NUM_PARAM_SLOTS] = value;
    }

    pub fn commit_staging(&mut self) {
        self.active = self.staging;
    }

    pub fn discard_staging(&mut self) {
        self.staging = self.active;
    }

    pub fn reset(&mut self) {
        self.active = self.defaults;
        self.staging = self.defaults;
    }
}

pub fn validate_core_params(core_params: &CoreParams) -> Result<(), SimpleError> {
    match &core_params.model {
        ModelParams::DualLeak(params) => validate_dual_leak_params(params),
        ModelParams::Izhikevich(params) | ModelParams::IzhikevichLite(params) => {
            validate_izhikevich_params(params)
        }
    }
}

fn validate_dual_leak_params(params: &DualLeakParams) -> Result<(), SimpleError> {
    if params.threshold == 0 {
        return Err(SimpleError::new("threshold must be strictly positive"));
    }

    if params.leak_shift_fast > 12 {
        return Err(SimpleError::new("leak_shift_fast must not exceed 12"));
    }

    if params.leak_shift_slow > 12 {
        return Err(SimpleError::new("leak_shift_slow must not exceed 12"));
    }

    if params.leak_shift_fast >= params.leak_shift_slow {
        return Err(SimpleError::new(
            "leak_shift_fast must be less than leak_shift_slow",
        ));
    }

    if params.stimulus_shift > 10 {
        return Err(SimpleError::new("stimulus_shift must not exceed 10"));
    }

    Ok(())
}

fn validate_izhikevich_params(params: &IzhikevichParams) -> Result<(), SimpleError> {
    if params.c_raw < 30 {
        return Err(SimpleError::new(
            "c_raw must be at least 30 (post-spike reset must sit below threshold)",
        ));
    }

    Ok(())
}
