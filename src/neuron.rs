use crate::decoder::BusLayout;
use crate::fixed;
use crate::params::{DualLeakParams, IzhikevichParams, ModelParams, NUM_PARAM_SLOTS};

/// One cycle's dynamics result. `membrane_out` is the 8-bit bus view of the
/// membrane value the cycle produced; on a spike cycle it shows the crossing
/// value, the stored state is already reset for the next cycle.
#[derive(Debug, Clone, Copy)]
pub struct StepOutput {
    pub membrane_out: u8,
    pub spiked: bool,
    pub was_refractory: bool,
}

/// The model variant is fixed at construction; the core never branches on it
/// at run time. Parameters arrive as the raw active register bank and are
/// interpreted per model every cycle, exactly like the hardware reads its
/// register file.
pub trait NeuronModel {
    fn bus_layout(&self) -> BusLayout;
    fn word_bits(&self) -> u8;
    fn default_raw(&self) -> [u8; NUM_PARAM_SLOTS];
    fn reset(&mut self, active: &[u8; NUM_PARAM_SLOTS]);
    fn advance(&mut self, stimulus: u16, active: &[u8; NUM_PARAM_SLOTS]) -> StepOutput;
    /// Membrane view while the dynamics hold (load mode, enable deasserted).
    fn hold_view(&self) -> u8;
    fn membrane(&self) -> f32;
    fn recovery(&self) -> Option<f32>;
}

pub fn create(model_params: &ModelParams) -> Box<dyn NeuronModel + Send> {
    match model_params {
        ModelParams::DualLeak(params) => Box::new(DualLeak::new(params)),
        ModelParams::Izhikevich(params) => Box::new(Izhikevich::new(params, 8)),
        ModelParams::IzhikevichLite(params) => Box::new(Izhikevich::new(params, 4)),
    }
}

// ---------------------------------------------------------------------------
// dual-leak LIF
// ---------------------------------------------------------------------------

const DUAL_LEAK_FRAC: u32 = 8;

// membrane is unsigned with an 8-bit integer part
const DUAL_LEAK_MAX: i32 = (255 << DUAL_LEAK_FRAC) | ((1 << DUAL_LEAK_FRAC) - 1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DualLeakState {
    membrane: i32,
    acc_fast: i32,
    acc_slow: i32,
    refractory: bool,
}

#[derive(Debug)]
struct DualLeak {
    defaults: [u8; NUM_PARAM_SLOTS],
    state: DualLeakState,
}

impl DualLeak {
    fn new(params: &DualLeakParams) -> Self {
        Self {
            defaults: params.to_raw(),
            state: DualLeakState::default(),
        }
    }
}

/// The two leak accumulators low-pass track the membrane with their own
/// time constants; each cycle's leak is the sum of both tracked values
/// scaled down by the same shift. Registers loaded over the wire bypass
/// validation, so shift amounts are masked to 4 bits before use.
fn dual_leak_step(
    state: DualLeakState,
    chan: u16,
    params: &DualLeakParams,
) -> (DualLeakState, StepOutput) {
    if state.refractory {
        let next = DualLeakState {
            refractory: false,
            ..state
        };
        let output = StepOutput {
            membrane_out: (state.membrane >> DUAL_LEAK_FRAC) as u8,
            spiked: false,
            was_refractory: true,
        };
        return (next, output);
    }

    let shift_fast = (params.leak_shift_fast & 0x0F) as u32;
    let shift_slow = (params.leak_shift_slow & 0x0F) as u32;
    let stimulus_shift = (params.stimulus_shift & 0x0F) as u32;

    let acc_fast = state.acc_fast + ((state.membrane - state.acc_fast) >> shift_fast);
    let acc_slow = state.acc_slow + ((state.membrane - state.acc_slow) >> shift_slow);

    let leak = (acc_fast >> shift_fast) + (acc_slow >> shift_slow);
    let stimulus = (chan as i32) << stimulus_shift;

    let membrane = fixed::clamp(
        state.membrane as i64 + stimulus as i64 - leak as i64,
        0,
        DUAL_LEAK_MAX,
    );

    let membrane_out = (membrane >> DUAL_LEAK_FRAC) as u8;
    let threshold = (params.threshold as i32) << DUAL_LEAK_FRAC;

    if membrane >= threshold {
        let next = DualLeakState {
            refractory: true,
            ..DualLeakState::default()
        };
        let output = StepOutput {
            membrane_out,
            spiked: true,
            was_refractory: false,
        };
        (next, output)
    } else {
        let next = DualLeakState {
            membrane,
            acc_fast,
            acc_slow,
            refractory: false,
        };
        let output = StepOutput {
            membrane_out,
            spiked: false,
            was_refractory: false,
        };
        (next, output)
    }
}

impl NeuronModel for DualLeak {
    fn bus_layout(&self) -> BusLayout {
        BusLayout::DualLeak
    }

    fn word_bits(&self) -> u8 {
        16
    }

    fn default_raw(&self) -> [u8; NUM_PARAM_SLOTS] {
        self.defaults
    }

    fn reset(&mut self, _active: &[u8; NUM_PARAM_SLOTS]) {
        self.state = DualLeakState::default();
    }

    fn advance(&mut self, stimulus: u16, active: &[u8; NUM_PARAM_SLOTS]) -> StepOutput {
        let params = DualLeakParams::from_raw(active);
        let (next, output) = dual_leak_step(self.state, stimulus, &params);
        self.state = next;
        output
    }

    fn hold_view(&self) -> u8 {
        (self.state.membrane >> DUAL_LEAK_FRAC) as u8
    }

    fn membrane(&self) -> f32 {
        fixed::to_f32(self.state.membrane, DUAL_LEAK_FRAC)
    }

    fn recovery(&self) -> Option<f32> {
        None
    }
}

// ---------------------------------------------------------------------------
// Izhikevich (full and lite share the update, lite runs at Q27.4)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IzhikevichState {
    v: i32,
    u: i32,
}

#[derive(Debug)]
struct Izhikevich {
    defaults: [u8; NUM_PARAM_SLOTS],
    frac: u32,
    state: IzhikevichState,
}

struct IzhikevichCoeffs {
    a: i32,
    b: i32,
    c: i32,
    d: i32,
    threshold: i32,
    quad: i32,
    linear_offset: i32,
}

impl IzhikevichCoeffs {
    /// 0.04 in Q.8; kept at full precision even for the lite variant, since
    /// rounding it to Q.4 would overestimate the quadratic term by half.
    const QUAD_Q8: i32 = 10;

    /// Raw register decode into Q.frac: a = a_raw/256, b = b_raw/256,
    /// c = -(c_raw), d = d_raw/8. The 0.04 quadratic coefficient and the
    /// +140 offset of the model are fixed constants.
    fn from_raw(raw: &[u8; NUM_PARAM_SLOTS], frac: u32) -> Self {
        let params = IzhikevichParams::from_raw(raw);
        Self {
            a: ((params.a_raw as i32) << frac) >> 8,
            b: ((params.b_raw as i32) << frac) >> 8,
            c: -(fixed::from_int(params.c_raw as i32, frac)),
            d: ((params.d_raw as i32) << frac) >> 3,
            threshold: fixed::from_int(30, frac),
            quad: Self::QUAD_Q8,
            linear_offset: fixed::from_int(140, frac),
        }
    }
}

impl Izhikevich {
    fn new(params: &IzhikevichParams, frac: u32) -> Self {
        let defaults = params.to_raw();
        let coeffs = IzhikevichCoeffs::from_raw(&defaults, frac);
        Self {
            defaults,
            frac,
            state: Self::baseline(&coeffs, frac),
        }
    }

    fn baseline(coeffs: &IzhikevichCoeffs, frac: u32) -> IzhikevichState {
        IzhikevichState {
            v: coeffs.c,
            u: fixed::mul(coeffs.b, coeffs.c, frac),
        }
    }
}

fn izhikevich_step(
    state: IzhikevichState,
    stimulus: u16,
    coeffs: &IzhikevichCoeffs,
    frac: u32,
) -> (IzhikevichState, StepOutput) {
    let (min, max) = fixed::signed_window(frac);

    let v = state.v as i64;
    let u = state.u as i64;
    let current = ((stimulus as i32) << frac) as i64;

    // v' = v + (0.04 v^2 + 5 v + 140 - u + I), step = 1
    let v_sq = (v * v) >> frac;
    let dv =
        ((coeffs.quad as i64 * v_sq) >> 8) + 5 * v + coeffs.linear_offset as i64 - u + current;
    let v_next = fixed::clamp(v + dv, min, max);

    // u' = u + a (b v' - u), using the updated membrane value
    let bv = (coeffs.b as i64 * v_next as i64) >> frac;
    let du = (coeffs.a as i64 * (bv - u)) >> frac;
    let u_next = fixed::clamp(u + du, min, max);

    let membrane_out = (v_next >> frac) as i8 as u8;

    if v_next >= coeffs.threshold {
        let next = IzhikevichState {
            v: coeffs.c,
            u: fixed::clamp(u_next as i64 + coeffs.d as i64, min, max),
        };
        let output = StepOutput {
            membrane_out,
            spiked: true,
            was_refractory: false,
        };
        (next, output)
    } else {
        let next = IzhikevichState {
            v: v_next,
            u: u_next,
        };
        let output = StepOutput {
            membrane_out,
            spiked: false,
            was_refractory: false,
        };
        (next, output)
    }
}

impl NeuronModel for Izhikevich {
    fn bus_layout(&self) -> BusLayout {
        BusLayout::Izhikevich
    }

    fn word_bits(&self) -> u8 {
        if self.frac == 8 {
            16
        } else {
            8
        }
    }

    fn default_raw(&self) -> [u8; NUM_PARAM_SLOTS] {
        self.defaults
    }

    fn reset(&mut self, active: &[u8; NUM_PARAM_SLOTS]) {
        let coeffs = IzhikevichCoeffs::from_raw(active, self.frac);
        self.state = Self::baseline(&coeffs, self.frac);
    }

    fn advance(&mut self, stimulus: u16, active: &[u8; NUM_PARAM_SLOTS]) -> StepOutput {
        let coeffs = IzhikevichCoeffs::from_raw(active, self.frac);
        let (next, output) = izhikevich_step(self.state, stimulus, &coeffs, self.frac);
        self.state = next;
        output
    }

    fn hold_view(&self) -> u8 {
        (self.state.v >> self.frac) as i8 as u8
    }

    fn membrane(&self) -> f32 {
        fixed::to_f32(self.state.v, self.frac)
    }

    fn recovery(&self) -> Option<f32> {
        Some(fixed::to_f32(self.state.u, self.frac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn dual_leak_params() -> DualLeakParams {
        DualLeakParams::default()
    }

    fn advance_dual_leak(
        state: DualLeakState,
        chan: u16,
        cycles: usize,
        params: &DualLeakParams,
    ) -> (DualLeakState, Vec<StepOutput>) {
        let mut state = state;
        let mut outputs = Vec::new();
        for _ in 0..cycles {
            let (next, output) = dual_leak_step(state, chan, params);
            state = next;
            outputs.push(output);
        }
        (state, outputs)
    }

    #[test]
    fn dual_leak_max_channel_rises_strictly_until_spike() {
        let params = dual_leak_params();
        let (_, outputs) = advance_dual_leak(DualLeakState::default(), 63, 10, &params);

        let spike_cycle = outputs.iter().position(|o| o.spiked);
        assert!(spike_cycle.is_some());

        let mut last = 0i32;
        for output in outputs.iter().take(spike_cycle.unwrap() + 1) {
            assert!((output.membrane_out as i32) > last || output.membrane_out == 255);
            last = output.membrane_out as i32;
        }
    }

    #[test]
    fn dual_leak_sub_threshold_equilibrium() {
        let params = dual_leak_params();
        let (state, outputs) = advance_dual_leak(DualLeakState::default(), 16, 400, &params);

        assert!(outputs.iter().all(|o| !o.spiked));

        // m* = stim / (2^-2 + 2^-4) = 16 / 0.3125 = 51.2 membrane units
        let membrane = fixed::to_f32(state.membrane, DUAL_LEAK_FRAC);
        assert!(membrane > 49.0 && membrane < 53.0);
        assert!(membrane < params.threshold as f32);

        // equilibrium is stable: one more cycle barely moves it
        let (next, _) = dual_leak_step(state, 16, &params);
        assert!((next.membrane - state.membrane).abs() < 1 << DUAL_LEAK_FRAC);
    }

    #[test]
    fn dual_leak_spike_resets_and_suppresses_one_cycle() {
        let params = dual_leak_params();
        let (_, outputs) = advance_dual_leak(DualLeakState::default(), 63, 10, &params);
        let spike_cycle = outputs.iter().position(|o| o.spiked).unwrap();

        // crossing value is visible on the spike cycle itself
        assert!(outputs[spike_cycle].membrane_out >= params.threshold);

        // the cycle after the spike is refractory and shows the baseline
        assert!(spike_cycle + 1 < outputs.len());
        assert!(outputs[spike_cycle + 1].was_refractory);
        assert_eq!(outputs[spike_cycle + 1].membrane_out, 0);
    }

    #[test]
    fn dual_leak_refractory_holds_state() {
        let refractory = DualLeakState {
            refractory: true,
            ..DualLeakState::default()
        };
        let (next, output) = dual_leak_step(refractory, 63, &dual_leak_params());

        assert!(output.was_refractory);
        assert!(!output.spiked);
        assert_eq!(next.membrane, 0);
        assert!(!next.refractory);
    }

    #[test]
    fn dual_leak_saturates_instead_of_wrapping() {
        let mut params = dual_leak_params();
        params.threshold = 255;
        params.leak_shift_fast = 11;
        params.leak_shift_slow = 12;
        params.stimulus_shift = 10;

        // stimulus of 63 << 10 per cycle overshoots the representable range
        let state = DualLeakState {
            membrane: DUAL_LEAK_MAX - 1,
            ..DualLeakState::default()
        };
        let (_, output) = dual_leak_step(state, 63, &params);
        assert!(output.spiked);
        assert_eq!(output.membrane_out, 255);
    }

    #[test]
    fn dual_leak_wire_loaded_shift_is_masked() {
        let params = DualLeakParams {
            threshold: 200,
            leak_shift_fast: 0xF2,
            leak_shift_slow: 0xF4,
            stimulus_shift: 0xF8,
        };

        // masked to 2/4/8, identical to the defaults
        let (masked, _) = dual_leak_step(DualLeakState::default(), 20, &params);
        let (reference, _) = dual_leak_step(DualLeakState::default(), 20, &dual_leak_params());
        assert_eq!(masked, reference);
    }

    fn izhikevich_coeffs(frac: u32) -> IzhikevichCoeffs {
        IzhikevichCoeffs::from_raw(&IzhikevichParams::default().to_raw(), frac)
    }

    #[test]
    fn izhikevich_coefficient_decode() {
        let coeffs = izhikevich_coeffs(8);
        assert_approx_eq!(f32, fixed::to_f32(coeffs.b, 8), 0.199, epsilon = 0.001);
        assert_approx_eq!(f32, fixed::to_f32(coeffs.c, 8), -65.0);
        assert_approx_eq!(f32, fixed::to_f32(coeffs.d, 8), 2.0);
        assert_eq!(coeffs.quad, 10);
        assert_eq!(coeffs.threshold, 30 << 8);
    }

    #[test]
    fn izhikevich_rests_without_stimulus() {
        let frac = 8;
        let coeffs = izhikevich_coeffs(frac);
        let mut state = Izhikevich::baseline(&coeffs, frac);

        for _ in 0..500 {
            let (next, output) = izhikevich_step(state, 0, &coeffs, frac);
            assert!(!output.spiked);
            state = next;
        }

        // settles near the resting fixed point around -70 mV
        let v = fixed::to_f32(state.v, frac);
        assert!(v < -60.0 && v > -80.0);
    }

    #[test]
    fn izhikevich_spikes_under_sustained_current() {
        let frac = 8;
        let coeffs = izhikevich_coeffs(frac);
        let mut state = Izhikevich::baseline(&coeffs, frac);

        let mut spiked = false;
        for _ in 0..200 {
            let (next, output) = izhikevich_step(state, 20, &coeffs, frac);
            if output.spiked {
                // crossing value is visible, stored state is already reset
                assert!(output.membrane_out as i8 >= 30);
                assert_eq!(next.v, coeffs.c);
                spiked = true;
                break;
            }
            state = next;
        }

        assert!(spiked);
    }

    #[test]
    fn izhikevich_spike_bumps_recovery_by_d() {
        let frac = 8;
        let coeffs = izhikevich_coeffs(frac);

        // just below threshold with strong drive, guaranteed to cross
        let state = IzhikevichState {
            v: fixed::from_int(29, frac),
            u: 0,
        };
        let (next, output) = izhikevich_step(state, 100, &coeffs, frac);

        assert!(output.spiked);

        let v_reset = fixed::to_f32(next.v, frac);
        assert_approx_eq!(f32, v_reset, -65.0);

        // u gained d = 2 on top of its own update
        let u_gain = fixed::to_f32(next.u, frac);
        assert!(u_gain > 1.5 && u_gain < 2.5);
    }

    #[test]
    fn izhikevich_membrane_view_is_twos_complement() {
        let frac = 8;
        let coeffs = izhikevich_coeffs(frac);
        let state = Izhikevich::baseline(&coeffs, frac);

        let (_, output) = izhikevich_step(state, 0, &coeffs, frac);
        assert!((output.membrane_out as i8) < -60);
        assert!((output.membrane_out as i8) > -80);
    }

    #[test]
    fn lite_variant_spikes_at_quarter_precision() {
        let frac = 4;
        let coeffs = izhikevich_coeffs(frac);
        let mut state = Izhikevich::baseline(&coeffs, frac);

        let mut spike_count = 0;
        for _ in 0..300 {
            let (next, output) = izhikevich_step(state, 30, &coeffs, frac);
            if output.spiked {
                spike_count += 1;
            }
            state = next;
        }

        assert!(spike_count > 0);
    }

    #[test]
    fn izhikevich_saturates_at_window_bounds() {
        let frac = 8;
        let coeffs = izhikevich_coeffs(frac);
        let (min, _) = fixed::signed_window(frac);

        // drive v to the bottom of the window; it must pin, not wrap
        let state = IzhikevichState { v: min, u: 0 };
        let (next, output) = izhikevich_step(state, 0, &coeffs, frac);
        assert!(!output.spiked);
        assert!(next.v >= min);
    }
}
