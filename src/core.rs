use log::debug;
use simple_error::{try_with, SimpleError};

use crate::decoder::{self, DecodedInput};
use crate::encoder::{self, Phase};
use crate::loader::SerialLoader;
use crate::neuron::{self, NeuronModel};
use crate::params::{self, CoreParams, ParamBank};
use crate::state_snapshot::StateSnapshot;

pub use crate::decoder::RawInput;
pub use crate::encoder::RawOutput;

pub fn create_core(core_params: CoreParams) -> Result<Core, SimpleError> {
    try_with!(
        params::validate_core_params(&core_params),
        "invalid core parameters"
    );

    let model = neuron::create(&core_params.model);
    let bank = ParamBank::new(model.default_raw());
    let loader = SerialLoader::new(model.word_bits());

    Ok(Core {
        model,
        bank,
        loader,
        t: 0,
    })
}

/// One neuron core instance: a single synchronous clock domain. Each call to
/// `tick` consumes one raw input vector and produces one raw output vector.
/// The complete next state is derived from the current state before anything
/// is committed, matching the register semantics of the silicon. Instances
/// are independent values with no shared state.
pub struct Core {
    model: Box<dyn NeuronModel + Send>,
    bank: ParamBank,
    loader: SerialLoader,
    t: usize,
}

impl Core {
    pub fn tick(&mut self, input: &RawInput) -> RawOutput {
        if !input.reset_n {
            // synchronous reset: partial loads are discarded, both parameter
            // copies return to the typed defaults
            self.loader.reset();
            self.bank.reset();
            self.model.reset(self.bank.active());
            self.t = 0;
            debug!("core reset to baseline");
            return encoder::encode(self.model.hold_view(), false, false, Phase::Hold);
        }

        self.t += 1;

        if !input.enable {
            return encoder::encode(self.model.hold_view(), false, false, Phase::Hold);
        }

        match decoder::decode(self.model.bus_layout(), input) {
            DecodedInput::LoadBit(bit) => {
                self.loader.shift_bit(bit, &mut self.bank);
                encoder::encode(self.model.hold_view(), false, false, Phase::Loading)
            }
            DecodedInput::Stimulus(value) => {
                let ready = if self.loader.is_active() {
                    self.loader.finish(&mut self.bank)
                } else {
                    false
                };

                // register-read: take this cycle's parameter copy up front
                let active = *self.bank.active();
                let step = self.model.advance(value, &active);

                let phase = if ready {
                    Phase::Ready
                } else if step.was_refractory {
                    Phase::Refractory
                } else {
                    Phase::Integrating
                };

                encoder::encode(step.membrane_out, step.spiked, ready, phase)
            }
        }
    }

    pub fn tick_idle(&mut self) -> RawOutput {
        self.tick(&RawInput::idle())
    }

    pub fn state_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            t: self.t,
            membrane: self.model.membrane(),
            recovery: self.model.recovery(),
            active_params: self.bank.active().to_vec(),
            loader_bits_pending: self.loader.bits_pending(),
        }
    }
}
