use log::{debug, trace};

use crate::params::{ParamBank, NUM_PARAM_SLOTS};

/// Bit-serial parameter loader. While load mode is asserted, one bit per
/// cycle is shifted in MSB first. Every completed word is written into the
/// staging copy of the register bank; the staging copy only becomes active
/// when the sequence ends with at least one complete word. A sequence always
/// starts targeting slot 0 and advances cyclically, so a single long
/// sequence can reprogram the whole bank.
#[derive(Debug, Clone)]
pub struct SerialLoader {
    word_bits: u8,
    shift_reg: u16,
    bit_count: u8,
    target_slot: usize,
    words_committed: usize,
    active: bool,
}

impl SerialLoader {
    /// `word_bits` is 16 for the full-precision loader (two registers
    /// aggregated per word, high byte first) and 8 for the lite loader.
    pub fn new(word_bits: u8) -> Self {
        debug_assert!(word_bits == 8 || word_bits == 16);

        Self {
            word_bits,
            shift_reg: 0,
            bit_count: 0,
            target_slot: 0,
            words_committed: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bits_pending(&self) -> u8 {
        self.bit_count
    }

    pub fn shift_bit(&mut self, bit: bool, bank: &mut ParamBank) {
        self.active = true;
        self.shift_reg = (self.shift_reg << 1) | bit as u16;
        self.bit_count += 1;

        if self.bit_count < self.word_bits {
            return;
        }

        if self.word_bits == 16 {
            bank.write_staging(self.target_slot, (self.shift_reg >> 8) as u8);
            bank.write_staging(self.target_slot + 1, self.shift_reg as u8);
            trace!(
                "staged word {:#06x} into slots {} and {}",
                self.shift_reg,
                self.target_slot,
                (self.target_slot + 1) % NUM_PARAM_SLOTS
            );
            self.target_slot = (self.target_slot + 2) % NUM_PARAM_SLOTS;
        } else {
            bank.write_staging(self.target_slot, self.shift_reg as u8);
            trace!(
                "staged word {:#04x} into slot {}",
                self.shift_reg,
                self.target_slot
            );
            self.target_slot = (self.target_slot + 1) % NUM_PARAM_SLOTS;
        }

        self.words_committed += 1;
        self.shift_reg = 0;
        self.bit_count = 0;
    }

    /// Called on the first cycle with load mode deasserted again. Swaps the
    /// staging copy in if at least one full word was shifted; a sequence
    /// interrupted mid-word leaves the active registers untouched. Returns
    /// whether the params_ready pulse fires.
    pub fn finish(&mut self, bank: &mut ParamBank) -> bool {
        let ready = self.words_committed > 0;

        if ready {
            bank.commit_staging();
            debug!(
                "load sequence complete, {} word(s) committed",
                self.words_committed
            );
        } else {
            bank.discard_staging();
        }

        self.reset();
        ready
    }

    pub fn reset(&mut self) {
        self.shift_reg = 0;
        self.bit_count = 0;
        self.target_slot = 0;
        self.words_committed = 0;
        self.active = false;
    }
}
