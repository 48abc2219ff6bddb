use tester_board::MAX_CHANNELS;

use super::multiplexer::multiplexer_bits;
use super::TesterError;

/// How slots map onto analog channels and multiplexer variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotLayout {
    pub channels: u8,
    pub variants: u8,
}

/// Identifies the slot a scan tick is working on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotId {
    pub index: usize,
    pub channel: u8,
    pub variant: u8,
}

impl SlotLayout {
    pub const fn new(channels: u8, variants: u8) -> Self {
        SlotLayout { channels, variants }
    }

    pub const fn slots(&self) -> usize {
        self.channels as usize * self.variants as usize
    }

    pub const fn multiplexer_bits(&self) -> u8 {
        multiplexer_bits(self.variants)
    }

    pub fn validate(&self, slots: usize) -> Result<(), TesterError> {
        if self.channels as usize > MAX_CHANNELS {
            return Err(TesterError::TooManyChannels);
        }
        if self.slots() == 0 || self.slots() != slots {
            return Err(TesterError::LayoutMismatch);
        }
        Ok(())
    }

    pub fn slot(&self, channel: u8, variant: u8) -> SlotId {
        SlotId {
            index: variant as usize + channel as usize * self.variants as usize,
            channel,
            variant,
        }
    }

    pub fn slot_by_index(&self, index: usize) -> Result<SlotId, TesterError> {
        if self.variants == 0 || index >= self.slots() {
            return Err(TesterError::InvalidSlot);
        }
        let channel = (index / self.variants as usize) as u8;
        let variant = (index % self.variants as usize) as u8;
        Ok(self.slot(channel, variant))
    }
}
