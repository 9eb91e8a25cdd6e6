//! Bind handshake
//!
//! The transmitter's low-power beacon cycles four frames: a marker frame
//! carrying the link address and protocol variant, then three checksummed
//! blocks of the hop table. This state machine consumes raw frames one at
//! a time and yields the completed record after the final block. A frame
//! that fails its stage's predicate changes nothing; only the bind
//! timeout (handled by the caller) ends an unfinished handshake.

use crate::config::NUMBER_OF_HOP_CHANNELS;
use crate::protocol::{
    parse_bind_marker, parse_hop_block, BindRecord, Frame, HOP_BLOCK_LEN, HOP_BLOCK_OFFSET,
};
use crate::types::{ModelAddress, Protocol};

/// Position within the handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BindStage {
    /// Waiting for the marker frame with address and protocol id
    AwaitAddress,
    /// Waiting for hop-table block 0, 1 or 2
    AwaitHopBlock(u8),
}

/// Outcome of feeding one frame to the handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindProgress {
    /// The frame did not match the current stage; nothing changed
    Ignored,
    /// The frame advanced the handshake by one stage
    Advanced,
    /// The final block arrived; the record is complete
    Complete(BindRecord),
}

/// 4-stage bind handshake state machine
#[derive(Clone, Copy, Debug)]
pub struct BindHandshake {
    stage: BindStage,
    checksum: u16,
    protocol: Protocol,
    address: ModelAddress,
    hop_channels: [u8; NUMBER_OF_HOP_CHANNELS],
}

impl BindHandshake {
    /// Create at the first stage
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: BindStage::AwaitAddress,
            checksum: 0,
            protocol: Protocol::ThreeChannel,
            address: ModelAddress::new([0; 5]),
            hop_channels: [0; NUMBER_OF_HOP_CHANNELS],
        }
    }

    /// Discard any partial progress and return to the first stage
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    /// Feed one received frame to the handshake
    pub fn accept(&mut self, payload: &Frame) -> BindProgress {
        match self.stage {
            BindStage::AwaitAddress => {
                let Some((protocol, address)) = parse_bind_marker(payload) else {
                    return BindProgress::Ignored;
                };
                self.protocol = protocol;
                self.address = address;
                self.checksum = address.checksum();
                self.stage = BindStage::AwaitHopBlock(0);
                BindProgress::Advanced
            }
            BindStage::AwaitHopBlock(seq) => {
                let Some(block) = parse_hop_block(payload, self.checksum, seq) else {
                    return BindProgress::Ignored;
                };

                let offset = HOP_BLOCK_OFFSET[seq as usize];
                self.hop_channels[offset..offset + HOP_BLOCK_LEN[seq as usize]]
                    .copy_from_slice(block);

                if usize::from(seq) + 1 < HOP_BLOCK_LEN.len() {
                    self.stage = BindStage::AwaitHopBlock(seq + 1);
                    return BindProgress::Advanced;
                }

                let record = BindRecord {
                    address: self.address,
                    hop_channels: self.hop_channels,
                    protocol: self.protocol,
                };
                self.restart();
                BindProgress::Complete(record)
            }
        }
    }
}

impl Default for BindHandshake {
    fn default() -> Self {
        Self::new()
    }
}
