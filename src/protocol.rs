//! Wire formats
//!
//! Bit-exact layouts of the three payload kinds the link carries: stick
//! data, failsafe configuration, and the four bind-handshake frames, plus
//! the persisted bind record. Parsing returns `Option`; a frame that does
//! not match its layout is simply not a frame of that kind.

use crate::config::{
    ADDRESS_WIDTH, BIND_RECORD_SIZE, DISCRIMINATOR_INDEX, FAILSAFE_ENABLED_MARKER,
    FAILSAFE_MARKER_INDEX, MAX_CHANNELS, NUMBER_OF_HOP_CHANNELS, PAYLOAD_SIZE,
    PROTOCOL_ID_3CH, PROTOCOL_ID_4CH, STICKDATA_ID_3CH, STICKDATA_ID_4CH,
};
use crate::types::{ChannelSet, ModelAddress, Protocol, PulseWidth};

/// One raw radio payload
pub type Frame = [u8; PAYLOAD_SIZE];

/// Byte positions of one channel's 16-bit value within a data payload
#[derive(Clone, Copy, Debug)]
struct ChannelBytes {
    hi: usize,
    lo: usize,
}

/// Where each channel lives in a data payload. Channel 3 is split across
/// a non-adjacent byte pair; bytes 7 and 8 in between carry the
/// discriminator and the failsafe marker.
const CHANNEL_BYTES: [ChannelBytes; MAX_CHANNELS] = [
    ChannelBytes { hi: 1, lo: 0 },
    ChannelBytes { hi: 3, lo: 2 },
    ChannelBytes { hi: 5, lo: 4 },
    ChannelBytes { hi: 9, lo: 6 },
];

/// Marker byte opening the first bind frame
const BIND_MARKER: u8 = 0xFF;

/// (protocol id, stick-data id) pairs accepted in a bind marker frame
const BIND_VARIANTS: [(u8, u8); 2] = [
    (PROTOCOL_ID_3CH, STICKDATA_ID_3CH),
    (PROTOCOL_ID_4CH, STICKDATA_ID_4CH),
];

/// Hop-table bytes carried by bind frames 1-3: two full blocks of 7 and a
/// final block of 6
pub const HOP_BLOCK_LEN: [usize; 3] = [7, 7, 6];

/// Hop-table offset each block writes to
pub const HOP_BLOCK_OFFSET: [usize; 3] = [0, 7, 14];

/// A classified data frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFrame {
    /// Current stick positions
    Stick(ChannelSet),
    /// Failsafe configuration: `Some` with the fallback values when the
    /// enable marker is set, `None` when the transmitter disabled it
    FailsafeConfig(Option<ChannelSet>),
}

/// Classify a payload against the bound protocol variant's discriminators.
/// Returns `None` for any frame matching neither.
#[must_use]
pub fn classify(payload: &Frame, protocol: Protocol) -> Option<DataFrame> {
    let discriminator = payload[DISCRIMINATOR_INDEX];

    if discriminator == protocol.stickdata_id() {
        Some(DataFrame::Stick(decode_channels(payload)))
    } else if discriminator == protocol.failsafe_id() {
        if payload[FAILSAFE_MARKER_INDEX] == FAILSAFE_ENABLED_MARKER {
            Some(DataFrame::FailsafeConfig(Some(decode_channels(payload))))
        } else {
            Some(DataFrame::FailsafeConfig(None))
        }
    } else {
        None
    }
}

/// Decode the four little-endian channel values from their fixed offsets
#[must_use]
pub fn decode_channels(payload: &Frame) -> ChannelSet {
    let mut set = ChannelSet::default();
    for (index, bytes) in CHANNEL_BYTES.iter().enumerate() {
        let value = (u16::from(payload[bytes.hi]) << 8) | u16::from(payload[bytes.lo]);
        set.set_channel(index, PulseWidth::from_ticks(value));
    }
    set
}

/// Encode a stick-data frame the way the transmitter does. The receiver
/// never sends; this is the reference encoding for the host tests and for
/// transmitter-side tooling.
#[must_use]
pub fn encode_stick_data(channels: &ChannelSet, protocol: Protocol) -> Frame {
    let mut payload = [0u8; PAYLOAD_SIZE];
    encode_channels(&mut payload, channels);
    payload[DISCRIMINATOR_INDEX] = protocol.stickdata_id();
    payload
}

/// Encode a failsafe-configuration frame; `None` encodes "failsafe
/// disabled" (the marker byte is left clear)
#[must_use]
pub fn encode_failsafe_config(channels: Option<&ChannelSet>, protocol: Protocol) -> Frame {
    let mut payload = [0u8; PAYLOAD_SIZE];
    payload[DISCRIMINATOR_INDEX] = protocol.failsafe_id();
    if let Some(channels) = channels {
        encode_channels(&mut payload, channels);
        payload[FAILSAFE_MARKER_INDEX] = FAILSAFE_ENABLED_MARKER;
    }
    payload
}

fn encode_channels(payload: &mut Frame, channels: &ChannelSet) {
    for (index, bytes) in CHANNEL_BYTES.iter().enumerate() {
        let value = channels.channel(index).as_ticks();
        payload[bytes.hi] = (value >> 8) as u8;
        payload[bytes.lo] = (value & 0xFF) as u8;
    }
}

/// Parse the bind marker frame (stage 0):
/// `[0xFF, P, M, a0, a1, a2, a3, a4, .., ..]`.
/// Returns the protocol variant and the link address.
#[must_use]
pub fn parse_bind_marker(payload: &Frame) -> Option<(Protocol, ModelAddress)> {
    if payload[0] != BIND_MARKER {
        return None;
    }

    let variant = BIND_VARIANTS
        .iter()
        .find(|&&(protocol_id, stick_id)| payload[1] == protocol_id && payload[2] == stick_id)?;

    let mut address = [0u8; ADDRESS_WIDTH];
    address.copy_from_slice(&payload[3..3 + ADDRESS_WIDTH]);
    Some((Protocol::from_id(variant.0), ModelAddress::new(address)))
}

/// Parse a hop-table frame (stages 1-3):
/// `[cksum_lo, cksum_hi, seq, d0..]`.
/// `expected_seq` selects the block (0, 1 or 2); the returned slice holds
/// that block's 7 or 6 hop channel bytes. A wrong checksum or sequence
/// byte yields `None`.
#[must_use]
pub fn parse_hop_block<'p>(
    payload: &'p Frame,
    checksum: u16,
    expected_seq: u8,
) -> Option<&'p [u8]> {
    if payload[0] != (checksum & 0xFF) as u8 || payload[1] != (checksum >> 8) as u8 {
        return None;
    }
    if payload[2] != expected_seq {
        return None;
    }

    let len = HOP_BLOCK_LEN[expected_seq as usize];
    Some(&payload[3..3 + len])
}

/// The persisted unit of a completed bind: link address, hop table and
/// protocol identifier, 26 bytes total. Written to non-volatile storage
/// only on a fully successful handshake and read back once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindRecord {
    /// Radio address of the transmitter-receiver pair
    pub address: ModelAddress,
    /// Frequency-hopping channel numbers, in hop order
    pub hop_channels: [u8; NUMBER_OF_HOP_CHANNELS],
    /// Protocol variant the pair agreed on
    pub protocol: Protocol,
}

impl BindRecord {
    /// Parse a raw storage blob. An all-zero blob (first power-up, no
    /// bind yet) parses to a zero address and the 3-channel variant; no
    /// over-the-air frame will validate against it, which is the expected
    /// unbound state rather than an error.
    #[must_use]
    pub fn parse(blob: &[u8; BIND_RECORD_SIZE]) -> Self {
        let mut address = [0u8; ADDRESS_WIDTH];
        address.copy_from_slice(&blob[..ADDRESS_WIDTH]);

        let mut hop_channels = [0u8; NUMBER_OF_HOP_CHANNELS];
        hop_channels.copy_from_slice(&blob[ADDRESS_WIDTH..ADDRESS_WIDTH + NUMBER_OF_HOP_CHANNELS]);

        Self {
            address: ModelAddress::new(address),
            hop_channels,
            protocol: Protocol::from_id(blob[BIND_RECORD_SIZE - 1]),
        }
    }

    /// Serialize to the raw storage layout
    #[must_use]
    pub fn as_bytes(&self) -> [u8; BIND_RECORD_SIZE] {
        let mut blob = [0u8; BIND_RECORD_SIZE];
        blob[..ADDRESS_WIDTH].copy_from_slice(self.address.as_bytes());
        blob[ADDRESS_WIDTH..ADDRESS_WIDTH + NUMBER_OF_HOP_CHANNELS]
            .copy_from_slice(&self.hop_channels);
        blob[BIND_RECORD_SIZE - 1] = self.protocol.id();
        blob
    }
}

impl Default for BindRecord {
    fn default() -> Self {
        Self::parse(&[0u8; BIND_RECORD_SIZE])
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BindRecord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BindRecord({}, {})", self.address, self.protocol);
    }
}
