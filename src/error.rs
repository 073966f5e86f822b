//! Error taxonomy for received frames.
//!
//! None of these are fatal. The decoder discards the offending frame,
//! re-arms the receiver, and waits for the display's next periodic frame.
//! They are returned only so callers can keep statistics.

use thiserror::Error;

/// Reasons a completed receive frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameError {
    /// Byte 0 is not the configuration start marker.
    #[error("invalid start marker: {0:#04x}")]
    BadStartMarker(u8),
    /// The CRC trailer does not match the CRC of the frame contents.
    #[error("CRC mismatch: computed {computed:#06x}, received {received:#06x}")]
    CrcMismatch {
        /// CRC computed over the start marker and data bytes.
        computed: u16,
        /// CRC carried in the frame trailer.
        received: u16,
    },
}
