//! Byte-at-a-time frame assembly for the receive direction.
//!
//! [`FrameReceiver::on_byte`] is meant to be called from the UART
//! receive interrupt. It only stores the byte and flips state: no CRC, no
//! decoding, no logging. Once a full frame is assembled it raises the ready
//! flag and disables the receive channel, so the frame stays untouched until
//! the main loop calls [`FrameReceiver::release`].
//!
//! ## States
//!
//! | State        | Byte                 | Action                                   |
//! |--------------|----------------------|------------------------------------------|
//! | `Idle`       | start marker `0x59`  | store it, go to `Collecting`             |
//! | `Idle`       | anything else        | drop it, stay `Idle`                     |
//! | `Collecting` | anything             | store it; on the 9th byte go `Idle`, signal ready, disable channel |
//!
//! A start marker inside `Collecting` is ordinary data.
//!
//! ## Known limitation
//!
//! There is no inter-byte timeout. If the display stops mid-frame, the
//! receiver stays in `Collecting` and the first bytes of the next frame are
//! used to complete the stale one. That frame fails its CRC and reception
//! resynchronizes afterwards.

use crate::consts::{RX_FRAME_LEN, RX_START_MARKER};
use heapless::Vec;

/// A complete receive frame: start marker, 6 data bytes, CRC low, CRC high.
pub type RxFrame = [u8; RX_FRAME_LEN];

/// The receive half of the UART.
pub trait ReceiveChannel {
    /// Allows byte-received events to be delivered.
    fn enable(&mut self);
    /// Stops byte-received events from being delivered.
    fn disable(&mut self);
}

impl<T: ReceiveChannel + ?Sized> ReceiveChannel for &mut T {
    fn enable(&mut self) {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable()
    }
}

/// Framing state of a [`FrameReceiver`].
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxState {
    /// Waiting for a start marker.
    #[default]
    Idle,
    /// Storing data and CRC bytes.
    Collecting,
}

/// Assembles receive frames from single bytes.
///
/// The buffer is the single hand-off slot between the interrupt and the
/// main loop. It is written only while no frame is pending and read only
/// while one is.
#[derive(Debug)]
pub struct FrameReceiver<CH: ReceiveChannel> {
    /// Receive channel, disabled while a frame is pending
    pub channel: CH,
    state: RxState,
    buf: Vec<u8, RX_FRAME_LEN>,
    ready: bool,

    /// Number of frames assembled since construction.
    pub frames: u16,

    /// Bytes delivered while a frame was pending.
    ///
    /// Stays zero as long as the channel honours [`ReceiveChannel::disable`].
    pub overruns: u16,
}

impl<CH: ReceiveChannel> FrameReceiver<CH> {
    /// Creates a receiver in [`RxState::Idle`] and enables the channel.
    pub fn new(channel: CH) -> Self {
        let mut cls = Self {
            channel,
            state: RxState::Idle,
            buf: Vec::new(),
            ready: false,
            frames: 0,
            overruns: 0,
        };
        cls.channel.enable();
        cls
    }

    /// Current framing state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Whether a complete frame is waiting to be consumed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Feeds one received byte into the state machine.
    ///
    /// Bounded and allocation-free; safe to call from an interrupt handler.
    pub fn on_byte(&mut self, byte: u8) {
        if self.ready {
            self.overruns = self.overruns.wrapping_add(1);
            return;
        }

        match self.state {
            RxState::Idle => {
                self.buf.clear();
                if byte == RX_START_MARKER {
                    let _ = self.buf.push(byte);
                    self.state = RxState::Collecting;
                }
            }
            RxState::Collecting => {
                let _ = self.buf.push(byte);
                if self.buf.is_full() {
                    self.state = RxState::Idle;
                    self.ready = true;
                    self.frames = self.frames.wrapping_add(1);
                    self.channel.disable();
                }
            }
        }
    }

    /// Returns the pending frame, if any.
    ///
    /// The frame is not consumed; call [`release()`](FrameReceiver::release)
    /// once done with it.
    pub fn frame(&self) -> Option<&RxFrame> {
        if !self.ready {
            return None;
        }
        self.buf.as_slice().try_into().ok()
    }

    /// Marks the pending frame as consumed and re-enables the channel.
    ///
    /// Does nothing when no frame is pending.
    pub fn release(&mut self) {
        if self.ready {
            self.ready = false;
            self.channel.enable();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct TestChannel {
        pub enabled: bool,
        pub enables: usize,
        pub disables: usize,
    }

    impl ReceiveChannel for TestChannel {
        fn enable(&mut self) {
            self.enabled = true;
            self.enables += 1;
        }

        fn disable(&mut self) {
            self.enabled = false;
            self.disables += 1;
        }
    }

    fn feed(rx: &mut FrameReceiver<TestChannel>, bytes: &[u8]) {
        for &b in bytes {
            rx.on_byte(b);
        }
    }

    #[test]
    fn test_receiver_initialization() {
        let rx = FrameReceiver::new(TestChannel::default());
        assert_eq!(rx.state(), RxState::Idle);
        assert!(!rx.is_ready());
        assert!(rx.channel.enabled);
        assert!(rx.frame().is_none());
    }

    #[test]
    fn test_noise_before_start_marker_is_dropped() {
        let mut rx = FrameReceiver::new(TestChannel::default());
        feed(&mut rx, &[0x00, 0x12, 0xff]);
        assert_eq!(rx.state(), RxState::Idle);

        feed(&mut rx, &[0x59, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rx.frame(), Some(&[0x59, 1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_full_frame_signals_ready_and_disables_channel() {
        let mut rx = FrameReceiver::new(TestChannel::default());
        feed(&mut rx, &[0x59, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(rx.state(), RxState::Collecting);
        assert!(!rx.is_ready());
        assert!(rx.channel.enabled);

        rx.on_byte(8);
        assert_eq!(rx.state(), RxState::Idle);
        assert!(rx.is_ready());
        assert!(!rx.channel.enabled);
        assert_eq!(rx.channel.disables, 1);
        assert_eq!(rx.frames, 1);
    }

    #[test]
    fn test_stray_start_marker_is_data() {
        let mut rx = FrameReceiver::new(TestChannel::default());
        feed(&mut rx, &[0x59, 0x59, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(rx.frame(), Some(&[0x59, 0x59, 1, 2, 3, 4, 5, 6, 7]));
    }

    #[test]
    fn test_pending_frame_is_not_overwritten() {
        let mut rx = FrameReceiver::new(TestChannel::default());
        feed(&mut rx, &[0x59, 1, 2, 3, 4, 5, 6, 7, 8]);
        feed(&mut rx, &[0x59, 9, 9]);
        assert_eq!(rx.overruns, 3);
        assert_eq!(rx.frame(), Some(&[0x59, 1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_release_rearms() {
        let mut rx = FrameReceiver::new(TestChannel::default());
        feed(&mut rx, &[0x59, 1, 2, 3, 4, 5, 6, 7, 8]);
        rx.release();
        assert!(!rx.is_ready());
        assert!(rx.channel.enabled);
        assert_eq!(rx.channel.enables, 2);

        // A second release without a pending frame is a no-op.
        rx.release();
        assert_eq!(rx.channel.enables, 2);

        feed(&mut rx, &[0x59, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(rx.frame(), Some(&[0x59, 8, 7, 6, 5, 4, 3, 2, 1]));
        assert_eq!(rx.frames, 2);
    }

    #[test]
    fn test_matches_reference_window_model() {
        // Pseudo-random stream with a high density of start markers.
        let mut seed: u32 = 0x1234_5678;
        let mut rx = FrameReceiver::new(TestChannel::default());

        let mut collecting = false;
        let mut window = [0u8; RX_FRAME_LEN];
        let mut len = 0;
        let mut expected_frames = 0u16;

        for _ in 0..5_000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let byte = if (seed >> 16) % 4 == 0 {
                RX_START_MARKER
            } else {
                (seed >> 8) as u8
            };

            if !collecting {
                len = 0;
                if byte == RX_START_MARKER {
                    window[0] = byte;
                    len = 1;
                    collecting = true;
                }
            } else {
                window[len] = byte;
                len += 1;
            }
            let completes = collecting && len == RX_FRAME_LEN;

            rx.on_byte(byte);
            assert_eq!(rx.is_ready(), completes);

            if completes {
                collecting = false;
                expected_frames += 1;
                assert_eq!(rx.frame(), Some(&window));
                rx.release();
            }
        }

        assert_eq!(rx.frames, expected_frames);
        assert!(expected_frames > 255);
        assert_eq!(rx.channel.enables, usize::from(expected_frames) + 1);
        assert_eq!(rx.channel.disables, usize::from(expected_frames));
        assert_eq!(rx.overruns, 0);
    }
}
