//! Global receiver shared between the UART interrupt and the main loop.
//!
//! The receiver lives in a `critical_section::Mutex` so both contexts can
//! reach it. The interrupt only ever calls
//! [`FrameReceiver::on_byte`]; the main loop copies the pending frame out,
//! decodes it with interrupts enabled, and releases the receiver in a
//! second short critical section. While the frame is pending the receive
//! channel is disabled, so the copy is always stable.

use crate::config::Configuration;
use crate::decoder::{ConfigFrame, InboundDecoder};
use crate::error::FrameError;
use crate::peripherals::{Lights, MotorLimits, Persistence};
use crate::receiver::{FrameReceiver, ReceiveChannel};
use core::cell::RefCell;
use critical_section::Mutex;

/// Type of the global receiver slot.
pub type GlobalReceiver<CH> = Mutex<RefCell<Option<FrameReceiver<CH>>>>;

/// Used to initialize the global static receiver for use with
/// `critical_section`.
///
/// # Example
/// ```rust,ignore
/// use ebike_uart_link::isr::{GlobalReceiver, global_link_receiver_init};
///
/// static LINK_RECEIVER: GlobalReceiver<Uart2Rx> = global_link_receiver_init();
/// ```
pub const fn global_link_receiver_init<CH: ReceiveChannel>() -> GlobalReceiver<CH> {
    Mutex::new(RefCell::new(None))
}

/// Installs a fresh receiver, enabling the channel.
///
/// Call once from `main()` before unmasking the UART interrupt.
pub fn global_link_receiver_setup<CH: ReceiveChannel>(
    global_receiver: &'static GlobalReceiver<CH>,
    channel: CH,
) {
    critical_section::with(|cs| {
        let _ = global_receiver
            .borrow(cs)
            .replace(Some(FrameReceiver::new(channel)));
    });
}

/// Feeds a received byte to the global receiver.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn UART2_RX() {
///     let byte = uart2_read_data();
///     global_byte_received(&LINK_RECEIVER, byte);
/// }
/// ```
pub fn global_byte_received<CH: ReceiveChannel>(
    global_receiver: &'static GlobalReceiver<CH>,
    byte: u8,
) {
    critical_section::with(|cs| {
        if let Some(receiver) = global_receiver.borrow(cs).borrow_mut().as_mut() {
            receiver.on_byte(byte);
        }
    });
}

/// Decodes the pending frame of the global receiver, if any.
///
/// Same contract as [`InboundDecoder::poll`], but the decoding itself runs
/// outside the critical section.
pub fn global_poll_frame<CH, L, P, M>(
    global_receiver: &'static GlobalReceiver<CH>,
    decoder: &mut InboundDecoder<L, P, M>,
    config: &mut Configuration,
) -> nb::Result<ConfigFrame, FrameError>
where
    CH: ReceiveChannel,
    L: Lights,
    P: Persistence,
    M: MotorLimits,
{
    let pending = critical_section::with(|cs| {
        global_receiver
            .borrow(cs)
            .borrow()
            .as_ref()
            .and_then(|receiver| receiver.frame().copied())
    });
    let Some(frame) = pending else {
        return Err(nb::Error::WouldBlock);
    };

    let result = decoder.decode(&frame, config);

    critical_section::with(|cs| {
        if let Some(receiver) = global_receiver.borrow(cs).borrow_mut().as_mut() {
            receiver.release();
        }
    });
    result.map_err(nb::Error::Other)
}
