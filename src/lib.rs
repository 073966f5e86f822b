//! # ebike-uart-link
//!
//! A portable, no_std Rust implementation of the serial link between an
//! e-bike motor controller and its display/control unit.
//!
//! The link exchanges fixed-size frames protected by CRC-16:
//! - the display sends 9-byte **configuration frames** (assist level, lights,
//!   walk assist, battery and motor limits), received one byte at a time from
//!   the UART interrupt
//! - the controller answers with 28-byte **telemetry frames** (speeds,
//!   currents, temperatures, sensor readings)
//!
//! ## Crate features
//! | Feature             | Description |
//! |---------------------|-------------|
//! | `std`               | Disables `#![no_std]` support |
//! | `rx-isr` (default)  | Global receiver helpers built on `critical_section` |
//! | `defmt-0-3`         | Uses `defmt` logging |
//! | `log`               | Uses `log` logging |
//!
//! ## Execution Contexts
//!
//! - **UART receive interrupt**: [`FrameReceiver::on_byte`](receiver::FrameReceiver::on_byte)
//!   assembles frames. When one is complete it disables the receive channel
//!   and raises a ready flag.
//! - **Main loop**: [`InboundDecoder::poll`](decoder::InboundDecoder::poll)
//!   checks the CRC, applies the frame to the [`Configuration`](config::Configuration),
//!   notifies lights, motor and storage, then re-enables the channel.
//!   [`send_telemetry`](telemetry::send_telemetry) is called periodically
//!   with a fresh [`Telemetry`](telemetry::Telemetry) snapshot.
//!
//! The disable-on-ready / enable-on-consumed pair is the only flow control:
//! the receive buffer is never written while the main loop reads it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ebike_uart_link::{config::*, decoder::InboundDecoder, telemetry::*};
//!
//! init_link_receiver!(Uart2Rx);
//!
//! #[interrupt]
//! fn UART2_RX() {
//!     uart_byte_received!(uart2_read_data());
//! }
//!
//! fn main() -> ! {
//!     setup_link_receiver!(uart2_rx);
//!     let mut config = Configuration::default();
//!     let mut decoder = InboundDecoder::new(lights, eeprom, motor, LinkSettings::default());
//!     loop {
//!         let _ = ebike_uart_link::isr::global_poll_frame(&LINK_RECEIVER, &mut decoder, &mut config);
//!         if telemetry_timer.expired() {
//!             let _ = send_telemetry(&mut uart2_tx, &snapshot(), &config);
//!         }
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Nothing in this crate is fatal. Desynchronized bytes are dropped until the
//! next start marker, frames with a bad CRC are discarded, unknown message
//! IDs apply only the common fields, and an out-of-range ramp-up rate is
//! replaced with the default.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "rx-isr")]
pub use critical_section;

#[macro_use]
mod fmt;

pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod decoder;
pub mod error;
#[cfg(feature = "rx-isr")]
pub mod isr;
#[cfg(feature = "rx-isr")]
mod macros;
pub mod peripherals;
pub mod receiver;
pub mod telemetry;

pub use error::FrameError;
