//! Validation and decoding of configuration frames.
//!
//! Decoding is split in two layers:
//!
//! - [`parse_config_frame`] is pure. It checks the start marker and CRC,
//!   reads the four fields common to every message, and interprets bytes 5
//!   and 6 according to the message ID.
//! - [`InboundDecoder`] applies a parsed frame to the shared
//!   [`Configuration`] and pushes the side effects out to the lights, the
//!   motor, and persistent storage. It runs in the main loop, never in the
//!   receive interrupt.
//!
//! ## Frame Layout
//!
//! `[0x59, id, assist_x10, flags, max_power_div25, var_0, var_1, crc_lo, crc_hi]`
//!
//! | ID | `var_0`                       | `var_1`                              |
//! |----|-------------------------------|--------------------------------------|
//! | 0  | low-voltage cutoff ×10, low   | low-voltage cutoff ×10, high         |
//! | 1  | wheel perimeter, low          | wheel perimeter, high                |
//! | 2  | wheel max speed               | battery max current                  |
//! | 3  | motor type                    | bit 0 boost state, bit 1 boost limit |
//! | 4  | boost assist level            | boost time                           |
//! | 5  | boost fade time               | boost feature enabled                |
//! | 6  | motor temperature min         | motor temperature max                |
//! | 7  | ramp-up A/s ×10               | cruise target speed                  |
//! | 8  | temperature limit enabled     | assist without pedal rotation        |
//!
//! ## Failure Handling
//!
//! A bad CRC discards the frame without touching the configuration. An
//! unknown ID still applies the common fields. In both cases the receiver is
//! re-armed; the display resends on its own schedule.

use crate::config::{Configuration, LinkSettings};
use crate::consts::{
    MSG_ID_BATTERY_CUTOFF, MSG_ID_MOTOR_TEMPERATURE, MSG_ID_MOTOR_TYPE, MSG_ID_OPTIONS,
    MSG_ID_RAMP_UP, MSG_ID_STARTUP_BOOST, MSG_ID_STARTUP_BOOST_FADE, MSG_ID_WHEEL_AND_CURRENT,
    MSG_ID_WHEEL_PERIMETER, RX_START_MARKER, rx,
};
use crate::crc::crc16;
use crate::error::FrameError;
use crate::peripherals::{Lights, MotorLimits, Persistence};
use crate::receiver::{FrameReceiver, ReceiveChannel, RxFrame};

/// The message-specific part of a configuration frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigPayload {
    /// ID 0.
    BatteryLowVoltageCutOff {
        /// Volts ×10.
        cut_off_x10: u16,
    },
    /// ID 1.
    WheelPerimeter {
        /// Millimetres.
        perimeter: u16,
    },
    /// ID 2.
    WheelSpeedAndCurrent {
        /// km/h.
        wheel_max_speed: u8,
        /// Amps.
        battery_max_current: u8,
    },
    /// ID 3.
    MotorType {
        /// Motor type selector.
        motor_type: u8,
        /// Startup boost active.
        startup_boost_state: bool,
        /// Startup boost capped at max power.
        startup_boost_limit_to_max_power: bool,
    },
    /// ID 4.
    StartupBoost {
        /// Boost assist level.
        assist_level: u8,
        /// Boost duration.
        time: u8,
    },
    /// ID 5.
    StartupBoostFade {
        /// Boost fade time.
        fade_time: u8,
        /// Boost feature enabled. Only a byte value of 1 enables it.
        feature_enabled: bool,
    },
    /// ID 6.
    MotorTemperatureLimits {
        /// Temperature where limiting starts.
        min: u8,
        /// Temperature where assistance stops.
        max: u8,
    },
    /// ID 7. The rate is carried as received; clamping happens on apply.
    RampUp {
        /// Amps/second ×10.
        amps_per_second_x10: u8,
        /// Cruise target wheel speed, unscaled.
        target_wheel_speed: u8,
    },
    /// ID 8. Each flag is set only by a byte value of 1.
    Options {
        /// Motor temperature limiting enabled.
        temperature_limit_feature_enabled: bool,
        /// Assist at startup without pedal rotation.
        assistance_without_pedal_rotation: bool,
    },
    /// Any other ID. Only the common fields apply.
    Unknown {
        /// Byte 5, unused.
        var_0: u8,
        /// Byte 6, unused.
        var_1: u8,
    },
}

impl ConfigPayload {
    /// Interprets bytes 5 and 6 for a message ID.
    pub fn from_bytes(message_id: u8, var_0: u8, var_1: u8) -> Self {
        match message_id {
            MSG_ID_BATTERY_CUTOFF => Self::BatteryLowVoltageCutOff {
                cut_off_x10: u16::from_le_bytes([var_0, var_1]),
            },
            MSG_ID_WHEEL_PERIMETER => Self::WheelPerimeter {
                perimeter: u16::from_le_bytes([var_0, var_1]),
            },
            MSG_ID_WHEEL_AND_CURRENT => Self::WheelSpeedAndCurrent {
                wheel_max_speed: var_0,
                battery_max_current: var_1,
            },
            MSG_ID_MOTOR_TYPE => Self::MotorType {
                motor_type: var_0,
                startup_boost_state: var_1 & (1 << 0) != 0,
                startup_boost_limit_to_max_power: var_1 & (1 << 1) != 0,
            },
            MSG_ID_STARTUP_BOOST => Self::StartupBoost {
                assist_level: var_0,
                time: var_1,
            },
            MSG_ID_STARTUP_BOOST_FADE => Self::StartupBoostFade {
                fade_time: var_0,
                feature_enabled: var_1 == 1,
            },
            MSG_ID_MOTOR_TEMPERATURE => Self::MotorTemperatureLimits {
                min: var_0,
                max: var_1,
            },
            MSG_ID_RAMP_UP => Self::RampUp {
                amps_per_second_x10: var_0,
                target_wheel_speed: var_1,
            },
            MSG_ID_OPTIONS => Self::Options {
                temperature_limit_feature_enabled: var_0 == 1,
                assistance_without_pedal_rotation: var_1 == 1,
            },
            _ => Self::Unknown { var_0, var_1 },
        }
    }
}

/// A CRC-valid configuration frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ConfigFrame {
    /// Byte 1.
    pub message_id: u8,
    /// Assist level factor ×10.
    pub assist_level_factor_x10: u8,
    /// Lights requested on.
    pub lights: bool,
    /// Walk assist requested.
    pub walk_assist: bool,
    /// Battery max power target in units of 25 W.
    pub target_battery_max_power_div25: u8,
    /// Message-specific fields.
    pub payload: ConfigPayload,
}

/// Validates and parses a complete receive frame.
///
/// # Errors
/// - [`FrameError::BadStartMarker`] if byte 0 is not `0x59`
/// - [`FrameError::CrcMismatch`] if the trailer does not match the CRC of
///   bytes 0 through 6
pub fn parse_config_frame(frame: &RxFrame) -> Result<ConfigFrame, FrameError> {
    if frame[0] != RX_START_MARKER {
        return Err(FrameError::BadStartMarker(frame[0]));
    }

    let computed = crc16(&frame[..rx::CRC_LO]);
    let received = u16::from_le_bytes([frame[rx::CRC_LO], frame[rx::CRC_HI]]);
    if computed != received {
        return Err(FrameError::CrcMismatch { computed, received });
    }

    let message_id = frame[rx::MESSAGE_ID];
    let flags = frame[rx::FLAGS];
    Ok(ConfigFrame {
        message_id,
        assist_level_factor_x10: frame[rx::ASSIST_LEVEL],
        lights: flags & rx::FLAG_LIGHTS != 0,
        walk_assist: flags & rx::FLAG_WALK_ASSIST != 0,
        target_battery_max_power_div25: frame[rx::MAX_POWER],
        payload: ConfigPayload::from_bytes(message_id, frame[rx::VAR_0], frame[rx::VAR_1]),
    })
}

/// Applies received configuration and drives its side effects.
///
/// ## Type Parameters
///
/// - `L`: the lighting subsystem
/// - `P`: persistent configuration storage
/// - `M`: the motor control subsystem
#[derive(Debug)]
pub struct InboundDecoder<L, P, M>
where
    L: Lights,
    P: Persistence,
    M: MotorLimits,
{
    /// Lighting subsystem
    pub lights: L,
    /// Configuration storage
    pub persistence: P,
    /// Motor control subsystem
    pub motor: M,
    settings: LinkSettings,

    /// Frames accepted and applied.
    pub rx_good: u16,

    /// Frames discarded for a bad start marker or CRC.
    pub rx_bad: u16,
}

impl<L, P, M> InboundDecoder<L, P, M>
where
    L: Lights,
    P: Persistence,
    M: MotorLimits,
{
    /// Creates a decoder owning (or borrowing, via `&mut`) its subsystems.
    pub fn new(lights: L, persistence: P, motor: M, settings: LinkSettings) -> Self {
        Self {
            lights,
            persistence,
            motor,
            settings,
            rx_good: 0,
            rx_bad: 0,
        }
    }

    /// Settings used for derived motor parameters.
    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Validates `frame` and, if it is good, applies it to `config`.
    ///
    /// On success the side effects run in this order: lights, motor limits
    /// carried by the message, persistence. On failure nothing is touched.
    pub fn decode(
        &mut self,
        frame: &RxFrame,
        config: &mut Configuration,
    ) -> Result<ConfigFrame, FrameError> {
        let decoded = match parse_config_frame(frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.rx_bad = self.rx_bad.wrapping_add(1);
                warn!("dropping config frame: {}", e);
                return Err(e);
            }
        };

        config.apply(&decoded);
        self.lights.set_state(config.lights);

        match decoded.payload {
            ConfigPayload::BatteryLowVoltageCutOff { cut_off_x10 } => {
                let step = self.settings.battery_voltage_cut_off_step(cut_off_x10);
                self.motor.set_battery_voltage_cutoff_step(step);
            }
            ConfigPayload::WheelSpeedAndCurrent {
                battery_max_current,
                ..
            } => {
                self.motor.set_battery_max_current(battery_max_current);
            }
            _ => {}
        }

        self.persistence.notify_possible_change(config);
        self.rx_good = self.rx_good.wrapping_add(1);
        debug!("applied config message {}", decoded.message_id);
        Ok(decoded)
    }

    /// Decodes the receiver's pending frame, if there is one.
    ///
    /// Call this from the main loop. The receiver is always released
    /// afterwards, whether the frame was good or not, so the next frame can
    /// be assembled.
    ///
    /// # Returns
    /// - `Err(nb::Error::WouldBlock)`: no frame pending
    /// - `Ok(frame)`: a frame was applied
    /// - `Err(nb::Error::Other(e))`: a frame was discarded; purely informational
    pub fn poll<CH: ReceiveChannel>(
        &mut self,
        receiver: &mut FrameReceiver<CH>,
        config: &mut Configuration,
    ) -> nb::Result<ConfigFrame, FrameError> {
        let result = match receiver.frame() {
            Some(frame) => self.decode(frame, config),
            None => return Err(nb::Error::WouldBlock),
        };
        receiver.release();
        result.map_err(nb::Error::Other)
    }
}
