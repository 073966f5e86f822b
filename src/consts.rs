//! Constants used across the display link implementation.
//!
//! This module defines the wire-level layout of both frame directions:
//! start markers, fixed frame lengths, field offsets, and the message IDs
//! that select how the two variable bytes of a configuration frame are read.
//!
//! ## Key Concepts
//!
//! - **Frames**: one start marker, a fixed number of data bytes, and a
//!   CRC-16 trailer sent low byte first.
//! - **Receive frames** (display to controller) carry configuration.
//! - **Transmit frames** (controller to display) carry telemetry.
//! - **Message IDs**: byte 1 of a receive frame; IDs above
//!   [`MSG_ID_OPTIONS`] are accepted but carry no extra fields.
//!
//! These values should be used wherever framing or packing logic is
//! implemented so that both directions agree on message boundaries.

/// Start marker of a configuration frame sent by the display.
pub const RX_START_MARKER: u8 = 0x59;

/// Number of data bytes between the start marker and the CRC of a receive frame.
pub const RX_DATA_LEN: usize = 6;

/// Total length of a receive frame: start marker, data, and 2 CRC bytes.
pub const RX_FRAME_LEN: usize = RX_DATA_LEN + 3;

/// Start marker of a telemetry frame sent to the display.
pub const TX_START_MARKER: u8 = 0x43;

/// Number of data bytes between the start marker and the CRC of a transmit frame.
pub const TX_DATA_LEN: usize = 25;

/// Total length of a transmit frame: start marker, data, and 2 CRC bytes.
pub const TX_FRAME_LEN: usize = TX_DATA_LEN + 3;

/// Seed loaded into the CRC accumulator at the start of every frame.
pub const CRC_SEED: u16 = 0xffff;

/// Offsets into a receive frame.
pub mod rx {
    /// Message ID selecting the meaning of [`VAR_0`] and [`VAR_1`].
    pub const MESSAGE_ID: usize = 1;
    /// Assist level factor ×10.
    pub const ASSIST_LEVEL: usize = 2;
    /// Bit flags, see [`FLAG_LIGHTS`] and [`FLAG_WALK_ASSIST`].
    pub const FLAGS: usize = 3;
    /// Battery max power target in units of 25 W.
    pub const MAX_POWER: usize = 4;
    /// First message-specific byte.
    pub const VAR_0: usize = 5;
    /// Second message-specific byte.
    pub const VAR_1: usize = 6;
    /// Low byte of the CRC trailer.
    pub const CRC_LO: usize = 7;
    /// High byte of the CRC trailer.
    pub const CRC_HI: usize = 8;

    /// Lights on.
    pub const FLAG_LIGHTS: u8 = 1 << 0;
    /// Walk assist / cruise requested.
    pub const FLAG_WALK_ASSIST: u8 = 1 << 1;
}

/// Offsets into a transmit frame.
pub mod tx {
    /// Low 8 bits of the filtered 10-bit battery voltage ADC value.
    pub const BATTERY_VOLTAGE_LO: usize = 1;
    /// High 2 bits of the battery voltage, see [`VOLTAGE_HI_MASK`].
    pub const BATTERY_VOLTAGE_HI: usize = 2;
    /// Scaled battery current.
    pub const BATTERY_CURRENT: usize = 3;
    /// Wheel speed ×10, 16 bits.
    pub const WHEEL_SPEED: usize = 4;
    /// Status flags, see [`FLAG_BRAKE`].
    pub const FLAGS: usize = 6;
    /// Raw throttle ADC reading.
    pub const THROTTLE_ADC: usize = 7;
    /// Motor temperature when the temperature limit is enabled, else processed throttle.
    pub const THROTTLE_OR_TEMPERATURE: usize = 8;
    /// Raw torque sensor ADC reading.
    pub const TORQUE_SENSOR_ADC: usize = 9;
    /// Torque sensor value with the offset removed.
    pub const TORQUE_SENSOR: usize = 10;
    /// Pedal cadence in RPM.
    pub const PEDAL_CADENCE: usize = 11;
    /// Pedal human power mapped to 0-255.
    pub const PEDAL_HUMAN_POWER: usize = 12;
    /// PWM duty cycle.
    pub const DUTY_CYCLE: usize = 13;
    /// Motor speed in electrical revolutions per second, 16 bits.
    pub const MOTOR_SPEED_ERPS: usize = 14;
    /// Field oriented control angle.
    pub const FOC_ANGLE: usize = 16;
    /// System state / error code.
    pub const SYSTEM_STATE: usize = 17;
    /// Current temperature limiting value.
    pub const TEMPERATURE_LIMITING: usize = 18;
    /// Wheel speed sensor tick counter, 24 bits.
    pub const WHEEL_TICK_COUNTER: usize = 19;
    /// Pedal torque ×10, 16 bits.
    pub const PEDAL_TORQUE: usize = 22;
    /// Pedal power ×10, 16 bits.
    pub const PEDAL_POWER: usize = 24;
    /// Low byte of the CRC trailer; the high byte follows.
    pub const CRC_LO: usize = 26;

    /// Brake lever engaged.
    pub const FLAG_BRAKE: u8 = 1 << 0;

    /// Mask of the two high voltage bits after shifting right by 4.
    pub const VOLTAGE_HI_MASK: u8 = 0x30;
}

/// Battery low-voltage cutoff ×10, 16 bits.
pub const MSG_ID_BATTERY_CUTOFF: u8 = 0;
/// Wheel perimeter in millimetres, 16 bits.
pub const MSG_ID_WHEEL_PERIMETER: u8 = 1;
/// Wheel max speed and battery max current.
pub const MSG_ID_WHEEL_AND_CURRENT: u8 = 2;
/// Motor type and startup boost sub-flags.
pub const MSG_ID_MOTOR_TYPE: u8 = 3;
/// Startup boost assist level and duration.
pub const MSG_ID_STARTUP_BOOST: u8 = 4;
/// Startup boost fade time and feature enable.
pub const MSG_ID_STARTUP_BOOST_FADE: u8 = 5;
/// Motor temperature lower and upper limits.
pub const MSG_ID_MOTOR_TEMPERATURE: u8 = 6;
/// Ramp-up rate and cruise target speed.
pub const MSG_ID_RAMP_UP: u8 = 7;
/// Temperature limit feature and startup-without-pedaling flags.
pub const MSG_ID_OPTIONS: u8 = 8;

/// Smallest accepted ramp-up rate, amps/second ×10.
pub const RAMP_UP_MIN_X10: u8 = 4;
/// Largest accepted ramp-up rate, amps/second ×10.
pub const RAMP_UP_MAX_X10: u8 = 100;
/// Ramp-up rate used when the display sends one out of range (5 A/s).
pub const DEFAULT_RAMP_UP_X10: u8 = 50;

/// Numerator of the ramp-up inverse step.
///
/// 15625 PWM interrupts per second, 0.625 A per current ADC step, and the
/// rate being ×10 give `15625 * 0.625 * 10 ≈ 97656`. A rate of 5 A/s (50)
/// yields the default step of 1953.
pub const RAMP_UP_STEP_NUMERATOR: u32 = 97_656;

/// Inverse of the battery voltage per 8-bit ADC step, ×256 (`256 / 0.344`).
pub const DEFAULT_VOLTAGE_PER_ADC_STEP_INVERSE_X256: u32 = 744;

/// Battery current ADC steps to the display's current unit.
pub const BATTERY_CURRENT_SCALE: f32 = 0.826;
