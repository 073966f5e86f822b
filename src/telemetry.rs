//! Telemetry frames sent to the display.
//!
//! The main loop fills a [`Telemetry`] snapshot from the live motor, sensor
//! and application values and hands it to [`send_telemetry`], typically from
//! a periodic timer. Frames are built fresh on every call; nothing carries
//! over between sends.
//!
//! ## Frame Layout
//!
//! | Index   | Field                                                        |
//! |---------|--------------------------------------------------------------|
//! | 0       | start marker `0x43`                                          |
//! | 1, 2    | battery voltage ADC: low 8 bits, then `(v >> 4) & 0x30`      |
//! | 3       | battery current ADC × 0.826                                  |
//! | 4, 5    | wheel speed ×10, little-endian                               |
//! | 6       | flags, bit 0 brake                                           |
//! | 7       | throttle ADC                                                 |
//! | 8       | motor temperature if temperature limiting is on, else throttle |
//! | 9       | torque sensor ADC                                            |
//! | 10      | torque sensor                                                |
//! | 11      | pedal cadence RPM                                            |
//! | 12      | pedal human power                                            |
//! | 13      | PWM duty cycle                                               |
//! | 14, 15  | motor speed ERPS, little-endian                              |
//! | 16      | FOC angle                                                    |
//! | 17      | system state                                                 |
//! | 18      | temperature limiting value                                   |
//! | 19..=21 | wheel speed sensor tick counter, 24 bits little-endian       |
//! | 22, 23  | pedal torque ×10, little-endian                              |
//! | 24, 25  | pedal power ×10, little-endian                               |
//! | 26, 27  | CRC-16 of bytes 0..=25, low byte first                       |

use crate::config::Configuration;
use crate::consts::{BATTERY_CURRENT_SCALE, TX_FRAME_LEN, TX_START_MARKER, tx};
use crate::crc::{crc16, hi8, lo8};
use embedded_io::Write;

/// A complete transmit frame.
pub type TxFrame = [u8; TX_FRAME_LEN];

/// Live values reported to the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Telemetry {
    /// Filtered battery voltage, 10-bit ADC.
    pub battery_voltage_adc_10b: u16,
    /// Filtered battery current, 10-bit ADC.
    pub battery_current_adc_10b: u16,
    /// Wheel speed ×10.
    pub wheel_speed_x10: u16,
    /// Brake lever engaged.
    pub brake: bool,
    /// Raw throttle ADC reading.
    pub throttle_adc: u8,
    /// Throttle with offset removed, mapped to 0-255.
    pub throttle: u8,
    /// Motor temperature.
    pub motor_temperature: u8,
    /// Raw torque sensor ADC reading.
    pub torque_sensor_adc: u8,
    /// Torque sensor with offset removed.
    pub torque_sensor: u8,
    /// Pedal cadence in RPM.
    pub pedal_cadence_rpm: u8,
    /// Pedal human power mapped to 0-255.
    pub pedal_human_power: u8,
    /// PWM duty cycle.
    pub duty_cycle: u8,
    /// Motor speed in electrical revolutions per second.
    pub motor_speed_erps: u16,
    /// Field oriented control angle.
    pub foc_angle: u8,
    /// System state / error code.
    pub system_state: u8,
    /// Current temperature limiting value.
    pub temperature_current_limiting_value: u8,
    /// Wheel speed sensor tick counter. Only the low 24 bits are sent.
    pub wheel_speed_sensor_tick_counter: u32,
    /// Pedal torque ×10.
    pub pedal_torque_x10: u16,
    /// Pedal power ×10.
    pub pedal_power_x10: u16,
}

/// Scales a 10-bit battery current reading for the display.
///
/// The fraction is dropped and values above 255 saturate.
pub fn scale_battery_current(current_adc_10b: u16) -> u8 {
    (current_adc_10b as f32 * BATTERY_CURRENT_SCALE) as u8
}

fn put_u16(frame: &mut TxFrame, at: usize, value: u16) {
    frame[at] = lo8(value);
    frame[at + 1] = hi8(value);
}

/// Builds a telemetry frame, CRC included.
///
/// `config` selects whether byte 8 carries the motor temperature or the
/// processed throttle value.
pub fn encode_telemetry(telemetry: &Telemetry, config: &Configuration) -> TxFrame {
    let mut frame: TxFrame = [0; TX_FRAME_LEN];
    frame[0] = TX_START_MARKER;

    let voltage = telemetry.battery_voltage_adc_10b;
    frame[tx::BATTERY_VOLTAGE_LO] = lo8(voltage);
    frame[tx::BATTERY_VOLTAGE_HI] = lo8(voltage >> 4) & tx::VOLTAGE_HI_MASK;

    frame[tx::BATTERY_CURRENT] = scale_battery_current(telemetry.battery_current_adc_10b);
    put_u16(&mut frame, tx::WHEEL_SPEED, telemetry.wheel_speed_x10);

    if telemetry.brake {
        frame[tx::FLAGS] |= tx::FLAG_BRAKE;
    }

    frame[tx::THROTTLE_ADC] = telemetry.throttle_adc;
    frame[tx::THROTTLE_OR_TEMPERATURE] = if config.temperature_limit_feature_enabled {
        telemetry.motor_temperature
    } else {
        telemetry.throttle
    };
    frame[tx::TORQUE_SENSOR_ADC] = telemetry.torque_sensor_adc;
    frame[tx::TORQUE_SENSOR] = telemetry.torque_sensor;
    frame[tx::PEDAL_CADENCE] = telemetry.pedal_cadence_rpm;
    frame[tx::PEDAL_HUMAN_POWER] = telemetry.pedal_human_power;
    frame[tx::DUTY_CYCLE] = telemetry.duty_cycle;
    put_u16(&mut frame, tx::MOTOR_SPEED_ERPS, telemetry.motor_speed_erps);
    frame[tx::FOC_ANGLE] = telemetry.foc_angle;
    frame[tx::SYSTEM_STATE] = telemetry.system_state;
    frame[tx::TEMPERATURE_LIMITING] = telemetry.temperature_current_limiting_value;

    let ticks = telemetry.wheel_speed_sensor_tick_counter.to_le_bytes();
    frame[tx::WHEEL_TICK_COUNTER..tx::WHEEL_TICK_COUNTER + 3].copy_from_slice(&ticks[..3]);

    put_u16(&mut frame, tx::PEDAL_TORQUE, telemetry.pedal_torque_x10);
    put_u16(&mut frame, tx::PEDAL_POWER, telemetry.pedal_power_x10);

    let crc = crc16(&frame[..tx::CRC_LO]);
    put_u16(&mut frame, tx::CRC_LO, crc);
    frame
}

/// Encodes `telemetry` and writes the frame one byte at a time.
///
/// # Errors
/// Only errors reported by `uart` itself.
pub fn send_telemetry<W: Write>(
    uart: &mut W,
    telemetry: &Telemetry,
    config: &Configuration,
) -> Result<(), W::Error> {
    let frame = encode_telemetry(telemetry, config);
    for byte in &frame {
        uart.write_all(core::slice::from_ref(byte))?;
    }
    trace!("sent telemetry frame, state {}", telemetry.system_state);
    Ok(())
}
