//! Shared configuration state and link settings.
//!
//! [`Configuration`] is the process-wide set of values the display can
//! change. It has a single writer, the [`InboundDecoder`](crate::decoder::InboundDecoder),
//! and any number of readers (motor control, lights, the telemetry encoder),
//! all running in the cooperative main-loop context. Because a decoded frame
//! is applied through one `&mut` borrow, readers never observe a message
//! group half-updated.
//!
//! [`LinkSettings`] holds the hardware-derived constants the decoder needs
//! to turn received values into motor parameters.

use crate::consts::{
    DEFAULT_RAMP_UP_X10, DEFAULT_VOLTAGE_PER_ADC_STEP_INVERSE_X256, RAMP_UP_MAX_X10,
    RAMP_UP_MIN_X10, RAMP_UP_STEP_NUMERATOR,
};
use crate::decoder::{ConfigFrame, ConfigPayload};

/// Configuration values received from the display.
///
/// Field names follow the units carried on the wire: `_x10` values are
/// scaled by ten, `_div25` values are in units of 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Configuration {
    /// Assist level factor ×10.
    pub assist_level_factor_x10: u8,
    /// Lights requested on.
    pub lights: bool,
    /// Walk assist / cruise requested.
    pub walk_assist: bool,
    /// Battery max power target in units of 25 W.
    pub target_battery_max_power_div25: u8,

    /// Battery low-voltage cutoff in volts ×10.
    pub battery_low_voltage_cut_off_x10: u16,
    /// Wheel perimeter in millimetres.
    pub wheel_perimeter: u16,
    /// Wheel max speed in km/h.
    pub wheel_max_speed: u8,
    /// Battery max current in amps.
    pub battery_max_current: u8,
    /// Motor type selector (36 V, 48 V, experimental).
    pub motor_type: u8,
    /// Startup power boost active.
    pub startup_boost_state: bool,
    /// Startup power boost capped at the battery max power target.
    pub startup_boost_limit_to_max_power: bool,
    /// Startup power boost assist level.
    pub startup_boost_assist_level: u8,
    /// Startup power boost duration.
    pub startup_boost_time: u8,
    /// Startup power boost fade time.
    pub startup_boost_fade_time: u8,
    /// Startup power boost feature enabled.
    pub startup_boost_feature_enabled: bool,
    /// Motor temperature at which limiting starts.
    pub motor_temperature_min_value_to_limit: u8,
    /// Motor temperature at which assistance is fully cut.
    pub motor_temperature_max_value_to_limit: u8,
    /// Ramp-up rate in amps/second ×10, always within the accepted range.
    pub ramp_up_amps_per_second_x10: u8,
    /// PWM cycles per current step while ramping up, derived from the ramp-up rate.
    pub ramp_up_inverse_step: u16,
    /// Cruise target wheel speed ×10.
    pub target_wheel_speed_x10: u16,
    /// Motor temperature limiting enabled; also selects what telemetry byte 8 carries.
    pub temperature_limit_feature_enabled: bool,
    /// Motor may assist at startup before the pedals turn.
    pub motor_assistance_startup_without_pedal_rotation: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            assist_level_factor_x10: 0,
            lights: false,
            walk_assist: false,
            target_battery_max_power_div25: 0,
            battery_low_voltage_cut_off_x10: 0,
            wheel_perimeter: 0,
            wheel_max_speed: 0,
            battery_max_current: 0,
            motor_type: 0,
            startup_boost_state: false,
            startup_boost_limit_to_max_power: false,
            startup_boost_assist_level: 0,
            startup_boost_time: 0,
            startup_boost_fade_time: 0,
            startup_boost_feature_enabled: false,
            motor_temperature_min_value_to_limit: 0,
            motor_temperature_max_value_to_limit: 0,
            ramp_up_amps_per_second_x10: DEFAULT_RAMP_UP_X10,
            ramp_up_inverse_step: ramp_up_inverse_step(DEFAULT_RAMP_UP_X10),
            target_wheel_speed_x10: 0,
            temperature_limit_feature_enabled: false,
            motor_assistance_startup_without_pedal_rotation: false,
        }
    }
}

impl Configuration {
    /// Applies a validated frame.
    ///
    /// The four common fields are written for every message ID; only the
    /// group selected by the payload variant is written besides them.
    /// [`ConfigPayload::Unknown`] leaves every other field untouched.
    pub fn apply(&mut self, frame: &ConfigFrame) {
        self.assist_level_factor_x10 = frame.assist_level_factor_x10;
        self.lights = frame.lights;
        self.walk_assist = frame.walk_assist;
        self.target_battery_max_power_div25 = frame.target_battery_max_power_div25;

        match frame.payload {
            ConfigPayload::BatteryLowVoltageCutOff { cut_off_x10 } => {
                self.battery_low_voltage_cut_off_x10 = cut_off_x10;
            }
            ConfigPayload::WheelPerimeter { perimeter } => {
                self.wheel_perimeter = perimeter;
            }
            ConfigPayload::WheelSpeedAndCurrent {
                wheel_max_speed,
                battery_max_current,
            } => {
                self.wheel_max_speed = wheel_max_speed;
                self.battery_max_current = battery_max_current;
            }
            ConfigPayload::MotorType {
                motor_type,
                startup_boost_state,
                startup_boost_limit_to_max_power,
            } => {
                self.motor_type = motor_type;
                self.startup_boost_state = startup_boost_state;
                self.startup_boost_limit_to_max_power = startup_boost_limit_to_max_power;
            }
            ConfigPayload::StartupBoost { assist_level, time } => {
                self.startup_boost_assist_level = assist_level;
                self.startup_boost_time = time;
            }
            ConfigPayload::StartupBoostFade {
                fade_time,
                feature_enabled,
            } => {
                self.startup_boost_fade_time = fade_time;
                self.startup_boost_feature_enabled = feature_enabled;
            }
            ConfigPayload::MotorTemperatureLimits { min, max } => {
                self.motor_temperature_min_value_to_limit = min;
                self.motor_temperature_max_value_to_limit = max;
            }
            ConfigPayload::RampUp {
                amps_per_second_x10,
                target_wheel_speed,
            } => {
                let rate = clamp_ramp_up(amps_per_second_x10);
                self.ramp_up_amps_per_second_x10 = rate;
                self.ramp_up_inverse_step = ramp_up_inverse_step(rate);
                self.target_wheel_speed_x10 = target_wheel_speed as u16 * 10;
            }
            ConfigPayload::Options {
                temperature_limit_feature_enabled,
                assistance_without_pedal_rotation,
            } => {
                self.temperature_limit_feature_enabled = temperature_limit_feature_enabled;
                self.motor_assistance_startup_without_pedal_rotation =
                    assistance_without_pedal_rotation;
            }
            ConfigPayload::Unknown { .. } => {}
        }
    }
}

/// Replaces an out-of-range ramp-up rate with [`DEFAULT_RAMP_UP_X10`].
pub fn clamp_ramp_up(amps_per_second_x10: u8) -> u8 {
    if (RAMP_UP_MIN_X10..=RAMP_UP_MAX_X10).contains(&amps_per_second_x10) {
        amps_per_second_x10
    } else {
        DEFAULT_RAMP_UP_X10
    }
}

/// PWM cycles between current steps for a given ramp-up rate.
///
/// `rate` must already be clamped; zero is never passed in.
pub const fn ramp_up_inverse_step(rate: u8) -> u16 {
    (RAMP_UP_STEP_NUMERATOR / rate as u32) as u16
}

/// Hardware-derived constants used while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LinkSettings {
    /// Inverse of the battery voltage per 8-bit ADC step, ×256.
    pub voltage_per_adc_step_inverse_x256: u32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            voltage_per_adc_step_inverse_x256: DEFAULT_VOLTAGE_PER_ADC_STEP_INVERSE_X256,
        }
    }
}

impl LinkSettings {
    /// Creates settings for a controller with the given voltage ADC scaling.
    pub fn new(voltage_per_adc_step_inverse_x256: u32) -> Self {
        Self {
            voltage_per_adc_step_inverse_x256,
        }
    }

    /// Converts a low-voltage cutoff in volts ×10 into 8-bit ADC steps.
    ///
    /// Saturates at `u8::MAX`. A zero scaling factor yields `0`.
    pub fn battery_voltage_cut_off_step(&self, cut_off_x10: u16) -> u8 {
        let steps = ((cut_off_x10 as u32) << 8)
            .checked_div(self.voltage_per_adc_step_inverse_x256)
            .unwrap_or(0)
            / 10;
        u8::try_from(steps).unwrap_or(u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: ConfigPayload) -> ConfigFrame {
        ConfigFrame {
            message_id: 0,
            assist_level_factor_x10: 15,
            lights: true,
            walk_assist: false,
            target_battery_max_power_div25: 20,
            payload,
        }
    }

    #[test]
    fn test_default_ramp_up_step() {
        let config = Configuration::default();
        assert_eq!(config.ramp_up_amps_per_second_x10, 50);
        assert_eq!(config.ramp_up_inverse_step, 1953);
    }

    #[test]
    fn test_ramp_up_below_minimum_uses_default() {
        let mut config = Configuration::default();
        config.apply(&frame(ConfigPayload::RampUp {
            amps_per_second_x10: 3,
            target_wheel_speed: 0,
        }));
        assert_eq!(config.ramp_up_amps_per_second_x10, DEFAULT_RAMP_UP_X10);
        assert_eq!(config.ramp_up_inverse_step, 1953);
    }

    #[test]
    fn test_ramp_up_above_maximum_uses_default() {
        assert_eq!(clamp_ramp_up(101), DEFAULT_RAMP_UP_X10);
        assert_eq!(clamp_ramp_up(0), DEFAULT_RAMP_UP_X10);
        assert_eq!(clamp_ramp_up(4), 4);
        assert_eq!(clamp_ramp_up(100), 100);
    }

    #[test]
    fn test_ramp_up_step_and_cruise_speed() {
        let mut config = Configuration::default();
        config.apply(&frame(ConfigPayload::RampUp {
            amps_per_second_x10: 10,
            target_wheel_speed: 25,
        }));
        assert_eq!(config.ramp_up_amps_per_second_x10, 10);
        assert_eq!(config.ramp_up_inverse_step, 9765);
        assert_eq!(config.target_wheel_speed_x10, 250);
    }

    #[test]
    fn test_unknown_payload_only_updates_common_fields() {
        let mut config = Configuration::default();
        config.wheel_perimeter = 2100;
        config.apply(&frame(ConfigPayload::Unknown { var_0: 1, var_1: 2 }));

        let mut expected = Configuration::default();
        expected.wheel_perimeter = 2100;
        expected.assist_level_factor_x10 = 15;
        expected.lights = true;
        expected.target_battery_max_power_div25 = 20;
        assert_eq!(config, expected);
    }

    #[test]
    fn test_battery_voltage_cut_off_step() {
        let settings = LinkSettings::default();
        // 39.0 V -> (390 << 8) / 744 / 10 = 13
        assert_eq!(settings.battery_voltage_cut_off_step(390), 13);
        assert_eq!(LinkSettings::new(1).battery_voltage_cut_off_step(u16::MAX), u8::MAX);
        assert_eq!(LinkSettings::new(0).battery_voltage_cut_off_step(390), 0);
    }
}
