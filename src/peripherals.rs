//! Subsystems the link talks to.
//!
//! The decoder pushes configuration into these on every valid frame. Each
//! trait is also implemented for `&mut T` so callers can lend a subsystem to
//! an [`InboundDecoder`](crate::decoder::InboundDecoder) without giving up
//! ownership.

use crate::config::Configuration;
use embedded_hal::digital::OutputPin;

/// Lighting subsystem.
pub trait Lights {
    /// Switches the lights on or off.
    fn set_state(&mut self, on: bool);
}

/// Non-volatile configuration storage.
pub trait Persistence {
    /// Called after every valid frame.
    ///
    /// Implementations compare `config` with their stored copy and write
    /// only when something actually changed.
    fn notify_possible_change(&mut self, config: &Configuration);
}

/// Motor control parameters that take effect immediately.
pub trait MotorLimits {
    /// Sets the battery low-voltage cutoff, in 8-bit ADC steps.
    fn set_battery_voltage_cutoff_step(&mut self, step: u8);
    /// Sets the battery max current, in amps.
    fn set_battery_max_current(&mut self, amps: u8);
}

impl<T: Lights + ?Sized> Lights for &mut T {
    fn set_state(&mut self, on: bool) {
        (**self).set_state(on)
    }
}

impl<T: Persistence + ?Sized> Persistence for &mut T {
    fn notify_possible_change(&mut self, config: &Configuration) {
        (**self).notify_possible_change(config)
    }
}

impl<T: MotorLimits + ?Sized> MotorLimits for &mut T {
    fn set_battery_voltage_cutoff_step(&mut self, step: u8) {
        (**self).set_battery_voltage_cutoff_step(step)
    }

    fn set_battery_max_current(&mut self, amps: u8) {
        (**self).set_battery_max_current(amps)
    }
}

/// Drives the lights from a single GPIO.
///
/// Pin errors are ignored; the next frame sets the state again.
#[derive(Debug)]
pub struct LightsPin<P: OutputPin> {
    /// The lights output
    pub pin: P,
    inverted: bool,
}

impl<P: OutputPin> LightsPin<P> {
    /// Wraps an active-high pin.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Wraps an active-low pin.
    pub fn new_inverted(pin: P) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

impl<P: OutputPin> Lights for LightsPin<P> {
    fn set_state(&mut self, on: bool) {
        if on != self.inverted {
            let _ = self.pin.set_high();
        } else {
            let _ = self.pin.set_low();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn test_lights_pin_follows_state() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut lights = LightsPin::new(pin);
        lights.set_state(true);
        lights.set_state(false);
        lights.pin.done();
    }

    #[test]
    fn test_lights_pin_inverted() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut lights = LightsPin::new_inverted(pin);
        lights.set_state(true);
        lights.set_state(false);
        lights.pin.done();
    }

    #[test]
    fn test_lights_through_mut_ref() {
        let pin = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let mut lights = LightsPin::new(pin);
        {
            let mut borrowed = &mut lights;
            Lights::set_state(&mut borrowed, true);
        }
        lights.pin.done();
    }
}
