//! Dial PWM Outputs
//!
//! Each dial is a moving-coil meter behind an RC filter on one channel of
//! a general-purpose timer. The duty cycle is the dial deflection.

use embassy_stm32::timer::simple_pwm::SimplePwmChannel;
use embassy_stm32::timer::GeneralInstance4Channel;

use crate::clock::DialOutput;
use crate::config::DIAL_FULL_SCALE;
use crate::types::Dial;

/// Three timer channels driving the hour, minute and second dials
pub struct PwmDials<'d, T: GeneralInstance4Channel> {
    hour: SimplePwmChannel<'d, T>,
    minute: SimplePwmChannel<'d, T>,
    second: SimplePwmChannel<'d, T>,
    full_scale: u16,
}

impl<'d, T: GeneralInstance4Channel> PwmDials<'d, T> {
    /// Bind the three channels
    #[must_use]
    pub fn new(
        hour: SimplePwmChannel<'d, T>,
        minute: SimplePwmChannel<'d, T>,
        second: SimplePwmChannel<'d, T>,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            full_scale: u16::from(DIAL_FULL_SCALE).max(1),
        }
    }

    fn channel(&mut self, dial: Dial) -> &mut SimplePwmChannel<'d, T> {
        match dial {
            Dial::Hour => &mut self.hour,
            Dial::Minute => &mut self.minute,
            Dial::Second => &mut self.second,
        }
    }
}

impl<T: GeneralInstance4Channel> DialOutput for PwmDials<'_, T> {
    fn enable(&mut self) {
        for dial in Dial::ALL {
            self.channel(dial).enable();
        }
    }

    fn set_level(&mut self, dial: Dial, level: u8) {
        let full_scale = self.full_scale;
        let level = u16::from(level).min(full_scale);
        self.channel(dial).set_duty_cycle_fraction(level, full_scale);
    }
}
