//! PWM-driven DAC output, the way the original hardware produced audio:
//! each sample sets the duty cycle of a fast PWM carrier and an RC filter
//! on the pin recovers the waveform.
//!
//! Generic over any [`embedded_hal::pwm::SetDutyCycle`] channel so board
//! crates can plug their timer peripheral straight in.

use embedded_hal::pwm::SetDutyCycle;

use crate::control::OutputControl;

/// Adapts a PWM channel into the drainer's output seam.
pub struct PwmDac<P> {
    channel: P,
}

impl<P: SetDutyCycle> PwmDac<P> {
    pub fn new(channel: P) -> Self {
        PwmDac { channel }
    }

    /// Give the peripheral back, e.g. to reconfigure the timer.
    pub fn release(self) -> P {
        self.channel
    }
}

impl<P: SetDutyCycle> OutputControl for PwmDac<P> {
    fn enable(&mut self) {
        // Mid-scale so the RC filter settles at the signal's zero level
        // before the first sample lands.
        let _ = self.channel.set_duty_cycle_fraction(1, 2);
    }

    fn emit(&mut self, sample: i16) {
        // Shift the signed sample into the unsigned duty range.
        let duty = (sample as i32 + 32768) as u16;
        let _ = self.channel.set_duty_cycle_fraction(duty, u16::MAX);
    }

    fn disable(&mut self) {
        let _ = self.channel.set_duty_cycle_fully_off();
    }
}
