//! `LinkHal` over embedded-hal drivers
//!
//! Wires an emitter output pin, a receiver ADC channel, a blocking delay
//! and a millisecond clock into the capability the engine expects. The
//! engine addresses pins by id; this adapter owns exactly two of them,
//! [`EMITTER_PIN`] and [`RECEIVER_PIN`].
//!
//! Driver errors cannot be reported through `LinkHal`, so they are logged,
//! counted in [`HalLink::faults`] and replaced by a safe value.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use lumen_hal::{AnalogInput, Level, LinkHal, MonotonicClock, PinId, PinMode};

/// Pin id of the emitter output
pub const EMITTER_PIN: PinId = 0;

/// Pin id of the receiver analog input
pub const RECEIVER_PIN: PinId = 1;

/// Default level above which the receiver reads as a digital high
pub const DEFAULT_DIGITAL_THRESHOLD: u16 = 2048;

/// Placeholder emitter for receive-only links
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEmitter;

impl ErrorType for NoEmitter {
    type Error = Infallible;
}

impl OutputPin for NoEmitter {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Placeholder receiver for transmit-only links; always reads 0
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReceiver;

impl AnalogInput for NoReceiver {
    type Error = Infallible;

    fn read(&mut self) -> Result<u16, Self::Error> {
        Ok(0)
    }
}

/// Link capability built from embedded-hal parts
pub struct HalLink<O, A, D, C> {
    emitter: O,
    receiver: A,
    delay: D,
    clock: C,
    emitter_level: Level,
    digital_threshold: u16,
    faults: u32,
}

impl<O, A, D, C> HalLink<O, A, D, C>
where
    O: OutputPin,
    A: AnalogInput,
    D: DelayNs,
    C: MonotonicClock,
{
    /// Create an adapter
    ///
    /// The emitter is not touched until the engine drives it.
    pub fn new(emitter: O, receiver: A, delay: D, clock: C) -> Self {
        Self {
            emitter,
            receiver,
            delay,
            clock,
            emitter_level: Level::Low,
            digital_threshold: DEFAULT_DIGITAL_THRESHOLD,
            faults: 0,
        }
    }

    /// Set the level `read_digital` uses on the receiver pin
    pub fn set_digital_threshold(&mut self, threshold: u16) {
        self.digital_threshold = threshold;
    }

    /// Number of driver errors absorbed so far
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Give back the drivers
    pub fn release(self) -> (O, A, D, C) {
        (self.emitter, self.receiver, self.delay, self.clock)
    }

    fn fault(&mut self) {
        self.faults = self.faults.saturating_add(1);
    }
}

impl<O, A, D, C> LinkHal for HalLink<O, A, D, C>
where
    O: OutputPin,
    A: AnalogInput,
    D: DelayNs,
    C: MonotonicClock,
{
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        // Direction is fixed by the driver types
        let valid = matches!(
            (pin, mode),
            (EMITTER_PIN, PinMode::Output) | (RECEIVER_PIN, PinMode::Input)
        );
        if !valid {
            #[cfg(feature = "defmt")]
            defmt::warn!("pin {} cannot be configured as {}", pin, mode);
            self.fault();
        }
    }

    fn write_digital(&mut self, pin: PinId, level: Level) {
        if pin != EMITTER_PIN {
            self.fault();
            return;
        }

        let state = PinState::from(level.is_high());
        if self.emitter.set_state(state).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("emitter write failed");
            self.fault();
            return;
        }
        self.emitter_level = level;
    }

    fn read_digital(&mut self, pin: PinId) -> Level {
        match pin {
            EMITTER_PIN => self.emitter_level,
            RECEIVER_PIN => Level::from(self.read_analog(pin) > self.digital_threshold),
            _ => Level::Low,
        }
    }

    fn read_analog(&mut self, pin: PinId) -> u16 {
        if pin != RECEIVER_PIN {
            self.fault();
            return 0;
        }

        match self.receiver.read() {
            Ok(value) => value,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("receiver conversion failed");
                self.fault();
                0
            }
        }
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn sleep_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}
