//! Virtual-clock link simulator
//!
//! [`SimLink`] implements [`LinkHal`] without any real hardware or real
//! time. Sleeps advance a microsecond counter instantly, digital writes are
//! recorded as a [`Waveform`], and analog reads are answered from a
//! [`SimInput`]:
//!
//! - a constant level (ambient light, no traffic)
//! - a scripted sequence of samples, cycled
//! - a replay of a recorded waveform, mapped to high/low sample values
//!
//! Replaying the output of one simulated transmitter into a simulated
//! receiver gives deterministic end-to-end tests of the bit timing.

use heapless::Vec;

use crate::gpio::{Level, PinId};
use crate::link::LinkHal;

/// Maximum level changes a waveform can hold
pub const MAX_EDGES: usize = 512;

/// Maximum length of a scripted sample sequence
pub const MAX_SCRIPT: usize = 64;

/// Analog value a replayed high level reads as
pub const DEFAULT_HIGH_SAMPLE: u16 = 3000;

/// Analog value a replayed low level reads as
pub const DEFAULT_LOW_SAMPLE: u16 = 200;

/// A level change at a point in virtual time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edge {
    /// Virtual time of the change in microseconds
    pub at_us: u64,
    /// Level from `at_us` onwards
    pub level: Level,
}

/// Recorded line levels over virtual time
#[derive(Debug, Clone)]
pub struct Waveform {
    initial: Level,
    edges: Vec<Edge, MAX_EDGES>,
    overflowed: bool,
}

impl Waveform {
    /// Create an empty waveform that sits at `initial` until the first edge
    pub fn new(initial: Level) -> Self {
        Self {
            initial,
            edges: Vec::new(),
            overflowed: false,
        }
    }

    /// Build a waveform from `(time_us, level)` pairs in time order
    pub fn from_edges(initial: Level, edges: &[(u64, Level)]) -> Self {
        let mut waveform = Self::new(initial);
        for &(at_us, level) in edges {
            waveform.record(at_us, level);
        }
        waveform
    }

    /// Record the line being driven to `level` at `at_us`
    ///
    /// Writes that do not change the level are not stored. Edges past the
    /// capacity are dropped and flagged in [`Waveform::overflowed`].
    pub fn record(&mut self, at_us: u64, level: Level) {
        if self.final_level() == level {
            return;
        }
        if self.edges.push(Edge { at_us, level }).is_err() {
            self.overflowed = true;
        }
    }

    /// Level of the line at `at_us`
    ///
    /// An edge takes effect at exactly its timestamp.
    pub fn level_at(&self, at_us: u64) -> Level {
        self.edges
            .iter()
            .take_while(|edge| edge.at_us <= at_us)
            .last()
            .map_or(self.initial, |edge| edge.level)
    }

    /// Level before the first edge
    pub fn initial_level(&self) -> Level {
        self.initial
    }

    /// Level after the last edge
    pub fn final_level(&self) -> Level {
        self.edges.last().map_or(self.initial, |edge| edge.level)
    }

    /// Recorded edges in time order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Check if edges were dropped for lack of capacity
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

/// Source of simulated analog samples
#[derive(Debug, Clone)]
pub enum SimInput {
    /// Every read returns the same value
    Constant(u16),
    /// Reads walk the sequence, wrapping at the end
    Script {
        /// Sample values
        values: Vec<u16, MAX_SCRIPT>,
        /// Index of the next value to return
        next: usize,
    },
    /// Reads follow a waveform over virtual time
    Replay {
        /// Line levels to replay
        waveform: Waveform,
        /// Sample value for a high level
        high: u16,
        /// Sample value for a low level
        low: u16,
    },
}

impl SimInput {
    fn sample(&mut self, now_us: u64) -> u16 {
        match self {
            SimInput::Constant(value) => *value,
            SimInput::Script { values, next } => {
                if values.is_empty() {
                    return 0;
                }
                let value = values[*next % values.len()];
                *next = (*next + 1) % values.len();
                value
            }
            SimInput::Replay {
                waveform,
                high,
                low,
            } => match waveform.level_at(now_us) {
                Level::High => *high,
                Level::Low => *low,
            },
        }
    }
}

/// Simulated link hardware running on a virtual clock
#[derive(Debug, Clone)]
pub struct SimLink {
    now_us: u64,
    output: Waveform,
    input: SimInput,
    analog_reads: u32,
    digital_writes: u32,
    slept_us: u64,
}

impl Default for SimLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLink {
    /// Create a simulator with a dark receiver (constant 0) and an idle-high output line
    pub fn new() -> Self {
        Self::with_input(SimInput::Constant(0))
    }

    /// Create a simulator reading from `input`
    pub fn with_input(input: SimInput) -> Self {
        Self {
            now_us: 0,
            output: Waveform::new(Level::High),
            input,
            analog_reads: 0,
            digital_writes: 0,
            slept_us: 0,
        }
    }

    /// Create a simulator whose receiver always reads `value`
    pub fn with_constant(value: u16) -> Self {
        Self::with_input(SimInput::Constant(value))
    }

    /// Create a simulator whose receiver cycles through `values`
    ///
    /// Values past [`MAX_SCRIPT`] are ignored.
    pub fn with_script(values: &[u16]) -> Self {
        let mut script = Vec::new();
        for &value in values.iter().take(MAX_SCRIPT) {
            let _ = script.push(value);
        }
        Self::with_input(SimInput::Script {
            values: script,
            next: 0,
        })
    }

    /// Create a simulator whose receiver replays `waveform`
    pub fn with_replay(waveform: Waveform, high: u16, low: u16) -> Self {
        Self::with_input(SimInput::Replay {
            waveform,
            high,
            low,
        })
    }

    /// Create a fresh simulator (clock at zero) whose receiver replays
    /// everything this simulator transmitted
    pub fn replay_output(&self, high: u16, low: u16) -> Self {
        Self::with_replay(self.output.clone(), high, low)
    }

    /// Current virtual time in microseconds
    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    /// Advance virtual time without counting it as a sleep
    pub fn advance_us(&mut self, us: u64) {
        self.now_us += us;
    }

    /// Everything written to output pins so far
    pub fn output(&self) -> &Waveform {
        &self.output
    }

    /// Number of analog reads served
    pub fn analog_reads(&self) -> u32 {
        self.analog_reads
    }

    /// Number of digital writes received
    pub fn digital_writes(&self) -> u32 {
        self.digital_writes
    }

    /// Total virtual time spent in `sleep_ms`/`sleep_us`
    pub fn slept_us(&self) -> u64 {
        self.slept_us
    }

    fn sleep(&mut self, us: u64) {
        self.now_us += us;
        self.slept_us += us;
    }
}

impl LinkHal for SimLink {
    fn write_digital(&mut self, _pin: PinId, level: Level) {
        self.digital_writes += 1;
        self.output.record(self.now_us, level);
    }

    fn read_digital(&mut self, _pin: PinId) -> Level {
        self.output.level_at(self.now_us)
    }

    fn read_analog(&mut self, _pin: PinId) -> u16 {
        self.analog_reads += 1;
        self.input.sample(self.now_us)
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.sleep(u64::from(ms) * 1000);
    }

    fn sleep_us(&mut self, us: u32) {
        self.sleep(u64::from(us));
    }

    fn now_ms(&self) -> u32 {
        (self.now_us / 1000) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_level_at_edges() {
        let waveform =
            Waveform::from_edges(Level::High, &[(1000, Level::Low), (2000, Level::High)]);

        assert_eq!(waveform.level_at(0), Level::High);
        assert_eq!(waveform.level_at(999), Level::High);
        assert_eq!(waveform.level_at(1000), Level::Low);
        assert_eq!(waveform.level_at(1999), Level::Low);
        assert_eq!(waveform.level_at(2000), Level::High);
        assert_eq!(waveform.level_at(u64::MAX), Level::High);
    }

    #[test]
    fn test_waveform_skips_repeated_levels() {
        let mut waveform = Waveform::new(Level::High);
        waveform.record(0, Level::High);
        waveform.record(10, Level::Low);
        waveform.record(20, Level::Low);

        assert_eq!(waveform.edges().len(), 1);
        assert_eq!(waveform.final_level(), Level::Low);
    }

    #[test]
    fn test_waveform_flags_dropped_edges() {
        let mut waveform = Waveform::new(Level::High);
        for i in 0..MAX_EDGES as u64 {
            waveform.record(i * 10, Level::from(i % 2 == 1));
        }
        assert!(!waveform.overflowed());

        let last = waveform.final_level();
        waveform.record(1_000_000, !last);

        assert!(waveform.overflowed());
        assert_eq!(waveform.edges().len(), MAX_EDGES);
        assert_eq!(waveform.final_level(), last);
    }

    #[test]
    fn test_advance_is_not_a_sleep() {
        let mut sim = SimLink::new();
        sim.advance_us(1500);
        sim.sleep_us(250);

        assert_eq!(sim.now_us(), 1750);
        assert_eq!(sim.now_ms(), 1);
        assert_eq!(sim.slept_us(), 250);
    }

    #[test]
    fn test_sleep_advances_clock() {
        let mut sim = SimLink::new();
        sim.sleep_ms(2);
        sim.sleep_us(500);

        assert_eq!(sim.now_us(), 2500);
        assert_eq!(sim.slept_us(), 2500);
        assert_eq!(sim.now_ms(), 2);
    }

    #[test]
    fn test_script_cycles() {
        let mut sim = SimLink::with_script(&[1, 2, 3]);
        let reads: [u16; 5] = core::array::from_fn(|_| sim.read_analog(0));

        assert_eq!(reads, [1, 2, 3, 1, 2]);
        assert_eq!(sim.analog_reads(), 5);
    }

    #[test]
    fn test_replay_output() {
        let mut tx = SimLink::new();
        tx.write_digital(0, Level::Low);
        tx.sleep_us(100);
        tx.write_digital(0, Level::High);

        let mut rx = tx.replay_output(DEFAULT_HIGH_SAMPLE, DEFAULT_LOW_SAMPLE);
        assert_eq!(rx.read_analog(1), DEFAULT_LOW_SAMPLE);
        rx.sleep_us(100);
        assert_eq!(rx.read_analog(1), DEFAULT_HIGH_SAMPLE);
    }
}
