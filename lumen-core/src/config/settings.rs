//! Persisted link settings
//!
//! A calibrated threshold is only valid for the optics it was measured on,
//! so the configurable fields can be stored as a postcard blob and loaded
//! again on boot.

use serde::{Deserialize, Serialize};

use super::link::{
    DEFAULT_BIT_DURATION_US, DEFAULT_SAMPLES_PER_BIT, DEFAULT_START_CONFIRM_SAMPLES,
    DEFAULT_THRESHOLD,
};

/// Magic number to identify valid settings data
pub const SETTINGS_MAGIC: u32 = 0x4C55_4D4E; // "LUMN"

/// Current settings data version
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound of an encoded [`StoredSettings`] blob
pub const MAX_SETTINGS_SIZE: usize = 40;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Configurable link fields
///
/// Derived timing is not stored; it is recomputed when the settings are
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkSettings {
    /// Bit period in microseconds
    pub bit_duration_us: u32,
    /// Analog decision threshold
    pub threshold: u16,
    /// Analog samples averaged per bit
    pub samples_per_bit: u32,
    /// Consecutive low samples that confirm a start bit
    pub start_confirm_samples: u32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            bit_duration_us: DEFAULT_BIT_DURATION_US,
            threshold: DEFAULT_THRESHOLD,
            samples_per_bit: DEFAULT_SAMPLES_PER_BIT,
            start_confirm_samples: DEFAULT_START_CONFIRM_SAMPLES,
        }
    }
}

/// Settings record as written to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredSettings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Stored settings
    pub settings: LinkSettings,
    /// CRC32 checksum (calculated over magic..settings)
    pub crc: u32,
}

impl StoredSettings {
    /// Wrap settings with a valid header and CRC
    pub fn new(settings: LinkSettings) -> Self {
        let mut stored = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            settings,
            crc: 0,
        };
        stored.update_crc();
        stored
    }

    /// Check if the magic and version match
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Calculate CRC32 for the record (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.settings.bit_duration_us.to_le_bytes());
        crc = crc32_update(crc, &self.settings.threshold.to_le_bytes());
        crc = crc32_update(crc, &self.settings.samples_per_bit.to_le_bytes());
        crc = crc32_update(crc, &self.settings.start_confirm_samples.to_le_bytes());

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, SettingsError> {
        postcard::to_slice(self, buffer)
            .map(|used| used.len())
            .map_err(|_| SettingsError::Serialize)
    }

    /// Deserialize and validate a stored blob
    pub fn decode(bytes: &[u8]) -> Result<LinkSettings, SettingsError> {
        let stored: StoredSettings =
            postcard::from_bytes(bytes).map_err(|_| SettingsError::Deserialize)?;

        if !stored.is_valid() {
            return Err(SettingsError::InvalidFormat);
        }
        if !stored.verify_crc() {
            return Err(SettingsError::CrcMismatch);
        }

        Ok(stored.settings)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
