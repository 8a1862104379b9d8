//! Fixed-point unit types
//!
//! The wire protocol represents physical quantities as small fixed-point
//! integers:
//!
//! - [`Power`]: dBm (or dB gain, depending on context), signed 8.8
//! - [`Frequency`]: MHz offset from 2400 MHz, signed 8.8
//! - [`RssiPower`]: measured dBm with modem resolution, signed 16.16
//!
//! Conversions saturate at the representable range rather than wrap.

use crate::error::WireError;

/// Power level in dBm or gain in dB, signed 8.8 fixed point
/// (about -128.0 .. 127.996)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Power(pub i16);

impl Power {
    /// Lowest representable power
    pub const MIN: Power = Power(i16::MIN);

    /// Convert from dBm, saturating to the representable range
    pub fn from_dbm(dbm: f64) -> Self {
        let clamped = dbm.clamp(-128.0, 127.0);
        Power((clamped * 256.0) as i16)
    }

    /// Convert to dBm
    pub fn to_dbm(self) -> f64 {
        f64::from(self.0) / 256.0
    }
}

/// RSSI power level in dBm, signed 16.16 fixed point
/// (-32768.0 .. 32768 - 1/2^16, resolution ~1.5e-5 dBm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RssiPower(pub i32);

impl RssiPower {
    /// Lowest representable measurement
    pub const MIN: RssiPower = RssiPower(i32::MIN);

    /// Convert from dBm, saturating to the representable range
    pub fn from_dbm(dbm: f64) -> Self {
        let clamped = dbm.clamp(-32768.0, 32767.0);
        RssiPower((clamped * 65536.0) as i32)
    }

    /// Convert to dBm
    pub fn to_dbm(self) -> f64 {
        f64::from(self.0) / 65536.0
    }
}

/// Carrier frequency as a MHz offset relative to 2400 MHz, signed 8.8 fixed
/// point. Offsets can be negative for blockers below the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frequency(pub i16);

impl Frequency {
    /// Sentinel for "no valid frequency"
    pub const INVALID: Frequency = Frequency(0x7FFF);

    /// Convert from a frequency value, saturating at the representable range.
    ///
    /// Accepts Hz, kHz or MHz (disambiguated by magnitude, as device command
    /// lines commonly mix them), or directly an offset from 2400 MHz.
    /// With `in_band_only` set, frequencies outside 2400..2480 MHz are
    /// rejected.
    pub fn from_mhz(freq: f64, in_band_only: bool) -> Result<Self, WireError> {
        let mut mhz = freq;
        if mhz > 1e9 {
            // provided in Hz
            mhz /= 1e6;
        } else if mhz > 1e6 {
            // provided in kHz
            mhz /= 1e3;
        }

        let offset = if (2400.0 - 128.0..=2400.0 + 128.0).contains(&mhz) {
            mhz - 2400.0
        } else {
            mhz
        };

        if !(-127.0..=127.0).contains(&offset) {
            return Err(WireError::FrequencyOutOfRange(freq));
        }
        if in_band_only && !(0.0..=80.0).contains(&offset) {
            return Err(WireError::FrequencyOutOfRange(freq));
        }

        Ok(Frequency((offset * 256.0 + 0.5) as i16))
    }

    /// The offset from 2400 MHz, in MHz
    pub fn to_mhz_offset(self) -> f64 {
        f64::from(self.0) / 256.0
    }

    /// Center frequency for a BLE channel index (0..=39).
    ///
    /// Data channels 0..=36 map to 2404..2478 MHz skipping 2426; advertising
    /// channels 37, 38, 39 map to 2402, 2426 and 2480 MHz.
    pub fn from_ble_channel(ch_idx: u32) -> Result<Self, WireError> {
        let mhz = match ch_idx {
            0..=10 => 2404.0 + f64::from(ch_idx) * 2.0,
            11..=36 => 2406.0 + f64::from(ch_idx) * 2.0,
            37 => 2402.0,
            38 => 2426.0,
            39 => 2480.0,
            _ => return Err(WireError::InvalidBleChannel(ch_idx)),
        };
        Frequency::from_mhz(mhz, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_conversion() {
        assert_eq!(Power::from_dbm(0.0), Power(0));
        assert_eq!(Power::from_dbm(10.0), Power(2560));
        assert_eq!(Power::from_dbm(-20.5), Power(-5248));
        assert!((Power(2560).to_dbm() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_saturates() {
        assert_eq!(Power::from_dbm(-500.0), Power(-128 * 256));
        assert_eq!(Power::from_dbm(500.0), Power(127 * 256));
    }

    #[test]
    fn test_rssi_conversion() {
        assert_eq!(RssiPower::from_dbm(-60.0), RssiPower(-60 * 65536));
        assert!((RssiPower(-60 * 65536).to_dbm() + 60.0).abs() < 1e-9);
        assert_eq!(RssiPower::from_dbm(-1e6), RssiPower(-32768 * 65536));
    }

    #[test]
    fn test_frequency_accepts_hz_khz_mhz() {
        let a = Frequency::from_mhz(2440.0, true).unwrap();
        let b = Frequency::from_mhz(2_440_000.0, true).unwrap();
        let c = Frequency::from_mhz(2_440_000_000.0, true).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!((a.to_mhz_offset() - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_frequency_accepts_offset() {
        let f = Frequency::from_mhz(40.0, true).unwrap();
        assert!((f.to_mhz_offset() - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_frequency_out_of_band() {
        // the rejected value is carried in the error and comparable
        assert_eq!(
            Frequency::from_mhz(2550.0, true).unwrap_err(),
            WireError::FrequencyOutOfRange(2550.0)
        );
        // out of band but representable when not restricted
        let f = Frequency::from_mhz(2390.0, false).unwrap();
        assert!((f.to_mhz_offset() + 10.0).abs() < 0.01);
    }

    #[test]
    fn test_ble_channel_map() {
        // advertising channels
        assert!((Frequency::from_ble_channel(37).unwrap().to_mhz_offset() - 2.0).abs() < 0.01);
        assert!((Frequency::from_ble_channel(38).unwrap().to_mhz_offset() - 26.0).abs() < 0.01);
        assert!((Frequency::from_ble_channel(39).unwrap().to_mhz_offset() - 80.0).abs() < 0.01);
        // data channels straddle the 2426 gap
        assert!((Frequency::from_ble_channel(10).unwrap().to_mhz_offset() - 24.0).abs() < 0.01);
        assert!((Frequency::from_ble_channel(11).unwrap().to_mhz_offset() - 28.0).abs() < 0.01);
        assert!(Frequency::from_ble_channel(40).is_err());
    }

    proptest! {
        #[test]
        fn prop_power_roundtrip(dbm in -128.0f64..127.0) {
            let back = Power::from_dbm(dbm).to_dbm();
            // one fixed-point step of slack
            prop_assert!((back - dbm).abs() <= 1.0 / 256.0);
        }

        #[test]
        fn prop_rssi_roundtrip(dbm in -32768.0f64..32767.0) {
            let back = RssiPower::from_dbm(dbm).to_dbm();
            prop_assert!((back - dbm).abs() <= 1.0 / 65536.0);
        }

        #[test]
        fn prop_in_band_frequency_roundtrip(mhz in 2400.0f64..2480.0) {
            let f = Frequency::from_mhz(mhz, true).unwrap();
            let back = f.to_mhz_offset() + 2400.0;
            prop_assert!((back - mhz).abs() <= 1.0 / 256.0);
        }
    }
}
