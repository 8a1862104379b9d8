//! Modulation identifiers
//!
//! The phy models every signal in the band, including ones a receiver cannot
//! decode (interferers and shaped noise). Two modulations that agree on the
//! [`Modulation::SIMILAR_MASK`] bits are close enough that a modem configured
//! for one can receive the other, if with degraded performance.

use std::fmt;
use std::str::FromStr;

use crate::error::WireError;

/// A low-level modulation identifier as understood by the phy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modulation(pub u16);

impl Modulation {
    /// Modulations matching under this mask are cross-receivable
    pub const SIMILAR_MASK: u16 = 0xFFF0;

    /// Standard 1 Mbps BLE
    pub const BLE_1M: Modulation = Modulation(0x10);
    /// Standard 2 Mbps BLE
    pub const BLE_2M: Modulation = Modulation(0x20);
    /// Proprietary 2 Mbps
    pub const PROP_2M: Modulation = Modulation(0x21);
    /// Proprietary 3 Mbps
    pub const PROP_3M: Modulation = Modulation(0x31);
    /// Proprietary 4 Mbps
    pub const PROP_4M: Modulation = Modulation(0x41);
    /// Standard BLE coded phy (both S=2 and S=8)
    pub const BLE_CODED: Modulation = Modulation(0x50);
    /// IEEE 802.15.4-2006 DSS 250 kbps O-QPSK
    pub const IEEE802154_DSS: Modulation = Modulation(0x100);

    /// BLE-shaped interference (not receivable)
    pub const BLE_INTERFERENCE: Modulation = Modulation(0x8000);
    /// WLAN-shaped interference (not receivable)
    pub const WLAN_INTERFERENCE: Modulation = Modulation(0x8010);
    /// Continuous-wave interference (not receivable)
    pub const CW_INTERFERENCE: Modulation = Modulation(0x8020);
    /// White noise, 1 MHz bandwidth
    pub const WHITE_NOISE_1MHZ: Modulation = Modulation(0x8030);
    /// White noise, 2 MHz bandwidth
    pub const WHITE_NOISE_2MHZ: Modulation = Modulation(0x8040);
    /// White noise, 4 MHz bandwidth
    pub const WHITE_NOISE_4MHZ: Modulation = Modulation(0x8050);
    /// White noise, 8 MHz bandwidth
    pub const WHITE_NOISE_8MHZ: Modulation = Modulation(0x8060);
    /// White noise, 16 MHz bandwidth
    pub const WHITE_NOISE_16MHZ: Modulation = Modulation(0x8070);
    /// White noise, 20 MHz bandwidth
    pub const WHITE_NOISE_20MHZ: Modulation = Modulation(0x8080);
    /// White noise, 40 MHz bandwidth
    pub const WHITE_NOISE_40MHZ: Modulation = Modulation(0x8090);
    /// White noise, 80 MHz bandwidth
    pub const WHITE_NOISE_80MHZ: Modulation = Modulation(0x80A0);

    /// Whether this modulation is an interferer or noise, i.e. never
    /// receivable by a modem
    pub fn is_interference(self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// Whether a modem configured for `other` can receive this modulation
    /// (possibly with degraded performance)
    pub fn is_compatible_with(self, other: Modulation) -> bool {
        self.0 & Self::SIMILAR_MASK == other.0 & Self::SIMILAR_MASK
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Modulation::BLE_1M => "BLE",
            Modulation::BLE_2M => "BLE2M",
            Modulation::PROP_2M => "Prop2M",
            Modulation::PROP_3M => "Prop3M",
            Modulation::PROP_4M => "Prop4M",
            Modulation::BLE_CODED => "BLECoded",
            Modulation::IEEE802154_DSS => "154",
            Modulation::BLE_INTERFERENCE => "BLI",
            Modulation::WLAN_INTERFERENCE => "WLAN",
            Modulation::CW_INTERFERENCE => "CW",
            Modulation::WHITE_NOISE_1MHZ => "WN1",
            Modulation::WHITE_NOISE_2MHZ => "WN2",
            Modulation::WHITE_NOISE_4MHZ => "WN4",
            Modulation::WHITE_NOISE_8MHZ => "WN8",
            Modulation::WHITE_NOISE_16MHZ => "WN16",
            Modulation::WHITE_NOISE_20MHZ => "WN20",
            Modulation::WHITE_NOISE_40MHZ => "WN40",
            Modulation::WHITE_NOISE_80MHZ => "WN80",
            Modulation(other) => return write!(f, "{other:#x}"),
        };
        f.write_str(name)
    }
}

impl FromStr for Modulation {
    type Err = WireError;

    /// Parse a human-readable modulation name, as used on device command
    /// lines
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let m = match s.trim() {
            "BLE" | "BL" => Modulation::BLE_1M,
            "BLE2M" => Modulation::BLE_2M,
            "Prop2M" => Modulation::PROP_2M,
            "Prop3M" => Modulation::PROP_3M,
            "Prop4M" => Modulation::PROP_4M,
            "BLECoded" => Modulation::BLE_CODED,
            "154" => Modulation::IEEE802154_DSS,
            "BLI" => Modulation::BLE_INTERFERENCE,
            "WLAN" => Modulation::WLAN_INTERFERENCE,
            "CW" => Modulation::CW_INTERFERENCE,
            "WN1" => Modulation::WHITE_NOISE_1MHZ,
            "WN2" => Modulation::WHITE_NOISE_2MHZ,
            "WN4" => Modulation::WHITE_NOISE_4MHZ,
            "WN8" => Modulation::WHITE_NOISE_8MHZ,
            "WN16" => Modulation::WHITE_NOISE_16MHZ,
            "WN20" => Modulation::WHITE_NOISE_20MHZ,
            "WN40" => Modulation::WHITE_NOISE_40MHZ,
            "WN80" => Modulation::WHITE_NOISE_80MHZ,
            other => return Err(WireError::UnknownModulation(other.to_string())),
        };
        Ok(m)
    }
}
