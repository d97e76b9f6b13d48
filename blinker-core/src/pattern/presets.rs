//! Named 20-bit patterns for common device states.
//!
//! Every preset plays at 100 ms per bit and loops until replaced, so one full
//! traversal takes two seconds. The connecting/error signatures share a
//! leading double pulse and differ in the tail, which keeps them tellable
//! apart at a glance.

use core::fmt;

use super::Pattern;

/// Ten bits on, ten bits off.
pub const SPEED_VERY_SLOW: Pattern = Pattern::new(0b0000_0000_0011_1111_1111);
/// Five on, five off. Shown while a captive portal is running.
pub const SPEED_SLOW: Pattern = Pattern::new(0b0000_0111_1100_0001_1111);
/// Two on, two off.
pub const SPEED_MEDIUM: Pattern = Pattern::new(0b0011_0011_0011_0011_0011);
/// Alternating bits. Shown on error or reset.
pub const SPEED_FAST: Pattern = Pattern::new(0b0101_0101_0101_0101_0101);
pub const WIFI_CONNECTING: Pattern = Pattern::new(0b0000_0000_0000_0001_0001);
pub const MQTT_CONNECTING: Pattern = Pattern::new(0b0000_0000_0001_0001_0001);
pub const WIFI_ERROR: Pattern = Pattern::new(0b0000_0000_1111_0001_0001);
pub const MQTT_ERROR: Pattern = Pattern::new(0b0000_1111_0001_0001_0001);

/// Catalog entry for each predefined pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Preset {
    SpeedVerySlow,
    SpeedSlow,
    SpeedMedium,
    SpeedFast,
    WifiConnecting,
    MqttConnecting,
    WifiError,
    MqttError,
}

/// Every preset in catalog order.
pub const ALL_PRESETS: [Preset; 8] = [
    Preset::SpeedVerySlow,
    Preset::SpeedSlow,
    Preset::SpeedMedium,
    Preset::SpeedFast,
    Preset::WifiConnecting,
    Preset::MqttConnecting,
    Preset::WifiError,
    Preset::MqttError,
];

impl Preset {
    /// Pattern played for this preset.
    #[must_use]
    pub const fn pattern(self) -> Pattern {
        match self {
            Preset::SpeedVerySlow => SPEED_VERY_SLOW,
            Preset::SpeedSlow => SPEED_SLOW,
            Preset::SpeedMedium => SPEED_MEDIUM,
            Preset::SpeedFast => SPEED_FAST,
            Preset::WifiConnecting => WIFI_CONNECTING,
            Preset::MqttConnecting => MQTT_CONNECTING,
            Preset::WifiError => WIFI_ERROR,
            Preset::MqttError => MQTT_ERROR,
        }
    }

    /// Kebab-case name used by the command grammar.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Preset::SpeedVerySlow => "speed-very-slow",
            Preset::SpeedSlow => "speed-slow",
            Preset::SpeedMedium => "speed-medium",
            Preset::SpeedFast => "speed-fast",
            Preset::WifiConnecting => "wifi-connecting",
            Preset::MqttConnecting => "mqtt-connecting",
            Preset::WifiError => "wifi-error",
            Preset::MqttError => "mqtt-error",
        }
    }

    /// Case-insensitive lookup by name. Underscores match dashes.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PRESETS.iter().copied().find(|preset| {
            let expected = preset.name().as_bytes();
            let given = name.as_bytes();
            expected.len() == given.len()
                && expected.iter().zip(given).all(|(&want, &got)| {
                    let got = if got == b'_' { b'-' } else { got };
                    want == got.to_ascii_lowercase()
                })
        })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
