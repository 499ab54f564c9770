use serde::Serialize;
use std::time::Duration;

/// Inputs for one resolution attempt.  Rebuilt from the config every cycle
/// so edits to the config file apply on the next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Directories prepended to `PATH`, in order.
    pub extra_path_dirs: Vec<String>,
    /// Optional user script or shell command line.
    pub script_path: Option<String>,
    /// Hard limit for a single command attempt.
    pub command_timeout: Duration,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extra_path_dirs: Vec::new(),
            script_path: None,
            command_timeout: Duration::from_secs(10),
        }
    }
}

/// Charge direction as scraped from free-form command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeState {
    Charging,
    Discharging,
    #[default]
    Unknown,
}

/// A battery reading extracted from command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedStatus {
    /// Always within `0..=100`.
    pub percent: u8,
    pub charge_state: ChargeState,
}

impl ParsedStatus {
    /// Build a status, clamping `percent` to 100.
    pub fn new(percent: u8, charge_state: ChargeState) -> Self {
        Self {
            percent: percent.min(100),
            charge_state,
        }
    }
}

/// UPower `org.freedesktop.UPower.Device.State`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Unknown,
    Charging,
    Discharging,
    Empty,
    FullyCharged,
    PendingCharge,
    PendingDischarge,
}

impl DeviceState {
    /// Map the raw D-Bus enum value.  Unlisted values become `Unknown`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Charging,
            2 => Self::Discharging,
            3 => Self::Empty,
            4 => Self::FullyCharged,
            5 => Self::PendingCharge,
            6 => Self::PendingDischarge,
            _ => Self::Unknown,
        }
    }

    pub fn is_charging(self) -> bool {
        matches!(self, Self::Charging | Self::PendingCharge)
    }

    /// Short human-readable description used in the diagnostic line.
    pub fn text(self) -> &'static str {
        match self {
            Self::Charging | Self::PendingCharge       => "Charging",
            Self::Discharging | Self::PendingDischarge => "Discharging",
            Self::FullyCharged                         => "Fully charged",
            Self::Empty                                => "Empty",
            Self::Unknown                              => "Unknown",
        }
    }
}

impl From<ChargeState> for DeviceState {
    fn from(state: ChargeState) -> Self {
        match state {
            ChargeState::Charging    => Self::Charging,
            ChargeState::Discharging => Self::Discharging,
            ChargeState::Unknown     => Self::Unknown,
        }
    }
}

/// Snapshot of the UPower display device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    /// 0.0 – 100.0 as reported by UPower.
    pub percentage: f64,
    pub state: DeviceState,
    pub is_present: bool,
}

impl PowerReading {
    /// Percentage rounded and clamped to `0..=100`.
    pub fn percent(&self) -> u8 {
        if self.percentage.is_nan() {
            return 0;
        }
        self.percentage.round().clamp(0.0, 100.0) as u8
    }
}

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// `rivalcfg` in any of its invocation forms.
    Rivalcfg,
    /// The user-configured script.
    Script,
    /// UPower's display device.
    System,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rivalcfg => "Rivalcfg",
            Self::Script   => "Script",
            Self::System   => "System",
        }
    }
}

/// Outcome of a single refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum BatteryStatus {
    /// A usable reading.
    Reported {
        source: Source,
        percent: u8,
        state: DeviceState,
    },
    /// A command printed something, but no percentage could be found in it.
    Unrecognized { source: Source, raw: String },
    /// Every strategy failed and no system battery is present.
    NoBattery {
        /// Result of `command -v rivalcfg`, if it found anything.
        rivalcfg_location: Option<String>,
    },
}

impl BatteryStatus {
    /// Reading from a parsed command output.
    pub fn from_parsed(source: Source, parsed: ParsedStatus) -> Self {
        Self::Reported {
            source,
            percent: parsed.percent.min(100),
            state: parsed.charge_state.into(),
        }
    }

    /// Reading from UPower; `None` when no device is present.
    pub fn from_power(reading: &PowerReading) -> Option<Self> {
        if !reading.is_present {
            return None;
        }
        Some(Self::Reported {
            source: Source::System,
            percent: reading.percent(),
            state: reading.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_status_clamps_percent() {
        assert_eq!(ParsedStatus::new(250, ChargeState::Unknown).percent, 100);
        assert_eq!(ParsedStatus::new(42, ChargeState::Charging).percent, 42);
    }

    #[test]
    fn device_state_from_raw() {
        assert_eq!(DeviceState::from_raw(1), DeviceState::Charging);
        assert_eq!(DeviceState::from_raw(4), DeviceState::FullyCharged);
        assert_eq!(DeviceState::from_raw(99), DeviceState::Unknown);
        assert!(DeviceState::PendingCharge.is_charging());
        assert!(!DeviceState::PendingDischarge.is_charging());
        assert_eq!(DeviceState::PendingDischarge.text(), "Discharging");
    }

    #[test]
    fn power_reading_rounds_and_clamps() {
        let reading = |percentage| PowerReading {
            percentage,
            state: DeviceState::Discharging,
            is_present: true,
        };
        assert_eq!(reading(79.6).percent(), 80);
        assert_eq!(reading(-3.0).percent(), 0);
        assert_eq!(reading(130.0).percent(), 100);
        assert_eq!(reading(f64::NAN).percent(), 0);
    }

    #[test]
    fn absent_power_device_is_not_a_reading() {
        let reading = PowerReading {
            percentage: 55.0,
            state: DeviceState::Unknown,
            is_present: false,
        };
        assert_eq!(BatteryStatus::from_power(&reading), None);
    }

    #[test]
    fn parsed_reading_keeps_charge_state() {
        let status = BatteryStatus::from_parsed(
            Source::Rivalcfg,
            ParsedStatus::new(40, ChargeState::Discharging),
        );
        assert_eq!(
            status,
            BatteryStatus::Reported {
                source: Source::Rivalcfg,
                percent: 40,
                state: DeviceState::Discharging,
            }
        );
    }
}
