use crate::icon::{icon_name, MISSING_ICON};
use chrono::{DateTime, Local};
use rivalbat_core::{BatteryStatus, DeviceState, Source};
use serde::Serialize;

/// Longest raw-output preview shown for unrecognized command output.
pub const PREVIEW_CHARS: usize = 80;

/// Readings at or below this level get the `low` class when not charging.
const LOW_PERCENT: u8 = 15;

/// Everything a bar needs to draw the indicator.  Serialises to the JSON
/// shape consumed by bar custom modules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    /// Short label, `"40%"` or `"--%"`.
    pub text: String,
    /// Diagnostic line naming the source of the reading.
    pub tooltip: String,
    /// Symbolic icon name.
    pub icon: String,
    /// Styling hint.
    pub class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
    /// Screen-reader friendly summary.
    pub accessible_name: String,
    /// When the underlying refresh finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Local>>,
}

impl IndicatorView {
    pub fn from_status(status: &BatteryStatus) -> Self {
        match status {
            BatteryStatus::Reported { source, percent, state } => {
                reported(*source, *percent, *state)
            }
            BatteryStatus::Unrecognized { source, raw } => Self {
                text: "--%".into(),
                tooltip: format!("{}: Unrecognized → {}", source.label(), preview(raw)),
                icon: MISSING_ICON.into(),
                class: "unrecognized",
                source: Some(*source),
                percentage: None,
                accessible_name: "Battery Indicator: unknown".into(),
                updated: None,
            },
            BatteryStatus::NoBattery { rivalcfg_location } => {
                let hint = match rivalcfg_location {
                    Some(path) => format!("rivalcfg found at {path}"),
                    None => "rivalcfg not found in PATH".to_string(),
                };
                Self {
                    text: "--%".into(),
                    tooltip: format!("No battery detected ({hint})"),
                    icon: MISSING_ICON.into(),
                    class: "missing",
                    source: None,
                    percentage: None,
                    accessible_name: "Battery Indicator: no battery".into(),
                    updated: None,
                }
            }
        }
    }

    /// Stamp the view with the time its refresh completed.
    pub fn at(mut self, time: DateTime<Local>) -> Self {
        self.updated = Some(time);
        self
    }

    /// Equality ignoring the timestamp, used to suppress duplicate output.
    pub fn same_content(&self, other: &Self) -> bool {
        Self { updated: None, ..self.clone() } == Self { updated: None, ..other.clone() }
    }
}

fn reported(source: Source, percent: u8, state: DeviceState) -> IndicatorView {
    let percent = percent.min(100);
    let charging = state.is_charging();
    let class = if charging {
        "charging"
    } else if percent <= LOW_PERCENT {
        "low"
    } else {
        "discharging"
    };

    IndicatorView {
        text: format!("{percent}%"),
        tooltip: format!("{}: {percent}% · {}", source.label(), state.text()),
        icon: icon_name(percent, charging),
        class,
        source: Some(source),
        percentage: Some(percent),
        accessible_name: format!("Battery Indicator: {percent}%"),
        updated: None,
    }
}

/// First [`PREVIEW_CHARS`] characters of `raw`, with `…` when cut.
fn preview(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rivalcfg_reading() {
        let view = IndicatorView::from_status(&BatteryStatus::Reported {
            source: Source::Rivalcfg,
            percent: 40,
            state: DeviceState::Discharging,
        });
        assert_eq!(view.text, "40%");
        assert_eq!(view.tooltip, "Rivalcfg: 40% · Discharging");
        assert_eq!(view.icon, "battery-level-40-symbolic");
        assert_eq!(view.class, "discharging");
        assert_eq!(view.accessible_name, "Battery Indicator: 40%");
    }

    #[test]
    fn system_reading_while_charging() {
        let view = IndicatorView::from_status(&BatteryStatus::Reported {
            source: Source::System,
            percent: 8,
            state: DeviceState::PendingCharge,
        });
        assert_eq!(view.tooltip, "System: 8% · Charging");
        assert_eq!(view.icon, "battery-level-10-charging-symbolic");
        assert_eq!(view.class, "charging");
    }

    #[test]
    fn low_battery_class() {
        let view = IndicatorView::from_status(&BatteryStatus::Reported {
            source: Source::Script,
            percent: 12,
            state: DeviceState::Unknown,
        });
        assert_eq!(view.class, "low");
        assert_eq!(view.tooltip, "Script: 12% · Unknown");
    }

    #[test]
    fn unrecognized_output_is_previewed() {
        let raw = "x".repeat(120);
        let view = IndicatorView::from_status(&BatteryStatus::Unrecognized {
            source: Source::Rivalcfg,
            raw,
        });
        let expected = format!("Rivalcfg: Unrecognized → {}…", "x".repeat(80));
        assert_eq!(view.tooltip, expected);
        assert_eq!(view.icon, MISSING_ICON);
        assert_eq!(view.text, "--%");
    }

    #[test]
    fn short_output_is_not_truncated() {
        assert_eq!(preview("No mouse found"), "No mouse found");
        assert_eq!(preview(&"é".repeat(80)), "é".repeat(80));
        assert_eq!(preview(&"é".repeat(81)), format!("{}…", "é".repeat(80)));
    }

    #[test]
    fn no_battery_mentions_rivalcfg_location() {
        let view = IndicatorView::from_status(&BatteryStatus::NoBattery {
            rivalcfg_location: None,
        });
        assert_eq!(view.tooltip, "No battery detected (rivalcfg not found in PATH)");
        assert_eq!(view.class, "missing");

        let view = IndicatorView::from_status(&BatteryStatus::NoBattery {
            rivalcfg_location: Some("/opt/venv/bin/rivalcfg".into()),
        });
        assert_eq!(
            view.tooltip,
            "No battery detected (rivalcfg found at /opt/venv/bin/rivalcfg)"
        );
    }

    #[test]
    fn timestamp_does_not_affect_content_equality() {
        let status = BatteryStatus::Reported {
            source: Source::Rivalcfg,
            percent: 70,
            state: DeviceState::Charging,
        };
        let a = IndicatorView::from_status(&status).at(Local.timestamp_opt(0, 0).unwrap());
        let b = IndicatorView::from_status(&status).at(Local.timestamp_opt(60, 0).unwrap());
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn serialises_for_bar_modules() {
        let view = IndicatorView::from_status(&BatteryStatus::Reported {
            source: Source::Rivalcfg,
            percent: 40,
            state: DeviceState::Discharging,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["text"], "40%");
        assert_eq!(json["source"], "rivalcfg");
        assert_eq!(json["percentage"], 40);
        assert!(json.get("updated").is_none());
    }
}
