/// Shown when there is no reading at all.
pub const MISSING_ICON: &str = "battery-missing-symbolic";

/// Nearest multiple of ten for a percentage, after clamping to `0..=100`.
pub fn icon_level(percent: u8) -> u8 {
    let p = percent.min(100);
    (p + 5) / 10 * 10
}

/// Symbolic icon name for a battery level, e.g. `battery-level-40-symbolic`
/// or `battery-level-40-charging-symbolic`.
pub fn icon_name(percent: u8, charging: bool) -> String {
    let level = icon_level(percent);
    if charging {
        format!("battery-level-{level}-charging-symbolic")
    } else {
        format!("battery-level-{level}-symbolic")
    }
}
