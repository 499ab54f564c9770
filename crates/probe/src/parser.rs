use regex::Regex;
use rivalbat_core::{ChargeState, ParsedStatus};
use std::sync::OnceLock;

// First 1–3 digit run that is `100` or at most two digits, not preceded by a
// digit, followed by `%` (optionally spaced) or an ASCII word boundary, so a
// non-ASCII letter right after the number still ends it.
fn percent_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])(100|[0-9]?[0-9])(?:\s*%|(?-u:\b))").expect("percent pattern is valid")
    })
}

fn discharging_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?-u:\b)discharging(?-u:\b)").expect("discharging pattern is valid"))
}

fn charging_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?-u:\b)charging(?-u:\b)").expect("charging pattern is valid"))
}

/// Extract a battery reading from free-form tool output.
///
/// Accepts whatever `rivalcfg` and user scripts tend to print, e.g.
/// `"Discharging [========= ] 95 %"`, `"Battery level: 90%"` or a bare `"90"`.
/// Returns `None` when no percentage-like token is present.
pub fn parse(text: &str) -> Option<ParsedStatus> {
    let caps = percent_pattern().captures(text)?;
    let percent = caps[1].parse::<u8>().ok().filter(|p| *p <= 100)?;

    Some(ParsedStatus::new(percent, charge_state(text)))
}

/// Whole-word, case-insensitive; "discharging" wins over "charging".
pub fn charge_state(text: &str) -> ChargeState {
    if discharging_pattern().is_match(text) {
        ChargeState::Discharging
    } else if charging_pattern().is_match(text) {
        ChargeState::Charging
    } else {
        ChargeState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(percent: u8, charge_state: ChargeState) -> Option<ParsedStatus> {
        Some(ParsedStatus { percent, charge_state })
    }

    #[test]
    fn rivalcfg_discharging_bar() {
        assert_eq!(
            parse("Discharging [===== ] 40 %"),
            status(40, ChargeState::Discharging)
        );
    }

    #[test]
    fn rivalcfg_charging_bar() {
        assert_eq!(
            parse("Charging [========= ] 95 %"),
            status(95, ChargeState::Charging)
        );
    }

    #[test]
    fn labelled_level_without_state() {
        assert_eq!(parse("Battery level: 90%"), status(90, ChargeState::Unknown));
    }

    #[test]
    fn bare_number() {
        assert_eq!(parse("90"), status(90, ChargeState::Unknown));
        assert_eq!(parse("0"), status(0, ChargeState::Unknown));
        assert_eq!(parse("100%"), status(100, ChargeState::Unknown));
    }

    #[test]
    fn empty_and_digit_free_text_do_not_match() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("Charging"), None);
        assert_eq!(parse("No mouse found"), None);
        assert_eq!(parse("error: device not supported"), None);
    }

    #[test]
    fn numbers_above_one_hundred_are_rejected() {
        assert_eq!(parse("101"), None);
        assert_eq!(parse("1000 %"), None);
        assert_eq!(parse("level 250%"), None);
    }

    #[test]
    fn first_qualifying_number_wins() {
        assert_eq!(parse("400 then 30% then 70%"), status(30, ChargeState::Unknown));
        assert_eq!(parse("12% 80%"), status(12, ChargeState::Unknown));
    }

    #[test]
    fn does_not_match_inside_a_larger_number() {
        // "95" is one token; "5" alone must never be picked.
        assert_eq!(parse("x95%"), status(95, ChargeState::Unknown));
        assert_eq!(parse("1995 and 7"), status(7, ChargeState::Unknown));
    }

    #[test]
    fn digits_followed_by_letters_are_skipped() {
        assert_eq!(parse("60a then 70%"), status(70, ChargeState::Unknown));
    }

    #[test]
    fn non_ascii_letters_end_a_token() {
        assert_eq!(parse("90é"), status(90, ChargeState::Unknown));
        assert_eq!(parse("Batterie 45µ"), status(45, ChargeState::Unknown));
        assert_eq!(charge_state("éCharging"), ChargeState::Charging);
    }

    #[test]
    fn discharging_is_not_read_as_charging() {
        assert_eq!(charge_state("DISCHARGING"), ChargeState::Discharging);
        assert_eq!(charge_state("was charging, now discharging"), ChargeState::Discharging);
        assert_eq!(charge_state("Charging"), ChargeState::Charging);
        assert_eq!(charge_state("recharging"), ChargeState::Unknown);
        assert_eq!(charge_state("charged"), ChargeState::Unknown);
    }

    #[test]
    fn every_percentage_round_trips_through_text() {
        for p in 0..=100u8 {
            assert_eq!(parse(&format!("{p}%")), status(p, ChargeState::Unknown));
            assert_eq!(
                parse(&format!("Charging [==] {p} %")),
                status(p, ChargeState::Charging)
            );
        }
    }

    #[test]
    fn parsing_is_idempotent() {
        for text in ["Discharging 40 %", "garbage", "", "Charging 100%", "7"] {
            assert_eq!(parse(text), parse(text));
        }
    }
}
