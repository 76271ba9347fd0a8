//! Human-readable formatting for widget text.

use chrono::{DateTime, TimeZone, Utc};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const SPEED_UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];

fn scale_1024(value: u64, units: &[&str]) -> String {
    if value == 0 {
        return format!("0 {}", units[0]);
    }
    let mut scaled = value as f64;
    let mut idx = 0;
    while scaled >= 1024.0 && idx + 1 < units.len() {
        scaled /= 1024.0;
        idx += 1;
    }
    let rounded = (scaled * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {}", units[idx])
    } else {
        format!("{rounded:.1} {}", units[idx])
    }
}

/// `1536` -> `"1.5 KB"`. Base 1024, one decimal, trailing `.0` dropped.
pub fn format_bytes(bytes: u64) -> String {
    scale_1024(bytes, &BYTE_UNITS)
}

/// Bytes per second, e.g. `"2.3 MB/s"`.
pub fn format_speed(bytes_per_sec: u64) -> String {
    scale_1024(bytes_per_sec, &SPEED_UNITS)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn usd(value: f64, decimals: usize, min_decimals: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, String::new()),
    };
    let mut frac = frac_part;
    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }
    if frac.is_empty() {
        format!("{sign}${}", group_thousands(&int_part))
    } else {
        format!("{sign}${}.{frac}", group_thousands(&int_part))
    }
}

/// Coin price in USD. Whole dollars from $1,000, cents from $1, and four
/// to six decimals below that.
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        usd(price, 0, 0)
    } else if price >= 1.0 {
        usd(price, 2, 2)
    } else {
        usd(price, 6, 4)
    }
}

/// `$1.23T` / `$4.56B` / `$7.89M`, else whole dollars.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e12 {
        format!("${:.2}T", market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("${:.2}M", market_cap / 1e6)
    } else {
        usd(market_cap, 0, 0)
    }
}

/// Signed percentage with two decimals, e.g. `"+2.50%"`.
pub fn format_change_percent(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

/// 12-hour clock time, e.g. `"3:07 PM"`.
pub fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I:%M %p").to_string()
}

/// Coarse age of a timestamp, e.g. `"3h ago"`.
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Whole days/hours/minutes/seconds until a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Time from `now` until `target`; all zero once the target has passed.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (target - now).num_seconds();
        if total <= 0 {
            return Self::default();
        }
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    /// Whether the target has been reached.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_speed(0), "0 B/s");
        assert_eq!(format_speed(2_411_724), "2.3 MB/s");
    }

    #[test]
    fn price_precision_depends_on_magnitude() {
        assert_eq!(format_price(97_123.45), "$97,123");
        assert_eq!(format_price(3_456.7), "$3,457");
        assert_eq!(format_price(2.5), "$2.50");
        assert_eq!(format_price(0.5), "$0.5000");
        assert_eq!(format_price(0.012_345_67), "$0.012346");
    }

    #[test]
    fn market_cap_suffixes() {
        assert_eq!(format_market_cap(1.92e12), "$1.92T");
        assert_eq!(format_market_cap(4.5e9), "$4.50B");
        assert_eq!(format_market_cap(7_890_000.0), "$7.89M");
        assert_eq!(format_market_cap(12_345.0), "$12,345");
    }

    #[test]
    fn change_percent_is_signed() {
        assert_eq!(format_change_percent(2.5), "+2.50%");
        assert_eq!(format_change_percent(-0.126), "-0.13%");
    }

    #[test]
    fn time_left_breaks_down_and_clamps() {
        let now = Utc::now();
        let target = now + Duration::days(2) + Duration::hours(3) + Duration::seconds(65);
        let left = TimeLeft::until(target, now);
        assert_eq!(
            left,
            TimeLeft {
                days: 2,
                hours: 3,
                minutes: 1,
                seconds: 5
            }
        );
        assert_eq!(left.to_string(), "2d 03h 01m 05s");
        assert!(TimeLeft::until(now - Duration::seconds(1), now).is_zero());
    }

    #[test]
    fn age_is_coarse() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(5), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(42), now), "42m ago");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_age(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn clock_is_twelve_hour() {
        let at = Utc.with_ymd_and_hms(2025, 12, 22, 15, 7, 0).unwrap();
        assert_eq!(format_clock(&at), "3:07 PM");
    }
}
