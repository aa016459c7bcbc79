//! Text shown on the dashboard: countdowns, clock, greeting and summaries.

use chrono::{DateTime, TimeZone, Timelike};

use crate::transit::Coordinate;

const ON_TIME_TOLERANCE_MS: u64 = 30_000;

/// `M:SS` below an hour, `H:MM:SS` from an hour up.
///
/// Takes an unsigned count: callers decide what a past time means (see
/// [`countdown_label`]).
pub fn format_duration(milliseconds: u64) -> String {
    let hours = milliseconds / 3_600_000;
    let minutes = (milliseconds / 60_000) % 60;
    let seconds = (milliseconds / 1_000) % 60;

    if hours == 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

/// Time until `arrival_ms`, or `Gone` once it has passed.
pub fn countdown_label(arrival_ms: i64, now_ms: i64) -> String {
    let remaining = arrival_ms - now_ms;
    if remaining < 0 {
        "Gone".to_string()
    } else {
        format_duration(remaining as u64)
    }
}

/// Empty when there is no live prediction.
pub fn deviation_label(deviation_ms: Option<i64>) -> String {
    match deviation_ms {
        None => String::new(),
        Some(d) if d.unsigned_abs() < ON_TIME_TOLERANCE_MS => "On time".to_string(),
        Some(d) => format!(
            "{} {}",
            format_duration(d.unsigned_abs()),
            if d > 0 { "delay" } else { "early" }
        ),
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        18..=21 => "Good evening",
        _ => "Go to sleep",
    }
}

/// 12-hour `h:mm`, with midnight and noon shown as 12.
pub fn clock_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{}:{:02}", twelve_hour(now.hour()), now.minute())
}

pub fn date_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}

/// `16/10/2026  9:05:07 PM`, used for "last updated" lines.
pub fn timestamp_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}\t{}:{:02} {}",
        at.format("%-d/%-m/%Y"),
        clock_label(at),
        at.second(),
        if at.hour() >= 12 { "PM" } else { "AM" }
    )
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

pub fn player_summary(count: usize) -> String {
    match count {
        0 => "There are no players online.".to_string(),
        1 => "There is 1 player online.".to_string(),
        n => format!("There are {n} players online."),
    }
}

/// Link to a map centered on the given position.
pub fn map_link(position: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/place/{}{}+{}{}",
        position.latitude.abs(),
        if position.latitude >= 0.0 { "N" } else { "S" },
        position.longitude.abs(),
        if position.longitude >= 0.0 { "E" } else { "W" },
    )
}

/// Capitalizes the first character of a photo description.
pub fn photo_title(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        None => "Photo".to_string(),
        Some(d) => {
            let mut chars = d.chars();
            match chars.next() {
                Some(first) => format!("\"{}{}\"", first.to_uppercase(), chars.as_str()),
                None => "Photo".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59_000), "0:59");
        assert_eq!(format_duration(61_000), "1:01");
        assert_eq!(format_duration(3_599_999), "59:59");
        assert_eq!(format_duration(3_600_000), "1:00:00");
        assert_eq!(format_duration(3_661_000), "1:01:01");
        assert_eq!(format_duration(36_000_000 + 5_000), "10:00:05");
    }

    #[test]
    fn test_countdown_label() {
        assert_eq!(countdown_label(10_000, 20_000), "Gone");
        assert_eq!(countdown_label(20_000, 20_000), "0:00");
        assert_eq!(countdown_label(140_000, 20_000), "2:00");
    }

    #[test]
    fn test_deviation_label() {
        assert_eq!(deviation_label(None), "");
        assert_eq!(deviation_label(Some(0)), "On time");
        assert_eq!(deviation_label(Some(29_999)), "On time");
        assert_eq!(deviation_label(Some(-29_999)), "On time");
        assert_eq!(deviation_label(Some(30_000)), "0:30 delay");
        assert_eq!(deviation_label(Some(-125_000)), "2:05 early");
    }

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(greeting(0), "Go to sleep");
        assert_eq!(greeting(4), "Go to sleep");
        assert_eq!(greeting(5), "Good morning");
        assert_eq!(greeting(11), "Good morning");
        assert_eq!(greeting(12), "Good afternoon");
        assert_eq!(greeting(17), "Good afternoon");
        assert_eq!(greeting(18), "Good evening");
        assert_eq!(greeting(21), "Good evening");
        assert_eq!(greeting(22), "Go to sleep");
        assert_eq!(greeting(23), "Go to sleep");
    }

    #[test]
    fn test_clock_and_timestamp_labels() {
        let midnight = Utc.with_ymd_and_hms(2026, 10, 16, 0, 7, 3).unwrap();
        assert_eq!(clock_label(&midnight), "12:07");
        assert_eq!(timestamp_label(&midnight), "16/10/2026\t12:07:03 AM");

        let evening = Utc.with_ymd_and_hms(2026, 1, 2, 21, 30, 45).unwrap();
        assert_eq!(clock_label(&evening), "9:30");
        assert_eq!(timestamp_label(&evening), "2/1/2026\t9:30:45 PM");
        assert_eq!(date_label(&evening), "Friday, January 2, 2026");
    }

    #[test]
    fn test_player_summary() {
        assert_eq!(player_summary(0), "There are no players online.");
        assert_eq!(player_summary(1), "There is 1 player online.");
        assert_eq!(player_summary(3), "There are 3 players online.");
    }

    #[test]
    fn test_map_link_hemispheres() {
        assert_eq!(
            map_link(Coordinate::new(47.5, -122.25)),
            "https://www.google.com/maps/place/47.5N+122.25W"
        );
        assert_eq!(
            map_link(Coordinate::new(-33.5, 151.25)),
            "https://www.google.com/maps/place/33.5S+151.25E"
        );
    }

    #[test]
    fn test_photo_title() {
        assert_eq!(photo_title(None), "Photo");
        assert_eq!(photo_title(Some("  ")), "Photo");
        assert_eq!(photo_title(Some("sunset over the bay")), "\"Sunset over the bay\"");
    }
}
