//! HTML fragments for the dashboard's insertion points.
//!
//! Every string that came from an upstream API is escaped before it is
//! placed in markup.

use chrono::{DateTime, TimeZone};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::format;
use crate::sources::{BackgroundImage, ServerStatus, WeatherReport};
use crate::state::{LocationStatus, Published};
use crate::transit::ArrivalBoard;

pub fn clock<Tz: TimeZone>(now: &DateTime<Tz>, name: Option<&str>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let greeting = format::greeting(chrono::Timelike::hour(now));
    let greeting = match name {
        Some(name) => format!("{greeting}, {}.", text(name)),
        None => format!("{greeting}."),
    };
    format!(
        r#"<div class="time">{}</div><div class="date">{}</div><div class="greeting">{}</div>"#,
        format::clock_label(now),
        format::date_label(now),
        greeting
    )
}

pub fn weather(report: Option<&WeatherReport>) -> String {
    let Some(report) = report else {
        return String::new();
    };
    format!(
        concat!(
            r#"<img class="weather-icon" src="{}" alt=""/>"#,
            r#"<div class="temperature">{}°</div>"#,
            r#"<div class="temperature-range">{}° / {}°</div>"#,
            r#"<div class="weather-details">{}, {}</div>"#,
        ),
        attr(&report.icon_url),
        report.temperature,
        report.temperature_low,
        report.temperature_high,
        text(&report.place),
        text(&report.description),
    )
}

/// One heading per stop that still has something to show, then one row per
/// arrival with route, destination, deviation, vehicle and countdown.
pub fn stops(board: Option<&ArrivalBoard>, now_ms: i64, limit: usize) -> String {
    let mut html = String::new();
    let Some(board) = board else {
        return html;
    };

    for (stop, arrivals) in board.display_rows(limit) {
        html.push_str(&format!(
            r#"<h3 class="centered no-overflow-text">{}</h3>"#,
            text(&stop.title())
        ));
        for arrival in arrivals {
            html.push_str(r#"<div class="flex-row">"#);
            if let Some(route) = &arrival.route {
                html.push_str(&format!(r#"<div class="route">{}</div>"#, text(route)));
            }
            html.push_str(&format!(
                concat!(
                    r#"<div class="destination">{}</div>"#,
                    r#"<div class="deviation">{}</div>"#,
                    r#"<div class="vehicle">{}</div>"#,
                    r#"<div class="countdown">{}</div>"#,
                    "</div>"
                ),
                text(&arrival.destination),
                format::deviation_label(arrival.deviation_ms()),
                text(&arrival.vehicle_id),
                format::countdown_label(arrival.effective_arrival_ms(), now_ms),
            ));
        }
        html.push_str(r#"<div class="spacer-small"></div>"#);
    }

    html
}

pub fn server(status: Option<&ServerStatus>) -> String {
    let Some(status) = status else {
        return String::new();
    };

    let mut html = String::new();
    for dimension in &status.dimensions {
        for player in dimension {
            html.push_str(&format!(
                concat!(
                    r#"<div class="flex-row grayscale">"#,
                    r#"<img class="image-small" src="{}" alt=""/>"#,
                    r#"<div class="centered-flex-content">{}</div>"#,
                    "</div>"
                ),
                attr(&player.avatar_url()),
                text(&player.player),
            ));
        }
        html.push_str(r#"<div class="spacer-small"></div>"#);
    }
    html.push_str(&format!(
        "<h3>{}</h3>",
        format::player_summary(status.player_count())
    ));
    html
}

pub fn footer<Tz: TimeZone>(
    tz: &Tz,
    location: &LocationStatus,
    transit: Option<&Published<ArrivalBoard>>,
    image: Option<&BackgroundImage>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut html = String::new();

    if let Some(transit) = transit {
        html.push_str(&format!(
            "<div>Data last updated: {}</div>",
            format::timestamp_label(&transit.updated_at.with_timezone(tz))
        ));
    }

    if let (Some(position), Some(updated_at)) = (location.position, location.updated_at) {
        let message = if location.watching {
            format!(
                "Location last updated: {}",
                format::timestamp_label(&updated_at.with_timezone(tz))
            )
        } else {
            "Location watch stopped.".to_string()
        };
        let accuracy = match location.accuracy_m {
            Some(accuracy) => format!("Accuracy: {accuracy}m"),
            None => "Default location".to_string(),
        };
        html.push_str(&format!(
            r#"<div>{} (<a href="{}" target="_blank">{}</a>)</div>"#,
            message,
            attr(&format::map_link(position)),
            accuracy
        ));
    }

    if let Some(image) = image {
        html.push_str(&format!(
            concat!(
                r#"<div>{} by <a href="{}" target="_blank">{}</a>"#,
                r#" on <a href="{}" target="_blank">Unsplash</a></div>"#
            ),
            text(&format::photo_title(image.title.as_deref())),
            attr(&image.author_link()),
            text(&image.author),
            attr(&BackgroundImage::service_link()),
        ));
    }

    html
}
