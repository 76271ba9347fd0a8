//! Plain-text rendering of a dashboard frame.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};
use wallboard_core::config::Units;
use wallboard_core::format::{
    format_age, format_bytes, format_change_percent, format_clock, format_market_cap, format_price,
    format_speed,
};
use wallboard_core::model::{
    CryptoData, Game, GameStatus, NetworkBandwidthData, SportsData, Team, WeatherData,
};
use wallboard_core::{FetchState, FetchStatus};

use crate::widgets::{Panel, Rotating, Snapshot};

const LOADING_GLYPH: &str = "⟳";
const MAX_DEVICES_SHOWN: usize = 5;

/// Renders one frame. Hidden widgets are left out.
pub fn render(snap: &Snapshot) -> String {
    let mut out = String::new();

    if let Some(message) = &snap.banner {
        let _ = writeln!(out, "» {message}");
        out.push('\n');
    }

    if snap.widgets.clock {
        let _ = writeln!(
            out,
            "{}   {}",
            format_clock(&snap.now),
            snap.now.format("%A, %B %-d, %Y")
        );
    }
    if let Some((label, left)) = &snap.countdown {
        if left.is_zero() {
            let _ = writeln!(out, "{label}: now");
        } else {
            let _ = writeln!(out, "{label}: {left}");
        }
    }
    out.push('\n');

    if snap.widgets.weather {
        match snap.panel {
            Panel::Weather => section(&mut out, "Weather", &snap.weather, snap.now.offset(), |out, w| {
                weather_body(out, w, snap.units, snap.now.offset())
            }),
            Panel::Crypto => section(&mut out, "Crypto", &snap.crypto, snap.now.offset(), crypto_body),
        }
    }

    if snap.widgets.news {
        section(&mut out, "Sports News", &snap.news, snap.now.offset(), |out, _| {
            if let Some(Rotating { item, index, len }) = &snap.story {
                let _ = writeln!(out, "  [{}] {}  ({}/{})", item.category, item.title, index + 1, len);
                if !item.snippet.is_empty() {
                    let _ = writeln!(out, "  {}", item.snippet);
                }
                let _ = writeln!(
                    out,
                    "  {} · {}",
                    item.source,
                    format_age(item.published_at, snap.now.with_timezone(&Utc))
                );
            } else {
                let _ = writeln!(out, "  No stories");
            }
        });
    }

    if snap.widgets.sports {
        section(&mut out, "Scores", &snap.sports, snap.now.offset(), |out, data| {
            sports_body(out, data, snap.game.as_ref(), snap.now.offset())
        });
    }

    if snap.widgets.network {
        section(&mut out, "Network", &snap.network, snap.now.offset(), network_body);
    }

    out
}

/// Writes a widget header with its status lines, then the body when a value
/// is present.
fn section<T>(
    out: &mut String,
    title: &str,
    state: &FetchState<T>,
    tz: &FixedOffset,
    body: impl FnOnce(&mut String, &T),
) {
    let status = state.status();
    if status == FetchStatus::Loading {
        let _ = writeln!(out, "── {title} {LOADING_GLYPH}");
    } else {
        let _ = writeln!(out, "── {title}");
    }

    let error = state.error.as_deref().unwrap_or_default();
    match status {
        FetchStatus::Stale => {
            let _ = writeln!(out, "  ! {error}");
            let _ = writeln!(out, "  showing last available data");
        }
        FetchStatus::Failed => {
            let _ = writeln!(out, "  ! {error}");
        }
        FetchStatus::Empty => {
            let _ = writeln!(out, "  No data yet");
        }
        FetchStatus::Loading if state.value.is_none() => {
            let _ = writeln!(out, "  Loading…");
        }
        FetchStatus::Loading | FetchStatus::Ready => {}
    }

    if let Some(value) = &state.value {
        body(out, value);
    }
    if let Some(at) = state.last_updated {
        let _ = writeln!(out, "  Updated {}", format_clock(&at.with_timezone(tz)));
    }
    out.push('\n');
}

fn weather_body(out: &mut String, w: &WeatherData, units: Units, tz: &FixedOffset) {
    let deg = units.temp_suffix();
    let _ = writeln!(out, "  {}", w.location);
    let _ = writeln!(
        out,
        "  {}{deg}  {}  (feels like {}{deg})",
        w.current.temp, w.current.description, w.current.feels_like
    );
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {} {}",
        w.current.humidity,
        w.current.wind_speed,
        units.speed_suffix()
    );

    if !w.hourly.is_empty() {
        let hours: Vec<String> = w
            .hourly
            .iter()
            .map(|h| format!("{} {}°", h.time.with_timezone(tz).format("%-I%p"), h.temp))
            .collect();
        let _ = writeln!(out, "  {}", hours.join(" | "));
    }
    for day in &w.daily {
        let _ = writeln!(
            out,
            "  {}  H {}° L {}°  {}",
            day.date.format("%a %-m/%-d"),
            day.high,
            day.low,
            day.description
        );
    }
}

fn crypto_body(out: &mut String, c: &CryptoData) {
    for p in &c.prices {
        let _ = writeln!(
            out,
            "  {:<9} {:>12}  {:>8}  MCap {}",
            p.symbol,
            format_price(p.price),
            format_change_percent(p.change_percent_24h),
            format_market_cap(p.market_cap)
        );
    }
}

fn team_label(t: &Team) -> String {
    match t.rank {
        Some(rank) => format!("#{rank} {}", t.abbreviation),
        None => t.abbreviation.clone(),
    }
}

fn game_line(g: &Game, tz: &FixedOffset) -> String {
    let away = team_label(&g.away_team);
    let home = team_label(&g.home_team);
    match g.status {
        GameStatus::Scheduled => format!(
            "{away} @ {home}  {}",
            g.start_time.with_timezone(tz).format("%a %-I:%M %p")
        ),
        GameStatus::InProgress | GameStatus::Final => format!(
            "{away} {} - {} {home}  {}",
            g.away_team.score.unwrap_or(0),
            g.home_team.score.unwrap_or(0),
            g.status_detail
        ),
    }
}

fn sports_body(out: &mut String, data: &SportsData, current: Option<&Rotating<Game>>, tz: &FixedOffset) {
    let Some(Rotating { item, index, len }) = current else {
        let _ = writeln!(out, "  No games");
        return;
    };
    let live = if item.status == GameStatus::InProgress { "LIVE " } else { "" };
    let _ = writeln!(
        out,
        "  {live}[{}] {}  ({}/{})",
        item.league,
        game_line(item, tz),
        index + 1,
        len
    );
    let extra: Vec<&str> = [item.venue.as_deref(), item.broadcast.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !extra.is_empty() {
        let _ = writeln!(out, "  {}", extra.join(" · "));
    }

    let ticker: Vec<String> = data.games.iter().map(|g| game_line(g, tz)).collect();
    let _ = writeln!(out, "  {}", ticker.join("  |  "));
}

fn network_body(out: &mut String, n: &NetworkBandwidthData) {
    let _ = writeln!(
        out,
        "  {}  ↓ {}  ↑ {}",
        n.interface,
        format_speed(n.current_rates.download),
        format_speed(n.current_rates.upload)
    );
    let _ = writeln!(
        out,
        "  Today  ↓ {}  ↑ {}",
        format_bytes(n.today.download),
        format_bytes(n.today.upload)
    );
    let _ = writeln!(
        out,
        "  Month  ↓ {}  ↑ {}",
        format_bytes(n.month.download),
        format_bytes(n.month.upload)
    );
    for (i, d) in n.top_devices.iter().take(MAX_DEVICES_SHOWN).enumerate() {
        let total = d.download + d.upload;
        let usage = if total > 0 { format_bytes(total) } else { "Active".into() };
        let _ = writeln!(out, "  #{} {}  {}", i + 1, d.display_name(), usage);
    }
}
