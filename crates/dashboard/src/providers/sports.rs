use reqwest::Client;
use serde::Deserialize;
use wallboard_core::config::{LeagueFeed, SportsConfig};
use wallboard_core::model::{Game, GameStatus, SportsData, Team};
use wallboard_core::{now_utc, FetchError};

use super::{endpoint, get_json, parse_time};

/// ESPN marks unranked teams with 99.
const UNRANKED: u32 = 99;

#[derive(Debug, Default, Deserialize)]
pub struct Scoreboard {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct Event {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    pub status: CompetitionStatus,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub broadcasts: Vec<Broadcast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub home_away: String,
    #[serde(default)]
    pub score: Option<String>,
    pub team: EspnTeam,
    #[serde(default)]
    pub curated_rank: Option<CuratedRank>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CuratedRank {
    pub current: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CompetitionStatus {
    #[serde(rename = "type")]
    pub kind: StatusType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusType {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub short_detail: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Broadcast {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Fetches every configured scoreboard. A failing feed is skipped; the
/// cycle fails only when all of them do.
pub async fn fetch(client: &Client, cfg: &SportsConfig) -> Result<SportsData, FetchError> {
    let mut handles = Vec::with_capacity(cfg.leagues.len());
    for league in &cfg.leagues {
        let url = endpoint(
            &cfg.base_url,
            &format!("{}/scoreboard", league.path),
            &[("limit", cfg.limit.to_string())],
        )?;
        let client = client.clone();
        handles.push(tokio::spawn(
            async move { get_json::<Scoreboard>(&client, url).await },
        ));
    }

    let mut games = Vec::new();
    let mut succeeded = 0usize;
    for (league, handle) in cfg.leagues.iter().zip(handles) {
        let res = handle
            .await
            .map_err(|e| FetchError::Http(format!("feed task failed: {e}")))
            .and_then(|r| r);
        match res {
            Ok(board) => {
                succeeded += 1;
                games.extend(parse_scoreboard(board, league));
            }
            Err(e) => tracing::warn!(league = %league.label, error = %e, "scoreboard feed failed"),
        }
    }

    if succeeded == 0 && !cfg.leagues.is_empty() {
        return Err(FetchError::AllSourcesFailed("scoreboard"));
    }

    Ok(SportsData {
        games: rank_games(games, cfg.max_games),
        fetched_at: now_utc(),
    })
}

/// Maps one league's events. Events missing a competition, either side, or
/// a readable start time are dropped.
pub fn parse_scoreboard(board: Scoreboard, league: &LeagueFeed) -> Vec<Game> {
    board
        .events
        .into_iter()
        .filter_map(|event| {
            let game = parse_event(event, league);
            if game.is_none() {
                tracing::debug!(league = %league.label, "skipping incomplete event");
            }
            game
        })
        .collect()
}

fn parse_event(event: Event, league: &LeagueFeed) -> Option<Game> {
    let start_time = parse_time(&event.date)?;
    let mut competition = event.competitions.into_iter().next()?;

    let status = match competition.status.kind.state.as_str() {
        "in" => GameStatus::InProgress,
        "post" => GameStatus::Final,
        _ => GameStatus::Scheduled,
    };

    let home_idx = competition.competitors.iter().position(|c| c.home_away == "home")?;
    let home = competition.competitors.swap_remove(home_idx);
    let away_idx = competition.competitors.iter().position(|c| c.home_away == "away")?;
    let away = competition.competitors.swap_remove(away_idx);

    Some(Game {
        id: event.id,
        sport: league.sport,
        league: league.label.clone(),
        status,
        status_detail: competition.status.kind.short_detail,
        home_team: team(home, status),
        away_team: team(away, status),
        start_time,
        venue: competition.venue.and_then(|v| v.full_name),
        broadcast: competition
            .broadcasts
            .into_iter()
            .next()
            .and_then(|b| b.names.into_iter().next()),
    })
}

fn team(c: Competitor, status: GameStatus) -> Team {
    // Scheduled games report "0"; no score until kickoff.
    let score = match status {
        GameStatus::Scheduled => None,
        _ => c.score.as_deref().and_then(|s| s.trim().parse().ok()),
    };
    Team {
        id: c.team.id,
        name: c
            .team
            .display_name
            .or(c.team.name)
            .unwrap_or_else(|| c.team.abbreviation.clone()),
        abbreviation: c.team.abbreviation,
        logo: c.team.logo,
        score,
        rank: c
            .curated_rank
            .and_then(|r| r.current)
            .filter(|r| *r > 0 && *r < UNRANKED),
    }
}

/// In-progress games first, then by start time; keeps the first `max`.
pub fn rank_games(mut games: Vec<Game>, max: usize) -> Vec<Game> {
    games.sort_by_key(|g| (g.status != GameStatus::InProgress, g.start_time));
    games.truncate(max);
    games
}
