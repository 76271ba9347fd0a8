//! Widget wiring: one refresh controller per data source, one rotation
//! sequencer per rotating widget.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use wallboard_core::config::{DashboardConfig, Units, WidgetToggles};
use wallboard_core::format::TimeLeft;
use wallboard_core::model::{
    CryptoData, Game, NetworkBandwidthData, NewsData, NewsStory, SportsData, WeatherData,
};
use wallboard_core::{FetchError, FetchState, RefreshController, RotationSequencer, RotationState};

use crate::providers::Providers;

/// What the shared weather/crypto panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Weather,
    Crypto,
}

/// The rotating item currently on screen and its place in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotating<I> {
    pub item: I,
    pub index: usize,
    pub len: usize,
}

impl<I: Clone + PartialEq> Rotating<I> {
    fn from_state(state: &RotationState<I>) -> Option<Self> {
        let (index, len) = state.position()?;
        Some(Self {
            item: state.current()?.clone(),
            index,
            len,
        })
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub now: DateTime<FixedOffset>,
    pub units: Units,
    pub widgets: WidgetToggles,
    pub banner: Option<String>,
    pub countdown: Option<(String, TimeLeft)>,
    pub panel: Panel,
    pub weather: FetchState<WeatherData>,
    pub crypto: FetchState<CryptoData>,
    pub news: FetchState<NewsData>,
    pub story: Option<Rotating<NewsStory>>,
    pub sports: FetchState<SportsData>,
    pub game: Option<Rotating<Game>>,
    pub network: FetchState<NetworkBandwidthData>,
}

pub struct Dashboard {
    config: Arc<DashboardConfig>,
    weather: RefreshController<WeatherData>,
    crypto: RefreshController<CryptoData>,
    sports: RefreshController<SportsData>,
    news: RefreshController<NewsData>,
    network: RefreshController<NetworkBandwidthData>,
    banner: RotationSequencer<String>,
    panel: RotationSequencer<Panel>,
    stories: RotationSequencer<NewsStory>,
    games: RotationSequencer<Game>,
}

fn controller<T, F, Fut>(
    name: &str,
    providers: &Providers,
    interval_ms: i64,
    enabled: bool,
    fetch: F,
) -> RefreshController<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Providers) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    let providers = providers.clone();
    RefreshController::new(name, move || fetch(providers.clone()), interval_ms, enabled)
}

impl Dashboard {
    /// Wires every widget. Must be called inside a tokio runtime; rotation
    /// timers start immediately, fetching starts on [`Dashboard::start`].
    pub fn new(config: Arc<DashboardConfig>, providers: Providers) -> Self {
        let refresh = &config.refresh;
        let widgets = &config.widgets;
        let rotation = &config.rotation;

        // Crypto shares the weather panel and its toggle.
        let weather = controller("weather", &providers, refresh.weather_ms, widgets.weather, |p| async move {
            p.weather().await
        });
        let crypto = controller("crypto", &providers, refresh.crypto_ms, widgets.weather, |p| async move {
            p.crypto().await
        });
        let sports = controller("sports", &providers, refresh.sports_ms, widgets.sports, |p| async move {
            p.sports().await
        });
        let news = controller("news", &providers, refresh.news_ms, widgets.news, |p| async move {
            p.news().await
        });
        let network = controller("network", &providers, refresh.network_ms, widgets.network, |p| async move {
            p.network().await
        });

        let panel_items = if widgets.weather {
            vec![Panel::Weather, Panel::Crypto]
        } else {
            Vec::new()
        };

        Self {
            banner: RotationSequencer::new(rotation.banner_ms, config.banner_messages.clone()),
            panel: RotationSequencer::new(rotation.panel_ms, panel_items),
            stories: RotationSequencer::empty(rotation.news_ms),
            games: RotationSequencer::empty(rotation.sports_ms),
            weather,
            crypto,
            sports,
            news,
            network,
            config,
        }
    }

    /// Starts every enabled controller.
    pub fn start(&mut self) {
        self.weather.start();
        self.crypto.start();
        self.sports.start();
        self.news.start();
        self.network.start();
    }

    /// Stops all fetching and rotation.
    pub fn stop(&mut self) {
        self.weather.stop();
        self.crypto.stop();
        self.sports.stop();
        self.news.stop();
        self.network.stop();
        self.banner.dispose();
        self.panel.dispose();
        self.stories.dispose();
        self.games.dispose();
    }

    /// Resolves once every enabled source has finished at least one fetch.
    pub async fn settled(&self) {
        settle(&self.weather).await;
        settle(&self.crypto).await;
        settle(&self.sports).await;
        settle(&self.news).await;
        settle(&self.network).await;
    }

    /// Feeds the rotating widgets from the latest values and captures a frame.
    pub fn snapshot(&self, now: DateTime<FixedOffset>) -> Snapshot {
        let news = self.news.state();
        let sports = self.sports.state();

        self.stories.set_items(
            news.value
                .as_ref()
                .map(|n| n.stories.clone())
                .unwrap_or_default(),
        );
        self.games.set_items(
            sports
                .value
                .as_ref()
                .map(|s| s.games.clone())
                .unwrap_or_default(),
        );

        let countdown = self.config.countdown.as_ref().map(|target| {
            (
                target.label.clone(),
                TimeLeft::until(target.at, now.with_timezone(&Utc)),
            )
        });

        Snapshot {
            now,
            units: self.config.weather.units,
            widgets: self.config.widgets.clone(),
            banner: self.banner.current(),
            countdown,
            panel: self.panel.current().unwrap_or(Panel::Weather),
            weather: self.weather.state(),
            crypto: self.crypto.state(),
            story: Rotating::from_state(&self.stories.snapshot()),
            news,
            game: Rotating::from_state(&self.games.snapshot()),
            sports,
            network: self.network.state(),
        }
    }
}

async fn settle<T: Clone + Send + Sync + 'static>(ctl: &RefreshController<T>) {
    if !ctl.is_started() {
        return;
    }
    let mut rx = ctl.subscribe();
    let done = rx
        .wait_for(|st| !st.is_loading && (st.value.is_some() || st.error.is_some()))
        .await;
    if done.is_err() {
        tracing::debug!(source = ctl.name(), "controller dropped before settling");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::time::Duration;

    fn story(id: &str) -> NewsStory {
        NewsStory {
            id: id.into(),
            title: format!("Story {id}"),
            snippet: String::new(),
            source: "ESPN".into(),
            category: "NFL".into(),
            published_at: Utc.with_ymd_and_hms(2025, 12, 22, 15, 0, 0).unwrap(),
            image_url: None,
        }
    }

    fn idle<T: Clone + Send + Sync + 'static>(name: &str) -> RefreshController<T> {
        RefreshController::new(name, || async { Err::<T, String>("disabled".into()) }, 0, false)
    }

    fn dashboard(news: RefreshController<NewsData>) -> Dashboard {
        Dashboard {
            config: Arc::new(DashboardConfig::default()),
            weather: idle("weather"),
            crypto: idle("crypto"),
            sports: idle("sports"),
            news,
            network: idle("network"),
            banner: RotationSequencer::empty(0),
            panel: RotationSequencer::new(0, vec![Panel::Weather, Panel::Crypto]),
            stories: RotationSequencer::empty(0),
            games: RotationSequencer::empty(0),
        }
    }

    fn now() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2025, 12, 22, 15, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    async fn settle_tasks() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_keeps_story_index_until_list_changes() {
        let feed = Arc::new(Mutex::new(vec![story("a"), story("b"), story("c")]));
        let source = Arc::clone(&feed);
        let mut news = RefreshController::new(
            "news",
            move || {
                let stories = source.lock().unwrap().clone();
                async move { Ok::<_, String>(NewsData { stories }) }
            },
            0,
            true,
        );
        news.start();
        settle_tasks().await;
        let dash = dashboard(news);

        let first = dash.snapshot(now()).story.unwrap();
        assert_eq!((first.item.id.as_str(), first.index, first.len), ("a", 0, 3));

        dash.stories.tick();
        let rotated = dash.snapshot(now()).story.unwrap();
        assert_eq!((rotated.item.id.as_str(), rotated.index), ("b", 1));

        // Same stories on the next frame: no reset.
        let again = dash.snapshot(now()).story.unwrap();
        assert_eq!((again.item.id.as_str(), again.index), ("b", 1));

        // A refetch returning identical content keeps the position too.
        assert!(dash.news.refetch_now());
        settle_tasks().await;
        let same = dash.snapshot(now()).story.unwrap();
        assert_eq!(same.index, 1);

        *feed.lock().unwrap() = vec![story("d"), story("e")];
        assert!(dash.news.refetch_now());
        settle_tasks().await;
        let reset = dash.snapshot(now()).story.unwrap();
        assert_eq!((reset.item.id.as_str(), reset.index, reset.len), ("d", 0, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_without_values_has_no_rotating_items() {
        let dash = dashboard(idle("news"));
        dash.panel.tick();

        let snap = dash.snapshot(now());
        assert!(snap.story.is_none());
        assert!(snap.game.is_none());
        assert!(snap.banner.is_none());
        assert_eq!(snap.panel, Panel::Crypto);
        assert!(snap.countdown.is_none());
    }
}
