//! Background fetching
//!
//! Every network call runs in its own tokio task and reports back to the UI
//! loop through an mpsc channel, so the loop never waits on the network.
//! The UI drains the channel once per tick with [`Fetcher::try_recv`].

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::data::{
    Coordinate, Geolocator, NewsArticle, NewsClient, NewsError, NewsTopic, WeatherClient,
    WeatherError, WeatherReport,
};
use crate::map::{MapError, TileClient, TileRequest};
use crate::search::{SuggestionRequest, WeatherRequest};

/// Cities listed in the "Most Viewed" section, in display order
pub const POPULAR_CITIES: [&str; 6] = ["Toronto", "Ottawa", "Paris", "London", "New York", "Tokyo"];

/// Work the UI asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Weather for a searched city
    Search(WeatherRequest),
    Suggestions(SuggestionRequest),
    MostViewed,
    CurrentLocation,
    /// News for each listed topic, fetched concurrently
    News {
        topics: Vec<NewsTopic>,
        /// Skip fresh cache entries
        refresh: bool,
    },
    /// One-shot position lookup for the map
    Locate,
    Tile(TileRequest),
}

/// Results sent from background tasks to the UI loop
#[derive(Debug)]
pub enum FetchMessage {
    Search {
        generation: u64,
        result: Result<WeatherReport, WeatherError>,
    },
    Suggestions {
        generation: u64,
        result: Result<Vec<String>, WeatherError>,
    },
    /// Reports for the popular cities that loaded
    MostViewed(Result<Vec<WeatherReport>, WeatherError>),
    CurrentLocation(Result<WeatherReport, WeatherError>),
    News {
        topic: NewsTopic,
        result: Result<Vec<NewsArticle>, NewsError>,
    },
    /// `None` when the lookup failed, timed out or is disabled
    Located(Option<Coordinate>),
    Tile {
        request: TileRequest,
        /// Tile size in bytes
        result: Result<usize, MapError>,
    },
}

/// API clients used by the background tasks
#[derive(Debug, Clone)]
pub struct Clients {
    pub weather: WeatherClient,
    pub news: NewsClient,
    pub tiles: TileClient,
    /// `None` disables the position lookup
    pub geolocator: Option<Geolocator>,
}

impl Clients {
    pub fn new(base_url: &str, news: NewsClient, geolocator: Option<Geolocator>) -> Self {
        Self {
            weather: WeatherClient::new(base_url),
            news,
            tiles: TileClient::new(base_url),
            geolocator,
        }
    }
}

/// Spawns fetch tasks and collects their results
pub struct Fetcher {
    clients: Clients,
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
    /// In-flight search; a new search aborts it
    search_task: Option<JoinHandle<()>>,
    /// In-flight suggestion lookup; a new lookup aborts it
    suggestion_task: Option<JoinHandle<()>>,
}

impl Fetcher {
    pub fn new(clients: Clients) -> Self {
        let (sender, receiver) = mpsc::channel(64);
        Self {
            clients,
            sender,
            receiver,
            search_task: None,
            suggestion_task: None,
        }
    }

    /// Starts the work for a command in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatching");
        let tx = self.sender.clone();

        match command {
            Command::Search(request) => {
                let client = self.clients.weather.clone();
                let handle = tokio::spawn(async move {
                    let result = client.fetch_weather(&request.city).await;
                    let _ = tx
                        .send(FetchMessage::Search {
                            generation: request.generation,
                            result,
                        })
                        .await;
                });
                replace_task(&mut self.search_task, handle);
            }
            Command::Suggestions(request) => {
                let client = self.clients.weather.clone();
                let handle = tokio::spawn(async move {
                    let result = client.search_suggestions(&request.query).await;
                    let _ = tx
                        .send(FetchMessage::Suggestions {
                            generation: request.generation,
                            result,
                        })
                        .await;
                });
                replace_task(&mut self.suggestion_task, handle);
            }
            Command::MostViewed => {
                let client = self.clients.weather.clone();
                tokio::spawn(async move {
                    let results =
                        join_all(POPULAR_CITIES.iter().map(|city| client.fetch_weather(city))).await;
                    let _ = tx
                        .send(FetchMessage::MostViewed(collect_popular(results)))
                        .await;
                });
            }
            Command::CurrentLocation => {
                let client = self.clients.weather.clone();
                tokio::spawn(async move {
                    let result = client.fetch_user_location().await;
                    let _ = tx.send(FetchMessage::CurrentLocation(result)).await;
                });
            }
            Command::News { topics, refresh } => {
                let client = self.clients.news.clone();
                tokio::spawn(async move {
                    let results = join_all(topics.iter().map(|topic| {
                        let client = &client;
                        async move {
                            if refresh {
                                client.refresh_news(*topic).await
                            } else {
                                client.fetch_news(*topic).await
                            }
                        }
                    }))
                    .await;
                    for (topic, result) in topics.into_iter().zip(results) {
                        let _ = tx.send(FetchMessage::News { topic, result }).await;
                    }
                });
            }
            Command::Locate => {
                let geolocator = self.clients.geolocator.clone();
                tokio::spawn(async move {
                    let position = match geolocator {
                        Some(geolocator) => Some(geolocator.locate_or_default().await),
                        None => None,
                    };
                    let _ = tx.send(FetchMessage::Located(position)).await;
                });
            }
            Command::Tile(request) => {
                let client = self.clients.tiles.clone();
                tokio::spawn(async move {
                    let result = client
                        .fetch_tile(request.overlay, request.tile)
                        .await
                        .map(|bytes| bytes.len());
                    let _ = tx.send(FetchMessage::Tile { request, result }).await;
                });
            }
        }
    }

    /// Checks for a finished fetch without blocking
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next finished fetch
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        self.receiver.recv().await
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        for task in [self.search_task.take(), self.suggestion_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}

/// Keeps the cities that loaded; fails only when none did
fn collect_popular(
    results: Vec<Result<WeatherReport, WeatherError>>,
) -> Result<Vec<WeatherReport>, WeatherError> {
    let mut reports = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(error = %e, "popular city failed to load");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if reports.is_empty() => Err(e),
        _ => Ok(reports),
    }
}

fn replace_task(slot: &mut Option<JoinHandle<()>>, handle: JoinHandle<()>) {
    if let Some(previous) = slot.replace(handle) {
        previous.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{TileCoord, WeatherOverlay};

    /// Clients pointed at a closed local port
    fn offline_clients(geolocator: Option<Geolocator>) -> Clients {
        let base_url = "http://127.0.0.1:9";
        Clients::new(base_url, NewsClient::new(base_url), geolocator)
    }

    #[tokio::test]
    async fn test_disabled_geolocation_reports_none() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        fetcher.dispatch(Command::Locate);

        assert!(matches!(fetcher.recv().await, Some(FetchMessage::Located(None))));
    }

    #[tokio::test]
    async fn test_failed_geolocation_falls_back_to_default() {
        let geolocator = Geolocator::new().with_endpoint("http://127.0.0.1:9/json/");
        let mut fetcher = Fetcher::new(offline_clients(Some(geolocator)));
        fetcher.dispatch(Command::Locate);

        match fetcher.recv().await {
            Some(FetchMessage::Located(Some(position))) => {
                assert_eq!(position, Coordinate::DEFAULT)
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    fn report(city: &str) -> WeatherReport {
        serde_json::from_str(&format!(r#"{{"city_name": "{city}", "temperature": 12}}"#)).unwrap()
    }

    #[test]
    fn test_popular_cities_keep_partial_results() {
        let reports = collect_popular(vec![
            Ok(report("Toronto")),
            Err(WeatherError::NotFound("City not found".into())),
            Ok(report("Tokyo")),
        ])
        .unwrap();

        let names: Vec<_> = reports.iter().map(|r| r.city_name.as_str()).collect();
        assert_eq!(names, vec!["Toronto", "Tokyo"]);
    }

    #[test]
    fn test_popular_cities_fail_when_none_load() {
        let result = collect_popular(vec![
            Err(WeatherError::NotFound("first".into())),
            Err(WeatherError::NotFound("second".into())),
        ]);
        assert!(matches!(result, Err(WeatherError::NotFound(msg)) if msg == "first"));
        assert!(collect_popular(Vec::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_most_viewed_offline_is_error() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        fetcher.dispatch(Command::MostViewed);

        assert!(matches!(
            fetcher.recv().await,
            Some(FetchMessage::MostViewed(Err(WeatherError::RequestFailed(_))))
        ));
    }

    #[tokio::test]
    async fn test_news_reports_every_topic() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        fetcher.dispatch(Command::News {
            topics: NewsTopic::all().to_vec(),
            refresh: true,
        });

        let mut topics = Vec::new();
        for _ in 0..NewsTopic::all().len() {
            match fetcher.recv().await {
                Some(FetchMessage::News { topic, result }) => {
                    assert!(result.is_err());
                    topics.push(topic);
                }
                other => panic!("unexpected message: {:?}", other),
            }
        }
        assert_eq!(topics, NewsTopic::all().to_vec());
    }

    #[tokio::test]
    async fn test_search_failure_carries_generation() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        fetcher.dispatch(Command::Search(WeatherRequest {
            generation: 7,
            city: "Paris".into(),
        }));

        match fetcher.recv().await {
            Some(FetchMessage::Search { generation, result }) => {
                assert_eq!(generation, 7);
                assert!(matches!(result, Err(WeatherError::RequestFailed(_))));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tile_failure_is_reported() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        let request = TileRequest {
            overlay: WeatherOverlay::Wind,
            tile: TileCoord { z: 7, x: 35, y: 46 },
        };
        fetcher.dispatch(Command::Tile(request));

        match fetcher.recv().await {
            Some(FetchMessage::Tile { request: got, result }) => {
                assert_eq!(got, request);
                assert!(result.is_err());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_try_recv_is_empty_without_work() {
        let mut fetcher = Fetcher::new(offline_clients(None));
        assert!(fetcher.try_recv().is_none());
    }
}
