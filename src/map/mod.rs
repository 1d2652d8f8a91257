//! Synchronized weather map
//!
//! [`MapView`] owns at most one map instance created through an injected
//! [`MapEngine`]. The instance lives only while the map section is visible:
//! it is built when the section becomes active and the position is known,
//! and fully destroyed when the section goes out of view. While it lives,
//! its base layer follows the theme and its legend follows the overlay the
//! user most recently switched on.

pub mod engine;
pub mod layers;
pub mod tiles;

use std::collections::HashMap;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info, warn};

pub use engine::{
    CanvasEngine, Control, Layer, ListenerId, MapEngine, MapError, MapEvent, MapOptions,
    MapSnapshot, MapSurface,
};
pub use layers::{BaseLayer, Legend, TileCoord, WeatherOverlay};
pub use tiles::{TileClient, TileStatus};

use crate::data::Coordinate;
use crate::theme::Theme;

/// Zoom level every map is created with
pub const DEFAULT_ZOOM: u8 = 7;

/// Lifecycle of the map section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    /// Never activated
    Unmounted,
    /// Activated before the position lookup finished; construction is deferred
    AwaitingCenter,
    /// Instance live
    Active,
    /// Instance destroyed after the section went out of view
    Inactive,
    /// The engine failed to build an instance
    Unavailable(String),
}

/// A tile the view wants fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    pub overlay: WeatherOverlay,
    pub tile: TileCoord,
}

/// The live instance and the listener registered on it
struct Session {
    surface: Box<dyn MapSurface>,
    listener: ListenerId,
    events: UnboundedReceiver<MapEvent>,
    base: BaseLayer,
}

pub struct MapView {
    engine: Box<dyn MapEngine>,
    session: Option<Session>,
    state: MapState,
    is_active: bool,
    /// Position from the one-shot lookup; `None` until it resolves
    home: Option<Coordinate>,
    center: Option<Coordinate>,
    theme: Theme,
    /// Overlay shown in the legend
    legend: Option<WeatherOverlay>,
    switcher_cursor: usize,
    tiles: HashMap<WeatherOverlay, (TileCoord, TileStatus)>,
    tile_requests: Vec<TileRequest>,
}

impl MapView {
    pub fn new(engine: Box<dyn MapEngine>, theme: Theme) -> Self {
        Self {
            engine,
            session: None,
            state: MapState::Unmounted,
            is_active: false,
            home: None,
            center: None,
            theme,
            legend: None,
            switcher_cursor: 0,
            tiles: HashMap::new(),
            tile_requests: Vec::new(),
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    /// True until the position lookup has resolved
    pub fn is_loading(&self) -> bool {
        self.home.is_none()
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.center
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn legend(&self) -> Option<WeatherOverlay> {
        self.legend
    }

    pub fn switcher_cursor(&self) -> usize {
        self.switcher_cursor
    }

    /// Overlay under the layer switcher cursor
    pub fn selected_overlay(&self) -> WeatherOverlay {
        WeatherOverlay::all()[self.switcher_cursor]
    }

    pub fn tile_status(&self, overlay: WeatherOverlay) -> Option<&TileStatus> {
        self.tiles.get(&overlay).map(|(_, status)| status)
    }

    /// State of the live instance, if any
    pub fn snapshot(&self) -> Option<MapSnapshot> {
        self.session.as_ref().map(|s| s.surface.snapshot())
    }

    /// Records the outcome of the position lookup
    ///
    /// Only the first call counts. `None` or an invalid coordinate falls back
    /// to [`Coordinate::DEFAULT`]. A deferred activation proceeds now.
    pub fn center_resolved(&mut self, coordinate: Option<Coordinate>) {
        if self.home.is_some() {
            return;
        }

        let home = coordinate
            .filter(Coordinate::is_valid)
            .unwrap_or(Coordinate::DEFAULT);
        debug!(latitude = home.latitude, longitude = home.longitude, "map center resolved");
        self.home = Some(home);
        self.center = Some(home);

        if self.state == MapState::AwaitingCenter {
            self.construct();
        }
    }

    /// Follows the visibility of the map section
    pub fn set_active(&mut self, active: bool) {
        if active == self.is_active {
            return;
        }
        self.is_active = active;

        if active {
            if self.center.is_some() {
                self.construct();
            } else {
                debug!("map activated before center is known, deferring");
                self.state = MapState::AwaitingCenter;
            }
        } else {
            let had_instance = self.session.is_some()
                || matches!(self.state, MapState::Unavailable(_));
            self.teardown();
            self.state = if had_instance {
                MapState::Inactive
            } else {
                MapState::Unmounted
            };
        }
    }

    fn construct(&mut self) {
        let Some(center) = self.center else {
            return;
        };

        let options = MapOptions {
            center,
            zoom: DEFAULT_ZOOM,
        };
        let mut surface = match self.engine.create(options) {
            Ok(surface) => surface,
            Err(e) => {
                warn!(error = %e, "map construction failed");
                self.state = MapState::Unavailable(e.to_string());
                return;
            }
        };

        let base = BaseLayer::for_theme(self.theme);
        let overlay = WeatherOverlay::default_overlay();
        surface.add_layer(Layer::Base(base));
        surface.add_layer(Layer::Overlay(overlay));
        surface.add_control(Control::LayerSwitcher(WeatherOverlay::all().to_vec()));
        surface.add_control(Control::Legend);

        let (tx, events) = unbounded_channel();
        let listener = surface.subscribe(tx);
        surface.invalidate_size();

        self.session = Some(Session {
            surface,
            listener,
            events,
            base,
        });
        self.legend = Some(overlay);
        self.tiles.clear();
        self.request_tile(overlay);
        self.state = MapState::Active;
        info!(?base, "map instance created");
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.surface.unsubscribe(session.listener);
            session.surface.destroy();
            info!("map instance destroyed");
        }
        self.legend = None;
        self.tiles.clear();
        self.tile_requests.clear();
    }

    /// Swaps the base layer to match `theme`, leaving everything else alone
    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;

        if let Some(session) = self.session.as_mut() {
            let next = BaseLayer::for_theme(theme);
            session.surface.remove_layer(Layer::Base(session.base));
            session.surface.add_layer(Layer::Base(next));
            session.base = next;
            debug!(?next, "base layer swapped");
        }
    }

    /// Applies overlay events fired by the instance to the legend
    ///
    /// Returns the number of events handled.
    pub fn poll_events(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(session) = self.session.as_mut() {
            while let Ok(event) = session.events.try_recv() {
                events.push(event);
            }
        }

        for event in &events {
            match *event {
                MapEvent::OverlayAdded(overlay) => {
                    self.legend = Some(overlay);
                    self.request_tile(overlay);
                }
                MapEvent::OverlayRemoved(overlay) => {
                    if self.legend == Some(overlay) {
                        self.legend = None;
                    }
                    self.tiles.remove(&overlay);
                }
            }
        }
        events.len()
    }

    /// Flips an overlay through the layer switcher
    ///
    /// Returns the new enabled state, or `None` without a live instance.
    pub fn toggle_overlay(&mut self, overlay: WeatherOverlay) -> Option<bool> {
        let enabled = self.session.as_mut()?.surface.toggle_overlay(overlay);
        self.poll_events();
        Some(enabled)
    }

    pub fn toggle_selected_overlay(&mut self) -> Option<bool> {
        self.toggle_overlay(self.selected_overlay())
    }

    /// Moves the layer switcher cursor, clamped to the overlay list
    pub fn move_switcher_cursor(&mut self, forward: bool) {
        let last = WeatherOverlay::all().len() - 1;
        self.switcher_cursor = if forward {
            (self.switcher_cursor + 1).min(last)
        } else {
            self.switcher_cursor.saturating_sub(1)
        };
    }

    /// Moves the center by a fraction of the visible span
    pub fn pan(&mut self, east: f64, north: f64) {
        let Some(center) = self.center else {
            return;
        };
        let (lon_span, lat_span) = visible_span(DEFAULT_ZOOM);
        let next = Coordinate::new(
            (center.latitude + north * lat_span).clamp(-85.0, 85.0),
            (center.longitude + east * lon_span).clamp(-180.0, 180.0),
        );
        self.move_to(next);
    }

    /// Returns to the position found by the lookup
    pub fn recenter(&mut self) {
        if let Some(home) = self.home {
            self.move_to(home);
        }
    }

    fn move_to(&mut self, center: Coordinate) {
        self.center = Some(center);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.surface.set_view(center, DEFAULT_ZOOM);

        let enabled = session.surface.snapshot().overlays;
        for overlay in enabled {
            self.request_tile(overlay);
        }
    }

    /// The container changed size
    pub fn resize(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.surface.invalidate_size();
        }
    }

    fn request_tile(&mut self, overlay: WeatherOverlay) {
        let Some(center) = self.center else {
            return;
        };
        let tile = TileCoord::containing(center.latitude, center.longitude, DEFAULT_ZOOM);
        if let Some((requested, _)) = self.tiles.get(&overlay) {
            if *requested == tile {
                return;
            }
        }
        self.tiles.insert(overlay, (tile, TileStatus::Loading));
        self.tile_requests.push(TileRequest { overlay, tile });
    }

    /// Drains tile requests queued since the last call
    pub fn take_tile_requests(&mut self) -> Vec<TileRequest> {
        std::mem::take(&mut self.tile_requests)
    }

    /// Records a tile result; results for a tile no longer under the center are dropped
    pub fn record_tile(&mut self, request: TileRequest, status: TileStatus) {
        if let Some((tile, current)) = self.tiles.get_mut(&request.overlay) {
            if *tile == request.tile {
                *current = status;
            }
        }
    }
}

impl Drop for MapView {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Longitude and latitude spans shown at a zoom level
pub fn visible_span(zoom: u8) -> (f64, f64) {
    let lon_span = 360.0 / 2f64.powi(zoom as i32) * 4.0;
    (lon_span, lon_span / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tokio::sync::mpsc::UnboundedSender;

    #[derive(Debug, Default)]
    struct EngineLog {
        created: usize,
        destroyed: usize,
        unsubscribed: usize,
    }

    /// Canvas engine that records instance lifecycles
    struct RecordingEngine {
        log: Rc<RefCell<EngineLog>>,
        fail: bool,
    }

    struct RecordingSurface {
        inner: Box<dyn MapSurface>,
        log: Rc<RefCell<EngineLog>>,
    }

    impl MapEngine for RecordingEngine {
        fn create(&self, options: MapOptions) -> Result<Box<dyn MapSurface>, MapError> {
            if self.fail {
                return Err(MapError::Unavailable("library failed to load".to_string()));
            }
            self.log.borrow_mut().created += 1;
            Ok(Box::new(RecordingSurface {
                inner: CanvasEngine.create(options)?,
                log: Rc::clone(&self.log),
            }))
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_layer(&mut self, layer: Layer) {
            self.inner.add_layer(layer)
        }
        fn remove_layer(&mut self, layer: Layer) -> bool {
            self.inner.remove_layer(layer)
        }
        fn add_control(&mut self, control: Control) {
            self.inner.add_control(control)
        }
        fn set_view(&mut self, center: Coordinate, zoom: u8) {
            self.inner.set_view(center, zoom)
        }
        fn invalidate_size(&mut self) {
            self.inner.invalidate_size()
        }
        fn subscribe(&mut self, listener: UnboundedSender<MapEvent>) -> ListenerId {
            self.inner.subscribe(listener)
        }
        fn unsubscribe(&mut self, id: ListenerId) {
            self.log.borrow_mut().unsubscribed += 1;
            self.inner.unsubscribe(id)
        }
        fn toggle_overlay(&mut self, overlay: WeatherOverlay) -> bool {
            self.inner.toggle_overlay(overlay)
        }
        fn snapshot(&self) -> MapSnapshot {
            self.inner.snapshot()
        }
        fn destroy(self: Box<Self>) {
            self.log.borrow_mut().destroyed += 1;
            self.inner.destroy()
        }
    }

    fn view(theme: Theme) -> (MapView, Rc<RefCell<EngineLog>>) {
        let log = Rc::new(RefCell::new(EngineLog::default()));
        let engine = RecordingEngine {
            log: Rc::clone(&log),
            fail: false,
        };
        (MapView::new(Box::new(engine), theme), log)
    }

    fn active_view(theme: Theme) -> (MapView, Rc<RefCell<EngineLog>>) {
        let (mut map, log) = view(theme);
        map.center_resolved(Some(Coordinate::new(45.5, -73.6)));
        map.set_active(true);
        (map, log)
    }

    #[test]
    fn test_starts_unmounted_and_loading() {
        let (map, log) = view(Theme::Light);
        assert_eq!(map.state(), &MapState::Unmounted);
        assert!(map.is_loading());
        assert!(map.snapshot().is_none());
        assert_eq!(log.borrow().created, 0);
    }

    #[test]
    fn test_activation_builds_full_instance() {
        let (map, log) = active_view(Theme::Light);

        assert_eq!(map.state(), &MapState::Active);
        assert_eq!(log.borrow().created, 1);

        let snapshot = map.snapshot().unwrap();
        assert_eq!(snapshot.center, Coordinate::new(45.5, -73.6));
        assert_eq!(snapshot.zoom, DEFAULT_ZOOM);
        assert_eq!(snapshot.base_layers, vec![BaseLayer::Light]);
        assert_eq!(snapshot.overlays, vec![WeatherOverlay::Temperature]);
        assert_eq!(
            snapshot.controls,
            vec![
                Control::LayerSwitcher(WeatherOverlay::all().to_vec()),
                Control::Legend
            ]
        );
        assert_eq!(snapshot.listener_count, 1);
        assert_eq!(snapshot.size_invalidations, 1);
        assert_eq!(map.legend(), Some(WeatherOverlay::Temperature));
    }

    #[test]
    fn test_dark_theme_builds_dark_base() {
        let (map, _log) = active_view(Theme::Dark);
        assert_eq!(map.snapshot().unwrap().base_layers, vec![BaseLayer::Dark]);
    }

    #[test]
    fn test_activation_before_lookup_is_deferred() {
        let (mut map, log) = view(Theme::Light);

        map.set_active(true);
        assert_eq!(map.state(), &MapState::AwaitingCenter);
        assert_eq!(log.borrow().created, 0);

        map.center_resolved(None);
        assert_eq!(map.state(), &MapState::Active);
        assert_eq!(map.snapshot().unwrap().center, Coordinate::DEFAULT);
    }

    #[test]
    fn test_only_first_lookup_result_counts() {
        let (mut map, _log) = view(Theme::Light);
        map.center_resolved(Some(Coordinate::new(51.5, -0.12)));
        map.center_resolved(Some(Coordinate::new(35.7, 139.7)));
        assert_eq!(map.center(), Some(Coordinate::new(51.5, -0.12)));
        assert!(!map.is_loading());
    }

    #[test]
    fn test_invalid_lookup_result_falls_back_to_default() {
        let (mut map, _log) = view(Theme::Light);
        map.center_resolved(Some(Coordinate::new(200.0, 0.0)));
        assert_eq!(map.center(), Some(Coordinate::DEFAULT));
    }

    #[test]
    fn test_deactivation_fully_tears_down() {
        let (mut map, log) = active_view(Theme::Light);

        map.set_active(false);

        assert_eq!(map.state(), &MapState::Inactive);
        assert!(map.snapshot().is_none());
        assert!(map.legend().is_none());
        assert_eq!(log.borrow().destroyed, 1);
        assert_eq!(log.borrow().unsubscribed, 1);
    }

    #[test]
    fn test_reactivation_creates_fresh_instance_without_leaked_listeners() {
        let (mut map, log) = active_view(Theme::Light);
        map.toggle_overlay(WeatherOverlay::Wind);

        map.set_active(false);
        map.set_active(true);

        assert_eq!(log.borrow().created, 2);
        assert_eq!(log.borrow().destroyed, 1);

        let snapshot = map.snapshot().unwrap();
        assert_eq!(snapshot.listener_count, 1);
        // Fresh instance: the Wind overlay from the old one is gone.
        assert_eq!(snapshot.overlays, vec![WeatherOverlay::Temperature]);

        // One toggle produces exactly one event.
        map.session
            .as_mut()
            .unwrap()
            .surface
            .toggle_overlay(WeatherOverlay::Clouds);
        assert_eq!(map.poll_events(), 1);
        assert_eq!(map.poll_events(), 0);
    }

    #[test]
    fn test_repeated_activation_flag_is_ignored() {
        let (mut map, log) = active_view(Theme::Light);
        map.set_active(true);
        assert_eq!(log.borrow().created, 1);
    }

    #[test]
    fn test_theme_toggle_swaps_exactly_one_base_layer() {
        let (mut map, _log) = active_view(Theme::Light);
        map.toggle_overlay(WeatherOverlay::Precipitation);
        map.pan(0.5, 0.0);
        let before = map.snapshot().unwrap();

        map.set_theme(Theme::Dark);
        let after = map.snapshot().unwrap();

        assert_eq!(before.base_layers, vec![BaseLayer::Light]);
        assert_eq!(after.base_layers, vec![BaseLayer::Dark]);
        assert_eq!(after.center, before.center);
        assert_eq!(after.zoom, before.zoom);
        assert_eq!(after.overlays, before.overlays);
        assert_eq!(after.listener_count, before.listener_count);

        map.set_theme(Theme::Light);
        assert_eq!(map.snapshot().unwrap().base_layers, vec![BaseLayer::Light]);
    }

    #[test]
    fn test_theme_change_while_inactive_applies_on_next_activation() {
        let (mut map, _log) = active_view(Theme::Light);
        map.set_active(false);
        map.set_theme(Theme::Dark);
        map.set_active(true);
        assert_eq!(map.snapshot().unwrap().base_layers, vec![BaseLayer::Dark]);
    }

    #[test]
    fn test_legend_follows_most_recent_overlay() {
        let (mut map, _log) = active_view(Theme::Light);

        assert_eq!(map.toggle_overlay(WeatherOverlay::Wind), Some(true));
        assert_eq!(map.legend(), Some(WeatherOverlay::Wind));

        assert_eq!(map.toggle_overlay(WeatherOverlay::Clouds), Some(true));
        assert_eq!(map.legend(), Some(WeatherOverlay::Clouds));

        // Removing an overlay that is not shown leaves the legend alone.
        assert_eq!(map.toggle_overlay(WeatherOverlay::Wind), Some(false));
        assert_eq!(map.legend(), Some(WeatherOverlay::Clouds));

        // Removing the shown one clears it.
        assert_eq!(map.toggle_overlay(WeatherOverlay::Clouds), Some(false));
        assert_eq!(map.legend(), None);

        assert_eq!(
            map.snapshot().unwrap().overlays,
            vec![WeatherOverlay::Temperature]
        );
    }

    #[test]
    fn test_toggle_without_instance_is_none() {
        let (mut map, _log) = view(Theme::Light);
        assert_eq!(map.toggle_overlay(WeatherOverlay::Wind), None);
    }

    #[test]
    fn test_engine_failure_degrades_to_unavailable() {
        let log = Rc::new(RefCell::new(EngineLog::default()));
        let engine = RecordingEngine {
            log: Rc::clone(&log),
            fail: true,
        };
        let mut map = MapView::new(Box::new(engine), Theme::Light);
        map.center_resolved(None);

        map.set_active(true);
        assert!(matches!(map.state(), MapState::Unavailable(msg) if msg.contains("failed to load")));
        assert!(map.snapshot().is_none());

        map.set_active(false);
        assert_eq!(map.state(), &MapState::Inactive);
    }

    #[test]
    fn test_switcher_cursor_is_clamped() {
        let (mut map, _log) = active_view(Theme::Light);
        map.move_switcher_cursor(false);
        assert_eq!(map.switcher_cursor(), 0);
        for _ in 0..10 {
            map.move_switcher_cursor(true);
        }
        assert_eq!(map.selected_overlay(), WeatherOverlay::Pressure);
        assert_eq!(map.toggle_selected_overlay(), Some(true));
        assert_eq!(map.legend(), Some(WeatherOverlay::Pressure));
    }

    #[test]
    fn test_pan_and_recenter() {
        let (mut map, _log) = active_view(Theme::Light);
        let home = map.center().unwrap();

        map.pan(1.0, 0.0);
        let moved = map.snapshot().unwrap().center;
        assert!(moved.longitude > home.longitude);
        assert_eq!(moved.latitude, home.latitude);

        map.recenter();
        assert_eq!(map.snapshot().unwrap().center, home);
    }

    #[test]
    fn test_tile_requests_follow_enabled_overlays() {
        let (mut map, _log) = active_view(Theme::Light);

        let requests = map.take_tile_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].overlay, WeatherOverlay::Temperature);
        assert_eq!(map.tile_status(WeatherOverlay::Temperature), Some(&TileStatus::Loading));

        map.toggle_overlay(WeatherOverlay::Wind);
        let requests = map.take_tile_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].overlay, WeatherOverlay::Wind);

        map.record_tile(requests[0], TileStatus::Loaded(1024));
        assert_eq!(map.tile_status(WeatherOverlay::Wind), Some(&TileStatus::Loaded(1024)));

        // Same tile under the center: no new request.
        map.pan(0.001, 0.0);
        assert!(map.take_tile_requests().is_empty());

        // A different tile re-requests every enabled overlay.
        map.pan(2.0, 0.0);
        assert_eq!(map.take_tile_requests().len(), 2);
    }

    #[test]
    fn test_stale_tile_result_is_dropped() {
        let (mut map, _log) = active_view(Theme::Light);
        let old = map.take_tile_requests()[0];
        map.pan(2.0, 0.0);

        map.record_tile(old, TileStatus::Loaded(10));

        assert_eq!(map.tile_status(WeatherOverlay::Temperature), Some(&TileStatus::Loading));
    }

    #[test]
    fn test_resize_invalidates_live_instance() {
        let (mut map, _log) = active_view(Theme::Light);
        map.resize();
        assert_eq!(map.snapshot().unwrap().size_invalidations, 2);
    }

    #[test]
    fn test_drop_destroys_instance() {
        let (map, log) = active_view(Theme::Light);
        drop(map);
        assert_eq!(log.borrow().destroyed, 1);
    }

    #[test]
    fn test_visible_span() {
        let (lon, lat) = visible_span(7);
        assert!((lon - 11.25).abs() < 1e-9);
        assert!((lat - 5.625).abs() < 1e-9);
    }
}
