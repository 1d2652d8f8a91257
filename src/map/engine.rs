//! Map engine abstraction
//!
//! The map view never talks to a concrete mapping library. It is handed a
//! [`MapEngine`] that creates [`MapSurface`] instances; each surface owns its
//! layers, controls and event listeners and releases all of them on
//! [`MapSurface::destroy`].
//!
//! [`CanvasEngine`] is the terminal implementation: it keeps the layer and
//! control state in memory and the UI draws it with a ratatui canvas.

use std::collections::BTreeMap;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::layers::{BaseLayer, WeatherOverlay};
use crate::data::Coordinate;

/// Errors raised by a map engine
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Map engine unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid map options: {0}")]
    InvalidOptions(String),

    #[error("Tile request failed: {0}")]
    TileRequest(#[from] reqwest::Error),

    #[error("Tile server returned status {0}")]
    TileStatus(u16),
}

/// Construction parameters of a map instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
}

/// A layer attached to a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Base(BaseLayer),
    Overlay(WeatherOverlay),
}

/// A control attached to a map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Toggles for the listed overlays, independent of each other
    LayerSwitcher(Vec<WeatherOverlay>),
    /// Scale of the highlighted overlay
    Legend,
}

/// Events fired by a surface to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// An overlay was switched on through the layer switcher
    OverlayAdded(WeatherOverlay),
    /// An overlay was switched off through the layer switcher
    OverlayRemoved(WeatherOverlay),
}

pub type ListenerId = u64;

/// Read-only view of a surface for rendering and inspection
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub base_layers: Vec<BaseLayer>,
    /// Enabled overlays in the order they were enabled
    pub overlays: Vec<WeatherOverlay>,
    pub controls: Vec<Control>,
    pub listener_count: usize,
    /// Times the surface was asked to re-measure its container
    pub size_invalidations: u32,
}

/// Creates map instances
pub trait MapEngine {
    fn create(&self, options: MapOptions) -> Result<Box<dyn MapSurface>, MapError>;
}

/// One live map instance
pub trait MapSurface {
    fn add_layer(&mut self, layer: Layer);

    /// Returns false if the layer was not attached
    fn remove_layer(&mut self, layer: Layer) -> bool;

    fn add_control(&mut self, control: Control);

    fn set_view(&mut self, center: Coordinate, zoom: u8);

    /// Re-measure the container after it was shown or resized
    fn invalidate_size(&mut self);

    /// Registers a listener for overlay events
    fn subscribe(&mut self, listener: UnboundedSender<MapEvent>) -> ListenerId;

    fn unsubscribe(&mut self, id: ListenerId);

    /// User interaction with the layer switcher: flips one overlay and fires
    /// the matching event. Returns whether the overlay is now enabled.
    fn toggle_overlay(&mut self, overlay: WeatherOverlay) -> bool;

    fn snapshot(&self) -> MapSnapshot;

    /// Tears the instance down, releasing layers, controls and listeners
    fn destroy(self: Box<Self>);
}

/// Terminal map engine
#[derive(Debug, Clone, Default)]
pub struct CanvasEngine;

impl MapEngine for CanvasEngine {
    fn create(&self, options: MapOptions) -> Result<Box<dyn MapSurface>, MapError> {
        if !options.center.is_valid() {
            return Err(MapError::InvalidOptions(format!(
                "center out of range: {:?}",
                options.center
            )));
        }
        debug!(
            latitude = options.center.latitude,
            longitude = options.center.longitude,
            zoom = options.zoom,
            "creating canvas map"
        );
        Ok(Box::new(CanvasSurface::new(options)))
    }
}

/// In-memory surface drawn by the UI
#[derive(Debug)]
pub struct CanvasSurface {
    center: Coordinate,
    zoom: u8,
    base_layers: Vec<BaseLayer>,
    overlays: Vec<WeatherOverlay>,
    controls: Vec<Control>,
    listeners: BTreeMap<ListenerId, UnboundedSender<MapEvent>>,
    next_listener: ListenerId,
    size_invalidations: u32,
}

impl CanvasSurface {
    fn new(options: MapOptions) -> Self {
        Self {
            center: options.center,
            zoom: options.zoom,
            base_layers: Vec::new(),
            overlays: Vec::new(),
            controls: Vec::new(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            size_invalidations: 0,
        }
    }

    fn emit(&mut self, event: MapEvent) {
        // Listeners whose receiver is gone are dropped.
        self.listeners.retain(|_, tx| tx.send(event).is_ok());
    }
}

impl MapSurface for CanvasSurface {
    fn add_layer(&mut self, layer: Layer) {
        match layer {
            Layer::Base(base) => {
                if !self.base_layers.contains(&base) {
                    self.base_layers.push(base);
                }
            }
            Layer::Overlay(overlay) => {
                if !self.overlays.contains(&overlay) {
                    self.overlays.push(overlay);
                }
            }
        }
    }

    fn remove_layer(&mut self, layer: Layer) -> bool {
        match layer {
            Layer::Base(base) => {
                let before = self.base_layers.len();
                self.base_layers.retain(|b| *b != base);
                self.base_layers.len() != before
            }
            Layer::Overlay(overlay) => {
                let before = self.overlays.len();
                self.overlays.retain(|o| *o != overlay);
                self.overlays.len() != before
            }
        }
    }

    fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    fn invalidate_size(&mut self) {
        self.size_invalidations += 1;
    }

    fn subscribe(&mut self, listener: UnboundedSender<MapEvent>) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(id, listener);
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn toggle_overlay(&mut self, overlay: WeatherOverlay) -> bool {
        if self.remove_layer(Layer::Overlay(overlay)) {
            self.emit(MapEvent::OverlayRemoved(overlay));
            false
        } else {
            self.add_layer(Layer::Overlay(overlay));
            self.emit(MapEvent::OverlayAdded(overlay));
            true
        }
    }

    fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            center: self.center,
            zoom: self.zoom,
            base_layers: self.base_layers.clone(),
            overlays: self.overlays.clone(),
            controls: self.controls.clone(),
            listener_count: self.listeners.len(),
            size_invalidations: self.size_invalidations,
        }
    }

    fn destroy(mut self: Box<Self>) {
        debug!(listeners = self.listeners.len(), "destroying canvas map");
        self.listeners.clear();
        self.controls.clear();
        self.overlays.clear();
        self.base_layers.clear();
    }
}
