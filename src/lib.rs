//! Weather News terminal client library
//!
//! Exposes the application core (section navigator, map view, typeahead
//! search, API clients) for the binary and for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch;
pub mod logging;
pub mod map;
pub mod prefs;
pub mod scroll;
pub mod search;
pub mod sections;
pub mod theme;
pub mod ui;
