//! City search with typeahead
//!
//! [`Typeahead`] owns the input line and the suggestion list. Suggestion
//! requests are debounced and numbered; a response is applied only if its
//! number is still current, so late answers for an older query are dropped.
//! [`SearchPage`] validates a submitted city and tracks the result state.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::data::{WeatherError, WeatherReport};

/// Shortest query that asks the server for suggestions
pub const MIN_QUERY_LEN: usize = 3;

/// Pause in typing before suggestions are requested
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

/// Rejected city input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a city name before searching!")]
    Empty,

    #[error("City name must only contain letters, spaces, or hyphens.")]
    InvalidCharacters,
}

impl ValidationError {
    /// Heading of the validation notice
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::Empty => "Input Required",
            ValidationError::InvalidCharacters => "Invalid Input",
        }
    }
}

/// Checks a city name before any request is made, returning it trimmed
pub fn validate_city_name(input: &str) -> Result<&str, ValidationError> {
    let city = input.trim();
    if city.is_empty() {
        return Err(ValidationError::Empty);
    }
    let allowed = |c: char| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-';
    if !city.chars().all(allowed) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(city)
}

/// A suggestion lookup the typeahead wants made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug)]
pub struct Typeahead {
    input: String,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
    /// Bumped on every input change; responses carrying an older value are stale
    generation: u64,
    deadline: Option<Instant>,
    debounce: Duration,
}

impl Default for Typeahead {
    fn default() -> Self {
        Self::new()
    }
}

impl Typeahead {
    pub fn new() -> Self {
        Self::with_debounce(SUGGESTION_DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            input: String::new(),
            suggestions: Vec::new(),
            highlighted: None,
            generation: 0,
            deadline: None,
            debounce,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn has_pending_request(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.input_changed(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.input_changed(now);
        }
    }

    /// Replaces the whole input as if typed
    pub fn set_input(&mut self, text: &str, now: Instant) {
        self.input = text.to_string();
        self.input_changed(now);
    }

    fn input_changed(&mut self, now: Instant) {
        self.generation += 1;
        self.highlighted = None;

        if self.input.trim().chars().count() < MIN_QUERY_LEN {
            self.suggestions.clear();
            self.deadline = None;
        } else {
            self.deadline = Some(now + self.debounce);
        }
    }

    /// Returns the request to issue once typing has paused
    pub fn tick(&mut self, now: Instant) -> Option<SuggestionRequest> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;

        let request = SuggestionRequest {
            generation: self.generation,
            query: self.input.trim().to_string(),
        };
        debug!(query = %request.query, generation = request.generation, "requesting suggestions");
        Some(request)
    }

    /// Applies a suggestion response; returns false if it was stale
    pub fn apply_suggestions(&mut self, generation: u64, suggestions: Vec<String>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale suggestions");
            return false;
        }
        self.suggestions = suggestions;
        self.highlighted = None;
        true
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    pub fn highlight_prev(&mut self) {
        if let Some(i) = self.highlighted {
            self.highlighted = Some(i.saturating_sub(1));
        }
    }

    /// Fills the input with the highlighted suggestion
    ///
    /// Returns false when nothing is highlighted.
    pub fn accept_highlighted(&mut self) -> bool {
        let Some(choice) = self
            .highlighted
            .and_then(|i| self.suggestions.get(i))
            .cloned()
        else {
            return false;
        };
        self.input = choice;
        self.dismiss();
        true
    }

    /// Hides the suggestions and drops any pending or in-flight lookup
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.suggestions.clear();
        self.highlighted = None;
        self.deadline = None;
    }

    /// Empties the input as well
    pub fn clear(&mut self) {
        self.input.clear();
        self.dismiss();
    }
}

/// Result area of the search page
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// Waiting for input
    #[default]
    Empty,
    Invalid(ValidationError),
    Loading { city: String },
    Loaded(Box<WeatherReport>),
    /// The city could not be resolved; offers "Try Again"
    NotFound(String),
    Failed(String),
}

/// A weather lookup the search page wants made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub generation: u64,
    pub city: String,
}

#[derive(Debug, Default)]
pub struct SearchPage {
    pub typeahead: Typeahead,
    state: SearchState,
    generation: u64,
}

impl SearchPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Enter key: picks the highlighted suggestion if there is one,
    /// otherwise submits the input
    pub fn enter(&mut self) -> Option<WeatherRequest> {
        if self.typeahead.accept_highlighted() {
            return None;
        }
        self.submit()
    }

    /// Validates the input and starts a lookup, replacing any previous result
    pub fn submit(&mut self) -> Option<WeatherRequest> {
        let city = match validate_city_name(self.typeahead.input()) {
            Ok(city) => city.to_string(),
            Err(e) => {
                debug!(error = %e, "search input rejected");
                self.state = SearchState::Invalid(e);
                return None;
            }
        };

        self.typeahead.dismiss();
        self.generation += 1;
        self.state = SearchState::Loading { city: city.clone() };
        Some(WeatherRequest {
            generation: self.generation,
            city,
        })
    }

    /// Applies a lookup result; returns false if a newer lookup superseded it
    pub fn apply_result(
        &mut self,
        generation: u64,
        result: Result<WeatherReport, WeatherError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(report) => SearchState::Loaded(Box::new(report)),
            Err(e) if e.is_not_found() => SearchState::NotFound(e.to_string()),
            Err(e) => SearchState::Failed(e.to_string()),
        };
        true
    }

    /// "Try Again": back to an empty form without repeating the lookup
    pub fn retry(&mut self) {
        self.generation += 1;
        self.typeahead.clear();
        self.state = SearchState::Empty;
    }
}
