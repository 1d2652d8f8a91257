//! Page sections
//!
//! The home page is an ordered strip of full-width sections. Insertion order
//! is display order and navigation order.

use thiserror::Error;

use crate::data::NewsTopic;

/// Errors raised while building a section list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    #[error("Duplicate section identifier: '{0}'")]
    DuplicateId(String),
}

/// What a section displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Home,
    MostViewed,
    CurrentLocation,
    WeatherMap,
    News(NewsTopic),
}

impl SectionKind {
    /// The home page layout
    pub fn home_page() -> &'static [SectionKind] {
        &[
            SectionKind::Home,
            SectionKind::MostViewed,
            SectionKind::CurrentLocation,
            SectionKind::WeatherMap,
            SectionKind::News(NewsTopic::Tornado),
            SectionKind::News(NewsTopic::Storm),
            SectionKind::News(NewsTopic::Flood),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Home => "Home",
            SectionKind::MostViewed => "Most Viewed",
            SectionKind::CurrentLocation => "Current Location",
            SectionKind::WeatherMap => "Weather Map",
            SectionKind::News(topic) => topic.label(),
        }
    }
}

/// One panel of the strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Stable identifier derived from the name (e.g. "most-viewed")
    pub id: String,
    pub name: String,
    /// Position in the strip, 0-based
    pub index: usize,
    pub kind: SectionKind,
}

/// Ordered, uniquely identified sections
#[derive(Debug, Clone, Default)]
pub struct SectionList {
    sections: Vec<Section>,
}

impl SectionList {
    /// Builds the list in the given order
    ///
    /// Fails if two sections derive the same identifier.
    pub fn new(kinds: &[SectionKind]) -> Result<Self, SectionError> {
        let mut sections: Vec<Section> = Vec::with_capacity(kinds.len());

        for (index, kind) in kinds.iter().enumerate() {
            let id = section_id(kind.name());
            if sections.iter().any(|s| s.id == id) {
                return Err(SectionError::DuplicateId(id));
            }
            sections.push(Section {
                id,
                name: kind.name().to_string(),
                index,
                kind: *kind,
            });
        }

        Ok(Self { sections })
    }

    /// The home page strip
    pub fn home_page() -> Self {
        Self {
            sections: SectionKind::home_page()
                .iter()
                .enumerate()
                .map(|(index, kind)| Section {
                    id: section_id(kind.name()),
                    name: kind.name().to_string(),
                    index,
                    kind: *kind,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Index of the section with the given identifier
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Index of the first section of the given kind
    pub fn position_of(&self, kind: SectionKind) -> Option<usize> {
        self.sections.iter().position(|s| s.kind == kind)
    }

    /// All identifiers in order
    pub fn ids(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Derives a section identifier: lowercase words joined by `-`
pub fn section_id(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
