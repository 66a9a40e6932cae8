//! The listings the shelf server serves and their request paths.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Shelf section served by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Movies,
    Tv,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Movies => f.write_str("movies"),
            Section::Tv => f.write_str("tv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized section '{0}', expected movies or tv")]
pub struct ParseSectionError(pub String);

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movies" | "movie" | "mo" => Ok(Section::Movies),
            "tv" => Ok(Section::Tv),
            _ => Err(ParseSectionError(s.to_string())),
        }
    }
}

/// Orderings the server offers for a section listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Title,
    Mtime,
    Rating,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Title => f.write_str("title"),
            Order::Mtime => f.write_str("mtime"),
            Order::Rating => f.write_str("rating"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized order '{0}', expected title, mtime, or rating")]
pub struct ParseOrderError(pub String);

impl FromStr for Order {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Order::Title),
            "mtime" => Ok(Order::Mtime),
            "rating" | "ratings" => Ok(Order::Rating),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

/// Which listing to fetch from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfSource {
    Listing { section: Section, order: Order },
    Search { query: String },
}

impl ShelfSource {
    pub fn listing(section: Section, order: Order) -> Self {
        ShelfSource::Listing { section, order }
    }

    pub fn movies() -> Self {
        ShelfSource::listing(Section::Movies, Order::Title)
    }

    pub fn tv() -> Self {
        ShelfSource::listing(Section::Tv, Order::Title)
    }

    pub fn search(query: impl Into<String>) -> Self {
        ShelfSource::Search {
            query: query.into(),
        }
    }

    /// Server path for this listing, search query percent-encoded.
    pub fn path(&self) -> String {
        match self {
            ShelfSource::Listing { section, order } => {
                let base = match section {
                    Section::Movies => "/movies/",
                    Section::Tv => "/tv/",
                };
                match order {
                    Order::Title => base.to_string(),
                    Order::Mtime => format!("{base}mtime/"),
                    Order::Rating => format!("{base}ratings/"),
                }
            }
            ShelfSource::Search { query } => {
                format!("/search/?q={}", urlencoding::encode(query))
            }
        }
    }
}

impl fmt::Display for ShelfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShelfSource::Listing { section, order } => {
                write!(f, "{section} by {order}")
            }
            ShelfSource::Search { query } => write!(f, "search \"{query}\""),
        }
    }
}
