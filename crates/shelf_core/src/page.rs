//! Parsing the server-rendered shelf page into the model.
//!
//! The page contract: each title is a `div.main-content` carrying
//! `data-title`, `data-video-type`, and `data-update-url`, with
//! `.title-rating`, `.blurb`, and `.title-image img` inside, and the
//! hidden candidate list as the immediately following `div.find-results`
//! sibling (`ul > li`, first child of each item an `a href`).

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;
use wire::domain::{ParseVideoTypeError, VideoType};

use crate::{
    shelf::{CandidateEntry, CandidateList, Poster, Shelf, TitleCard},
    source::ShelfSource,
};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("shelf request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("{status}: {status_text}")]
    Status { status: u16, status_text: String },
    #[error("shelf path is not a valid url: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("title block is missing its {attr} attribute")]
    MissingAttr { attr: &'static str },
    #[error("title block '{title}' has an unrecognized video type")]
    BadVideoType {
        title: String,
        #[source]
        source: ParseVideoTypeError,
    },
}

struct ShelfSelectors {
    card: Selector,
    rating: Selector,
    blurb: Selector,
    poster: Selector,
    item: Selector,
    link: Selector,
}

impl ShelfSelectors {
    fn new() -> Self {
        // Literal selectors; parsing them cannot fail.
        Self {
            card: Selector::parse("div.main-content").unwrap(),
            rating: Selector::parse(".title-rating").unwrap(),
            blurb: Selector::parse(".blurb").unwrap(),
            poster: Selector::parse(".title-image img").unwrap(),
            item: Selector::parse("ul > li").unwrap(),
            link: Selector::parse("a").unwrap(),
        }
    }
}

/// Turns one rendered shelf page into cards with collapsed candidate
/// lists, in document order.
pub fn parse_shelf(html: &str, page_url: &Url, source: ShelfSource) -> Result<Shelf, PageError> {
    let document = Html::parse_document(html);
    let selectors = ShelfSelectors::new();

    let mut cards = Vec::new();
    for element in document.select(&selectors.card) {
        cards.push(parse_card(element, page_url, &selectors)?);
    }

    tracing::debug!(cards = cards.len(), %page_url, "parsed shelf page");
    Ok(Shelf {
        source,
        page_url: page_url.clone(),
        cards,
    })
}

fn parse_card(
    element: ElementRef<'_>,
    page_url: &Url,
    selectors: &ShelfSelectors,
) -> Result<TitleCard, PageError> {
    let title = required_attr(element, "data-title")?;
    let update_url = required_attr(element, "data-update-url")?;
    let video_type = required_attr(element, "data-video-type")?
        .parse::<VideoType>()
        .map_err(|source| PageError::BadVideoType {
            title: title.clone(),
            source,
        })?;

    let rating_line = element
        .select(&selectors.rating)
        .next()
        .map(text_of)
        .unwrap_or_default();
    let blurb = element
        .select(&selectors.blurb)
        .next()
        .map(text_of)
        .unwrap_or_default();
    let poster = element
        .select(&selectors.poster)
        .next()
        .and_then(|img| parse_poster(img, page_url));
    let candidates = candidate_entries(element, page_url, selectors);

    Ok(TitleCard {
        title,
        video_type,
        update_url,
        rating_line,
        blurb,
        poster,
        candidates,
    })
}

fn parse_poster(img: ElementRef<'_>, page_url: &Url) -> Option<Poster> {
    let src = img.value().attr("src")?;
    let src = page_url.join(src).ok()?;
    let height = img
        .value()
        .attr("height")
        .and_then(|raw| raw.trim().parse().ok());
    Some(Poster { src, height })
}

/// Candidate entries come from the card's immediately following
/// `div.find-results` sibling; a card without one gets an empty list.
fn candidate_entries(
    card: ElementRef<'_>,
    page_url: &Url,
    selectors: &ShelfSelectors,
) -> CandidateList {
    let Some(results) = following_results_sibling(card) else {
        return CandidateList::new(Vec::new());
    };

    let mut entries = Vec::new();
    for item in results.select(&selectors.item) {
        // The entry's first child is the provider link; items without one
        // have nothing to apply.
        let Some(link) = item.select(&selectors.link).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let url = page_url
            .join(href)
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|_| href.to_string());
        entries.push(CandidateEntry {
            label: text_of(link),
            url,
        });
    }
    CandidateList::new(entries)
}

fn following_results_sibling(card: ElementRef<'_>) -> Option<ElementRef<'_>> {
    card.next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|el| el.value().classes().any(|class| class == "find-results"))
}

fn required_attr(element: ElementRef<'_>, attr: &'static str) -> Result<String, PageError> {
    element
        .value()
        .attr(attr)
        .map(|value| value.trim().to_string())
        .ok_or(PageError::MissingAttr { attr })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
