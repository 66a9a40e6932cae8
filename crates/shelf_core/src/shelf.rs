//! The shelf model: title cards, posters, and the candidate-list state
//! machine driven by clicks on a card's rating line.

use url::{Position, Url};
use wire::{domain::VideoType, update::TitleUpdate};

use crate::source::ShelfSource;

/// Poster image as rendered: current source plus the declared height,
/// when the page declared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    pub src: Url,
    pub height: Option<u32>,
}

/// One provider match from the hidden list under a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub label: String,
    pub url: String,
}

/// Interaction state of a card's candidate list.
///
/// The list starts hidden exactly as served. The first reveal goes through
/// a plain visible state and immediately attaches apply actions plus the
/// manual URL row; after that, clicks only flip visibility while the
/// actions (and any half-typed manual URL) persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Collapsed,
    ExpandedPlain,
    ExpandedActionable { manual_url: String },
    CollapsedActionable { manual_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    pub entries: Vec<CandidateEntry>,
    state: ListState,
}

impl CandidateList {
    pub fn new(entries: Vec<CandidateEntry>) -> Self {
        Self {
            entries,
            state: ListState::Collapsed,
        }
    }

    /// Handles a click on the card's rating line. The first reveal makes
    /// the list actionable, exactly once; afterwards clicks only flip
    /// visibility. Returns whether the list is visible after the click.
    pub fn click_rating(&mut self) -> bool {
        self.toggle_hidden();
        if matches!(self.state, ListState::ExpandedPlain) {
            // First reveal only: plain links gain actions and the manual row.
            self.state = ListState::ExpandedActionable {
                manual_url: String::new(),
            };
        }
        self.is_visible()
    }

    /// Visibility flip alone, the hidden-class toggle of the rendered list.
    fn toggle_hidden(&mut self) {
        let prev = std::mem::replace(&mut self.state, ListState::Collapsed);
        self.state = match prev {
            ListState::Collapsed => ListState::ExpandedPlain,
            ListState::ExpandedPlain => ListState::Collapsed,
            ListState::ExpandedActionable { manual_url } => {
                ListState::CollapsedActionable { manual_url }
            }
            ListState::CollapsedActionable { manual_url } => {
                ListState::ExpandedActionable { manual_url }
            }
        };
    }

    pub fn is_visible(&self) -> bool {
        matches!(
            self.state,
            ListState::ExpandedPlain | ListState::ExpandedActionable { .. }
        )
    }

    pub fn is_actionable(&self) -> bool {
        matches!(
            self.state,
            ListState::ExpandedActionable { .. } | ListState::CollapsedActionable { .. }
        )
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn manual_url(&self) -> Option<&str> {
        match &self.state {
            ListState::ExpandedActionable { manual_url }
            | ListState::CollapsedActionable { manual_url } => Some(manual_url),
            _ => None,
        }
    }

    /// Mutable access for binding the manual row's text field.
    pub fn manual_url_mut(&mut self) -> Option<&mut String> {
        match &mut self.state {
            ListState::ExpandedActionable { manual_url }
            | ListState::CollapsedActionable { manual_url } => Some(manual_url),
            _ => None,
        }
    }

    /// Clears and returns the manual row's text. The input empties at
    /// submit time no matter how the request later settles.
    pub fn take_manual_url(&mut self) -> Option<String> {
        self.manual_url_mut().map(std::mem::take)
    }
}

/// One title block on the shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCard {
    pub title: String,
    pub video_type: VideoType,
    pub update_url: String,
    pub rating_line: String,
    pub blurb: String,
    pub poster: Option<Poster>,
    pub candidates: CandidateList,
}

impl TitleCard {
    /// Folds a successful update into the card: rating line, blurb, and,
    /// when the server sent new art, the poster source rebuilt on the old
    /// origin with the rendered height left alone.
    pub fn apply_update(&mut self, update: &TitleUpdate) {
        self.rating_line = format_rating_line(&update.rating, &self.title);
        self.blurb = update.blurb.clone();
        let (Some(path), Some(poster)) = (update.image_url.as_deref(), self.poster.as_mut())
        else {
            return;
        };
        match rebase_poster_url(&poster.src, path) {
            Ok(src) => poster.src = src,
            Err(err) => {
                tracing::warn!(
                    title = %self.title,
                    "keeping old poster, new image path unusable: {err}"
                );
            }
        }
    }
}

/// Rating text as the shelf renders it.
pub fn format_rating_line(rating: &str, title: &str) -> String {
    format!("{rating} - {title}")
}

/// Rebuilds a poster URL from the old source's scheme and host plus the
/// server-sent path, so art keeps loading from the origin that served the
/// shelf.
pub fn rebase_poster_url(old: &Url, new_path: &str) -> Result<Url, url::ParseError> {
    let origin = &old[..Position::BeforePath];
    Url::parse(&format!("{origin}{new_path}"))
}

/// One fetched listing: where it came from and the parsed cards.
#[derive(Debug, Clone)]
pub struct Shelf {
    pub source: ShelfSource,
    pub page_url: Url,
    pub cards: Vec<TitleCard>,
}

impl Shelf {
    pub fn card_by_title(&self, title: &str) -> Option<&TitleCard> {
        self.cards
            .iter()
            .find(|card| card.title.eq_ignore_ascii_case(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> CandidateEntry {
        CandidateEntry {
            label: label.to_string(),
            url: format!("https://provider.example/title/{label}/"),
        }
    }

    fn card_with_poster() -> TitleCard {
        TitleCard {
            title: "Archer".to_string(),
            video_type: VideoType::Tv,
            update_url: "/update/".to_string(),
            rating_line: "8.0/10 - Archer".to_string(),
            blurb: "old blurb".to_string(),
            poster: Some(Poster {
                src: Url::parse("http://127.0.0.1:8000/static/img/archer.jpg").unwrap(),
                height: Some(220),
            }),
            candidates: CandidateList::new(vec![entry("tt1486217")]),
        }
    }

    #[test]
    fn list_starts_collapsed_without_actions() {
        let list = CandidateList::new(vec![entry("a")]);
        assert!(!list.is_visible());
        assert!(!list.is_actionable());
        assert_eq!(list.manual_url(), None);
    }

    #[test]
    fn first_click_reveals_and_attaches_actions() {
        let mut list = CandidateList::new(vec![entry("a"), entry("b")]);
        assert!(list.click_rating());
        assert!(list.is_visible());
        assert!(list.is_actionable());
        assert_eq!(list.manual_url(), Some(""));
    }

    #[test]
    fn actions_survive_collapse_and_later_reveals() {
        let mut list = CandidateList::new(vec![entry("a")]);
        list.click_rating();
        assert!(!list.click_rating());
        assert!(list.is_actionable(), "hiding must not discard actions");
        assert!(list.click_rating());
        assert_eq!(
            list.state(),
            &ListState::ExpandedActionable {
                manual_url: String::new()
            }
        );
    }

    #[test]
    fn odd_clicks_show_even_clicks_hide() {
        let mut list = CandidateList::new(vec![entry("a")]);
        for click in 1..=6 {
            let visible = list.click_rating();
            assert_eq!(visible, click % 2 == 1, "after click {click}");
            assert!(list.is_actionable());
        }
    }

    #[test]
    fn typed_manual_text_survives_hiding() {
        let mut list = CandidateList::new(vec![entry("a")]);
        list.click_rating();
        *list.manual_url_mut().unwrap() = "https://provider.example/title/tt42/".to_string();
        list.click_rating();
        list.click_rating();
        assert_eq!(
            list.manual_url(),
            Some("https://provider.example/title/tt42/")
        );
    }

    #[test]
    fn take_manual_url_empties_the_field() {
        let mut list = CandidateList::new(Vec::new());
        list.click_rating();
        *list.manual_url_mut().unwrap() = "https://provider.example/title/tt42/".to_string();
        assert_eq!(
            list.take_manual_url().as_deref(),
            Some("https://provider.example/title/tt42/")
        );
        assert_eq!(list.manual_url(), Some(""));
    }

    #[test]
    fn empty_list_still_gains_the_manual_row() {
        let mut list = CandidateList::new(Vec::new());
        list.click_rating();
        assert!(list.is_actionable());
        assert!(list.entries.is_empty());
    }

    #[test]
    fn rating_line_is_rating_hyphen_title() {
        assert_eq!(format_rating_line("8.6/10", "Archer"), "8.6/10 - Archer");
    }

    #[test]
    fn apply_update_patches_rating_blurb_and_poster() {
        let mut card = card_with_poster();
        card.apply_update(&TitleUpdate {
            rating: "8.6/10".to_string(),
            blurb: "new blurb".to_string(),
            image_url: Some("/media/img/archer-new.jpg".to_string()),
        });
        assert_eq!(card.rating_line, "8.6/10 - Archer");
        assert_eq!(card.blurb, "new blurb");
        let poster = card.poster.unwrap();
        assert_eq!(
            poster.src.as_str(),
            "http://127.0.0.1:8000/media/img/archer-new.jpg"
        );
        assert_eq!(poster.height, Some(220), "rendered height must not jump");
    }

    #[test]
    fn apply_update_without_image_keeps_the_poster() {
        let mut card = card_with_poster();
        let before = card.poster.clone();
        card.apply_update(&TitleUpdate {
            rating: "8.6/10".to_string(),
            blurb: "new blurb".to_string(),
            image_url: None,
        });
        assert_eq!(card.poster, before);
    }

    #[test]
    fn apply_update_with_image_on_posterless_card_still_patches_text() {
        let mut card = card_with_poster();
        card.poster = None;
        card.apply_update(&TitleUpdate {
            rating: "7.0/10".to_string(),
            blurb: "b".to_string(),
            image_url: Some("/media/img/x.jpg".to_string()),
        });
        assert_eq!(card.rating_line, "7.0/10 - Archer");
        assert_eq!(card.poster, None);
    }

    #[test]
    fn rebase_keeps_scheme_host_and_port() {
        let old = Url::parse("https://shelf.example:8443/static/img/old.png?v=1").unwrap();
        let rebased = rebase_poster_url(&old, "/media/img/new.png").unwrap();
        assert_eq!(
            rebased.as_str(),
            "https://shelf.example:8443/media/img/new.png"
        );
    }

    #[test]
    fn card_lookup_is_case_insensitive() {
        let shelf = Shelf {
            source: ShelfSource::movies(),
            page_url: Url::parse("http://127.0.0.1:8000/movies/").unwrap(),
            cards: vec![card_with_poster()],
        };
        assert!(shelf.card_by_title("archer").is_some());
        assert!(shelf.card_by_title("Lodge 49").is_none());
    }
}
