//! Reducer: folds backend events into the shelf view state.

use std::collections::HashSet;

use shelf_core::Shelf;

use crate::backend_bridge::commands::ActionSource;
use crate::controller::events::{UiError, UiEvent};
use crate::ui::app::PosterImage;

/// Per-card poster pipeline. The texture is uploaded lazily at render time
/// because `egui::Context` is only available there.
pub enum PosterState {
    NotRequested,
    Loading,
    Ready {
        image: PosterImage,
        texture: Option<egui::TextureHandle>,
    },
    Error(String),
}

/// Render-side companion to a `TitleCard`: poster pipeline plus the set of
/// in-flight update actions for that card.
pub struct CardUi {
    pub poster: PosterState,
    pub busy: HashSet<ActionSource>,
}

impl Default for CardUi {
    fn default() -> Self {
        Self {
            poster: PosterState::NotRequested,
            busy: HashSet::new(),
        }
    }
}

impl CardUi {
    pub fn is_busy(&self, source: ActionSource) -> bool {
        self.busy.contains(&source)
    }
}

pub struct ErrorDialog {
    pub title: &'static str,
    pub message: String,
}

impl ErrorDialog {
    fn from_error(error: &UiError) -> Self {
        Self {
            title: error.dialog_title(),
            message: error.message().to_string(),
        }
    }
}

/// Everything the render pass reads. Mutated only by [`apply_event`] and by
/// direct user interactions in the render code.
pub struct ShelfUi {
    pub shelf: Option<Shelf>,
    /// Bumped every time a shelf arrives. Commands dispatched from the
    /// render pass carry the value current at dispatch; completions
    /// stamped with an older one are dropped instead of landing on
    /// whatever card now sits at their index.
    pub generation: u64,
    pub cards: Vec<CardUi>,
    pub error_dialog: Option<ErrorDialog>,
    pub search_text: String,
    pub loading_shelf: bool,
}

impl Default for ShelfUi {
    fn default() -> Self {
        Self {
            shelf: None,
            generation: 0,
            cards: Vec::new(),
            error_dialog: None,
            search_text: String::new(),
            loading_shelf: false,
        }
    }
}

/// Applies one backend event to the view state. Returns a status line for the
/// bottom bar when the event warrants one.
pub fn apply_event(view: &mut ShelfUi, event: UiEvent) -> Option<String> {
    match event {
        UiEvent::ShelfLoading => {
            view.loading_shelf = true;
            None
        }
        UiEvent::ShelfLoaded(shelf) => {
            view.loading_shelf = false;
            view.generation += 1;
            view.cards = shelf.cards.iter().map(|_| CardUi::default()).collect();
            view.search_text.clear();
            let count = shelf.cards.len();
            view.shelf = Some(shelf);
            Some(format!("Loaded {count} titles"))
        }
        UiEvent::ShelfLoadFailed(error) => {
            view.loading_shelf = false;
            Some(format!("Shelf load failed: {}", error.message()))
        }
        UiEvent::UpdateApplied { action, update } => {
            if action.generation != view.generation {
                return None;
            }
            let Some(shelf) = view.shelf.as_mut() else {
                return None;
            };
            let Some(card) = shelf.cards.get_mut(action.card) else {
                return None;
            };
            let old_src = card.poster.as_ref().map(|poster| poster.src.clone());
            card.apply_update(&update);
            let new_src = card.poster.as_ref().map(|poster| poster.src.clone());
            if old_src != new_src {
                // New art means the cached pixels are stale.
                if let Some(ui) = view.cards.get_mut(action.card) {
                    ui.poster = PosterState::NotRequested;
                }
            }
            Some(format!("Updated {}", card.title))
        }
        UiEvent::UpdateFailed { action, error } => {
            if action.generation != view.generation {
                return None;
            }
            view.error_dialog = Some(ErrorDialog::from_error(&error));
            None
        }
        UiEvent::ActionSettled { action } => {
            if action.generation != view.generation {
                return None;
            }
            if let Some(ui) = view.cards.get_mut(action.card) {
                ui.busy.remove(&action.source);
            }
            None
        }
        UiEvent::PosterLoaded {
            generation,
            card,
            image,
        } => {
            if generation != view.generation {
                return None;
            }
            if let Some(ui) = view.cards.get_mut(card) {
                ui.poster = PosterState::Ready {
                    image,
                    texture: None,
                };
            }
            None
        }
        UiEvent::PosterFailed {
            generation,
            card,
            reason,
        } => {
            if generation != view.generation {
                return None;
            }
            if let Some(ui) = view.cards.get_mut(card) {
                ui.poster = PosterState::Error(reason);
            }
            None
        }
        UiEvent::BackendFailed(error) => {
            view.error_dialog = Some(ErrorDialog::from_error(&error));
            Some(format!("Backend failure: {}", error.message()))
        }
        UiEvent::Info(message) => Some(message),
    }
}
