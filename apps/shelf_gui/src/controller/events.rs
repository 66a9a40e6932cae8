//! UI/backend events and error modeling for the shelf GUI controller.

use shelf_core::Shelf;
use wire::update::TitleUpdate;

use crate::backend_bridge::commands::ActionKey;
use crate::ui::app::PosterImage;

pub enum UiEvent {
    ShelfLoading,
    ShelfLoaded(Shelf),
    ShelfLoadFailed(UiError),
    UpdateApplied {
        action: ActionKey,
        update: TitleUpdate,
    },
    UpdateFailed {
        action: ActionKey,
        error: UiError,
    },
    ActionSettled {
        action: ActionKey,
    },
    PosterLoaded {
        generation: u64,
        card: usize,
        image: PosterImage,
    },
    PosterFailed {
        generation: u64,
        card: usize,
        reason: String,
    },
    BackendFailed(UiError),
    Info(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadShelf,
    ApplyUpdate,
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn dialog_title(&self) -> &'static str {
        match self.context {
            UiErrorContext::BackendStartup => "Backend failure",
            UiErrorContext::LoadShelf => "Shelf load failed",
            UiErrorContext::ApplyUpdate => "Update failed",
        }
    }
}
