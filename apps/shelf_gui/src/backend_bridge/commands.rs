//! Backend commands queued from UI to backend worker.

use std::time::Duration;

use shelf_core::{ShelfSource, UpdateRequest};
use url::Url;

/// One click target that can carry an in-flight update: a candidate
/// entry's apply action or the card's manual-URL row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSource {
    Candidate(usize),
    Manual,
}

/// Identifies one click target on one loaded shelf. `generation` is the
/// shelf the action was dispatched from; a reload rebuilds the cards, so
/// completions stamped with an older generation no longer name anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub generation: u64,
    pub card: usize,
    pub source: ActionSource,
}

pub enum BackendCommand {
    Configure {
        server_url: Url,
        csrf_cookie: String,
        update_timeout: Duration,
    },
    LoadShelf {
        source: ShelfSource,
    },
    ApplyUpdate {
        action: ActionKey,
        request: UpdateRequest,
    },
    FetchPoster {
        generation: u64,
        card: usize,
        url: Url,
    },
}
