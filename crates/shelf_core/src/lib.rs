pub mod client;
pub mod config;
pub mod cookies;
pub mod page;
pub mod shelf;
pub mod source;

pub use client::{HttpShelfClient, ShelfTransport, UpdateError, UpdateRequest};
pub use page::PageError;
pub use shelf::{CandidateEntry, CandidateList, ListState, Poster, Shelf, TitleCard};
pub use source::{Order, Section, ShelfSource};
