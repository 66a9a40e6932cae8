//! UI layer for the shelf GUI: app shell, shelf rendering, and the backend worker.

pub mod app;

pub use app::ShelfGuiApp;
