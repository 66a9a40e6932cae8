pub mod domain;
pub mod update;
