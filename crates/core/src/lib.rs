#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod scoring;
pub mod text;
pub mod time;

pub use time::Clock;
