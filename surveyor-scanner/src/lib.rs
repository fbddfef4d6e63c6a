pub mod classifier;
pub mod config;
pub mod crawler;
pub mod driver;
pub mod element;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod login;
pub mod normalize;

pub use crawler::Crawler;
pub use driver::{Driver, HttpSession};
pub use element::{CategorySet, ElementInfo, Link, PageRecord, RawElement, SiteModel};
pub use error::ScanError;
