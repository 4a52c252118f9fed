mod chrome;
mod completion;
pub mod error;
mod export;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod page;
mod style;
mod target;
mod wait;

pub use crate::chrome::{Chrome, ChromeOptions, ChromeTab};
pub use crate::completion::{Completion, is_done, wait_for_done};
pub use crate::export::{PageLayout, export_pdf};
pub use crate::page::{PageSource, PosterPage, prepare};
pub use crate::style::StyleConfig;
pub use crate::target::{page_url, poster_url};
pub use crate::wait::DEFAULT_POLL_INTERVAL;
