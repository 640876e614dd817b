//! kubeanno-engine — one scrape cycle, start to finish.
//!
//! Each inbound scrape runs [`CollectionEngine::on_scrape`], which:
//!
//! 1. bounds the cycle by a deadline (default five minutes),
//! 2. enters the cycle window (one cycle at a time),
//! 3. resets the published snapshot,
//! 4. lists every catalog kind in order, scanning each object against
//!    the watch-list and publishing matches as they are found,
//! 5. stops at the first failing kind and returns its error.
//!
//! Points published before a failure stay published until the next
//! cycle's reset.

pub mod engine;
pub mod error;

pub use engine::{CollectionEngine, CycleReport, DEFAULT_DEADLINE};
pub use error::CollectError;
