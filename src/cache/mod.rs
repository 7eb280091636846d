//! Cache Module
//!
//! Provides in-process memoization with TTL expiration and FIFO eviction.

mod clock;
mod entry;
mod key;
mod memoize;
mod order;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use key::{CacheArgs, CacheKey, CallArgs, KeyArg, KeyPart};
pub use memoize::Memoized;
pub use stats::CacheStats;
pub use store::MemoCache;
