pub mod client;
pub mod migrate;
pub mod sweeper;
#[cfg(feature = "test-utils")]
pub mod testutil;
pub mod writer;

pub use client::GraphClient;
pub use sweeper::{DedupSweeper, SweepStats};
pub use writer::{GraphWriteError, GraphWriter, WriteOutcome};
