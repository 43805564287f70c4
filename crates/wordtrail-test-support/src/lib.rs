//! Shared test doubles and content fixtures for the Wordtrail engine.

mod clock;
mod content;
pub mod fixtures;
mod rng;
mod store;

pub use clock::{FixedClock, fixed_clock};
pub use content::InMemoryContentRepository;
pub use rng::{MockRng, SequenceRng};
pub use store::RecordingSaveStore;
