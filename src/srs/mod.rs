pub mod review;
pub mod scheduler;
pub mod stats;

pub use review::{ReviewError, ReviewSession, ReviewState};
pub use scheduler::{calculate_next_review, SrsUpdate, MAX_SRS_LEVEL};
