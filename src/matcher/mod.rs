pub mod notifier;
pub mod optimiser;
pub mod stats;
pub mod submatch;
