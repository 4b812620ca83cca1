pub mod client;
pub mod types;

pub use client::{InferenceClient, ReplicateClient};
pub use types::{ModelRef, Prediction, PredictionInput, PredictionStatus};
