pub mod invoker;
pub mod materializer;
mod normalizer;
mod scratch;
mod service;
mod types;

pub use normalizer::InputNormalizer;
pub use scratch::ScratchFiles;
pub use service::TryOnService;
pub use types::{
    Category, DEFAULT_SEED, ImageInput, Steps, TryOnOutcome, TryOnParams, TryOnRequest,
};
