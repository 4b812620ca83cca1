use async_trait::async_trait;
use tryon_rust::{
    Error, Result,
    replicate::{InferenceClient, PredictionInput},
};
use std::sync::{Arc, Mutex};

/// Mock inference client for testing
#[derive(Debug)]
pub struct MockInferenceClient {
    pub output: Vec<u8>,
    pub requests: Arc<Mutex<Vec<PredictionInput>>>,
    pub error: Option<String>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn get_requests(&self) -> Vec<PredictionInput> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn run(&self, input: &PredictionInput) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(input.clone());

        if let Some(ref error) = self.error {
            return Err(Error::remote(error.clone()));
        }

        Ok(self.output.clone())
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}
