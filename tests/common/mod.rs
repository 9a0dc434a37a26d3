#![allow(dead_code)]

use async_trait::async_trait;
use mavericks::error::AgentError;
use mavericks::llm::embedding::{ EmbeddingClient, EmbeddingResponse };
use mavericks::models::profile::Profile;
use mavericks::profiles::ProfileSource;
use std::sync::atomic::{ AtomicUsize, Ordering };

/// Deterministic embedder: one dimension per vocabulary word, value = occurrence count.
pub struct VocabEmbedder {
    vocab: Vec<&'static str>,
    pub calls: AtomicUsize,
}

impl VocabEmbedder {
    pub fn new() -> Self {
        Self {
            vocab: vec![
                "kathryn", "alice", "bob", "email", "emea", "apac", "amer", "rust", "python",
                "cloud", "data", "architect", "analyst"
            ],
            calls: AtomicUsize::new(0),
        }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0; self.vocab.len()];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = token.to_lowercase();
            if let Some(pos) = self.vocab.iter().position(|w| *w == token) {
                v[pos] += 1.0;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingClient for VocabEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingResponse { embedding: self.vector(text) })
    }

    fn model(&self) -> &str {
        "vocab-test"
    }
}

/// Embedder whose backend is always unavailable.
pub struct UnavailableEmbedder;

#[async_trait]
impl EmbeddingClient for UnavailableEmbedder {
    async fn embed(&self, _text: &str) -> Result<EmbeddingResponse, AgentError> {
        Err(AgentError::Capability("connection refused".into()))
    }

    fn model(&self) -> &str {
        "unavailable"
    }
}

/// Profile source that counts how often it is read.
pub struct CountingProfiles {
    profiles: Vec<Profile>,
    pub loads: AtomicUsize,
}

impl CountingProfiles {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles, loads: AtomicUsize::new(0) }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ProfileSource for CountingProfiles {
    fn load(&self) -> Result<Vec<Profile>, AgentError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.profiles.clone())
    }
}

pub fn sample_profiles() -> Vec<Profile> {
    serde_json
        ::from_str(
            r#"[
                {
                    "name": "Kathryn",
                    "email": "kathryn@example.com",
                    "region": "EMEA",
                    "designation": "Architect",
                    "skills": ["Rust", "Cloud"]
                },
                {
                    "name": "Alice",
                    "email": "alice@example.com",
                    "region": "APAC",
                    "designation": "Analyst",
                    "skills": ["Python", "Data"]
                },
                {
                    "name": "Bob",
                    "email": "bob@example.com",
                    "region": "AMER",
                    "categoryExpertise": "Cloud"
                }
            ]"#
        )
        .unwrap()
}
