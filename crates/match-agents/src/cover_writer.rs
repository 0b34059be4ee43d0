//! Reasoning-backed cover-letter deriver, biased toward the verdict's
//! supporting arguments.

use std::sync::Arc;

use async_trait::async_trait;

use tribunal::derive::{CoverWriter, DeriveError};
use tribunal::{DebateState, Verdict};

use crate::backend::ReasoningBackend;
use crate::prompts;

pub struct LlmCoverWriter {
    backend: Arc<dyn ReasoningBackend>,
}

impl LlmCoverWriter {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CoverWriter for LlmCoverWriter {
    async fn write(&self, state: &DebateState, verdict: &Verdict) -> Result<String, DeriveError> {
        let highlights: Vec<String> = verdict
            .supporting_arguments
            .iter()
            .filter_map(|&i| state.arguments.get(i))
            .filter(|a| !a.is_failure())
            .map(|a| a.claim.clone())
            .collect();

        let request = prompts::cover_letter_request(state, &highlights);
        let value = self
            .backend
            .invoke(&request)
            .await
            .map_err(|e| DeriveError::CoverLetter(e.to_string()))?;

        value["cover_letter"]
            .as_str()
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DeriveError::CoverLetter("missing cover_letter field".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tribunal::{
        Argument, ArgumentAuthor, ArgumentStrength, JobPosting, MatchOutcome, Profile,
    };

    use crate::backend::{BackendError, PromptRequest};

    struct StubBackend {
        responses: Mutex<VecDeque<Result<Value, BackendError>>>,
        last_user: Mutex<String>,
    }

    impl StubBackend {
        fn new(responses: Vec<Result<Value, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                last_user: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl ReasoningBackend for StubBackend {
        async fn invoke(&self, request: &PromptRequest) -> Result<Value, BackendError> {
            *self.last_user.lock().unwrap() = request.user.clone();
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(BackendError::Transport("script exhausted".into())))
        }
    }

    fn state_and_verdict() -> (DebateState, Verdict) {
        let profile = Arc::new(Profile {
            id: "cand-1".into(),
            name: "Ada".into(),
            skills: BTreeSet::new(),
            experience: Vec::new(),
            raw_resume: String::new(),
            portfolio_handle: None,
        });
        let posting = Arc::new(JobPosting {
            id: "job-1".into(),
            title: "Engineer".into(),
            org: "Globex".into(),
            required_skills: BTreeSet::new(),
            preferred_skills: BTreeSet::new(),
            description: String::new(),
            min_experience_years: None,
        });
        let mut state = DebateState::open(profile, posting);
        state.record_argument(Argument::new(
            ArgumentAuthor::Coach,
            0,
            "Deep Python expertise",
            Vec::new(),
            ArgumentStrength::Strong,
        ));
        let verdict = Verdict {
            outcome: MatchOutcome::Match,
            rationale: "fits".into(),
            confidence: 0.8,
            score: 80.0,
            supporting_arguments: vec![0],
            must_address: Vec::new(),
            nice_to_have: Vec::new(),
            degraded: false,
        };
        (state, verdict)
    }

    #[tokio::test]
    async fn test_writes_letter_from_highlights() {
        let backend = StubBackend::new(vec![Ok(json!({ "cover_letter": "Dear team, ..." }))]);
        let writer = LlmCoverWriter::new(backend.clone());
        let (state, verdict) = state_and_verdict();

        let letter = writer.write(&state, &verdict).await.unwrap();
        assert_eq!(letter, "Dear team, ...");
        assert!(backend
            .last_user
            .lock()
            .unwrap()
            .contains("Deep Python expertise"));
    }

    #[tokio::test]
    async fn test_missing_field_is_error() {
        let backend = StubBackend::new(vec![Ok(json!({ "letter": "wrong key" }))]);
        let writer = LlmCoverWriter::new(backend);
        let (state, verdict) = state_and_verdict();
        assert!(writer.write(&state, &verdict).await.is_err());
    }
}
