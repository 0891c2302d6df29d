use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use scriptaudit_ai::{CompletionProvider, CompletionRequest, ProviderError};

type Reply = Result<String, ProviderError>;

/// Provider with pre-set replies, for dev and tests.
///
/// Scripted replies are handed out in order; once they run out the last one
/// repeats. Requests are recorded.
#[derive(Debug)]
pub struct CannedProvider {
    inner: Mutex<CannedState>,
}

#[derive(Debug)]
struct CannedState {
    queue: VecDeque<Reply>,
    last: Reply,
    requests: Vec<CompletionRequest>,
}

impl CannedProvider {
    /// Always answer with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(text.into())])
    }

    /// Answer with each reply in turn. An empty script yields `EmptyResponse`.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or(Err(ProviderError::EmptyResponse));
        Self {
            inner: Mutex::new(CannedState {
                queue: replies.into(),
                last,
                requests: Vec::new(),
            }),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state().requests.clone()
    }

    pub fn calls(&self) -> usize {
        self.state().requests.len()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, CannedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CompletionProvider for CannedProvider {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut state = self.state();
        state.requests.push(request.clone());
        match state.queue.pop_front() {
            Some(reply) => reply,
            None => state.last.clone(),
        }
    }
}
