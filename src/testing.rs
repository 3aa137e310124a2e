//! Test doubles shared by unit tests.
use crate::backend::{TranslationBackend, TranslationRequest};
use crate::cost::{Confirm, CostEstimate};
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Backend that replays scripted responses in order and records requests.
#[derive(Default)]
pub struct StubBackend {
    responses: RefCell<VecDeque<Result<String>>>,
    requests: RefCell<Vec<TranslationRequest>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(anyhow!(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl TranslationBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn complete(&self, request: &TranslationRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("stub backend has no scripted response")))
    }
}

/// Confirmation gate with a fixed answer that counts how often it was asked.
pub struct FixedConfirm {
    pub answer: bool,
    pub asked: Vec<(String, CostEstimate)>,
}

impl FixedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Confirm for FixedConfirm {
    fn confirm(&mut self, locale: &str, estimate: &CostEstimate) -> Result<bool> {
        self.asked.push((locale.to_string(), *estimate));
        Ok(self.answer)
    }
}
