//! In-memory transport for tests: replays canned `data` payloads in order
//! and records every request.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::transport::{GraphqlRequest, GraphqlTransport};

#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<VecDeque<ApiResult<Value>>>,
    calls: RefCell<Vec<GraphqlRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, data: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(data));
        self
    }

    pub fn fail(self, err: ApiError) -> Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<GraphqlRequest> {
        self.calls.borrow().clone()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.operation).collect()
    }
}

impl GraphqlTransport for FakeTransport {
    fn execute(&self, request: GraphqlRequest) -> ApiResult<Value> {
        let operation = request.operation;
        self.calls.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ApiError::MissingData(operation)))
    }
}
