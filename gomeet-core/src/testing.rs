//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::{RawResponse, Request, Transport};
use crate::error::GoMeetResult;

struct Route {
    path: &'static str,
    param: Option<(&'static str, String)>,
    responses: VecDeque<RawResponse>,
}

impl Route {
    fn matches(&self, request: &Request) -> bool {
        if self.path != request.path {
            return false;
        }
        match &self.param {
            Some((name, value)) => request.param(name) == Some(value.as_str()),
            None => true,
        }
    }

    /// Queued responses are consumed in order; the last one repeats.
    fn next(&mut self) -> RawResponse {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap()
        } else {
            self.responses.front().cloned().unwrap()
        }
    }
}

/// Answers requests from a script and records everything it was sent.
/// Unscripted paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    sent: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &'static str, status: u16, body: &str) -> Self {
        self.push(path, None, status, "", body)
    }

    pub fn respond_status(self, path: &'static str, status: u16, reason: &str, body: &str) -> Self {
        self.push(path, None, status, reason, body)
    }

    /// Respond only when the request carries `name=value`.
    pub fn respond_when(
        self,
        path: &'static str,
        name: &'static str,
        value: &str,
        status: u16,
        body: &str,
    ) -> Self {
        self.push(path, Some((name, value.to_string())), status, "", body)
    }

    fn push(
        self,
        path: &'static str,
        param: Option<(&'static str, String)>,
        status: u16,
        reason: &str,
        body: &str,
    ) -> Self {
        let response = RawResponse {
            status,
            reason: reason.to_string(),
            body: body.to_string(),
        };
        {
            let mut routes = self.routes.lock().unwrap();
            match routes
                .iter_mut()
                .find(|r| r.path == path && r.param == param)
            {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    path,
                    param,
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> GoMeetResult<RawResponse> {
        let response = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.matches(&request))
                .map(Route::next)
        };
        self.sent.lock().unwrap().push(request);

        Ok(response.unwrap_or(RawResponse {
            status: 404,
            reason: "Not Found".to_string(),
            body: String::new(),
        }))
    }
}
