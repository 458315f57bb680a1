//! Canned-response transport for unit tests.

use super::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::sync::Mutex;

pub(crate) struct StubClient {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
    requests: Mutex<Vec<(String, HeaderMap)>>,
}

impl StubClient {
    pub(crate) fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok(Vec::new())
        }
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_url(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|(url, _)| url.clone())
    }

    pub(crate) fn last_header(&self, name: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, headers)| headers.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.requests
            .lock()
            .unwrap()
            .push((req.url().to_string(), req.headers().clone()));

        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(*name, value.as_str());
        }
        let resp = builder
            .body(self.body.clone())
            .expect("stub response is well formed");
        Ok(resp.into())
    }
}
