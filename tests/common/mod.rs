//! Shared test helpers: a scriptable in-memory transport

#![allow(dead_code)]

use async_trait::async_trait;
use rds_sdk::rds::{HttpRequest, RawResponse, Transport};
use rds_sdk::{RdsError, Result};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const COVID_API_URL: &str = "https://covid19.richdataservices.com/rds";
pub const CATALOG_ID: &str = "covid19";
pub const DATA_PRODUCT_ID: &str = "us_jhu_ccse_country";

type Hook = Box<dyn Fn(&HttpRequest) + Send + Sync>;

struct Reply {
    delay: Option<Duration>,
    result: Result<RawResponse>,
}

/// Transport answering from scripted replies and recording every request
///
/// Replies queued for a url are consumed in order; once exhausted (or when
/// none were queued) the transport answers `200 {}`.
#[derive(Default)]
pub struct StubTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    hook: Mutex<Option<Arc<Hook>>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, url: &str, status: u16, body: Value) {
        self.push(url, None, Ok(ok_or_status(status, body)));
    }

    pub fn reply_after(&self, url: &str, delay: Duration, body: Value) {
        self.push(url, Some(delay), Ok(ok_or_status(200, body)));
    }

    pub fn fail(&self, url: &str, error: RdsError) {
        self.push(url, None, Err(error));
    }

    /// Run `hook` when a request arrives, before replying
    pub fn on_request(&self, hook: impl Fn(&HttpRequest) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Arc::new(Box::new(hook)));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn push(&self, url: &str, delay: Option<Duration>, result: Result<RawResponse>) {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(Reply { delay, result });
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let hook = self.hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(&request);
        }

        let reply = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply { delay, result }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(ok_or_status(200, json!({}))),
        }
    }
}

fn ok_or_status(status: u16, body: Value) -> RawResponse {
    let status_text = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    RawResponse {
        status,
        status_text: status_text.to_string(),
        body,
    }
}

/// Poll `condition` until it holds or a second has passed
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
