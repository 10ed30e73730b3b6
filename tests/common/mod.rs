// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::StatusCode;
use sagitech_client::config::Config;
use sagitech_client::models::{Role, UserProfile};
use sagitech_client::routes::{Navigator, Route};
use sagitech_client::services::{ApiRequest, ApiResponse, Gateway, Transport, TransportError};
use sagitech_client::session::{keys, MemoryStore, SessionStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://backend.test/api";

/// One scripted transport outcome.
#[allow(dead_code)]
pub enum Step {
    Respond(u16, serde_json::Value),
    Fail(&'static str),
}

/// Transport that replays a fixed script and records what was sent.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    sent: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.url).collect()
    }

    /// Authorization header of each sent request.
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.sent()
            .iter()
            .map(|r| {
                r.headers
                    .get(AUTHORIZATION)
                    .map(|v| v.to_str().unwrap().to_string())
            })
            .collect()
    }

    pub fn refresh_calls(&self) -> usize {
        self.sent_urls()
            .iter()
            .filter(|url| url.ends_with("/token/refresh/"))
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more times than scripted");

        match step {
            Step::Respond(status, body) => Ok(ApiResponse {
                status: StatusCode::from_u16(status).unwrap(),
                headers: HeaderMap::new(),
                body: serde_json::to_vec(&body).unwrap(),
            }),
            Step::Fail(message) => Err(TransportError(message.to_string())),
        }
    }
}

/// Navigator that remembers every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Config pointing at the fake backend with short backoff.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        api_base_url: BASE_URL.to_string(),
        retry_base_delay: Duration::from_millis(5),
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn farmer() -> UserProfile {
    UserProfile {
        id: 7,
        username: "abena".to_string(),
        email: "abena@farm.gh".to_string(),
        first_name: "Abena".to_string(),
        last_name: "Boateng".to_string(),
        role: Role::Farmer,
    }
}

/// Store holding a full three-key session.
#[allow(dead_code)]
pub fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, access).unwrap();
    store
        .set(
            keys::TOKENS,
            &serde_json::json!({ "access": access, "refresh": refresh }).to_string(),
        )
        .unwrap();
    store
        .set(keys::USER, &serde_json::to_string(&farmer()).unwrap())
        .unwrap();
    store
}

/// Gateway over a scripted transport, recording redirects.
#[allow(dead_code)]
pub fn scripted_gateway(
    transport: Arc<ScriptedTransport>,
    store: Arc<MemoryStore>,
) -> (Gateway, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let gateway =
        Gateway::new(&test_config(), transport, store).with_navigator(navigator.clone());
    (gateway, navigator)
}

#[allow(dead_code)]
pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Request with nothing but a method and URL.
#[allow(dead_code)]
pub fn get(path: &str) -> ApiRequest {
    ApiRequest::get(url(path))
}
