// In-process stand-in for Groq, SerpAPI and Deepgram.
// Replies are queued per request path and served in order; every request is recorded.
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::{Config, DeepgramSettings, LlmSettings, SerpSettings};
use crate::job_search::SerpApiClient;
use crate::llm_client::LlmClient;
use crate::matching::LlmMatchScorer;
use crate::speech::DeepgramClient;
use crate::state::{AppState, Services};
use crate::workflow::{MemoryCheckpointer, WorkflowRunner};

pub const CHAT_PATH: &str = "/chat/completions";
pub const SEARCH_PATH: &str = "/search";
pub const LISTEN_PATH: &str = "/v1/listen";
pub const SPEAK_PATH: &str = "/v1/speak";

#[derive(Debug, Clone)]
pub enum MockReply {
    Json { status: u16, body: Value },
    Text { status: u16, body: String },
    Bytes { content_type: String, body: Vec<u8> },
}

impl MockReply {
    pub fn json(body: Value) -> Self {
        MockReply::Json { status: 200, body }
    }

    pub fn status(status: u16, body: &str) -> Self {
        MockReply::Text {
            status,
            body: body.to_string(),
        }
    }

    pub fn mp3(body: &[u8]) -> Self {
        MockReply::Bytes {
            content_type: "audio/mpeg".to_string(),
            body: body.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        reqwest::Url::parse(&format!("http://mock/?{query}"))
            .ok()?
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(|queue| queue.pop_front());

    match reply {
        Some(MockReply::Json { status, body }) => {
            (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
        }
        Some(MockReply::Text { status, body }) => {
            (StatusCode::from_u16(status).unwrap(), body).into_response()
        }
        Some(MockReply::Bytes { content_type, body }) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            body,
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("mock ran out of replies for {path}"),
        )
            .into_response(),
    }
}

/// Mock provider server bound on 127.0.0.1:0. Dropped with the test runtime.
pub struct MockProviders {
    addr: SocketAddr,
    state: MockState,
}

impl MockProviders {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock provider server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn push(&self, path: &str, reply: MockReply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_chat(&self, reply: MockReply) {
        self.push(CHAT_PATH, reply);
    }

    pub fn push_chat_text(&self, content: &str) {
        self.push_chat(MockReply::json(chat_completion(content)));
    }

    pub fn push_chat_json(&self, value: Value) {
        self.push_chat_text(&value.to_string());
    }

    pub fn push_chat_tool_call(&self, name: &str, arguments: Value) {
        self.push_chat(MockReply::json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_0",
                        "type": "function",
                        "function": { "name": name, "arguments": arguments.to_string() }
                    }]
                }
            }]
        })));
    }

    pub fn push_serp(&self, reply: MockReply) {
        self.push(SEARCH_PATH, reply);
    }

    pub fn push_transcript(&self, transcript: &str) {
        self.push(
            LISTEN_PATH,
            MockReply::json(json!({
                "results": { "channels": [{ "alternatives": [{ "transcript": transcript }] }] }
            })),
        );
    }

    pub fn push_speech(&self, mp3: &[u8]) {
        self.push(SPEAK_PATH, MockReply::mp3(mp3));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: "gsk-test".to_string(),
            base_url: self.address(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 2500,
            temperature: 0.7,
        }
    }

    pub fn llm_client(&self) -> LlmClient {
        LlmClient::new(&self.llm_settings()).with_retry_base_delay(Duration::from_millis(1))
    }

    pub fn serp_client(&self) -> SerpApiClient {
        SerpApiClient::new(&SerpSettings {
            api_key: "serp-test".to_string(),
            base_url: self.address(),
            engine: "google_jobs".to_string(),
        })
    }

    pub fn deepgram_client(&self) -> DeepgramClient {
        DeepgramClient::new(&DeepgramSettings {
            api_key: "dg-test".to_string(),
            base_url: self.address(),
            stt_model: "nova-2".to_string(),
            tts_model: "aura-asteria-en".to_string(),
        })
    }

    pub fn services(&self) -> Services {
        let llm = self.llm_client();
        Services {
            match_scorer: Arc::new(LlmMatchScorer::new(llm.clone())),
            llm,
            jobs: self.serp_client(),
            speech: self.deepgram_client(),
            artifacts: None,
        }
    }

    /// Router state over these mocks: in-memory checkpoints, no database, no S3.
    pub fn app_state(&self) -> AppState {
        let address = self.address();
        let config = Config::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("gsk-test".to_string()),
            "SERPAPI_API_KEY" => Some("serp-test".to_string()),
            "DEEPGRAM_API_KEY" => Some("dg-test".to_string()),
            "GROQ_BASE_URL" | "SERPAPI_BASE_URL" | "DEEPGRAM_BASE_URL" => Some(address.clone()),
            _ => None,
        })
        .expect("mock config is valid");

        let services = self.services();
        AppState {
            runner: WorkflowRunner::new(services.clone(), Arc::new(MemoryCheckpointer::new())),
            services,
            db: None,
            config,
        }
    }
}

/// A minimal chat-completions body whose first choice carries `content`.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8 }
    })
}
