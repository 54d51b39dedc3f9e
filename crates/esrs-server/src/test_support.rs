//! Router test fixtures: in-memory collections and a scripted gateway.

use std::collections::VecDeque;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::Request;
use axum::response::Response;
use esrs_chat::gateway::CompletionGateway;
use esrs_chat::LLMConfig;
use esrs_core::{CollectionLayout, Error, EsrsConfig, Result};
use esrs_infer::LexicalScorer;
use esrs_resolve::{Retriever, SectorTable};
use esrs_runtime::{build_assistant, NoopSink};
use esrs_store::{Document, IndexStore, ScoredDocument, VectorIndex};
use parking_lot::Mutex;

use crate::state::AppState;

struct ListIndex {
    name: &'static str,
    docs: Vec<&'static str>,
}

impl VectorIndex for ListIndex {
    fn name(&self) -> &str {
        self.name
    }

    fn len(&self) -> usize {
        self.docs.len()
    }

    fn search(&self, _query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        Ok(self
            .docs
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, text)| ScoredDocument {
                document: Document::new(*text),
                distance: i as f32,
            })
            .collect())
    }
}

struct ScriptedGateway(Mutex<VecDeque<String>>);

impl CompletionGateway for ScriptedGateway {
    fn complete(&self, _prompt: &str) -> Result<String> {
        self.0
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Gateway("connection refused".into()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// App state over five small collections; the gateway replays `responses`.
pub fn app_state(responses: &[&str]) -> Arc<AppState> {
    let index = |name: &'static str, docs: Vec<&'static str>| -> Arc<dyn VectorIndex> {
        Arc::new(ListIndex { name, docs })
    };
    let store = Arc::new(IndexStore::from_indexes(
        CollectionLayout::default(),
        vec![
            index("nace_db", vec!["B06 Extraction of crude petroleum and natural gas"]),
            index(
                "default_db",
                vec![
                    "ESRS E1 covers climate change",
                    "ESRS S1 covers own workforce",
                ],
            ),
            index("oil_gas_db", vec!["Oil and gas undertakings disclose Scope 3 emissions"]),
            index("mining_db", vec!["Mining undertakings disclose tailings"]),
            index("road_db", vec!["Road transport undertakings disclose fleet emissions"]),
        ],
    ));
    let table = Arc::new(SectorTable::from_pairs([
        ("B06", "Oil & Gas Company"),
        ("B05", "Mining, Quarrying and Coal"),
        ("H49.4", "Road Transport"),
    ]));
    let gateway = Arc::new(ScriptedGateway(Mutex::new(
        responses.iter().map(|r| r.to_string()).collect(),
    )));
    let retriever = Arc::new(Retriever::new(Arc::new(LexicalScorer)));
    let reranker = retriever.scorer_name().to_string();

    let assistant = build_assistant(store.clone(), retriever, table, gateway, Arc::new(NoopSink));
    let config = EsrsConfig::from_lookup(std::env::temp_dir(), |_| None).unwrap();
    Arc::new(AppState::new(
        config,
        store,
        assistant,
        LLMConfig::default().status(),
        reranker,
    ))
}

pub fn post_json(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::post(uri).header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    request.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
