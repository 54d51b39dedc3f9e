//! Test doubles shared by the runtime unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use esrs_chat::gateway::CompletionGateway;
use esrs_core::{CollectionLayout, Error, Result};
use esrs_infer::LexicalScorer;
use esrs_resolve::{Retriever, SectorTable};
use esrs_store::{Document, IndexStore, ScoredDocument, VectorIndex};
use parking_lot::Mutex;

use crate::assembler::ContextAssembler;
use crate::assistant::Assistant;
use crate::classifier::NaceClassifier;
use crate::events::{ConversationEvent, ConversationSink};

/// Returns its documents in storage order for any query.
pub struct FixedIndex {
    pub name: &'static str,
    pub docs: Vec<String>,
}

impl VectorIndex for FixedIndex {
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
                document: Document::new(text.clone()),
                distance: i as f32,
            })
            .collect())
    }
}

/// Replays canned completions in order and records every prompt.
///
/// Once the script runs out every call fails.
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: &str) {
        self.responses.lock().push_back(response.to_string());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl CompletionGateway for ScriptedGateway {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Gateway("quota exceeded".into()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(String, ConversationEvent)>>,
}

impl ConversationSink for RecordingSink {
    fn record(&self, session_id: &str, event: &ConversationEvent) {
        self.events
            .lock()
            .push((session_id.to_string(), event.clone()));
    }
}

fn index(name: &'static str, docs: &[&str]) -> Arc<dyn VectorIndex> {
    Arc::new(FixedIndex {
        name,
        docs: docs.iter().map(|d| d.to_string()).collect(),
    })
}

/// Five collections of a few passages each, plus a small sector table.
pub struct Fixture {
    pub store: Arc<IndexStore>,
    pub table: Arc<SectorTable>,
    pub retriever: Arc<Retriever>,
    pub gateway: Arc<ScriptedGateway>,
    pub sink: Arc<RecordingSink>,
}

impl Fixture {
    pub fn new(responses: &[&str]) -> Self {
        let indexes = vec![
            index(
                "nace_db",
                &[
                    "A01.1 Growing of non-perennial crops",
                    "B05 Mining of coal and lignite",
                    "B06 Extraction of crude petroleum and natural gas",
                ],
            ),
            index(
                "default_db",
                &[
                    "ESRS E1 covers climate change mitigation and adaptation",
                    "ESRS S1 covers the undertaking's own workforce",
                ],
            ),
            index(
                "oil_gas_db",
                &["Oil and gas undertakings shall disclose Scope 3 emissions from sold products"],
            ),
            index("mining_db", &["Mining undertakings shall disclose tailings management"]),
            index("road_db", &["Road transport undertakings shall disclose fleet emissions"]),
        ];

        Self {
            store: Arc::new(IndexStore::from_indexes(CollectionLayout::default(), indexes)),
            table: Arc::new(SectorTable::from_pairs([
                ("B06", "Oil & Gas Company"),
                ("B05", "Mining, Quarrying and Coal"),
                ("H49.4", "Road Transport"),
            ])),
            retriever: Arc::new(Retriever::new(Arc::new(LexicalScorer))),
            gateway: Arc::new(ScriptedGateway::new(responses)),
            sink: Arc::new(RecordingSink::default()),
        }
    }

    /// A fixture whose gateway fails every call.
    pub fn failing() -> Self {
        Self::new(&[])
    }

    pub fn classifier(&self) -> NaceClassifier {
        NaceClassifier::new(
            self.store.clone(),
            self.retriever.clone(),
            self.table.clone(),
            self.gateway.clone(),
        )
    }

    pub fn assembler(&self) -> ContextAssembler {
        ContextAssembler::new(self.store.clone(), self.retriever.clone(), self.gateway.clone())
    }

    pub fn assistant(&self) -> Assistant {
        Assistant::new(self.classifier(), self.assembler(), self.sink.clone())
    }
}
