//! Response shapes the chat frontend depends on.
//!
//! These serialize the core's response types directly and check the field
//! names and JSON types the frontend reads.

use esrs_chat::LLMConfig;
use esrs_runtime::{ConversationEvent, Reply};
use esrs_store::CollectionStatus;

/// First message: { answer, context, is_first_message, nace_sector, esrs_sector }
#[test]
fn test_first_message_reply_shape() {
    let reply = Reply {
        answer: "Thank you for your company description.".into(),
        context: String::new(),
        is_first_message: true,
        nace_sector: Some("B06".into()),
        esrs_sector: Some("Oil & Gas Company".into()),
    };
    let json = serde_json::to_value(&reply).unwrap();

    assert!(json["answer"].is_string());
    assert_eq!(json["context"], "");
    assert_eq!(json["is_first_message"], true);
    assert_eq!(json["nace_sector"], "B06");
    assert_eq!(json["esrs_sector"], "Oil & Gas Company");
}

/// Follow-up: { answer, context, is_first_message } without sector fields.
#[test]
fn test_answer_reply_shape() {
    let reply = Reply {
        answer: "<ul>\n<li>Scope 3</li>\n</ul>".into(),
        context: "passage one\npassage two".into(),
        is_first_message: false,
        nace_sector: None,
        esrs_sector: None,
    };
    let json = serde_json::to_value(&reply).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), 3);
    assert_eq!(json["is_first_message"], false);
    assert!(json["context"].as_str().unwrap().contains('\n'));
}

/// Status entries: { name, available, documents? , error? }
#[test]
fn test_collection_status_shape() {
    let loaded = CollectionStatus {
        name: "default_db".into(),
        available: true,
        documents: Some(1200),
        error: None,
    };
    let failed = CollectionStatus {
        name: "road_db".into(),
        available: false,
        documents: None,
        error: Some("index.bin missing".into()),
    };

    let loaded = serde_json::to_value(&loaded).unwrap();
    assert!(loaded["documents"].is_number());
    assert!(loaded.get("error").is_none());

    let failed = serde_json::to_value(&failed).unwrap();
    assert_eq!(failed["available"], false);
    assert!(failed["error"].is_string());
    assert!(failed.get("documents").is_none());
}

/// LLM status uses camelCase keys and never carries API keys.
#[test]
fn test_llm_status_shape() {
    let mut config = LLMConfig::default();
    config.groq_api_key = Some("gsk-secret".into());
    let json = serde_json::to_value(config.status()).unwrap();

    assert_eq!(json["preferredProvider"], "auto");
    assert_eq!(json["activeProvider"], "groq");
    assert!(json["activeModel"].is_string());
    assert_eq!(json["configuredProviders"], serde_json::json!(["groq"]));
    assert!(!json.to_string().contains("gsk-secret"));
}

/// Persistence events are tagged by type.
#[test]
fn test_conversation_event_shape() {
    let created = ConversationEvent::created("We haul freight across Europe", "H49.4", "Road Transport");
    let json = serde_json::to_value(&created).unwrap();

    assert_eq!(json["type"], "created");
    assert_eq!(json["industry_code"], "H49.4");
    assert_eq!(json["sector_label"], "Road Transport");
    assert_eq!(json["title"], "We haul freight across Europe");
    assert!(json["company_description"].is_string());
}
