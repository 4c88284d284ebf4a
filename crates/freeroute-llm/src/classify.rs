//! Model classification by identifier heuristics
//!
//! Total, deterministic and side-effect-free: the same descriptor always
//! yields the same categories and tags, and `categories` is never empty.

use serde::{Deserialize, Serialize};

/// Derived category and tag sets for a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Classify a model by case-insensitive substring matching on its id
/// plus numeric thresholds on its context length
pub fn classify(model_id: &str, context_length: u64) -> Classification {
    let id = model_id.to_lowercase();
    let mut categories: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    // (category, id keywords, tags added alongside)
    let keyword_table: [(&str, &[&str], [&str; 2]); 7] = [
        ("RAG", &["rag", "retrieval", "search"], ["search", "knowledge bases"]),
        ("MoE", &["moe", "mixtral"], ["Mixture of Experts", "efficient"]),
        (
            "Vision",
            &["vision", "visual", "llava", "qwen2-vl", "yolo"],
            ["image analysis", "multimodal"],
        ),
        ("Code", &["code", "coder", "codex"], ["programming", "development"]),
        ("Math", &["math", "reasoning"], ["calculation", "reasoning"]),
        ("Chat", &["instruct", "chat"], ["conversation", "instruction"]),
        ("Embedding", &["embed"], ["vectors", "similarity"]),
    ];

    for (name, keywords, extra) in keyword_table {
        // Anything not explicitly a pretraining checkpoint counts as Chat
        let matched = keywords.iter().any(|k| id.contains(k))
            || (name == "Chat" && !id.contains("pretrain"));
        if matched {
            categories.push(name.to_owned());
            tags.extend(extra.iter().map(|t| (*t).to_owned()));
        }
    }

    // One size bucket per model, first match wins
    if id.contains("7b") {
        tags.push("7B".to_owned());
    } else if id.contains("8b") || id.contains("9b") {
        tags.push("8-9B".to_owned());
    } else if id.contains("70b") || id.contains("72b") {
        tags.push("70B+".to_owned());
    } else if id.contains("405b") {
        tags.push("405B".to_owned());
    }

    // Context tags, descending thresholds, first match wins
    if context_length >= 128_000 {
        tags.push("128K+".to_owned());
    } else if context_length >= 32_000 {
        tags.push("32K".to_owned());
    } else if context_length >= 16_000 {
        tags.push("16K".to_owned());
    } else if context_length >= 8_000 {
        tags.push("8K".to_owned());
    }

    // Family tags are additive, not exclusive
    for (keyword, tag) in [
        ("llama", "Llama"),
        ("qwen", "Qwen"),
        ("mistral", "Mistral"),
        ("gemma", "Gemma"),
        ("phi", "Phi"),
        ("deepseek", "DeepSeek"),
        ("command", "Command"),
    ] {
        if id.contains(keyword) {
            tags.push(tag.to_owned());
        }
    }

    if categories.is_empty() {
        categories.push("General".to_owned());
    }

    Classification { categories, tags }
}
