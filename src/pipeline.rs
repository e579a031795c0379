//! Retrieve, rerank, stuff, answer.

use anyhow::Result;

use crate::llm::{ChatMessage, CompletionRequest};
use crate::state::Services;
use crate::vector::CollectionHandle;

/// Preamble placed in front of every question before retrieval.
pub const PERSONALITY_PROMPT: &str = "Role: friendly and helpful assistant.\x20
                            ########
                            Objective: Assistant thinks logically, Focuses on the Keywords asked in a question.
                            ########
                            Instructions: Please respond to the user’s question based on the given information. If you cannot find the answer, kindly state that Answer cannot be found.
                            Also respond in the same language user asks the question.";

const STUFF_SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's question. \n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n";

/// Knobs for one question.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub model: String,
    pub temperature: f32,
    /// Candidates fetched from the vector store.
    pub top_k: usize,
    /// Candidates kept after reranking.
    pub top_n: usize,
}

/// The preamble followed directly by the user's question.
pub fn personalize(question: &str) -> String {
    format!("{PERSONALITY_PROMPT}{question}")
}

/// System message holding every context passage, separated by blank lines.
pub fn stuff_system_prompt(passages: &[String]) -> String {
    format!("{STUFF_SYSTEM_TEMPLATE}{}", passages.join("\n\n"))
}

/// Answer `question` from the chunks stored in `collection`.
pub async fn ask_and_get_answer(
    services: &Services,
    collection: &str,
    question: &str,
    options: &AnswerOptions,
) -> Result<String> {
    let query = personalize(question);

    let handle = CollectionHandle::new(
        services.vector_store.clone(),
        services.embedder.clone(),
        collection,
    );
    let candidates: Vec<String> = handle
        .similarity_search(&query, options.top_k)
        .await?
        .into_iter()
        .map(|c| c.text)
        .collect();

    let context = if candidates.is_empty() {
        Vec::new()
    } else {
        services
            .reranker
            .rerank(&query, &candidates, options.top_n)
            .await?
            .into_iter()
            .filter_map(|r| candidates.get(r.index).cloned())
            .collect()
    };

    tracing::debug!(
        collection,
        candidates = candidates.len(),
        kept = context.len(),
        "Retrieved context"
    );

    services
        .chat
        .complete(CompletionRequest {
            model: options.model.clone(),
            temperature: options.temperature,
            messages: vec![
                ChatMessage::system(stuff_system_prompt(&context)),
                ChatMessage::user(query),
            ],
        })
        .await
}
