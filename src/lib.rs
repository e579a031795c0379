//! # project-rag
//!
//! An HTTP service that turns documents and web pages into question-answering
//! projects. Sources are split into overlapping chunks, embedded, and stored in
//! a Qdrant collection per project; questions are answered by retrieving the
//! closest chunks, reranking them with a cross-encoder, and stuffing the
//! survivors into a single chat completion.
//!
//! ## Architecture
//!
//! ```text
//!   createAiPorject                       answerQuery
//!         │                                    │
//!         ▼                                    ▼
//!  ┌──────────────┐                   ┌──────────────────┐
//!  │ download /   │                   │ preamble + query │
//!  │ load_websites│                   └────────┬─────────┘
//!  └──────┬───────┘                            │ embed
//!         │ pages                              ▼
//!         ▼                           ┌──────────────────┐
//!  ┌──────────────┐                   │  Qdrant top-3    │
//!  │ page limit   │                   └────────┬─────────┘
//!  └──────┬───────┘                            │
//!         ▼                                    ▼
//!  ┌──────────────┐                   ┌──────────────────┐
//!  │ chunk 500/50 │                   │  Cohere rerank   │
//!  └──────┬───────┘                   └────────┬─────────┘
//!         │ embed                              │
//!         ▼                                    ▼
//!  ┌──────────────┐                   ┌──────────────────┐
//!  │ Qdrant upsert│                   │ stuff + chat     │
//!  └──────────────┘                   └──────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server and hosted services
//! - [`models`] - Document units, chunks, and request/response types
//! - [`ingest`] - PDF, DOCX, TXT, and web page loading plus file-link download
//! - [`chunking`] - Recursive character splitting with overlap
//! - [`llm`] - OpenAI embeddings and chat, Cohere reranking
//! - [`vector`] - Vector store trait, Qdrant and in-memory backends, collection gateway
//! - [`pipeline`] - Retrieve, rerank, stuff, answer
//! - [`api`] - Axum handlers and error responses
//! - [`state`] - Shared application state and the page ledger

pub mod api;
pub mod chunking;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod vector;
