//! Text chunking: recursive separator splitting with a fixed overlap.

pub mod recursive;

use anyhow::Result;

use crate::config::ChunkingConfig;
use crate::models::{Chunk, DocumentUnit};

pub use recursive::SEPARATORS;

/// Splits loaded pages into overlapping chunks for embedding.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than zero");
        }
        if chunk_overlap > chunk_size {
            anyhow::bail!(
                "Chunk overlap ({chunk_overlap}) is larger than chunk size ({chunk_size})"
            );
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        recursive::split_recursive(text, self.chunk_size, self.chunk_overlap, SEPARATORS)
    }

    /// Split every unit in order. Each chunk gets a copy of its unit's metadata.
    pub fn split_documents(&self, units: &[DocumentUnit]) -> Vec<Chunk> {
        units
            .iter()
            .flat_map(|unit| {
                self.split_text(&unit.text)
                    .into_iter()
                    .map(move |text| Chunk {
                        text,
                        metadata: unit.metadata.clone(),
                    })
            })
            .collect()
    }
}

/// Chunk loaded pages with the configured size and overlap.
pub fn chunk_data(units: &[DocumentUnit], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let splitter = TextSplitter::from_config(config)?;
    Ok(splitter.split_documents(units))
}
