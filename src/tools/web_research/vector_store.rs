use anyhow::Result;

use super::loader::Document;
use crate::agent::stateless_llm::EmbeddingInterface;

/// Transient in-memory similarity index over embedded chunks.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: Vec<(Document, Vec<f32>)>,
}

impl InMemoryVectorStore {
    /// Embed `documents` and index them. No embedding call is made for an
    /// empty input.
    pub async fn from_documents(
        documents: Vec<Document>,
        embeddings: &dyn EmbeddingInterface,
    ) -> Result<Self> {
        if documents.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = embeddings.embed_documents(&texts).await?;
        if vectors.len() != documents.len() {
            anyhow::bail!(
                "Expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            );
        }

        Ok(Self {
            entries: documents.into_iter().zip(vectors).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` documents most similar to `query`, best first.
    pub fn similarity_search_by_vector(&self, query: &[f32], k: usize) -> Vec<&Document> {
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|(doc, vector)| (cosine_similarity(query, vector), doc))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(k).map(|(_, doc)| doc).collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
