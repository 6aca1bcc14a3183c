//! Comment deduplication: the final gate before publication.
//!
//! Two stages. Stage 1 is an exact signature match on
//! `(normalized path, line, message prefix)` — O(1) per candidate and
//! always on. Stage 2 compares message embeddings through the injected
//! [`EmbeddingProvider`] and catches paraphrased near-duplicates; it is
//! batched (one `embed` call per run), scoped to comments on the same
//! `(file, line)` key, and fails open: when the provider is disabled,
//! errors, or times out, the batch simply skips semantic dedup rather
//! than blocking publication.

use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{DEFAULT_SIGNATURE_PREFIX_LEN, DEFAULT_SIMILARITY_THRESHOLD};
use crate::models::diff::normalize_path;
use crate::models::issue::{ExistingComment, ResolvedComment};
use crate::providers::EmbeddingProvider;

/// Tuning knobs for deduplication.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// How many characters of the normalized message participate in
    /// the exact-match signature.
    pub signature_prefix_len: usize,
    /// Cosine similarity at or above which two messages are semantic
    /// duplicates.
    pub similarity_threshold: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            signature_prefix_len: DEFAULT_SIGNATURE_PREFIX_LEN,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// A candidate comment with the upstream confidence that decides which
/// of two semantic duplicates survives.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub comment: ResolvedComment,
    pub confidence: f32,
}

/// Which stage flagged a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuplicateReason {
    /// Exact signature match against an existing or earlier comment.
    Signature,
    /// Semantic similarity above the threshold.
    Embedding { similarity: f32 },
}

/// A rejected candidate, tagged for operator logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateComment {
    pub comment: ResolvedComment,
    pub reason: DuplicateReason,
    /// Short stable hash of the signature, for log correlation.
    pub fingerprint: String,
}

/// Result of partitioning a candidate batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupOutcome {
    pub unique: Vec<ResolvedComment>,
    pub duplicates: Vec<DuplicateComment>,
}

/// Stateless two-stage duplicate filter.
pub struct CommentDeduplicator {
    provider: Arc<dyn EmbeddingProvider>,
    config: DedupConfig,
}

type Signature = (String, u32, String);

impl CommentDeduplicator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: DedupConfig) -> Self {
        Self { provider, config }
    }

    /// Partition candidates into unique comments and duplicates.
    ///
    /// Candidates are compared against the already-published comments
    /// and against each other; earlier candidates win signature ties,
    /// higher-confidence candidates win embedding ties.
    pub async fn partition(
        &self,
        existing: &[ExistingComment],
        candidates: Vec<Candidate>,
    ) -> DedupOutcome {
        let mut outcome = DedupOutcome::default();

        // Stage 1: exact signatures.
        let mut seen: IndexSet<Signature> = existing
            .iter()
            .map(|c| self.signature(&c.file, c.line, &c.content))
            .collect();

        let mut survivors: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            let sig = self.signature(
                &candidate.comment.file,
                candidate.comment.line,
                &candidate.comment.message,
            );
            if seen.contains(&sig) {
                outcome.duplicates.push(DuplicateComment {
                    fingerprint: fingerprint(&sig),
                    comment: candidate.comment,
                    reason: DuplicateReason::Signature,
                });
            } else {
                seen.insert(sig);
                survivors.push(candidate);
            }
        }

        // Stage 2: semantic similarity, scoped per (file, line) key.
        if !self.provider.is_enabled() || survivors.is_empty() {
            outcome.unique = survivors.into_iter().map(|c| c.comment).collect();
            return outcome;
        }

        let texts: Vec<String> = survivors
            .iter()
            .map(|c| c.comment.message.clone())
            .chain(existing.iter().map(|c| c.content.clone()))
            .collect();

        let vectors = match self.provider.embed(&texts).await {
            Ok(v) if v.len() == texts.len() => v,
            Ok(v) => {
                eprintln!(
                    "Warning: embedding provider returned {} vectors for {} texts; \
                     skipping semantic dedup for this batch",
                    v.len(),
                    texts.len()
                );
                outcome.unique = survivors.into_iter().map(|c| c.comment).collect();
                return outcome;
            }
            Err(e) => {
                eprintln!("Warning: semantic dedup unavailable ({e}); keeping signature results");
                outcome.unique = survivors.into_iter().map(|c| c.comment).collect();
                return outcome;
            }
        };

        let (candidate_vecs, existing_vecs) = vectors.split_at(survivors.len());
        let mut kept: Vec<(Candidate, &[f32])> = Vec::new();

        'candidates: for (candidate, vector) in survivors.into_iter().zip(candidate_vecs) {
            let candidate_path = normalize_path(&candidate.comment.file).to_string();

            // Against published comments on the same line. Paths are
            // normalized on both sides, same as the signature stage.
            for (published, published_vec) in existing.iter().zip(existing_vecs) {
                if normalize_path(&published.file) != candidate_path
                    || published.line != candidate.comment.line
                {
                    continue;
                }
                let similarity = self.provider.cosine_similarity(vector, published_vec);
                if similarity >= self.config.similarity_threshold {
                    outcome.duplicates.push(self.embedding_duplicate(candidate, similarity));
                    continue 'candidates;
                }
            }

            // Against candidates already kept this run.
            for slot in kept.iter_mut() {
                if normalize_path(&slot.0.comment.file) != candidate_path
                    || slot.0.comment.line != candidate.comment.line
                {
                    continue;
                }
                let similarity = self.provider.cosine_similarity(vector, slot.1);
                if similarity >= self.config.similarity_threshold {
                    if candidate.confidence > slot.0.confidence {
                        let loser = std::mem::replace(slot, (candidate, vector));
                        outcome.duplicates.push(self.embedding_duplicate(loser.0, similarity));
                    } else {
                        outcome.duplicates.push(self.embedding_duplicate(candidate, similarity));
                    }
                    continue 'candidates;
                }
            }

            kept.push((candidate, vector));
        }

        outcome.unique = kept.into_iter().map(|(c, _)| c.comment).collect();
        outcome
    }

    fn embedding_duplicate(&self, candidate: Candidate, similarity: f32) -> DuplicateComment {
        let sig = self.signature(
            &candidate.comment.file,
            candidate.comment.line,
            &candidate.comment.message,
        );
        DuplicateComment {
            fingerprint: fingerprint(&sig),
            comment: candidate.comment,
            reason: DuplicateReason::Embedding { similarity },
        }
    }

    fn signature(&self, file: &str, line: u32, message: &str) -> Signature {
        let path = normalize_path(file).to_string();
        let prefix: String = normalize_message(message)
            .chars()
            .take(self.config.signature_prefix_len)
            .collect();
        (path, line, prefix)
    }
}

/// Lowercase and collapse runs of whitespace so formatting differences
/// don't defeat the exact match.
fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Short stable hash of a signature for log correlation.
fn fingerprint(sig: &Signature) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sig.0.as_bytes());
    hasher.update(sig.1.to_le_bytes());
    hasher.update(sig.2.as_bytes());
    hex::encode(&hasher.finalize()[..6])
}
