//! Vector table storage for TandemDB
//!
//! A fixed-dimension vector store with brute-force cosine-similarity search.
//! Every entry pairs a vector with a metadata mapping, index-aligned; the
//! entry's index is its stable identity (this table kind has no delete).

use crate::error::{Error, Result};
use crate::storage::Metadata;
use serde::{Deserialize, Serialize};

/// Vector dimension used when a creation request does not name one.
pub const DEFAULT_DIMENSION: usize = 128;

/// Result count used when a search request does not name one.
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Index of the stored entry (insertion order)
    pub index: usize,
    /// Cosine similarity to the query, in [-1, 1]
    pub score: f64,
    /// Metadata stored with the entry
    pub metadata: Metadata,
}

/// A vector table: fixed dimension, append-only entries, linear-scan search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorTableRecord")]
pub struct VectorTable {
    dimension: usize,
    vectors: Vec<Vec<f64>>,
    metadata: Vec<Metadata>,
}

impl VectorTable {
    /// Create an empty table storing vectors of exactly `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Get the fixed vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Get the number of stored entries
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector with optional metadata and return its index.
    ///
    /// Fails with `DimensionMismatch` when the length is off, with
    /// `NonFiniteVector` when the L2 norm comes out NaN or infinite (a NaN
    /// or infinite component, or finite components whose squared sum
    /// overflows), and with `ZeroNormVector` when the norm is zero; neither
    /// degenerate vector can be normalized for search, and non-finite
    /// components have no JSON representation. Duplicate vectors are
    /// permitted. On failure the table is unchanged.
    pub fn insert(&mut self, vector: Vec<f64>, metadata: Option<Metadata>) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        let norm = l2_norm(&vector);
        if !norm.is_finite() {
            return Err(Error::NonFiniteVector);
        }
        if norm == 0.0 {
            return Err(Error::ZeroNormVector);
        }

        let index = self.vectors.len();
        self.vectors.push(vector);
        self.metadata.push(metadata.unwrap_or_default());
        Ok(index)
    }

    /// Rank every stored entry by cosine similarity to `query` and return the
    /// `top_k` best.
    ///
    /// Similarity is the dot product of the unit-normalized vectors, in
    /// [-1, 1]. Results come back ordered by descending similarity; exact
    /// ties break toward the lower index. Callers should treat the tie order
    /// as an implementation detail, not a contract. A `top_k` past the table
    /// size returns the full ranked set; an empty table returns an empty set
    /// rather than an error. Queries are validated like inserts: a
    /// non-finite or zero L2 norm is rejected. A stored entry whose norm is
    /// zero or non-finite (possible only in a file written by another
    /// producer) scores `0.0`.
    pub fn search(&self, query: &[f64], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let query_norm = l2_norm(query);
        if !query_norm.is_finite() {
            return Err(Error::NonFiniteVector);
        }
        if query_norm == 0.0 {
            return Err(Error::ZeroNormVector);
        }
        // Normalizing the query before the dot product keeps every score for
        // a finite-norm entry inside [-1, 1], even when the raw dot would
        // overflow.
        let unit_query: Vec<f64> = query.iter().map(|x| x / query_norm).collect();

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| {
                let norm = l2_norm(vector);
                let score = if norm == 0.0 || !norm.is_finite() {
                    0.0
                } else {
                    dot_product(&unit_query, vector) / norm
                };
                (index, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(index, score)| SearchHit {
                index,
                score,
                metadata: self.metadata[index].clone(),
            })
            .collect())
    }
}

/// Serialization proxy for `VectorTable`.
///
/// The stored dimension and per-vector lengths are trusted verbatim, but the
/// `vectors`/`metadata` alignment is checked so a misaligned record fails the
/// load instead of panicking when a search reaches the missing entry.
#[derive(Deserialize)]
struct VectorTableRecord {
    dimension: usize,
    vectors: Vec<Vec<f64>>,
    metadata: Vec<Metadata>,
}

impl TryFrom<VectorTableRecord> for VectorTable {
    type Error = Error;

    fn try_from(record: VectorTableRecord) -> Result<Self> {
        if record.vectors.len() != record.metadata.len() {
            return Err(Error::MetadataMisaligned {
                vectors: record.vectors.len(),
                metadata: record.metadata.len(),
            });
        }
        Ok(Self {
            dimension: record.dimension,
            vectors: record.vectors,
            metadata: record.metadata,
        })
    }
}

fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
