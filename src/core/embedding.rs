//! Embedding input contract: ordered (n, x, y, label) points.
//!
//! The embedding is produced by an external preprocessing stage and is
//! read-only here. Construction validates the contract once; every later
//! stage borrows the point slice and never mutates it.

use thiserror::Error;

/// Contract violations detected when taking ownership of embedding data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbeddingError {
    #[error("embedding contains no points")]
    Empty,
    #[error("point indices start at n=2, got n={0}")]
    IndexTooSmall(u64),
    #[error("point indices must be strictly increasing: n={prev} followed by n={next}")]
    NonMonotonicIndex { prev: u64, next: u64 },
    #[error("non-finite coordinate at n={0}")]
    NonFiniteCoordinate(u64),
}

/// One embedding point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub n: u64,
    pub x: f64,
    pub y: f64,
    /// Observed (real) event label.
    pub is_event: bool,
}

/// Ordered, validated point collection.
#[derive(Clone, Debug)]
pub struct Embedding {
    points: Vec<Point>,
}

impl Embedding {
    /// Validate and take ownership of `points`.
    ///
    /// Checks: non-empty, indices strictly increasing from n >= 2, all
    /// coordinates finite. Any violation aborts before computation begins.
    pub fn new(points: Vec<Point>) -> Result<Self, EmbeddingError> {
        let first = points.first().ok_or(EmbeddingError::Empty)?;
        if first.n < 2 {
            return Err(EmbeddingError::IndexTooSmall(first.n));
        }
        for pair in points.windows(2) {
            if pair[1].n <= pair[0].n {
                return Err(EmbeddingError::NonMonotonicIndex {
                    prev: pair[0].n,
                    next: pair[1].n,
                });
            }
        }
        for p in &points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(EmbeddingError::NonFiniteCoordinate(p.n));
            }
        }
        Ok(Self { points })
    }

    /// Build from consecutive rows with the index-derived fallback:
    /// `n` starts at 2 and increments by 1 per row, in row order.
    pub fn from_rows(rows: Vec<(f64, f64, bool)>) -> Result<Self, EmbeddingError> {
        let points = rows
            .into_iter()
            .enumerate()
            .map(|(i, (x, y, is_event))| Point {
                n: i as u64 + 2,
                x,
                y,
                is_event,
            })
            .collect();
        Self::new(points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Largest stored index.
    #[inline]
    pub fn max_n(&self) -> u64 {
        self.points.last().map(|p| p.n).unwrap_or(0)
    }

    /// Points with `n <= cutoff`, as a prefix of the ordered slice.
    ///
    /// `None` when the cutoff exceeds the largest stored index; the caller
    /// decides whether that is a skipped row or an error.
    pub fn prefix(&self, cutoff: u64) -> Option<&[Point]> {
        if cutoff > self.max_n() {
            return None;
        }
        let end = self.points.partition_point(|p| p.n <= cutoff);
        Some(&self.points[..end])
    }
}

/// Coordinates of the real events within `points`.
pub fn event_coords(points: &[Point]) -> Vec<[f64; 2]> {
    points
        .iter()
        .filter(|p| p.is_event)
        .map(|p| [p.x, p.y])
        .collect()
}

/// Number of real events within `points`.
pub fn event_count(points: &[Point]) -> usize {
    points.iter().filter(|p| p.is_event).count()
}

/// Coordinates selected by an external 1:1 label mask (e.g. a null field).
pub fn masked_coords(points: &[Point], mask: &[bool]) -> Vec<[f64; 2]> {
    debug_assert_eq!(points.len(), mask.len(), "mask must pair 1:1 with points");
    points
        .iter()
        .zip(mask.iter())
        .filter(|&(_, &m)| m)
        .map(|(p, _)| [p.x, p.y])
        .collect()
}
