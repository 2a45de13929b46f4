//! Uniform bucket grid for exact fixed-radius neighbor counting.
//!
//! Points are packed into square cells sized so a roughly uniform set lands
//! a handful of points per cell; a radius query then visits only the cells
//! overlapping the query disk's bounding box. Counts stay exact; only the
//! traversal is pruned.

use rayon::prelude::*;

/// Immutable spatial index over a set of 2-D coordinates.
#[derive(Clone, Debug)]
pub struct GridIndex {
    cell: f64,
    min_x: f64,
    min_y: f64,
    cols: usize,
    rows: usize,
    /// Bucket b owns `points[starts[b] as usize..starts[b + 1] as usize]`.
    starts: Vec<u32>,
    points: Vec<[f64; 2]>,
}

impl GridIndex {
    /// Build an index over `points`. An empty set builds a valid index that
    /// answers 0 for every query.
    pub fn build(points: &[[f64; 2]]) -> Self {
        if points.is_empty() {
            return Self {
                cell: 1.0,
                min_x: 0.0,
                min_y: 0.0,
                cols: 0,
                rows: 0,
                starts: vec![0],
                points: Vec::new(),
            };
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }

        // Aim for ~sqrt(n) cells per axis, i.e. about one point per cell on
        // a uniform set. A degenerate (all-coincident) set gets one cell.
        let axis = (points.len() as f64).sqrt().ceil().max(1.0);
        let span = (max_x - min_x).max(max_y - min_y);
        let cell = if span > 0.0 { span / axis } else { 1.0 };
        let cols = (((max_x - min_x) / cell).floor() as usize) + 1;
        let rows = (((max_y - min_y) / cell).floor() as usize) + 1;

        let bucket = |p: &[f64; 2]| -> usize {
            let col = (((p[0] - min_x) / cell).floor() as usize).min(cols - 1);
            let row = (((p[1] - min_y) / cell).floor() as usize).min(rows - 1);
            row * cols + col
        };

        // Counting sort into a packed bucket layout.
        let mut counts = vec![0u32; cols * rows];
        for p in points {
            counts[bucket(p)] += 1;
        }
        let mut starts = Vec::with_capacity(cols * rows + 1);
        let mut acc = 0u32;
        starts.push(0);
        for &c in &counts {
            acc += c;
            starts.push(acc);
        }
        let mut cursor: Vec<u32> = starts[..cols * rows].to_vec();
        let mut packed = vec![[0.0f64; 2]; points.len()];
        for p in points {
            let b = bucket(p);
            packed[cursor[b] as usize] = *p;
            cursor[b] += 1;
        }

        Self {
            cell,
            min_x,
            min_y,
            cols,
            rows,
            starts,
            points: packed,
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact count of indexed points with Euclidean distance <= `radius`
    /// from `center`, coincident points included.
    pub fn count_within(&self, center: [f64; 2], radius: f64) -> usize {
        if self.points.is_empty() || !radius.is_finite() || radius < 0.0 {
            return 0;
        }
        let [cx, cy] = center;
        let r2 = radius * radius;

        let lo_col = ((cx - radius - self.min_x) / self.cell).floor();
        let hi_col = ((cx + radius - self.min_x) / self.cell).floor();
        let lo_row = ((cy - radius - self.min_y) / self.cell).floor();
        let hi_row = ((cy + radius - self.min_y) / self.cell).floor();
        if hi_col < 0.0 || hi_row < 0.0 {
            return 0;
        }
        if lo_col >= self.cols as f64 || lo_row >= self.rows as f64 {
            return 0;
        }
        let lo_col = lo_col.max(0.0) as usize;
        let lo_row = lo_row.max(0.0) as usize;
        let hi_col = hi_col.min((self.cols - 1) as f64) as usize;
        let hi_row = hi_row.min((self.rows - 1) as f64) as usize;

        let mut count = 0usize;
        for row in lo_row..=hi_row {
            for col in lo_col..=hi_col {
                let b = row * self.cols + col;
                let beg = self.starts[b] as usize;
                let end = self.starts[b + 1] as usize;
                for p in &self.points[beg..end] {
                    let dx = p[0] - cx;
                    let dy = p[1] - cy;
                    if dx * dx + dy * dy <= r2 {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Batch variant of [`count_within`](Self::count_within), fanned out
    /// across the rayon pool. Output order follows `centers`.
    pub fn count_within_batch(&self, centers: &[[f64; 2]], radius: f64) -> Vec<u32> {
        centers
            .par_iter()
            .map(|&c| self.count_within(c, radius) as u32)
            .collect()
    }
}
