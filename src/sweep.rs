//! Sweep orchestration: repeated calibrate → sample → index → measure →
//! compare cycles along one parameter axis, all other controls fixed.
//!
//! Rows are pure functions of (embedding subset, controls, seed); they run
//! in parallel with no shared mutable state, and the output table preserves
//! the caller-specified parameter order regardless of completion order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::core::density::{density_sample, mean_density, reference_coords, reference_sample};
use crate::core::embedding::{Embedding, Point, event_coords, event_count, masked_coords};
use crate::core::grid::GridIndex;
use crate::core::intensity::IntensityModel;
use crate::core::ks::ks_two_sample;
use crate::core::nullfield::calibrate;

/// Offset separating the reference-draw stream from the null-draw stream,
/// so calibration and center sampling never share a generator.
const REFERENCE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Experimental controls held fixed across all rows of one sweep.
#[derive(Clone, Copy, Debug)]
pub struct Controls {
    /// Calibration target; `None` matches the observed event count of the
    /// active subset.
    pub target_count: Option<usize>,
    /// Requested reference-sample size (clamped to the subset size).
    pub sample_size: usize,
    /// Base seed; each row derives its generators from it deterministically.
    pub seed: u64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            target_count: None,
            sample_size: 50_000,
            seed: 42,
        }
    }
}

/// One computed row. Carries enough provenance to replicate it alone.
#[derive(Clone, Copy, Debug)]
pub struct SweepRow {
    /// Swept parameter value (query radius, or cutoff N).
    pub value: f64,
    pub sample_size: usize,
    pub mean_rho_real: f64,
    pub mean_rho_null: f64,
    pub ks: f64,
    pub p_value: f64,
    /// Realized event counts: observed field, then calibrated null field.
    pub n_real: usize,
    pub n_null: usize,
    /// Calibration constant of the row's null field.
    pub c: f64,
    pub seed: u64,
}

/// A parameter value that could not be evaluated, with the reason.
#[derive(Clone, Debug)]
pub struct RowSkip {
    pub value: f64,
    pub reason: String,
}

/// Ordered sweep output: computed rows and skip diagnostics, each in the
/// caller-specified parameter order.
#[derive(Clone, Debug, Default)]
pub struct SweepTable {
    pub rows: Vec<SweepRow>,
    pub skipped: Vec<RowSkip>,
}

enum RowOutcome {
    Row(SweepRow),
    Skip(RowSkip),
}

fn collect_table(outcomes: Vec<RowOutcome>) -> SweepTable {
    let mut table = SweepTable::default();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Row(row) => table.rows.push(row),
            RowOutcome::Skip(skip) => {
                warn!(value = skip.value, reason = %skip.reason, "sweep row skipped");
                table.skipped.push(skip);
            }
        }
    }
    table
}

/// Drives comparison cycles across a parameter axis.
pub struct SweepOrchestrator<'a, M> {
    embedding: &'a Embedding,
    model: &'a M,
    controls: Controls,
    abort: Option<Arc<AtomicBool>>,
}

impl<'a, M> SweepOrchestrator<'a, M>
where
    M: IntensityModel + Sync,
{
    pub fn new(embedding: &'a Embedding, model: &'a M, controls: Controls) -> Self {
        Self {
            embedding,
            model,
            controls,
            abort: None,
        }
    }

    /// Install a flag checked before each row starts. Raising it skips the
    /// rows not yet started; completed rows are never touched.
    pub fn with_abort(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    fn aborted(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn clamped_sample_size(&self, len: usize) -> usize {
        let k = self.controls.sample_size.min(len);
        if k < self.controls.sample_size {
            debug!(
                requested = self.controls.sample_size,
                clamped = k,
                "reference sample clamped to subset size"
            );
        }
        k
    }

    /// Radius-axis sweep: calibration, reference sampling and both index
    /// builds happen ONCE over the full embedding; only the query radius
    /// varies per row.
    pub fn radius_sweep(&self, radii: &[f64]) -> SweepTable {
        let points = self.embedding.points();
        let n_real = event_count(points);
        let target = self.controls.target_count.unwrap_or(n_real);
        let seed = self.controls.seed;

        let field = match calibrate(points, target, self.model, seed) {
            Ok(field) => field,
            Err(err) => {
                // One calibration feeds every radius row; none can proceed.
                return collect_table(
                    radii
                        .iter()
                        .map(|&r| {
                            RowOutcome::Skip(RowSkip {
                                value: r,
                                reason: err.to_string(),
                            })
                        })
                        .collect(),
                );
            }
        };
        info!(
            c = field.constant,
            n_real,
            n_null = field.realized,
            clipped = field.clipped,
            "null field calibrated"
        );

        let k = self.clamped_sample_size(points.len());
        let refs = reference_sample(points.len(), k, seed ^ REFERENCE_STREAM);
        let centers = reference_coords(points, &refs);
        let real_index = GridIndex::build(&event_coords(points));
        let null_index = GridIndex::build(&masked_coords(points, &field.labels));

        let outcomes: Vec<RowOutcome> = radii
            .par_iter()
            .map(|&radius| {
                if self.aborted() {
                    return RowOutcome::Skip(RowSkip {
                        value: radius,
                        reason: "sweep aborted".into(),
                    });
                }
                if !radius.is_finite() || radius < 0.0 {
                    return RowOutcome::Skip(RowSkip {
                        value: radius,
                        reason: "radius must be finite and non-negative".into(),
                    });
                }
                let rho_real = density_sample(&real_index, &centers, radius);
                let rho_null = density_sample(&null_index, &centers, radius);
                let Some(ks) = ks_two_sample(&rho_real, &rho_null) else {
                    return RowOutcome::Skip(RowSkip {
                        value: radius,
                        reason: "reference sample is empty".into(),
                    });
                };
                let row = SweepRow {
                    value: radius,
                    sample_size: centers.len(),
                    mean_rho_real: mean_density(&rho_real),
                    mean_rho_null: mean_density(&rho_null),
                    ks: ks.statistic,
                    p_value: ks.p_value,
                    n_real,
                    n_null: field.realized,
                    c: field.constant,
                    seed,
                };
                info!(
                    radius,
                    mean_real = row.mean_rho_real,
                    mean_null = row.mean_rho_null,
                    ks = row.ks,
                    p = row.p_value,
                    "radius row done"
                );
                RowOutcome::Row(row)
            })
            .collect();

        collect_table(outcomes)
    }

    /// Cutoff-axis sweep: for each cutoff N the embedding is restricted to
    /// its prefix with `n <= N`, and calibration, reference sampling and
    /// index construction are all redone on that subset; the query radius is
    /// held fixed.
    pub fn cutoff_sweep(&self, cutoffs: &[u64], radius: f64) -> SweepTable {
        let max_n = self.embedding.max_n();
        let outcomes: Vec<RowOutcome> = cutoffs
            .par_iter()
            .map(|&cutoff| {
                let value = cutoff as f64;
                if self.aborted() {
                    return RowOutcome::Skip(RowSkip {
                        value,
                        reason: "sweep aborted".into(),
                    });
                }
                if !radius.is_finite() || radius < 0.0 {
                    return RowOutcome::Skip(RowSkip {
                        value,
                        reason: "radius must be finite and non-negative".into(),
                    });
                }
                let Some(points) = self.embedding.prefix(cutoff) else {
                    return RowOutcome::Skip(RowSkip {
                        value,
                        reason: format!("cutoff N={cutoff} exceeds embedding (max n={max_n})"),
                    });
                };
                if points.is_empty() {
                    return RowOutcome::Skip(RowSkip {
                        value,
                        reason: format!("cutoff N={cutoff} precedes the first point"),
                    });
                }
                match self.compare_subset(points, radius, value) {
                    RowOutcome::Row(row) => {
                        info!(
                            cutoff,
                            mean_real = row.mean_rho_real,
                            mean_null = row.mean_rho_null,
                            ks = row.ks,
                            p = row.p_value,
                            n_real = row.n_real,
                            n_null = row.n_null,
                            c = row.c,
                            "cutoff row done"
                        );
                        RowOutcome::Row(row)
                    }
                    skip => skip,
                }
            })
            .collect();

        collect_table(outcomes)
    }

    /// One full comparison cycle on a subset. The reference sample is drawn
    /// once and reused for BOTH fields; the paired design is what makes the
    /// KS comparison valid.
    fn compare_subset(&self, points: &[Point], radius: f64, value: f64) -> RowOutcome {
        let n_real = event_count(points);
        let target = self.controls.target_count.unwrap_or(n_real);
        let seed = self.controls.seed;

        let field = match calibrate(points, target, self.model, seed) {
            Ok(field) => field,
            Err(err) => {
                return RowOutcome::Skip(RowSkip {
                    value,
                    reason: err.to_string(),
                });
            }
        };

        let k = self.clamped_sample_size(points.len());
        if k == 0 {
            return RowOutcome::Skip(RowSkip {
                value,
                reason: "reference sample is empty".into(),
            });
        }
        let refs = reference_sample(points.len(), k, seed ^ REFERENCE_STREAM);
        let centers = reference_coords(points, &refs);

        let real_index = GridIndex::build(&event_coords(points));
        let null_index = GridIndex::build(&masked_coords(points, &field.labels));
        let rho_real = density_sample(&real_index, &centers, radius);
        let rho_null = density_sample(&null_index, &centers, radius);

        let Some(ks) = ks_two_sample(&rho_real, &rho_null) else {
            return RowOutcome::Skip(RowSkip {
                value,
                reason: "reference sample is empty".into(),
            });
        };

        RowOutcome::Row(SweepRow {
            value,
            sample_size: centers.len(),
            mean_rho_real: mean_density(&rho_real),
            mean_rho_null: mean_density(&rho_null),
            ks: ks.statistic,
            p_value: ks.p_value,
            n_real,
            n_null: field.realized,
            c: field.constant,
            seed,
        })
    }

    /// Single comparison at one radius over the full embedding; a one-row
    /// radius sweep.
    pub fn compare_at(&self, radius: f64) -> SweepTable {
        self.radius_sweep(&[radius])
    }
}
