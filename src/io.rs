//! CSV collaborators: embedding input, null-field export, sweep-table output.
//!
//! The core has no storage-format dependency; everything file-shaped lives
//! here, at the edge of the crate.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::core::embedding::{Embedding, EmbeddingError, Point};
use crate::core::nullfield::NullField;
use crate::sweep::SweepTable;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("{path}:{line}: {message}")]
    Malformed {
        path: String,
        line: usize,
        message: String,
    },
    #[error(transparent)]
    Contract(#[from] EmbeddingError),
}

/// Load an embedding from a headered CSV.
///
/// Required columns: `x`, `y` and the event label named by `label` (the
/// upstream datasets use `is_prime`). An `n` column is used when present;
/// when absent, indices fall back to 2, 3, ... in row order. Extra columns
/// are ignored. Any missing required field or unparseable value fails the
/// load; the contract is enforced before any computation starts.
pub fn load_embedding_csv(path: &Path, label: &str) -> Result<Embedding, CsvError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| CsvError::Read {
        path: display.clone(),
        source,
    })?;

    let mut lines = text.lines().enumerate();
    let (_, header) = lines.next().ok_or_else(|| CsvError::Malformed {
        path: display.clone(),
        line: 1,
        message: "file is empty".into(),
    })?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let position = |name: &str| columns.iter().position(|c| *c == name);
    let require = |name: &str| {
        position(name).ok_or_else(|| CsvError::MissingColumn {
            path: display.clone(),
            column: name.into(),
        })
    };

    let ix = require("x")?;
    let iy = require("y")?;
    let ilabel = require(label)?;
    let in_col = position("n");

    let mut points: Vec<Point> = Vec::new();
    let mut rows: Vec<(f64, f64, bool)> = Vec::new();
    for (lineno, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |col: usize, name: &str| {
            fields.get(col).copied().ok_or_else(|| CsvError::Malformed {
                path: display.clone(),
                line: lineno + 1,
                message: format!("row has no '{name}' field"),
            })
        };
        let float = |col: usize, name: &str| -> Result<f64, CsvError> {
            field(col, name)?.parse::<f64>().map_err(|_| CsvError::Malformed {
                path: display.clone(),
                line: lineno + 1,
                message: format!("'{name}' is not a number"),
            })
        };
        let x = float(ix, "x")?;
        let y = float(iy, "y")?;
        let is_event = parse_label(field(ilabel, label)?).ok_or_else(|| CsvError::Malformed {
            path: display.clone(),
            line: lineno + 1,
            message: format!("'{label}' must be 0/1 or true/false"),
        })?;
        match in_col {
            Some(icol) => {
                let n = field(icol, "n")?.parse::<u64>().map_err(|_| CsvError::Malformed {
                    path: display.clone(),
                    line: lineno + 1,
                    message: "'n' is not an integer".into(),
                })?;
                points.push(Point { n, x, y, is_event });
            }
            None => rows.push((x, y, is_event)),
        }
    }

    let embedding = if in_col.is_some() {
        Embedding::new(points)?
    } else {
        Embedding::from_rows(rows)?
    };
    Ok(embedding)
}

fn parse_label(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Write a sweep table as CSV rows, computed rows only, caller order.
/// Skipped values are diagnostics, reported through the log, not the table.
pub fn write_sweep_csv(path: &Path, table: &SweepTable) -> Result<(), CsvError> {
    let mut out = String::new();
    out.push_str("value,sample_size,mean_rho_real,mean_rho_null,ks,p_value,n_real,n_null,c,seed\n");
    for row in &table.rows {
        let _ = writeln!(
            out,
            "{},{},{:.6},{:.6},{:.6},{:.6e},{},{},{:.6},{}",
            row.value,
            row.sample_size,
            row.mean_rho_real,
            row.mean_rho_null,
            row.ks,
            row.p_value,
            row.n_real,
            row.n_null,
            row.c,
            row.seed,
        );
    }
    fs::write(path, out).map_err(|source| CsvError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Export a calibrated null field alongside its geometry so one draw can be
/// reused by downstream tooling.
pub fn write_null_field_csv(
    path: &Path,
    points: &[Point],
    field: &NullField,
    label: &str,
) -> Result<(), CsvError> {
    debug_assert_eq!(points.len(), field.labels.len());
    let mut out = String::new();
    let _ = writeln!(out, "n,x,y,{label}");
    for (p, &hit) in points.iter().zip(&field.labels) {
        let _ = writeln!(out, "{},{},{},{}", p.n, p.x, p.y, u8::from(hit));
    }
    fs::write(path, out).map_err(|source| CsvError::Write {
        path: path.display().to_string(),
        source,
    })
}
