//! Reactor-chamber heating: beam application, uniformity scoring, terminal
//! detection.
//!
//! Cells never cool; only beam application and the per-cell cap change them.
//! Without an active beam the simulation never terminates — the player must
//! act.

use crate::types::{CellPos, Constants, HeatingState, SimPhase};

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 10;
pub const CELL_COUNT: usize = GRID_WIDTH * GRID_HEIGHT;

/// Snapshot of one heating tick. `committed` carries the uniformity score on
/// the tick the chamber reaches target heat, and is `Some` exactly once.
pub(crate) struct HeatingTickReport {
    pub avg_heat: f32,
    pub uniformity: f32,
    pub committed: Option<f32>,
}

/// Advance the heating simulation by one tick. Returns `None` once done.
pub(crate) fn step(heating: &mut HeatingState, constants: &Constants) -> Option<HeatingTickReport> {
    if heating.phase == SimPhase::Done {
        return None;
    }

    if let Some(beam) = heating.beam {
        apply_beam(&mut heating.cells, beam, constants);
    }

    let avg_heat = avg_heat(&heating.cells);
    let uniformity = uniformity(&heating.cells, constants);

    let committed = if avg_heat >= constants.heat_target_avg {
        heating.phase = SimPhase::Done;
        Some(uniformity)
    } else {
        None
    };

    Some(HeatingTickReport {
        avg_heat,
        uniformity,
        committed,
    })
}

/// Heat the beam cell and its eight neighbors, falling off with Euclidean
/// distance in cell units (self 0, orthogonal 1, diagonal ~1.41). Each cell
/// clamps at `cell_heat_cap`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) fn apply_beam(cells: &mut [f32], beam: CellPos, constants: &Constants) {
    let bx = i32::from(beam.x);
    let by = i32::from(beam.y);
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            let gx = bx + dx;
            let gy = by + dy;
            if gx < 0 || gx >= GRID_WIDTH as i32 || gy < 0 || gy >= GRID_HEIGHT as i32 {
                continue;
            }
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            let power = (constants.beam_heat_rate * (constants.beam_radius_cells - dist)).max(0.0);
            let idx = gy as usize * GRID_WIDTH + gx as usize;
            cells[idx] = (cells[idx] + power).min(constants.cell_heat_cap);
        }
    }
}

pub(crate) fn avg_heat(cells: &[f32]) -> f32 {
    cells.iter().sum::<f32>() / cells.len() as f32
}

/// Mean squared deviation from the grid average.
pub(crate) fn variance(cells: &[f32]) -> f32 {
    let mean = avg_heat(cells);
    cells.iter().map(|h| (h - mean).powi(2)).sum::<f32>() / cells.len() as f32
}

/// `1 - min(variance / divisor, penalty_cap)` — 1.0 for a perfectly even
/// grid, floored at `1 - penalty_cap`.
pub(crate) fn uniformity(cells: &[f32], constants: &Constants) -> f32 {
    1.0 - (variance(cells) / constants.uniformity_variance_divisor)
        .min(constants.uniformity_penalty_cap)
}

impl HeatingState {
    /// Overall heat as a display percentage (`avg_heat * 100`).
    pub fn progress_pct(&self) -> f32 {
        avg_heat(&self.cells) * 100.0
    }

    pub fn uniformity(&self, constants: &Constants) -> f32 {
        uniformity(&self.cells, constants)
    }
}
