//! Snapshot metrics computed from `GameState`.
//!
//! A single `compute_metrics(&GameState, &Constants) -> MetricsSnapshot`
//! function samples the current state for time-series analysis. No state
//! mutation, no IO; the CSV writer is the only thing here that touches disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::heating;
use crate::types::{Constants, GameState};

/// Current schema version — bump when fields are added/removed/reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub metrics_version: u32,
    pub level: &'static str,

    // Heating
    pub avg_heat: f32,
    pub heat_uniformity: f32,

    // Cooling
    pub temperature: f32,
    pub liquid_level: f32,
    pub condenser_efficiency: f32,

    // Sorting
    pub items_sorted: u32,
    pub sort_mistakes: u32,
    pub items_in_flight: u32,

    // Committed scores
    pub heating_score: f32,
    pub sorting_score: f32,
    pub cooling_score: f32,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_metrics(state: &GameState, constants: &Constants) -> MetricsSnapshot {
    MetricsSnapshot {
        tick: state.meta.tick,
        metrics_version: METRICS_VERSION,
        level: state.level.label(),
        avg_heat: heating::avg_heat(&state.heating.cells),
        heat_uniformity: heating::uniformity(&state.heating.cells, constants),
        temperature: state.cooling.temperature,
        liquid_level: state.cooling.liquid_level,
        condenser_efficiency: state.cooling.efficiency,
        items_sorted: state.sorting.sorted_count,
        sort_mistakes: state.sorting.mistakes,
        items_in_flight: state.sorting.in_flight.len() as u32,
        heating_score: state.scores.heating,
        sorting_score: state.scores.sorting,
        cooling_score: state.scores.cooling,
    }
}

const CSV_HEADER: &str = "tick,level,avg_heat,heat_uniformity,temperature,liquid_level,\
condenser_efficiency,items_sorted,sort_mistakes,items_in_flight,\
heating_score,sorting_score,cooling_score";

/// Appends one CSV row per snapshot to `<run_dir>/metrics.csv`.
pub struct MetricsFileWriter {
    writer: BufWriter<File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: &Path) -> std::io::Result<MetricsFileWriter> {
        let file = File::create(run_dir.join("metrics.csv"))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}")?;
        Ok(MetricsFileWriter { writer })
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            snapshot.tick,
            snapshot.level,
            snapshot.avg_heat,
            snapshot.heat_uniformity,
            snapshot.temperature,
            snapshot.liquid_level,
            snapshot.condenser_efficiency,
            snapshot.items_sorted,
            snapshot.sort_mistakes,
            snapshot.items_in_flight,
            snapshot.heating_score,
            snapshot.sorting_score,
            snapshot.cooling_score,
        )
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
