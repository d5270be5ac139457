//! `pyro_core` — deterministic pyrolysis-game tick.
//!
//! No IO, no clocks. All randomness via the passed-in Rng.

mod cooling;
mod engine;
mod feedstock;
mod heating;
pub mod metrics;
mod progress;
mod results;
mod sorting;
mod types;

pub use cooling::band_status;
pub use engine::tick;
pub use feedstock::feedstock_preview;
pub use heating::{CELL_COUNT, GRID_HEIGHT, GRID_WIDTH};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use progress::ProgressError;
pub use results::{compute_results, ResultsSummary};
pub use sorting::spawn_weights;
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
