use std::sync::Arc;

use parking_lot::Mutex;
use pyro_control::ScriptedOperator;
use pyro_core::{Constants, EventEnvelope, GameState};
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;

pub struct SessionState {
    pub game: GameState,
    pub constants: Constants,
    pub rng: ChaCha8Rng,
    pub operator: ScriptedOperator,
    pub next_command_id: u64,
}

pub type SharedSession = Arc<Mutex<SessionState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;
