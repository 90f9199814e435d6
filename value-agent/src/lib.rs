//! Value-function agent: epsilon-greedy action selection over a fixed-size
//! state, experience replay training and snapshot persistence.
//!
//! Public API:
//! - [`ValueFunctionAgent::act`]: pick an action index for a state.
//! - [`ValueFunctionAgent::remember`]: append a transition to the ring buffer.
//! - [`ValueFunctionAgent::replay`]: train on a uniform minibatch, then decay epsilon.
//! - [`ValueFunctionAgent::load`] / [`ValueFunctionAgent::save`]: snapshot I/O.

pub mod errors;
mod network;
mod optimizer;
mod replay_buffer;
mod snapshot;
pub mod structs;

use std::borrow::Cow;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

pub use errors::agent_error::AgentError;
pub use network::QNetwork;
pub use optimizer::Adam;
pub use replay_buffer::ReplayBuffer;
pub use snapshot::{AgentSnapshot, SNAPSHOT_VERSION, read_snapshot, write_snapshot};
pub use structs::agent_config::AgentConfig;
pub use structs::transition::ReplayTransition;

/// Result of a [`ValueFunctionAgent::replay`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayOutcome {
    /// Buffer smaller than the batch size; nothing changed.
    Skipped { buffered: usize, batch_size: usize },
    /// One minibatch was trained and epsilon decayed.
    Trained {
        batch_size: usize,
        mean_loss: f32,
        epsilon: f32,
    },
}

/// How [`ValueFunctionAgent::load`] ended up initializing the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Restored,
    /// No snapshot at the path.
    Fresh,
    /// A snapshot existed but could not be used.
    FallbackFresh,
}

#[derive(Debug)]
pub struct ValueFunctionAgent {
    config: AgentConfig,
    epsilon: f32,
    network: QNetwork,
    optimizer: Adam,
    memory: ReplayBuffer,
    updates: u64,
}

impl ValueFunctionAgent {
    /// Create an agent with freshly initialized weights.
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let network = fresh_network(&config);
        Ok(Self {
            epsilon: config.epsilon,
            optimizer: Adam::new(config.learning_rate),
            memory: ReplayBuffer::with_capacity(config.memory_capacity),
            network,
            config,
            updates: 0,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Number of gradient updates applied since construction or load.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn network(&self) -> &QNetwork {
        &self.network
    }

    // ── Acting ──────────────────────────────────────────────────────────────

    /// Epsilon-greedy action in `[0, action_size)`. Never changes epsilon.
    pub fn act(&self, state: &[f32]) -> usize {
        self.act_with(state, &mut rand::thread_rng())
    }

    pub fn act_with<R: Rng + ?Sized>(&self, state: &[f32], rng: &mut R) -> usize {
        if rng.gen_bool(f64::from(self.epsilon.clamp(0.0, 1.0))) {
            return rng.gen_range(0..self.config.action_size);
        }
        self.greedy_action(state)
    }

    /// Action with the highest predicted value; ties go to the lowest index.
    pub fn greedy_action(&self, state: &[f32]) -> usize {
        let values = self.network.predict(&self.shape_input(state));
        argmax(&values)
    }

    pub fn predict(&self, state: &[f32]) -> Vec<f32> {
        self.network.predict(&self.shape_input(state))
    }

    // ── Learning ────────────────────────────────────────────────────────────

    pub fn remember(
        &mut self,
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) {
        self.memory.push(ReplayTransition {
            state,
            action,
            reward,
            next_state,
            done,
        });
    }

    pub fn replay(&mut self) -> ReplayOutcome {
        self.replay_with(&mut rand::thread_rng())
    }

    /// Train on `batch_size` transitions drawn uniformly without replacement.
    ///
    /// target = reward                                   if done
    /// target = reward + gamma * max_a Q(next_state, a)  otherwise
    pub fn replay_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReplayOutcome {
        let batch_size = self.config.batch_size;
        if self.memory.len() < batch_size {
            return ReplayOutcome::Skipped {
                buffered: self.memory.len(),
                batch_size,
            };
        }

        let batch: Vec<ReplayTransition> = self
            .memory
            .sample(rng, batch_size)
            .into_iter()
            .cloned()
            .collect();

        let mut total_loss = 0.0_f32;
        for t in &batch {
            let target = if t.done {
                t.reward
            } else {
                let next = self.network.predict(&self.shape_input(&t.next_state));
                let best = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                t.reward + self.config.gamma * best
            };

            let input = self.shape_input(&t.state).into_owned();
            total_loss += self
                .network
                .fit_action(&input, t.action, target, &mut self.optimizer);
            self.updates += 1;
        }

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        let mean_loss = total_loss / batch.len() as f32;

        debug!(
            target: "value_agent::replay",
            batch = batch.len(),
            mean_loss,
            epsilon = self.epsilon,
            "replay: minibatch trained"
        );

        ReplayOutcome::Trained {
            batch_size: batch.len(),
            mean_loss,
            epsilon: self.epsilon,
        }
    }

    // ── Persistence ─────────────────────────────────────────────────────────

    /// Restore weights, optimizer state and epsilon from `path`.
    ///
    /// A missing, unreadable or shape-incompatible snapshot is not fatal:
    /// the agent keeps freshly initialized weights and the reason is logged.
    pub async fn load(&mut self, path: &Path) -> LoadOutcome {
        match read_snapshot(path).await {
            Ok(Some(snapshot)) => match self.restore(snapshot) {
                Ok(()) => {
                    info!(
                        target: "value_agent::snapshot",
                        path = %path.display(),
                        epsilon = self.epsilon,
                        "agent model restored"
                    );
                    LoadOutcome::Restored
                }
                Err(e) => {
                    warn!(
                        target: "value_agent::snapshot",
                        path = %path.display(),
                        error = %e,
                        "snapshot incompatible, training starts from scratch"
                    );
                    self.reset();
                    LoadOutcome::FallbackFresh
                }
            },
            Ok(None) => {
                info!(
                    target: "value_agent::snapshot",
                    path = %path.display(),
                    "no snapshot found, training starts from scratch"
                );
                self.reset();
                LoadOutcome::Fresh
            }
            Err(e) => {
                warn!(
                    target: "value_agent::snapshot",
                    path = %path.display(),
                    error = %e,
                    "snapshot unreadable, training starts from scratch"
                );
                self.reset();
                LoadOutcome::FallbackFresh
            }
        }
    }

    /// Atomically persist the current model to `path`.
    pub async fn save(&self, path: &Path) -> Result<(), AgentError> {
        write_snapshot(path, &self.snapshot()).await?;
        info!(
            target: "value_agent::snapshot",
            path = %path.display(),
            updates = self.updates,
            epsilon = self.epsilon,
            "agent model saved"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            epsilon: self.epsilon,
            network: self.network.clone(),
            optimizer: self.optimizer.clone(),
        }
    }

    /// Swap in a snapshot. Rejects snapshots built for another shape or whose
    /// layers are internally inconsistent.
    pub fn restore(&mut self, snapshot: AgentSnapshot) -> Result<(), AgentError> {
        snapshot.network.validate()?;
        let shape_ok = snapshot.config.state_size == self.config.state_size
            && snapshot.config.action_size == self.config.action_size
            && snapshot.network.input_size() == self.config.state_size
            && snapshot.network.output_size() == self.config.action_size;
        if !shape_ok {
            return Err(AgentError::ShapeMismatch {
                got_state: snapshot.network.input_size(),
                got_action: snapshot.network.output_size(),
                want_state: self.config.state_size,
                want_action: self.config.action_size,
            });
        }

        self.network = snapshot.network;
        self.optimizer = snapshot.optimizer;
        self.optimizer.set_lr(self.config.learning_rate);
        self.epsilon = if snapshot.epsilon.is_finite() {
            snapshot
                .epsilon
                .clamp(self.config.epsilon_min, self.config.epsilon.max(self.config.epsilon_min))
        } else {
            self.config.epsilon
        };
        Ok(())
    }

    fn reset(&mut self) {
        self.network = fresh_network(&self.config);
        self.optimizer = Adam::new(self.config.learning_rate);
        self.epsilon = self.config.epsilon;
    }

    /// Zero-pad or truncate to `state_size`.
    fn shape_input<'a>(&self, state: &'a [f32]) -> Cow<'a, [f32]> {
        if state.len() == self.config.state_size {
            Cow::Borrowed(state)
        } else {
            let mut v = state.to_vec();
            v.resize(self.config.state_size, 0.0);
            Cow::Owned(v)
        }
    }
}

fn fresh_network(config: &AgentConfig) -> QNetwork {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    QNetwork::new(
        config.state_size,
        &config.hidden_sizes,
        config.action_size,
        &mut rng,
    )
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
