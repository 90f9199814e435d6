//! Small multi-layer perceptron used as the action-value approximator.
//!
//! `state → [Dense + ReLU]* → Dense (linear, one output per action)`.
//! Trained one sample at a time with mean-squared error, where only the
//! taken action's output carries an error term.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::agent_error::AgentError;
use crate::optimizer::Adam;

/// Fully connected layer; `weights` is row-major `[outputs][inputs]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

impl Dense {
    /// Kaiming-uniform weights (suited to ReLU), zero bias.
    fn kaiming<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let bound = (6.0 / inputs as f32).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.gen_range(-bound..bound))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            bias: vec![0.0; outputs],
        }
    }

    fn forward(&self, x: &[f32]) -> Vec<f32> {
        (0..self.outputs)
            .map(|o| {
                let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
                row.iter().zip(x.iter()).map(|(w, xi)| w * xi).sum::<f32>() + self.bias[o]
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QNetwork {
    layers: Vec<Dense>,
}

impl QNetwork {
    pub fn new<R: Rng + ?Sized>(
        input: usize,
        hidden: &[usize],
        output: usize,
        rng: &mut R,
    ) -> Self {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(input);
        sizes.extend_from_slice(hidden);
        sizes.push(output);

        let layers = sizes
            .windows(2)
            .map(|w| Dense::kaiming(w[0], w[1], &mut *rng))
            .collect();
        Self { layers }
    }

    /// Check that every layer's buffers match its declared size and that
    /// consecutive layers chain. Deserialized networks must pass this before
    /// any forward pass.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.layers.is_empty() {
            return Err(AgentError::MalformedNetwork("no layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.inputs == 0 || layer.outputs == 0 {
                return Err(AgentError::MalformedNetwork(format!("layer {i} has a zero dimension")));
            }
            if layer.weights.len() != layer.inputs * layer.outputs {
                return Err(AgentError::MalformedNetwork(format!(
                    "layer {i} has {} weights, expected {}",
                    layer.weights.len(),
                    layer.inputs * layer.outputs
                )));
            }
            if layer.bias.len() != layer.outputs {
                return Err(AgentError::MalformedNetwork(format!(
                    "layer {i} has {} biases, expected {}",
                    layer.bias.len(),
                    layer.outputs
                )));
            }
        }
        if let Some(i) = self
            .layers
            .windows(2)
            .position(|w| w[0].outputs != w[1].inputs)
        {
            return Err(AgentError::MalformedNetwork(format!(
                "layer {i} outputs {} but layer {} takes {}",
                self.layers[i].outputs,
                i + 1,
                self.layers[i + 1].inputs
            )));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.inputs).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.outputs).unwrap_or(0)
    }

    /// Predicted value of every action for `x`.
    pub fn predict(&self, x: &[f32]) -> Vec<f32> {
        self.forward_trace(x).0.pop().unwrap_or_default()
    }

    /// Returns `(activations, pre_activations)`; `activations[0]` is the input
    /// and the last entry is the (linear) output.
    fn forward_trace(&self, x: &[f32]) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre = Vec::with_capacity(self.layers.len());
        activations.push(x.to_vec());

        let last = self.layers.len().saturating_sub(1);
        for (i, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(&activations[i]);
            let a = if i == last {
                z.clone()
            } else {
                z.iter().map(|v| v.max(0.0)).collect()
            };
            pre.push(z);
            activations.push(a);
        }
        (activations, pre)
    }

    /// One gradient step moving `Q(x, action)` toward `target`; all other
    /// outputs keep their current prediction as target. Returns the MSE loss
    /// before the update.
    pub fn fit_action(&mut self, x: &[f32], action: usize, target: f32, opt: &mut Adam) -> f32 {
        let (activations, pre) = self.forward_trace(x);
        let output = activations.last().cloned().unwrap_or_default();
        let n_out = output.len();
        if action >= n_out {
            return 0.0;
        }

        let err = output[action] - target;
        let loss = err * err / n_out as f32;

        // dL/dz at the linear output: only the taken action is non-zero.
        let mut delta = vec![0.0_f32; n_out];
        delta[action] = 2.0 * err / n_out as f32;

        let mut grads: Vec<(Vec<f32>, Vec<f32>)> = vec![(Vec::new(), Vec::new()); self.layers.len()];
        for l in (0..self.layers.len()).rev() {
            let layer = &self.layers[l];
            let input = &activations[l];

            let mut gw = vec![0.0_f32; layer.weights.len()];
            for o in 0..layer.outputs {
                if delta[o] == 0.0 {
                    continue;
                }
                let row = &mut gw[o * layer.inputs..(o + 1) * layer.inputs];
                for (g, xi) in row.iter_mut().zip(input.iter()) {
                    *g = delta[o] * xi;
                }
            }

            let next_delta: Vec<f32> = if l > 0 {
                let z_prev = &pre[l - 1];
                (0..layer.inputs)
                    .map(|i| {
                        if z_prev[i] <= 0.0 {
                            return 0.0;
                        }
                        (0..layer.outputs)
                            .map(|o| layer.weights[o * layer.inputs + i] * delta[o])
                            .sum::<f32>()
                    })
                    .collect()
            } else {
                Vec::new()
            };

            grads[l] = (gw, delta);
            delta = next_delta;
        }

        let flat_grads: Vec<Vec<f32>> = grads
            .into_iter()
            .flat_map(|(gw, gb)| [gw, gb])
            .collect();
        let mut params: Vec<&mut Vec<f32>> = self
            .layers
            .iter_mut()
            .flat_map(|l| [&mut l.weights, &mut l.bias])
            .collect();
        opt.step(&mut params, &flat_grads);

        loss
    }
}
