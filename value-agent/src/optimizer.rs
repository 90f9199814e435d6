//! Adam optimizer (Kingma & Ba, 2015) over flat parameter tensors.
//!
//! Moment estimates are kept per tensor index, so the caller must present
//! parameters in the same order on every step.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    /// First moment estimates.
    m: Vec<Vec<f32>>,
    /// Second moment estimates.
    v: Vec<Vec<f32>>,
    /// Timestep for bias correction.
    t: u64,
}

impl Adam {
    /// Default: β₁=0.9, β₂=0.999, ε=1e-7
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    pub fn steps(&self) -> u64 {
        self.t
    }

    /// Apply one optimization step. `params[i]` is updated with `grads[i]`.
    pub fn step(&mut self, params: &mut [&mut Vec<f32>], grads: &[Vec<f32>]) {
        self.t += 1;
        for (idx, (param, grad)) in params.iter_mut().zip(grads.iter()).enumerate() {
            self.update_param(idx, param, grad);
        }
    }

    fn update_param(&mut self, idx: usize, param: &mut [f32], grad: &[f32]) {
        if idx >= self.m.len() {
            self.m.resize(idx + 1, Vec::new());
            self.v.resize(idx + 1, Vec::new());
        }
        if self.m[idx].len() != param.len() {
            self.m[idx] = vec![0.0; param.len()];
            self.v[idx] = vec![0.0; param.len()];
        }

        let m = &mut self.m[idx];
        let v = &mut self.v[idx];

        let bias_correction1 = 1.0 - self.beta1.powi(self.t.min(i32::MAX as u64) as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t.min(i32::MAX as u64) as i32);

        for i in 0..param.len() {
            let g = grad[i];
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = m[i] / bias_correction1;
            let v_hat = v[i] / bias_correction2;

            param[i] -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_against_gradient() {
        let mut opt = Adam::new(0.1);
        let mut w = vec![1.0_f32, -1.0];
        opt.step(&mut [&mut w], &[vec![1.0, -1.0]]);
        assert!(w[0] < 1.0);
        assert!(w[1] > -1.0);
        assert_eq!(opt.steps(), 1);
    }

    #[test]
    fn zero_gradient_leaves_parameters_unchanged() {
        let mut opt = Adam::new(0.1);
        let mut w = vec![0.5_f32];
        opt.step(&mut [&mut w], &[vec![0.0]]);
        assert_eq!(w, vec![0.5]);
    }
}
