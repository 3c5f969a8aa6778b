//! LSTM layer forward pass.

use ndarray::{s, Array1, Array2};

use super::params::LayerParameters;
use crate::error::StartupError;

#[derive(Debug, Clone)]
pub struct LstmLayer {
    hidden_size: usize,
    w_ih: Array2<f64>,
    w_hh: Array2<f64>,
    // bias_ih + bias_hh, folded at load time
    bias: Array1<f64>,
}

impl LstmLayer {
    pub fn from_parameters(
        name: &str,
        params: &LayerParameters,
        input_size: usize,
        hidden_size: usize,
    ) -> Result<Self, StartupError> {
        let gates = 4 * hidden_size;
        let w_ih = matrix(&format!("{}.weight_ih", name), &params.weight_ih, gates, input_size)?;
        let w_hh = matrix(&format!("{}.weight_hh", name), &params.weight_hh, gates, hidden_size)?;
        let bias_ih = vector(&format!("{}.bias_ih", name), &params.bias_ih, gates)?;
        let bias_hh = vector(&format!("{}.bias_hh", name), &params.bias_hh, gates)?;

        Ok(Self {
            hidden_size,
            w_ih,
            w_hh,
            bias: bias_ih + bias_hh,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Zeroed `(h, c)` state.
    pub fn init_state(&self) -> (Array1<f64>, Array1<f64>) {
        (
            Array1::zeros(self.hidden_size),
            Array1::zeros(self.hidden_size),
        )
    }

    /// One timestep. Returns the next `(h, c)`.
    pub fn step(
        &self,
        x: &Array1<f64>,
        h_prev: &Array1<f64>,
        c_prev: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let hs = self.hidden_size;
        let gates = self.w_ih.dot(x) + self.w_hh.dot(h_prev) + &self.bias;

        let i_gate = gates.slice(s![0..hs]).mapv(sigmoid);
        let f_gate = gates.slice(s![hs..2 * hs]).mapv(sigmoid);
        let g = gates.slice(s![2 * hs..3 * hs]).mapv(f64::tanh);
        let o_gate = gates.slice(s![3 * hs..4 * hs]).mapv(sigmoid);

        let c_next = &f_gate * c_prev + &i_gate * &g;
        let h_next = &o_gate * &c_next.mapv(f64::tanh);

        (h_next, c_next)
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn matrix(
    name: &str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<Array2<f64>, StartupError> {
    if rows.len() != expected_rows {
        return Err(StartupError::ModelShape(format!(
            "{}: expected {} rows, found {}",
            name,
            expected_rows,
            rows.len()
        )));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected_cols) {
        return Err(StartupError::ModelShape(format!(
            "{}: row {} has {} columns, expected {}",
            name,
            i,
            row.len(),
            expected_cols
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    ensure_finite(name, &flat)?;
    Array2::from_shape_vec((expected_rows, expected_cols), flat)
        .map_err(|e| StartupError::ModelShape(format!("{}: {}", name, e)))
}

pub(crate) fn vector(
    name: &str,
    values: &[f64],
    expected_len: usize,
) -> Result<Array1<f64>, StartupError> {
    if values.len() != expected_len {
        return Err(StartupError::ModelShape(format!(
            "{}: expected {} values, found {}",
            name,
            expected_len,
            values.len()
        )));
    }
    ensure_finite(name, values)?;
    Ok(Array1::from(values.to_vec()))
}

fn ensure_finite(name: &str, values: &[f64]) -> Result<(), StartupError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StartupError::ModelShape(format!(
            "{}: contains non-finite weights",
            name
        )));
    }
    Ok(())
}
