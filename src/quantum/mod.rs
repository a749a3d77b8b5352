//! Fixed demonstration circuits and the executor that measures them.
//!
//! The HTTP layer only knows the [`CircuitExecutor`] contract: give it a
//! circuit and a shot count, get back one row of measured bits per shot.

mod simulator;

pub use simulator::StateVectorSimulator;

use crate::cli::Args;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on simulated register width; the state vector holds 2^n amplitudes.
pub const MAX_QUBITS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantumError {
    #[error("Qubit {qubit} is out of range for a {num_qubits}-qubit circuit")]
    QubitOutOfRange {
        qubit: usize,
        num_qubits: usize,
    },
    #[error("Control and target must differ (both are qubit {0})")]
    SameControlTarget(usize),
    #[error("Gate applied to qubit {0} after it was measured")]
    GateAfterMeasurement(usize),
    #[error("Qubit {0} is measured more than once")]
    DuplicateMeasurement(usize),
    #[error("Circuit has no measurements")]
    NoMeasurements,
    #[error("Shot count must be at least 1")]
    ZeroShots,
    #[error("Circuit width {0} exceeds the supported maximum of {max} qubits", max = MAX_QUBITS)]
    TooManyQubits(usize),
    #[error("Simulation task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    H(usize),
    Cnot {
        control: usize,
        target: usize,
    },
    Measure(usize),
}

/// Ordered gate list over a fixed-width register, all qubits starting in |0>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, gates: Vec::new() }
    }

    pub fn h(mut self, qubit: usize) -> Self {
        self.gates.push(Gate::H(qubit));
        self
    }

    pub fn cnot(mut self, control: usize, target: usize) -> Self {
        self.gates.push(Gate::Cnot { control, target });
        self
    }

    pub fn measure(mut self, qubit: usize) -> Self {
        self.gates.push(Gate::Measure(qubit));
        self
    }

    /// H on 0, CNOT 0 -> 1, measure both: every shot reads `[0, 0]` or `[1, 1]`.
    pub fn bell() -> Self {
        Self::new(2).h(0).cnot(0, 1).measure(0).measure(1)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Measured qubits in the order their `Measure` gates appear.
    pub fn measured_qubits(&self) -> Vec<usize> {
        self.gates
            .iter()
            .filter_map(|g| match g {
                Gate::Measure(q) => Some(*q),
                _ => None,
            })
            .collect()
    }
}

pub trait CircuitExecutor: Send + Sync {
    /// Runs `circuit` `shots` times. Row `i` holds shot `i`'s bits, one per
    /// measured qubit, in measurement order.
    fn run(&self, circuit: &Circuit, shots: usize) -> Result<Vec<Vec<u8>>, QuantumError>;
}

pub fn create_executor(args: &Args) -> Arc<dyn CircuitExecutor> {
    match args.quantum_seed {
        Some(seed) => Arc::new(StateVectorSimulator::with_seed(seed)),
        None => Arc::new(StateVectorSimulator::new()),
    }
}
