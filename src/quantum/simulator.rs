use crate::quantum::{ Circuit, CircuitExecutor, Gate, QuantumError, MAX_QUBITS };
use log::debug;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };
use std::collections::HashSet;
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::Mutex;

/// Dense state-vector simulator. Basis index bit `q` is the value of qubit `q`.
pub struct StateVectorSimulator {
    rng: Mutex<StdRng>,
}

impl StateVectorSimulator {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_os_rng()) }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Applies every unitary gate and returns the final amplitudes.
    fn evolve(circuit: &Circuit) -> Result<Vec<Complex<f64>>, QuantumError> {
        let n = circuit.num_qubits();
        let mut state = vec![Complex::new(0.0, 0.0); 1 << n];
        state[0] = Complex::new(1.0, 0.0);

        for gate in circuit.gates() {
            match *gate {
                Gate::H(q) => apply_hadamard(&mut state, q),
                Gate::Cnot { control, target } => apply_cnot(&mut state, control, target),
                Gate::Measure(_) => {}
            }
        }
        Ok(state)
    }
}

impl Default for StateVectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitExecutor for StateVectorSimulator {
    fn run(&self, circuit: &Circuit, shots: usize) -> Result<Vec<Vec<u8>>, QuantumError> {
        if shots == 0 {
            return Err(QuantumError::ZeroShots);
        }
        validate(circuit)?;

        let state = Self::evolve(circuit)?;
        let measured = circuit.measured_qubits();

        // Running totals of |amplitude|^2 for sampling by binary search.
        let mut cumulative = Vec::with_capacity(state.len());
        let mut total = 0.0;
        for amp in &state {
            total += amp.norm_sqr();
            cumulative.push(total);
        }

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut outcomes = Vec::with_capacity(shots);
        for _ in 0..shots {
            let r = rng.random::<f64>() * total;
            let index = cumulative.partition_point(|&c| c <= r).min(state.len() - 1);
            outcomes.push(
                measured
                    .iter()
                    .map(|&q| ((index >> q) & 1) as u8)
                    .collect()
            );
        }

        debug!("Simulated {} shot(s) over {} qubit(s)", shots, circuit.num_qubits());
        Ok(outcomes)
    }
}

fn validate(circuit: &Circuit) -> Result<(), QuantumError> {
    let n = circuit.num_qubits();
    if n > MAX_QUBITS {
        return Err(QuantumError::TooManyQubits(n));
    }

    let check = |q: usize| {
        if q >= n {
            Err(QuantumError::QubitOutOfRange { qubit: q, num_qubits: n })
        } else {
            Ok(())
        }
    };

    let mut measured = HashSet::new();
    for gate in circuit.gates() {
        match *gate {
            Gate::H(q) => {
                check(q)?;
                if measured.contains(&q) {
                    return Err(QuantumError::GateAfterMeasurement(q));
                }
            }
            Gate::Cnot { control, target } => {
                check(control)?;
                check(target)?;
                if control == target {
                    return Err(QuantumError::SameControlTarget(control));
                }
                for q in [control, target] {
                    if measured.contains(&q) {
                        return Err(QuantumError::GateAfterMeasurement(q));
                    }
                }
            }
            Gate::Measure(q) => {
                check(q)?;
                if !measured.insert(q) {
                    return Err(QuantumError::DuplicateMeasurement(q));
                }
            }
        }
    }

    if measured.is_empty() {
        return Err(QuantumError::NoMeasurements);
    }
    Ok(())
}

fn apply_hadamard(state: &mut [Complex<f64>], q: usize) {
    let bit = 1 << q;
    for i in 0..state.len() {
        if i & bit == 0 {
            let j = i | bit;
            let (a, b) = (state[i], state[j]);
            state[i] = (a + b) * FRAC_1_SQRT_2;
            state[j] = (a - b) * FRAC_1_SQRT_2;
        }
    }
}

fn apply_cnot(state: &mut [Complex<f64>], control: usize, target: usize) {
    let (c, t) = (1 << control, 1 << target);
    for i in 0..state.len() {
        if i & c != 0 && i & t == 0 {
            state.swap(i, i | t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_shots_are_correlated() {
        let sim = StateVectorSimulator::with_seed(1);
        let outcomes = sim.run(&Circuit::bell(), 200).unwrap();
        assert_eq!(outcomes.len(), 200);
        for shot in &outcomes {
            assert_eq!(shot.len(), 2);
            assert!(shot[0] <= 1);
            assert_eq!(shot[0], shot[1]);
        }
        // 200 fair coin flips landing all on one side is not a realistic outcome.
        assert!(outcomes.iter().any(|s| s[0] == 0));
        assert!(outcomes.iter().any(|s| s[0] == 1));
    }

    #[test]
    fn untouched_register_measures_zero() {
        let sim = StateVectorSimulator::with_seed(3);
        let circuit = Circuit::new(3).measure(2).measure(0);
        let outcomes = sim.run(&circuit, 10).unwrap();
        assert!(outcomes.iter().all(|s| s == &vec![0, 0]));
    }

    #[test]
    fn cnot_follows_control() {
        let state = {
            let circuit = Circuit::new(2).h(0).cnot(0, 1);
            StateVectorSimulator::evolve(&circuit).unwrap()
        };
        // (|00> + |11>) / sqrt(2): indices 0 and 3.
        assert!((state[0].norm_sqr() - 0.5).abs() < 1e-12);
        assert!((state[3].norm_sqr() - 0.5).abs() < 1e-12);
        assert!(state[1].norm_sqr() < 1e-12);
        assert!(state[2].norm_sqr() < 1e-12);
    }

    #[test]
    fn same_seed_same_outcomes() {
        let a = StateVectorSimulator::with_seed(99).run(&Circuit::bell(), 64).unwrap();
        let b = StateVectorSimulator::with_seed(99).run(&Circuit::bell(), 64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_circuits() {
        let sim = StateVectorSimulator::with_seed(0);
        assert_eq!(sim.run(&Circuit::bell(), 0), Err(QuantumError::ZeroShots));
        assert_eq!(
            sim.run(&Circuit::new(2).h(2).measure(0), 1),
            Err(QuantumError::QubitOutOfRange { qubit: 2, num_qubits: 2 })
        );
        assert_eq!(
            sim.run(&Circuit::new(2).cnot(1, 1).measure(0), 1),
            Err(QuantumError::SameControlTarget(1))
        );
        assert_eq!(
            sim.run(&Circuit::new(1).measure(0).h(0), 1),
            Err(QuantumError::GateAfterMeasurement(0))
        );
        assert_eq!(
            sim.run(&Circuit::new(1).measure(0).measure(0), 1),
            Err(QuantumError::DuplicateMeasurement(0))
        );
        assert_eq!(sim.run(&Circuit::new(2).h(0), 1), Err(QuantumError::NoMeasurements));
        assert_eq!(
            sim.run(&Circuit::new(MAX_QUBITS + 1).measure(0), 1),
            Err(QuantumError::TooManyQubits(MAX_QUBITS + 1))
        );
    }
}
