//! Synthetic impedance matrix.
//!
//! The matrix is a stand-in for a per-line impedance model: it is driven by a
//! seeded pseudo-random stream rather than electrical parameters. What matters
//! is reproducibility. Given the same seed, node order, capacities and
//! topology, [`ImpedanceSynthesizer::synthesize`] returns a bit-identical
//! matrix.
//!
//! Draw order is fixed: outer loop over operators in insertion order, inner
//! loop likewise. Each diagonal entry consumes one draw. Each ordered pair
//! `(i, j)` with an interconnection consumes one draw and writes it to both
//! `(i, j)` and `(j, i)`, so the value drawn for the later ordering is the one
//! that remains. Pairs without an interconnection consume nothing and stay 0.

use std::ops::Range;
use std::str::FromStr;

use jgrid_core::{CapacityMap, ImpedancePu, Network, OperatorId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_SEED: u64 = 42;

/// Lowest capacity used as a divisor in the capacity-weighted model.
pub const CAPACITY_FLOOR_GW: f64 = 0.1;

/// Capacity at which the self-impedance scale factor is 1.
pub const REFERENCE_CAPACITY_GW: f64 = 10.0;

/// Distance (degrees) that doubles a mutual impedance.
pub const DISTANCE_SCALE: f64 = 10.0;

const SELF_IMPEDANCE_RANGE: Range<f64> = 0.1..0.3;
const MUTUAL_IMPEDANCE_RANGE: Range<f64> = 0.05..0.15;

/// How drawn values are shaped by capacity and distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpedanceModel {
    /// Raw uniform draws.
    Uniform,
    /// Self-impedance scaled by `10 / capacity`, mutual impedance by
    /// `1 + distance / 10`.
    #[default]
    CapacityWeighted,
}

impl ImpedanceModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpedanceModel::Uniform => "uniform",
            ImpedanceModel::CapacityWeighted => "capacity-weighted",
        }
    }
}

impl FromStr for ImpedanceModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "uniform" | "basic" => Ok(ImpedanceModel::Uniform),
            "capacity-weighted" | "capacity_weighted" | "weighted" => {
                Ok(ImpedanceModel::CapacityWeighted)
            }
            other => Err(format!("unknown impedance model '{other}'")),
        }
    }
}

impl std::fmt::Display for ImpedanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Square impedance matrix indexed by operator, in network insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpedanceMatrix {
    pub labels: Vec<OperatorId>,
    pub seed: u64,
    pub model: ImpedanceModel,
    pub values: Vec<Vec<f64>>,
}

impl ImpedanceMatrix {
    fn zeros(labels: Vec<OperatorId>, seed: u64, model: ImpedanceModel) -> Self {
        let n = labels.len();
        Self {
            labels,
            seed,
            model,
            values: vec![vec![0.0; n]; n],
        }
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.labels.iter().position(|label| label.as_str() == id)
    }

    /// Entry for an operator pair, if both are in the matrix.
    pub fn impedance(&self, a: &str, b: &str) -> Option<ImpedancePu> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(ImpedancePu(self.values[i][j]))
    }

    pub fn self_impedance(&self, id: &str) -> Option<ImpedancePu> {
        self.impedance(id, id)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&OperatorId, &[f64])> {
        self.labels
            .iter()
            .zip(self.values.iter().map(|row| row.as_slice()))
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (0..i).all(|j| self.values[i][j] == self.values[j][i]))
    }
}

/// Seeded generator for [`ImpedanceMatrix`] values.
#[derive(Debug, Clone)]
pub struct ImpedanceSynthesizer {
    seed: u64,
    model: ImpedanceModel,
    capacity_floor: f64,
}

impl Default for ImpedanceSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl ImpedanceSynthesizer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            model: ImpedanceModel::default(),
            capacity_floor: CAPACITY_FLOOR_GW,
        }
    }

    pub fn with_model(mut self, model: ImpedanceModel) -> Self {
        self.model = model;
        self
    }

    /// Override the capacity floor; non-positive values fall back to
    /// [`CAPACITY_FLOOR_GW`].
    pub fn with_capacity_floor(mut self, floor_gw: f64) -> Self {
        self.capacity_floor = if floor_gw > 0.0 {
            floor_gw
        } else {
            CAPACITY_FLOOR_GW
        };
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn model(&self) -> ImpedanceModel {
        self.model
    }

    /// Build the matrix for `network`.
    ///
    /// `capacity` overrides the capacities stored on the operators; operators
    /// missing from it use their own capacity.
    pub fn synthesize(&self, network: &Network, capacity: &CapacityMap) -> ImpedanceMatrix {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let operators: Vec<_> = network.operators().collect();
        let labels = operators.iter().map(|op| op.id.clone()).collect();
        let mut matrix = ImpedanceMatrix::zeros(labels, self.seed, self.model);

        for (i, a) in operators.iter().enumerate() {
            for (j, b) in operators.iter().enumerate() {
                if i == j {
                    let drawn = rng.gen_range(SELF_IMPEDANCE_RANGE);
                    let scale = match self.model {
                        ImpedanceModel::Uniform => 1.0,
                        ImpedanceModel::CapacityWeighted => {
                            let gw = capacity.get(&a.id).copied().unwrap_or(a.capacity);
                            REFERENCE_CAPACITY_GW / self.effective_capacity(a.label(), gw.value())
                        }
                    };
                    matrix.values[i][i] = drawn * scale;
                } else if let Some(distance) = network.distance(a.label(), b.label()) {
                    let drawn = rng.gen_range(MUTUAL_IMPEDANCE_RANGE);
                    let scale = match self.model {
                        ImpedanceModel::Uniform => 1.0,
                        ImpedanceModel::CapacityWeighted => 1.0 + distance / DISTANCE_SCALE,
                    };
                    matrix.values[i][j] = drawn * scale;
                    matrix.values[j][i] = drawn * scale;
                }
            }
        }

        debug!(
            size = matrix.size(),
            seed = self.seed,
            model = %self.model,
            "synthesized impedance matrix"
        );
        matrix
    }

    fn effective_capacity(&self, id: &str, gw: f64) -> f64 {
        // NaN fails the comparison and is floored too
        if gw >= self.capacity_floor {
            gw
        } else {
            warn!(
                operator = id,
                capacity_gw = gw,
                floor_gw = self.capacity_floor,
                "capacity below floor, using floor for self-impedance"
            );
            self.capacity_floor
        }
    }
}

/// Capacity-weighted matrix for `network` with the given seed.
pub fn synthesize_impedance(
    network: &Network,
    capacity: &CapacityMap,
    seed: u64,
) -> ImpedanceMatrix {
    ImpedanceSynthesizer::new(seed).synthesize(network, capacity)
}
