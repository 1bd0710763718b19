//! Normalization and cross-checking of capacity and connection records.
//!
//! The validator turns whatever the loaders produced into a
//! [`ValidatedInput`]: a capacity for every known operator and a
//! deduplicated list of valid connection pairs. It never fails. Each repair
//! is recorded in [`Diagnostics`]:
//!
//! | Defect | Action | Severity |
//! |--------|--------|----------|
//! | capacity for unknown operator | record ignored | warning |
//! | capacity not a finite number | record ignored | error |
//! | negative capacity | clamped to 0 | warning |
//! | repeated capacity record | last value kept | warning |
//! | operator without capacity | policy default | warning |
//! | connection with unknown/empty endpoint | dropped | error |
//! | self-connection | dropped | error |
//! | repeated connection pair | collapsed | warning |

use std::collections::HashSet;

use jgrid_core::{
    CapacityMap, ConnectionPair, DiagnosticIssue, Diagnostics, Gigawatts, Network, OperatorId,
    OperatorSite, Severity, DEFAULT_CAPACITY_GW,
};
use serde::Serialize;

use crate::reference::canonical_operator_id;

/// Raw capacity value as it arrived from a source.
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityValue {
    Number(f64),
    Text(String),
}

impl CapacityValue {
    /// Coerce to a finite float; text is trimmed before parsing.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            CapacityValue::Number(value) => *value,
            CapacityValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl std::fmt::Display for CapacityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityValue::Number(value) => write!(f, "{value}"),
            CapacityValue::Text(text) => write!(f, "'{text}'"),
        }
    }
}

/// Unvalidated capacity row.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityRecord {
    pub operator: String,
    pub value: CapacityValue,
    /// Source line, when loaded from a file
    pub line: Option<usize>,
}

impl CapacityRecord {
    pub fn new(operator: impl Into<String>, capacity_gw: f64) -> Self {
        Self {
            operator: operator.into(),
            value: CapacityValue::Number(capacity_gw),
            line: None,
        }
    }

    pub fn from_text(operator: impl Into<String>, capacity: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            value: CapacityValue::Text(capacity.into()),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Unvalidated connection row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    pub from: String,
    pub to: String,
    pub line: Option<usize>,
}

impl ConnectionRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Substitution policy for missing data.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub default_capacity_gw: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            default_capacity_gw: DEFAULT_CAPACITY_GW,
        }
    }
}

/// Counters for what the validator changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub capacity_accepted: usize,
    pub capacity_defaulted: usize,
    pub capacity_clamped: usize,
    pub capacity_rejected: usize,
    pub connections_accepted: usize,
    pub connections_dropped: usize,
    pub connections_collapsed: usize,
}

/// Validator output: complete, consistent input for [`Network::build`].
#[derive(Debug, Clone, Default)]
pub struct ValidatedInput {
    /// One entry per known operator, in known order
    pub capacity: Vec<(OperatorId, Gigawatts)>,
    pub connections: Vec<ConnectionPair>,
    pub stats: ValidationStats,
    pub diagnostics: Diagnostics,
}

impl ValidatedInput {
    pub fn capacity_map(&self) -> CapacityMap {
        self.capacity.iter().cloned().collect()
    }

    pub fn build_network(&self, sites: &[OperatorSite]) -> Network {
        Network::build(sites, &self.capacity_map(), &self.connections)
    }
}

/// Checks records against a fixed set of known operators.
#[derive(Debug, Clone)]
pub struct DataValidator {
    known: Vec<OperatorId>,
    policy: ValidationPolicy,
}

impl DataValidator {
    pub fn new(known: impl IntoIterator<Item = OperatorId>) -> Self {
        let mut seen = HashSet::new();
        let known = known
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self {
            known,
            policy: ValidationPolicy::default(),
        }
    }

    pub fn from_sites(sites: &[OperatorSite]) -> Self {
        Self::new(sites.iter().map(|site| site.id.clone()))
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn known(&self) -> &[OperatorId] {
        &self.known
    }

    /// Resolve a raw name to a known operator.
    ///
    /// Tries the trimmed name as-is, then the reference alias table, then a
    /// case-insensitive match.
    pub fn normalize(&self, raw: &str) -> Option<OperatorId> {
        self.resolve(raw).map(|slot| self.known[slot].clone())
    }

    fn resolve(&self, raw: &str) -> Option<usize> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        let exact = |candidate: &str| self.known.iter().position(|id| id.as_str() == candidate);
        exact(name)
            .or_else(|| canonical_operator_id(name).and_then(exact))
            .or_else(|| {
                self.known
                    .iter()
                    .position(|id| id.as_str().eq_ignore_ascii_case(name))
            })
    }

    pub fn validate(
        &self,
        capacity: &[CapacityRecord],
        connections: &[ConnectionRecord],
    ) -> ValidatedInput {
        let mut stats = ValidationStats::default();
        let mut diagnostics = Diagnostics::new();
        let capacity = self.validate_capacity(capacity, &mut stats, &mut diagnostics);
        let connections = self.validate_connections(connections, &mut stats, &mut diagnostics);
        ValidatedInput {
            capacity,
            connections,
            stats,
            diagnostics,
        }
    }

    fn validate_capacity(
        &self,
        records: &[CapacityRecord],
        stats: &mut ValidationStats,
        diag: &mut Diagnostics,
    ) -> Vec<(OperatorId, Gigawatts)> {
        let mut values: Vec<Option<f64>> = vec![None; self.known.len()];

        for record in records {
            let report = |diag: &mut Diagnostics, warning: bool, message: &str| {
                let severity = if warning {
                    Severity::Warning
                } else {
                    Severity::Error
                };
                let mut issue = DiagnosticIssue::new(severity, "capacity", message)
                    .with_entity(record.operator.trim());
                if let Some(line) = record.line {
                    issue = issue.with_line(line);
                }
                diag.add(issue);
            };

            let Some(slot) = self.resolve(&record.operator) else {
                stats.capacity_rejected += 1;
                report(diag, true, "capacity for unknown operator ignored");
                continue;
            };
            let Some(mut gw) = record.value.coerce() else {
                stats.capacity_rejected += 1;
                report(
                    diag,
                    false,
                    &format!("invalid capacity value {} ignored", record.value),
                );
                continue;
            };
            if gw < 0.0 {
                stats.capacity_clamped += 1;
                report(
                    diag,
                    true,
                    &format!("negative capacity {gw} GW clamped to 0"),
                );
                gw = 0.0;
            }

            if let Some(previous) = values[slot] {
                report(
                    diag,
                    true,
                    &format!("repeated capacity record replaces {previous} GW"),
                );
            } else {
                stats.capacity_accepted += 1;
            }
            values[slot] = Some(gw);
        }

        self.known
            .iter()
            .zip(values)
            .map(|(id, value)| {
                let gw = value.unwrap_or_else(|| {
                    stats.capacity_defaulted += 1;
                    diag.add_warning_with_entity(
                        "capacity",
                        &format!(
                            "no capacity record, using default {} GW",
                            self.policy.default_capacity_gw
                        ),
                        id.as_str(),
                    );
                    self.policy.default_capacity_gw
                });
                (id.clone(), Gigawatts(gw))
            })
            .collect()
    }

    fn validate_connections(
        &self,
        records: &[ConnectionRecord],
        stats: &mut ValidationStats,
        diag: &mut Diagnostics,
    ) -> Vec<ConnectionPair> {
        let mut seen: HashSet<(OperatorId, OperatorId)> = HashSet::new();
        let mut pairs = Vec::new();

        for record in records {
            let entity = format!("{}-{}", record.from.trim(), record.to.trim());
            let mut reject = |diag: &mut Diagnostics, message: &str| {
                stats.connections_dropped += 1;
                let mut issue = DiagnosticIssue::new(Severity::Error, "connection", message)
                    .with_entity(entity.as_str());
                if let Some(line) = record.line {
                    issue = issue.with_line(line);
                }
                diag.add(issue);
            };

            let (from, to) = match (self.normalize(&record.from), self.normalize(&record.to)) {
                (Some(from), Some(to)) => (from, to),
                (from, to) => {
                    let missing: Vec<&str> = [(&from, &record.from), (&to, &record.to)]
                        .into_iter()
                        .filter(|(resolved, _)| resolved.is_none())
                        .map(|(_, raw)| raw.trim())
                        .collect();
                    reject(
                        diag,
                        &format!("unknown operator(s) {:?}, connection dropped", missing),
                    );
                    continue;
                }
            };
            if from == to {
                reject(diag, "self-connection dropped");
                continue;
            }

            let key = if from <= to {
                (from.clone(), to.clone())
            } else {
                (to.clone(), from.clone())
            };
            if !seen.insert(key) {
                stats.connections_collapsed += 1;
                diag.add_warning_with_entity(
                    "connection",
                    "duplicate connection collapsed",
                    &entity,
                );
                continue;
            }
            stats.connections_accepted += 1;
            pairs.push((from, to));
        }
        pairs
    }
}
