//! Built-in reference tables for the nine regional operators.
//!
//! Used whenever a capacity or connection source is missing or unusable.
//! Capacities are approximate installed generation in GW; positions mark the
//! centre of each operator's main service area.

use jgrid_core::OperatorSite;

use crate::validate::{CapacityRecord, ConnectionRecord};

/// One row of the reference operator table.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceOperator {
    pub id: &'static str,
    /// Name used by the native-language data files
    pub native_name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity_gw: f64,
}

pub const REFERENCE_OPERATORS: [ReferenceOperator; 9] = [
    ReferenceOperator {
        id: "Hokkaido",
        native_name: "北海道",
        latitude: 43.2,
        longitude: 141.5,
        capacity_gw: 8.5,
    },
    ReferenceOperator {
        id: "Tohoku",
        native_name: "東北",
        latitude: 38.5,
        longitude: 140.5,
        capacity_gw: 17.2,
    },
    ReferenceOperator {
        id: "Tokyo",
        native_name: "東京",
        latitude: 35.7,
        longitude: 139.7,
        capacity_gw: 52.8,
    },
    ReferenceOperator {
        id: "Chubu",
        native_name: "中部",
        latitude: 35.2,
        longitude: 137.0,
        capacity_gw: 32.1,
    },
    ReferenceOperator {
        id: "Hokuriku",
        native_name: "北陸",
        latitude: 36.8,
        longitude: 137.2,
        capacity_gw: 7.3,
    },
    ReferenceOperator {
        id: "Kansai",
        native_name: "関西",
        latitude: 34.7,
        longitude: 135.5,
        capacity_gw: 33.5,
    },
    ReferenceOperator {
        id: "Chugoku",
        native_name: "中国",
        latitude: 34.4,
        longitude: 132.5,
        capacity_gw: 12.8,
    },
    ReferenceOperator {
        id: "Shikoku",
        native_name: "四国",
        latitude: 33.8,
        longitude: 133.5,
        capacity_gw: 6.7,
    },
    ReferenceOperator {
        id: "Kyushu",
        native_name: "九州",
        latitude: 33.0,
        longitude: 130.5,
        capacity_gw: 18.9,
    },
];

/// Default spanning topology (nine interconnections).
pub const REFERENCE_CONNECTIONS: [(&str, &str); 9] = [
    ("Hokkaido", "Tohoku"),
    ("Tohoku", "Tokyo"),
    ("Tokyo", "Chubu"),
    ("Chubu", "Hokuriku"),
    ("Chubu", "Kansai"),
    ("Hokuriku", "Kansai"),
    ("Kansai", "Chugoku"),
    ("Kansai", "Shikoku"),
    ("Chugoku", "Kyushu"),
];

pub fn reference_sites() -> Vec<OperatorSite> {
    REFERENCE_OPERATORS
        .iter()
        .map(|op| OperatorSite::new(op.id, op.latitude, op.longitude))
        .collect()
}

pub fn reference_capacity_records() -> Vec<CapacityRecord> {
    REFERENCE_OPERATORS
        .iter()
        .map(|op| CapacityRecord::new(op.id, op.capacity_gw))
        .collect()
}

pub fn reference_connection_records() -> Vec<ConnectionRecord> {
    REFERENCE_CONNECTIONS
        .iter()
        .map(|(a, b)| ConnectionRecord::new(*a, *b))
        .collect()
}

/// Map a native-language or differently-cased operator name to its id.
pub fn canonical_operator_id(name: &str) -> Option<&'static str> {
    let name = name.trim();
    REFERENCE_OPERATORS
        .iter()
        .find(|op| op.native_name == name || op.id.eq_ignore_ascii_case(name))
        .map(|op| op.id)
}
