//! End-to-end checks on the nine-operator reference network.

use std::io::Write;

use jgrid_algo::{analyze, synthesize_impedance, AnalysisOptions, ImpedanceModel};
use jgrid_io::{
    load_inputs, prepare, ConnectionRecord, DataValidator, GridConfig, RawInputs, TableSource,
    ValidationPolicy,
};
use jgrid_io::reference::{reference_capacity_records, reference_sites};
use tempfile::NamedTempFile;

const EPS: f64 = 1e-12;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn reference_network_statistics() {
    let input = prepare(RawInputs::reference(), &ValidationPolicy::default());
    let snapshot = analyze(&input.network, &AnalysisOptions::default());
    let stats = &snapshot.statistics;

    assert_eq!(stats.node_count, 9);
    assert_eq!(stats.edge_count, 9);
    assert!((stats.density - 0.25).abs() < EPS);
    assert!(stats.is_connected);
    assert!((stats.total_capacity_gw - 189.8).abs() < 1e-9);
    // Hokkaido to Kyushu: Tohoku, Tokyo, Chubu, Kansai, Chugoku
    assert_eq!(stats.diameter, Some(6));
    assert!(stats.betweenness_centrality.is_some());

    let centrality_sum = stats.degree_centrality.sum();
    assert!((centrality_sum - 2.0 * 9.0 / 8.0).abs() < EPS);
    assert_eq!(input.network.degree("Kansai"), 4);
}

#[test]
fn reference_impedance_is_symmetric_and_deterministic() {
    let input = prepare(RawInputs::reference(), &ValidationPolicy::default());
    let capacity = input.validated.capacity_map();

    let first = synthesize_impedance(&input.network, &capacity, 42);
    let second = synthesize_impedance(&input.network, &capacity, 42);
    assert_eq!(first, second);
    assert!(first.is_symmetric());
    assert_eq!(first.model, ImpedanceModel::CapacityWeighted);

    // no direct line between Hokkaido and Kyushu
    assert_eq!(first.impedance("Hokkaido", "Kyushu").unwrap().value(), 0.0);
    assert!(first.impedance("Tokyo", "Chubu").unwrap().value() > 0.0);
    for i in 0..first.size() {
        assert!(first.get(i, i) > 0.0);
    }

    let other_seed = synthesize_impedance(&input.network, &capacity, 7);
    assert_ne!(first.values, other_seed.values);
}

#[test]
fn unknown_connection_is_dropped() {
    let mut raw = RawInputs::reference();
    raw.connections
        .records
        .push(ConnectionRecord::new("Okinawa", "Kyushu"));

    let input = prepare(raw, &ValidationPolicy::default());
    assert_eq!(input.network.edge_count(), 9);
    assert!(!input.network.has_edge("Okinawa", "Kyushu"));
    assert_eq!(input.diagnostics.error_count(), 1);
}

#[test]
fn csv_inputs_with_native_names() {
    let capacity = temp_file("電力会社,発電能力_GW\n東京,50.0\n関西,-3\n");
    let connections =
        temp_file("電力会社1,電力会社2\n東京,中部\n中部,関西\n関西,沖縄\n");

    let raw = load_inputs(Some(capacity.path()), Some(connections.path()));
    assert!(matches!(raw.capacity.source, TableSource::File(_)));

    let input = prepare(raw, &ValidationPolicy { default_capacity_gw: 5.0 });
    let network = &input.network;
    assert_eq!(network.edge_count(), 2);
    assert!(network.has_edge("Tokyo", "Chubu"));
    assert_eq!(network.operator("Tokyo").unwrap().capacity.value(), 50.0);
    assert_eq!(network.operator("Kansai").unwrap().capacity.value(), 0.0);
    assert_eq!(network.operator("Kyushu").unwrap().capacity.value(), 5.0);

    let stats = &input.validated.stats;
    assert_eq!(stats.capacity_clamped, 1);
    assert_eq!(stats.capacity_defaulted, 7);
    assert_eq!(stats.connections_dropped, 1);

    // zero capacity is floored, not divided by
    let snapshot = analyze(network, &AnalysisOptions::default());
    assert!(snapshot.impedance.self_impedance("Kansai").unwrap().value().is_finite());
}

#[test]
fn missing_tables_fall_back_to_reference() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_inputs(
        Some(&dir.path().join("power_capacity.csv")),
        Some(&dir.path().join("connections.csv")),
    );
    let input = prepare(raw, &ValidationPolicy::default());

    assert_eq!(input.network.edge_count(), 9);
    assert_eq!(input.diagnostics.issues_by_category("source").count(), 2);
    assert!(!input.diagnostics.has_errors());
}

#[test]
fn isolated_operator_degrades_statistics() {
    let sites = reference_sites();
    let connections: Vec<ConnectionRecord> = jgrid_io::REFERENCE_CONNECTIONS
        .iter()
        .filter(|(a, b)| *a != "Hokkaido" && *b != "Hokkaido")
        .map(|(a, b)| ConnectionRecord::new(*a, *b))
        .collect();
    let validated =
        DataValidator::from_sites(&sites).validate(&reference_capacity_records(), &connections);
    let snapshot = analyze(&validated.build_network(&sites), &AnalysisOptions::default());

    let stats = &snapshot.statistics;
    assert!(!stats.is_connected);
    assert_eq!(stats.component_count, 2);
    assert_eq!(stats.diameter, None);
    assert_eq!(stats.average_shortest_path, None);
    assert!(stats.betweenness_centrality.is_none());
}

#[test]
fn config_drives_analysis_options() {
    let file = temp_file(r#"{ "analysis": { "seed": 9, "impedance_model": "uniform" } }"#);
    let config = GridConfig::load_from(file.path()).unwrap();
    let options = config.analysis_options();

    assert_eq!(options.seed, 9);
    assert_eq!(options.model, ImpedanceModel::Uniform);

    let input = prepare(RawInputs::reference(), &config.validation_policy());
    let snapshot = analyze(&input.network, &options);
    assert_eq!(snapshot.impedance.seed, 9);
}
