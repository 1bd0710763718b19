use crate::Network;
use anyhow::{anyhow, Result};
use petgraph::visit::EdgeRef;
use quick_xml::escape::escape;
use std::collections::{HashSet, VecDeque};

/// Island summary used by `graph islands`.
#[derive(Debug)]
pub struct IslandSummary {
    pub island_id: usize,
    pub operators: Vec<String>,
}

/// Island membership of a single operator.
#[derive(Debug)]
pub struct NodeAssignment {
    pub node_index: usize,
    pub label: String,
    pub island_id: usize,
}

#[derive(Debug)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

impl IslandAnalysis {
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }
}

/// Labels connected components by breadth-first search, in node insertion order.
pub fn find_islands(network: &Network) -> IslandAnalysis {
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = Vec::new();
    for start in network.graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let island_id = islands.len();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in network.graph.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort_by_key(|node| node.index());
        for node in &members {
            assignments.push(NodeAssignment {
                node_index: node.index(),
                label: network.graph[*node].label().to_string(),
                island_id,
            });
        }
        islands.push(IslandSummary {
            island_id,
            operators: members
                .iter()
                .map(|node| network.graph[*node].label().to_string())
                .collect(),
        });
    }
    assignments.sort_by_key(|assignment| assignment.node_index);
    IslandAnalysis {
        islands,
        assignments,
    }
}

/// Export the topology as Graphviz DOT or GraphML text.
pub fn export_graph(network: &Network, format: &str) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(network)),
        "graphml" => Ok(render_graphml(network)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(network: &Network) -> String {
    let mut buffer = String::new();
    buffer.push_str("graph jgrid_network {\n");
    for node in network.graph.node_indices() {
        let operator = &network.graph[node];
        buffer.push_str(&format!(
            "  n{} [label=\"{}\\n{:.1} GW\", pos=\"{},{}!\"];\n",
            node.index(),
            sanitize_label(operator.label()),
            operator.capacity.value(),
            operator.position.longitude.value(),
            operator.position.latitude.value(),
        ));
    }
    for edge in network.graph.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        buffer.push_str(&format!(
            "  n{source} -- n{target} [label=\"{:.2}\"];\n",
            edge.weight().distance
        ));
    }
    buffer.push('}');
    buffer
}

/// GraphML with operator position and capacity on nodes, distance on edges.
fn render_graphml(network: &Network) -> String {
    let mut buffer = String::new();
    buffer.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buffer.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    for (key, target, name, kind) in [
        ("d0", "node", "label", "string"),
        ("d1", "node", "latitude", "double"),
        ("d2", "node", "longitude", "double"),
        ("d3", "node", "capacity_gw", "double"),
        ("d4", "edge", "distance", "double"),
    ] {
        buffer.push_str(&format!(
            "  <key id=\"{key}\" for=\"{target}\" attr.name=\"{name}\" attr.type=\"{kind}\"/>\n"
        ));
    }
    buffer.push_str("  <graph id=\"jgrid_network\" edgedefault=\"undirected\">\n");
    for node in network.graph.node_indices() {
        let operator = &network.graph[node];
        buffer.push_str(&format!("    <node id=\"n{}\">\n", node.index()));
        buffer.push_str(&format!(
            "      <data key=\"d0\">{}</data>\n",
            escape(operator.label())
        ));
        buffer.push_str(&format!(
            "      <data key=\"d1\">{}</data>\n",
            operator.position.latitude.value()
        ));
        buffer.push_str(&format!(
            "      <data key=\"d2\">{}</data>\n",
            operator.position.longitude.value()
        ));
        buffer.push_str(&format!(
            "      <data key=\"d3\">{}</data>\n",
            operator.capacity.value()
        ));
        buffer.push_str("    </node>\n");
    }
    for edge in network.graph.edge_references() {
        buffer.push_str(&format!(
            "    <edge id=\"e{}\" source=\"n{}\" target=\"n{}\">\n",
            edge.id().index(),
            edge.source().index(),
            edge.target().index()
        ));
        buffer.push_str(&format!(
            "      <data key=\"d4\">{}</data>\n",
            edge.weight().distance
        ));
        buffer.push_str("    </edge>\n");
    }
    buffer.push_str("  </graph>\n</graphml>\n");
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapacityMap, OperatorId, OperatorSite};

    fn sample() -> Network {
        let sites = vec![
            OperatorSite::new("A", 0.0, 0.0),
            OperatorSite::new("B", 0.0, 1.0),
            OperatorSite::new("C", 5.0, 5.0),
            OperatorSite::new("D", 5.0, 6.0),
            OperatorSite::new("E", 9.0, 9.0),
        ];
        let connections = vec![
            (OperatorId::from("A"), OperatorId::from("B")),
            (OperatorId::from("C"), OperatorId::from("D")),
        ];
        Network::build(&sites, &CapacityMap::new(), &connections)
    }

    #[test]
    fn test_find_islands() {
        let analysis = find_islands(&sample());
        assert_eq!(analysis.island_count(), 3);
        assert_eq!(analysis.islands[0].operators, vec!["A", "B"]);
        assert_eq!(analysis.islands[1].operators, vec!["C", "D"]);
        assert_eq!(analysis.islands[2].operators, vec!["E"]);
        assert_eq!(analysis.assignments[3].label, "D");
        assert_eq!(analysis.assignments[3].island_id, 1);
    }

    #[test]
    fn test_find_islands_empty() {
        let analysis = find_islands(&Network::new());
        assert_eq!(analysis.island_count(), 0);
        assert!(analysis.assignments.is_empty());
    }

    #[test]
    fn test_export_dot() {
        let dot = export_graph(&sample(), "dot").unwrap();
        assert!(dot.starts_with("graph jgrid_network {"));
        assert!(dot.contains("n0 -- n1 [label=\"1.00\"]"));
        assert!(dot.contains("label=\"E\\n10.0 GW\""));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn test_export_graphml() {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let xml = export_graph(&sample(), "GraphML").unwrap();
        let mut reader = Reader::from_str(&xml);
        let (mut nodes, mut edges) = (0, 0);
        let mut labels = Vec::new();
        let mut in_label = false;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"node" => nodes += 1,
                Event::Start(e) if e.name().as_ref() == b"edge" => edges += 1,
                Event::Start(e) if e.name().as_ref() == b"data" => {
                    in_label = e
                        .attributes()
                        .any(|attr| attr.unwrap().value.as_ref() == b"d0");
                }
                Event::Text(text) if in_label => {
                    labels.push(text.unescape().unwrap().into_owned());
                    in_label = false;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        assert_eq!(nodes, 5);
        assert_eq!(edges, 2);
        assert_eq!(labels, vec!["A", "B", "C", "D", "E"]);
        assert!(xml.contains("edgedefault=\"undirected\""));
    }

    #[test]
    fn test_export_unknown_format() {
        assert!(export_graph(&sample(), "gexf").is_err());
    }
}
