//! Topological views over the node/link sections of a document.
//!
//! The document stores references as plain ids, not object pointers; this
//! module materializes them into a petgraph graph for connectivity queries
//! (component counts, islands, DOT export). Links with unresolved endpoints
//! are skipped here; the referential pass reports them separately.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::document::{Document, Value};
use crate::error::{HydError, HydResult};
use crate::schema::{self, canonical_name};

/// Summary statistics for `graph stats` output (density/degree/components).
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Island summary used in `graph islands`.
#[derive(Debug, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
}

/// Node assignment info so every node can be tagged with its component.
#[derive(Debug, Serialize)]
pub struct NodeAssignment {
    pub node_index: usize,
    pub label: String,
    pub island_id: usize,
}

/// Aggregated island analysis result.
#[derive(Debug, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

/// Materialize the node/link sections into an undirected graph.
///
/// Node weights are node ids; edge weights are link ids.
pub fn build_graph(doc: &Document) -> UnGraph<String, String> {
    let mut graph = UnGraph::<String, String>::new_undirected();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    for section_name in schema::node_sections(doc.dialect()) {
        for row in doc.rows(section_name) {
            if let Some((_, id)) = row.fields().first() {
                let id = id.to_token();
                nodes
                    .entry(canonical_name(&id))
                    .or_insert_with(|| graph.add_node(id));
            }
        }
    }

    for section_name in schema::link_sections(doc.dialect()) {
        let Some(schema) = schema::schema_for(doc.dialect(), section_name) else {
            continue;
        };
        let endpoints: Vec<&str> = schema
            .reference_fields()
            .map(|(spec, _)| spec.name)
            .take(2)
            .collect();
        if endpoints.len() != 2 {
            continue;
        }
        for row in doc.rows(section_name) {
            let from = row.get(endpoints[0]).map(Value::to_token);
            let to = row.get(endpoints[1]).map(Value::to_token);
            let (Some(from), Some(to)) = (from, to) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (
                nodes.get(&canonical_name(&from)),
                nodes.get(&canonical_name(&to)),
            ) else {
                continue;
            };
            let link_id = row
                .fields()
                .first()
                .map(|(_, v)| v.to_token())
                .unwrap_or_default();
            graph.add_edge(a, b, link_id);
        }
    }

    graph
}

/// Graph-level statistics (density, degree distribution, component count).
pub fn graph_stats(doc: &Document) -> HydResult<GraphStats> {
    let graph = build_graph(doc);
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let mut degrees = Vec::with_capacity(node_count);
    for node in graph.node_indices() {
        degrees.push(graph.neighbors(node).count());
    }
    let min_degree = *degrees.iter().min().unwrap_or(&0);
    let max_degree = *degrees.iter().max().unwrap_or(&0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().copied().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    let connected_components = connected_components(&graph);
    Ok(GraphStats {
        node_count,
        edge_count,
        connected_components,
        min_degree,
        avg_degree,
        max_degree,
        density,
    })
}

/// Labels connected components (breadth-first search) and pulls island
/// metadata for reporting.
pub fn find_islands(doc: &Document) -> HydResult<IslandAnalysis> {
    let graph = build_graph(doc);
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = Vec::new();
    let mut island_id = 0;
    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in graph.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        if members.is_empty() {
            continue;
        }
        islands.push(IslandSummary {
            island_id,
            node_count: members.len(),
        });
        for node in members {
            assignments.push(NodeAssignment {
                node_index: node.index(),
                label: graph[node].clone(),
                island_id,
            });
        }
        island_id += 1;
    }
    assignments.sort_by_key(|assignment| assignment.node_index);
    Ok(IslandAnalysis {
        islands,
        assignments,
    })
}

/// Export the topology to a DOT string (Graphviz) so external tools can
/// visualize the layout.
pub fn export_graph(doc: &Document, format: &str) -> HydResult<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(doc)),
        other => Err(HydError::Validation(format!(
            "unsupported graph export format '{other}'"
        ))),
    }
}

fn render_dot(doc: &Document) -> String {
    let graph = build_graph(doc);
    let mut buffer = String::new();
    buffer.push_str("graph hyd_network {\n");
    for node in graph.node_indices() {
        let label = sanitize_label(&graph[node]);
        buffer.push_str(&format!("  n{} [label=\"{}\"];\n", node.index(), label));
    }
    for edge in graph.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        buffer.push_str(&format!("  n{source} -- n{target};\n"));
    }
    buffer.push('}');
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Row;
    use crate::Dialect;

    fn sample_doc() -> Document {
        let mut doc = Document::empty(Dialect::Swmm);
        for (name, elevation) in [("J1", 10.0), ("J2", 9.0), ("J3", 8.0), ("LONE", 5.0)] {
            doc.add_row(
                "JUNCTIONS",
                Row::from_fields(vec![
                    ("name".into(), Value::Text(name.into())),
                    ("elevation".into(), Value::Real(elevation)),
                ]),
            )
            .unwrap();
        }
        for (name, from, to) in [("C1", "J1", "J2"), ("C2", "J2", "J3")] {
            doc.add_row(
                "CONDUITS",
                Row::from_fields(vec![
                    ("name".into(), Value::Text(name.into())),
                    ("from_node".into(), Value::Text(from.into())),
                    ("to_node".into(), Value::Text(to.into())),
                    ("length".into(), Value::Real(100.0)),
                    ("roughness".into(), Value::Real(0.013)),
                ]),
            )
            .unwrap();
        }
        doc
    }

    #[test]
    fn test_graph_stats() {
        let stats = graph_stats(&sample_doc()).unwrap();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.max_degree, 2);
    }

    #[test]
    fn test_find_islands() {
        let analysis = find_islands(&sample_doc()).unwrap();
        assert_eq!(analysis.islands.len(), 2);
        assert_eq!(analysis.assignments.len(), 4);
        let lone = analysis
            .assignments
            .iter()
            .find(|a| a.label == "LONE")
            .unwrap();
        assert_eq!(
            analysis.islands[lone.island_id].node_count,
            1
        );
    }

    #[test]
    fn test_dot_export() {
        let dot = export_graph(&sample_doc(), "dot").unwrap();
        assert!(dot.starts_with("graph hyd_network"));
        assert!(dot.contains("label=\"J1\""));
        assert!(export_graph(&sample_doc(), "gexf").is_err());
    }
}
