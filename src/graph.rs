//! Relationship graph over matched entities
//!
//! Nodes are the matched entities. Edges are every fetched relationship,
//! including ones whose other endpoint was not matched in this text; such
//! endpoints stay resolvable by id against the catalog. Graph data is best
//! effort: a failing relationship feed yields an empty graph.

// Use petgraph from rustworkx-core to ensure version compatibility
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use rustworkx_core::petgraph::visit::EdgeRef;
use rustworkx_core::petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use crate::catalog::{EntityType, Relationship, RelationshipFeed};
use crate::config::LinkerConfig;
use crate::scanner::EntityMatch;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub entity_type: EntityType,
    pub importance: f64,
    pub color: String,
    /// Incident edges among the fetched relationships
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub strength: f64,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub central_count: usize,
    /// Connected components, endpoints outside the matched set included
    pub component_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Ids of nodes at or above the central importance threshold
    pub central_nodes: Vec<String>,
    pub stats: GraphStats,
}

impl KnowledgeGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Fetch relationships for the matched entities and build the graph.
///
/// No feed, no matches, or a feed failure all produce a well-formed graph;
/// a failure produces the empty graph.
pub async fn fetch_graph(
    feed: Option<&dyn RelationshipFeed>,
    matches: &[EntityMatch],
    config: &LinkerConfig,
) -> KnowledgeGraph {
    let ids: BTreeSet<String> = matches.iter().map(|m| m.entity_id.clone()).collect();
    if ids.is_empty() {
        return KnowledgeGraph::default();
    }

    let relationships = match feed {
        Some(feed) => match feed.relationships_involving(&ids).await {
            Ok(relationships) => relationships,
            Err(e) => {
                warn!(error = %e, "relationship feed unavailable, returning empty graph");
                return KnowledgeGraph::default();
            }
        },
        None => Vec::new(),
    };

    build_graph(matches, &relationships, config)
}

/// Pure graph assembly from matches and an already fetched relationship set
pub fn build_graph(
    matches: &[EntityMatch],
    relationships: &[Relationship],
    config: &LinkerConfig,
) -> KnowledgeGraph {
    let mut graph: DiGraph<String, usize> = DiGraph::new();
    let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();

    // One node per matched entity, in order of first appearance
    let mut nodes: Vec<GraphNode> = Vec::new();
    for m in matches {
        if id_to_index.contains_key(&m.entity_id) {
            continue;
        }
        let idx = graph.add_node(m.entity_id.clone());
        id_to_index.insert(m.entity_id.clone(), idx);
        nodes.push(GraphNode {
            id: m.entity_id.clone(),
            label: m.display_name.clone(),
            entity_type: m.entity_type,
            importance: m.importance,
            color: config.node_color(m.entity_type).to_string(),
            degree: 0,
        });
    }

    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    for rel in relationships {
        let key = (rel.source_id.clone(), rel.target_id.clone(), rel.label.clone());
        if !seen.insert(key) {
            continue;
        }
        let source = ensure_node(&mut graph, &mut id_to_index, &rel.source_id);
        let target = ensure_node(&mut graph, &mut id_to_index, &rel.target_id);
        graph.add_edge(source, target, edges.len());
        edges.push(GraphEdge {
            source: rel.source_id.clone(),
            target: rel.target_id.clone(),
            label: rel.label.clone(),
            strength: rel.strength,
            bidirectional: rel.bidirectional,
        });
    }

    for node in nodes.iter_mut() {
        if let Some(&idx) = id_to_index.get(&node.id) {
            node.degree = graph.edges_directed(idx, Direction::Incoming).count()
                + graph.edges_directed(idx, Direction::Outgoing).count();
        }
    }

    let central_nodes: Vec<String> = nodes
        .iter()
        .filter(|n| n.importance >= config.central_importance)
        .map(|n| n.id.clone())
        .collect();

    let stats = GraphStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        central_count: central_nodes.len(),
        component_count: component_count(&graph),
    };
    debug!(
        nodes = stats.node_count,
        edges = stats.edge_count,
        central = stats.central_count,
        "knowledge graph built"
    );

    KnowledgeGraph {
        nodes,
        edges,
        central_nodes,
        stats,
    }
}

/// Node for an edge endpoint, creating a context node if it was not matched
fn ensure_node(
    graph: &mut DiGraph<String, usize>,
    id_to_index: &mut HashMap<String, NodeIndex>,
    id: &str,
) -> NodeIndex {
    if let Some(&idx) = id_to_index.get(id) {
        return idx;
    }
    let idx = graph.add_node(id.to_string());
    id_to_index.insert(id.to_string(), idx);
    idx
}

/// Connected components, treating edges as undirected
fn component_count(graph: &DiGraph<String, usize>) -> usize {
    use rustworkx_core::connectivity::number_connected_components;

    if graph.node_count() == 0 {
        return 0;
    }

    let mut undirected: UnGraph<(), ()> = UnGraph::new_undirected();
    let node_map: HashMap<NodeIndex, NodeIndex> = graph
        .node_indices()
        .map(|idx| (idx, undirected.add_node(())))
        .collect();

    for edge_ref in graph.edge_references() {
        if let (Some(&src), Some(&tgt)) = (
            node_map.get(&edge_ref.source()),
            node_map.get(&edge_ref.target()),
        ) {
            if !undirected.contains_edge(src, tgt) {
                undirected.add_edge(src, tgt, ());
            }
        }
    }

    number_connected_components(&undirected)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::{Collaborator, LinkError, LinkResult};
    use crate::scanner::{LinkSuggestion, PatternSource};
    use async_trait::async_trait;
    use futures::executor::block_on;

    fn entity_match(id: &str, entity_type: EntityType, importance: f64) -> EntityMatch {
        EntityMatch {
            entity_id: id.to_string(),
            entity_name: id.to_string(),
            display_name: format!("{id}-label"),
            entity_type,
            importance,
            matched_text: id.to_string(),
            pattern_source: PatternSource::Canonical,
            start: 0,
            end: 1,
            confidence: 0.8,
            link: LinkSuggestion::InlineLink { url: format!("/entities/{id}") },
            personalized_score: None,
        }
    }

    // -------------------------------------------------------------------------
    // Node Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_one_node_per_matched_entity() {
        let matches = vec![
            entity_match("neom", EntityType::Project, 9.0),
            entity_match("ahmad", EntityType::Person, 6.0),
            entity_match("neom", EntityType::Project, 9.0),
        ];
        let graph = build_graph(&matches, &[], &LinkerConfig::default());

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "neom");
        assert_eq!(graph.nodes[0].label, "neom-label");
        assert_eq!(graph.nodes[0].color, "#8B5CF6");
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_central_nodes_threshold() {
        let matches = vec![
            entity_match("a", EntityType::Person, 8.0),
            entity_match("b", EntityType::Person, 7.9),
            entity_match("c", EntityType::Person, 10.0),
        ];
        let graph = build_graph(&matches, &[], &LinkerConfig::default());
        assert_eq!(graph.central_nodes, vec!["a", "c"]);
        assert_eq!(graph.stats.central_count, 2);
    }

    // -------------------------------------------------------------------------
    // Edge Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_edges_keep_unmatched_endpoints() {
        let matches = vec![
            entity_match("a", EntityType::Person, 5.0),
            entity_match("b", EntityType::Company, 5.0),
        ];
        let relationships = vec![
            Relationship::new("a", "b", "ceo_of", 0.9),
            Relationship::new("b", "z", "subsidiary_of", 0.5),
        ];
        let graph = build_graph(&matches, &relationships, &LinkerConfig::default());

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].target, "z");

        let b = graph.nodes.iter().find(|n| n.id == "b").unwrap();
        assert_eq!(b.degree, 2);
        assert_eq!(graph.stats.component_count, 1);
    }

    #[test]
    fn test_duplicate_relationships_collapsed() {
        let matches = vec![entity_match("a", EntityType::Person, 5.0)];
        let relationships = vec![
            Relationship::new("a", "b", "knows", 1.0),
            Relationship::new("a", "b", "knows", 0.4),
            Relationship::new("a", "b", "funds", 0.4),
        ];
        let graph = build_graph(&matches, &relationships, &LinkerConfig::default());
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_component_count_for_disconnected_nodes() {
        let matches = vec![
            entity_match("a", EntityType::Person, 5.0),
            entity_match("b", EntityType::Person, 5.0),
            entity_match("c", EntityType::Person, 5.0),
        ];
        let relationships = vec![Relationship::new("a", "b", "knows", 1.0)];
        let graph = build_graph(&matches, &relationships, &LinkerConfig::default());
        assert_eq!(graph.stats.component_count, 2);
    }

    // -------------------------------------------------------------------------
    // Feed Tests
    // -------------------------------------------------------------------------

    struct DownFeed;

    #[async_trait]
    impl RelationshipFeed for DownFeed {
        async fn relationships_involving(
            &self,
            _entity_ids: &BTreeSet<String>,
        ) -> LinkResult<Vec<Relationship>> {
            Err(LinkError::unavailable(Collaborator::RelationshipFeed, "connection refused"))
        }
    }

    #[test]
    fn test_feed_failure_yields_empty_graph() {
        let matches = vec![entity_match("a", EntityType::Person, 9.0)];
        let graph = block_on(fetch_graph(Some(&DownFeed), &matches, &LinkerConfig::default()));
        assert!(graph.is_empty());
        assert!(graph.central_nodes.is_empty());
    }

    #[test]
    fn test_feed_with_no_relationships_keeps_nodes() {
        let catalog = InMemoryCatalog::default();
        let matches = vec![
            entity_match("a", EntityType::Person, 9.0),
            entity_match("b", EntityType::Person, 6.0),
        ];
        let graph = block_on(fetch_graph(Some(&catalog), &matches, &LinkerConfig::default()));
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.central_nodes, vec!["a"]);
    }

    #[test]
    fn test_no_matches_skips_feed() {
        let graph = block_on(fetch_graph(Some(&DownFeed), &[], &LinkerConfig::default()));
        assert_eq!(graph, KnowledgeGraph::default());
    }
}
