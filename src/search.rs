//! Shortest join-path search over the foreign-key graph.

use crate::graph::Graph;
use crate::model::{ForeignKey, ModelError, Path};

/// Depth-first enumeration of simple paths, filtered down to the shortest.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFinder {
    /// Walks longer than this many edges are not explored.
    pub max_length: Option<usize>,
}

/// One branch of the search: where it is, where it has been, how it got there.
struct Walk {
    table: String,
    spine: Vec<String>,
    edges: Vec<ForeignKey>,
}

impl PathFinder {
    pub fn new(max_length: Option<usize>) -> Self {
        Self { max_length }
    }

    /// Find every shortest simple path between two fully-qualified tables.
    ///
    /// Edges are traversable in both directions but keep their declared
    /// direction in the result. No route is an empty result, not an error.
    /// `begin == end` yields no paths. The result is sorted and deduplicated.
    pub fn find_paths(
        &self,
        graph: &Graph,
        begin: &str,
        end: &str,
    ) -> Result<Vec<Path>, ModelError> {
        let mut found: Vec<Vec<ForeignKey>> = Vec::new();
        let mut best: Option<usize> = None;
        let mut explored = 0usize;

        let mut stack = vec![Walk {
            table: begin.to_string(),
            spine: Vec::new(),
            edges: Vec::new(),
        }];

        while let Some(walk) = stack.pop() {
            explored += 1;

            // Cycle check comes before the end check.
            if walk.spine.contains(&walk.table) {
                continue;
            }
            if walk.table == end {
                if !walk.edges.is_empty() {
                    let len = walk.edges.len();
                    best = Some(best.map_or(len, |b| b.min(len)));
                    found.push(walk.edges);
                }
                continue;
            }
            // Any extension would be longer than a path already found.
            if best.is_some_and(|b| walk.edges.len() >= b) {
                continue;
            }
            if self.max_length.is_some_and(|max| walk.edges.len() >= max) {
                continue;
            }

            let mut spine = walk.spine;
            spine.push(walk.table.clone());

            let mut branches = Vec::new();
            for edge in graph.edges(&walk.table) {
                let (source, destination) = edge.tables();
                for next in [source, destination] {
                    if next == walk.table {
                        continue;
                    }
                    let mut edges = walk.edges.clone();
                    edges.push(edge.clone());
                    branches.push(Walk {
                        table: next,
                        spine: spine.clone(),
                        edges,
                    });
                }
            }
            // Reverse so branches pop in adjacency order.
            stack.extend(branches.into_iter().rev());
        }

        log::debug!(
            "Searched {} -> {}: explored {} walks, found {} paths",
            begin,
            end,
            explored,
            found.len()
        );

        let Some(shortest) = found.iter().map(Vec::len).min() else {
            return Ok(Vec::new());
        };

        let mut paths = found
            .into_iter()
            .filter(|edges| edges.len() == shortest)
            .map(Path::new)
            .collect::<Result<Vec<_>, _>>()?;
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

/// Find every shortest path with an unbounded [`PathFinder`].
pub fn find_paths(graph: &Graph, begin: &str, end: &str) -> Result<Vec<Path>, ModelError> {
    PathFinder::default().find_paths(graph, begin, end)
}
