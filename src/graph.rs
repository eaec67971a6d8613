//! An undirected, unweighted graph stored as adjacency lists, with the usual traversal and
//! connectivity queries.
//!
//! Vertices are dense ids `0..vertex_count()`. Every query that takes a vertex id checks it and
//! reports [`GraphError::VertexOutOfRange`] instead of panicking.
//!
//! # Examples
//!
//! ```
//! use avltree::graph::Graph;
//!
//! # fn main() -> Result<(), avltree::graph::GraphError> {
//! // A square: 0 - 1 - 2 - 3 - 0
//! let mut graph = Graph::with_vertices(4);
//! graph.add_edge(0, 1)?;
//! graph.add_edge(1, 2)?;
//! graph.add_edge(2, 3)?;
//! graph.add_edge(3, 0)?;
//!
//! assert!(graph.is_connected());
//! assert!(graph.is_two_colorable());
//! assert!(graph.has_cycle());
//! assert_eq!(graph.distances_from(0)?, [Some(0), Some(1), Some(2), Some(1)]);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;

use log::debug;

/// An undirected graph over the vertices `0..vertex_count()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
    edges: usize,
}

/// The result of [`Graph::dfs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthFirst {
    /// The time each vertex was first reached. Times start at 1 and every discovery and every
    /// finish advances the clock by one.
    pub discovered: Vec<usize>,
    /// The time each vertex had all of its neighbors explored.
    pub finished: Vec<usize>,
    /// The vertex each vertex was reached from, `None` for the roots of the search forest.
    pub predecessor: Vec<Option<usize>>,
}

/// The result of [`Graph::bfs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadthFirst {
    /// Edges on the shortest path from the source, `None` when unreachable.
    pub distance: Vec<Option<usize>>,
    /// The vertex each vertex was reached from. `None` for the source and unreachable vertices.
    pub predecessor: Vec<Option<usize>>,
}

impl BreadthFirst {
    /// Whether `vertex` was reached. Out of range vertices never are.
    pub fn reached(&self, vertex: usize) -> bool {
        self.distance.get(vertex).is_some_and(Option::is_some)
    }
}

/// Errors returned by [`Graph`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex id that isn't in the graph.
    #[error("vertex {vertex} does not exist in a graph with {len} vertices")]
    VertexOutOfRange {
        /// The id that was asked for.
        vertex: usize,
        /// How many vertices the graph has.
        len: usize,
    },
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with `count` vertices and no edges.
    pub fn with_vertices(count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); count],
            edges: 0,
        }
    }

    /// Adds an unconnected vertex and returns its id.
    pub fn add_vertex(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    /// Connects `u` and `v`. Returns `false` if they already were. A self loop is stored once in
    /// its vertex's neighbor list.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<bool, GraphError> {
        self.check(u)?;
        self.check(v)?;
        if self.adjacency[u].contains(&v) {
            return Ok(false);
        }
        self.adjacency[u].push(v);
        if u != v {
            self.adjacency[v].push(u);
        }
        self.edges += 1;
        Ok(true)
    }

    /// The number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// The neighbors of `u` in the order their edges were added.
    pub fn neighbors(&self, u: usize) -> Result<&[usize], GraphError> {
        self.check(u)?;
        Ok(&self.adjacency[u])
    }

    /// Whether an edge connects `u` and `v`.
    pub fn is_neighbor(&self, u: usize, v: usize) -> Result<bool, GraphError> {
        self.check(v)?;
        Ok(self.neighbors(u)?.contains(&v))
    }

    /// Depth first search over the whole graph. Roots are taken in id order and neighbors in the
    /// order their edges were added.
    pub fn dfs(&self) -> DepthFirst {
        let count = self.vertex_count();
        let mut discovered = vec![0; count];
        let mut finished = vec![0; count];
        let mut predecessor = vec![None; count];
        let mut time = 0;

        for root in 0..count {
            if discovered[root] != 0 {
                continue;
            }
            time += 1;
            discovered[root] = time;

            // Each frame is a vertex and the index of the next neighbor to look at.
            let mut stack = vec![(root, 0)];
            while let Some(frame) = stack.last_mut() {
                let (u, next) = *frame;
                frame.1 += 1;
                match self.adjacency[u].get(next) {
                    Some(&v) => {
                        if discovered[v] == 0 {
                            predecessor[v] = Some(u);
                            time += 1;
                            discovered[v] = time;
                            stack.push((v, 0));
                        }
                    }
                    None => {
                        time += 1;
                        finished[u] = time;
                        stack.pop();
                    }
                }
            }
        }

        DepthFirst {
            discovered,
            finished,
            predecessor,
        }
    }

    /// Breadth first search from `source`.
    pub fn bfs(&self, source: usize) -> Result<BreadthFirst, GraphError> {
        self.check(source)?;
        let count = self.vertex_count();
        let mut distance = vec![None; count];
        let mut predecessor = vec![None; count];

        distance[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            let next = distance[u].map(|d| d + 1);
            for &v in &self.adjacency[u] {
                if distance[v].is_none() {
                    distance[v] = next;
                    predecessor[v] = Some(u);
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }

        debug!("bfs from {source} reached {reached} of {count} vertices");
        Ok(BreadthFirst {
            distance,
            predecessor,
        })
    }

    /// Shortest path lengths from `source` to every vertex, `None` where unreachable.
    pub fn distances_from(&self, source: usize) -> Result<Vec<Option<usize>>, GraphError> {
        Ok(self.bfs(source)?.distance)
    }

    /// Whether there is a path from `u` to `v`.
    pub fn is_reachable(&self, u: usize, v: usize) -> Result<bool, GraphError> {
        self.check(v)?;
        Ok(self.bfs(u)?.reached(v))
    }

    /// Whether every vertex can reach every other one. The empty graph is connected.
    pub fn is_connected(&self) -> bool {
        match self.bfs(0) {
            Ok(search) => search.distance.iter().all(Option::is_some),
            Err(_) => true,
        }
    }

    /// Whether the vertices can be split into two sets with every edge crossing between them,
    /// i.e. whether the graph is bipartite. Every component is checked. The empty graph is
    /// reported as not two colorable.
    pub fn is_two_colorable(&self) -> bool {
        if self.adjacency.is_empty() {
            return false;
        }
        let mut color: Vec<Option<bool>> = vec![None; self.vertex_count()];
        for start in 0..self.vertex_count() {
            if color[start].is_some() {
                continue;
            }
            color[start] = Some(false);
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                let side = color[u] == Some(true);
                for &v in &self.adjacency[u] {
                    match color[v] {
                        None => {
                            color[v] = Some(!side);
                            queue.push_back(v);
                        }
                        Some(other) if other == side => return false,
                        Some(_) => {}
                    }
                }
            }
        }
        true
    }

    /// Whether any component contains a cycle. A self loop is a cycle.
    pub fn has_cycle(&self) -> bool {
        let mut visited = vec![false; self.vertex_count()];
        let mut parent: Vec<Option<usize>> = vec![None; self.vertex_count()];
        for start in 0..self.vertex_count() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for &v in &self.adjacency[u] {
                    if !visited[v] {
                        visited[v] = true;
                        parent[v] = Some(u);
                        queue.push_back(v);
                    } else if parent[u] != Some(v) {
                        // Edges are never duplicated so reaching a visited vertex through
                        // anything but the tree edge closes a cycle.
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, vertex: usize) -> Result<(), GraphError> {
        if vertex < self.vertex_count() {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                len: self.vertex_count(),
            })
        }
    }
}

/// Prints the adjacency list, one `id: neighbors...` line per vertex.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, neighbors) in self.adjacency.iter().enumerate() {
            write!(f, "{id}:")?;
            for neighbor in neighbors {
                write!(f, " {neighbor}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
