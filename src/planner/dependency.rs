//! Dependency graph with deterministic ordering.
//!
//! Nodes remember the order they were added in. Topological sorting is
//! stable with respect to that order: among the nodes whose dependencies
//! are satisfied, the earliest added always comes first.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{PlanError, Result};

/// Dependency relationships between nodes of type `K`.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K> {
    /// Nodes in insertion order.
    order: Vec<K>,
    /// Map of node to its direct dependencies.
    dependencies: HashMap<K, Vec<K>>,
    /// Map of node to nodes that depend on it.
    dependents: HashMap<K, Vec<K>>,
}

impl<K> DependencyGraph<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder<K> {
        DependencyGraphBuilder::new()
    }

    fn dependencies_of(&self, node: K) -> &[K] {
        self.dependencies.get(&node).map_or(&[][..], Vec::as_slice)
    }

    fn dependents_of(&self, node: K) -> &[K] {
        self.dependents.get(&node).map_or(&[][..], Vec::as_slice)
    }

    /// Nodes with dependencies first, ties broken by insertion order.
    ///
    /// Returns `None` if the graph has a cycle.
    pub fn stable_topological_order(&self) -> Option<Vec<K>> {
        let position: HashMap<K, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, node)| (*node, i))
            .collect();

        let mut in_degree: Vec<usize> = self
            .order
            .iter()
            .map(|node| self.dependencies_of(*node).len())
            .collect();

        // Positions of nodes with no unmet dependencies, smallest first
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| i)
            .collect();

        let mut result = Vec::with_capacity(self.order.len());

        while let Some(next) = ready.pop_first() {
            let node = self.order[next];
            result.push(node);

            for dependent in self.dependents_of(node) {
                let i = position[dependent];
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    ready.insert(i);
                }
            }
        }

        (result.len() == self.order.len()).then_some(result)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same node.
    pub fn find_cycle(&self) -> Option<Vec<K>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs<K: Copy + Eq + Hash + Debug>(
            node: K,
            graph: &DependencyGraph<K>,
            state: &mut HashMap<K, State>,
            path: &mut Vec<K>,
        ) -> Option<Vec<K>> {
            state.insert(node, State::Visiting);
            path.push(node);

            for dep in graph.dependencies_of(node) {
                match state.get(dep).copied().unwrap_or(State::Unvisited) {
                    State::Visiting => {
                        let start = path.iter().position(|n| n == dep).unwrap_or(0);
                        let mut cycle = path[start..].to_vec();
                        cycle.push(*dep);
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(*dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        let mut state: HashMap<K, State> = HashMap::new();
        let mut path = Vec::new();

        for node in &self.order {
            if state.get(node).is_none() {
                if let Some(cycle) = dfs(*node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug)]
pub struct DependencyGraphBuilder<K> {
    order: Vec<K>,
    dependencies: HashMap<K, Vec<K>>,
}

impl<K> Default for DependencyGraphBuilder<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            dependencies: HashMap::new(),
        }
    }
}

impl<K> DependencyGraphBuilder<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its dependencies. Adding a node twice merges them.
    pub fn add_node(mut self, node: K, depends_on: impl IntoIterator<Item = K>) -> Self {
        let deps = self.dependencies.entry(node).or_insert_with(|| {
            self.order.push(node);
            Vec::new()
        });
        for dep in depends_on {
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        self
    }

    /// Build the dependency graph.
    ///
    /// Returns an error if any dependency references a node never added.
    pub fn build(self) -> Result<DependencyGraph<K>> {
        let mut dependents: HashMap<K, Vec<K>> =
            self.order.iter().map(|node| (*node, Vec::new())).collect();

        for node in &self.order {
            for dep in self.dependencies.get(node).map_or(&[][..], Vec::as_slice) {
                match dependents.get_mut(dep) {
                    Some(list) => list.push(*node),
                    None => {
                        return Err(PlanError::UnknownAction {
                            name: format!("{:?} (required by {:?})", dep, node),
                        })
                    }
                }
            }
        }

        Ok(DependencyGraph {
            order: self.order,
            dependencies: self.dependencies,
            dependents,
        })
    }
}
