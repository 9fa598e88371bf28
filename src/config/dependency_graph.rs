// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module dependency graph and execution-order resolution.
//!
//! Nodes are module kinds in registration order. Edges run from each
//! dependency to its dependents. Resolution is Kahn's algorithm with the
//! ready set kept in a min-heap of registration indices, so whenever several
//! modules are runnable the one registered first goes first. Two runs with
//! the same registrations therefore always produce the same order.
//!
//! When Kahn's algorithm stalls, a depth-first search over the stalled nodes
//! extracts one concrete cycle for the error message.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::errors::ValidationError;
use crate::traits::ModuleKind;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<ModuleKind>,
    index: HashMap<ModuleKind, usize>,
    dependencies: Vec<Vec<ModuleKind>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its dependencies. Returns `false` (and changes
    /// nothing) if the kind is already present.
    pub fn add_node(&mut self, kind: ModuleKind, dependencies: Vec<ModuleKind>) -> bool {
        if self.index.contains_key(&kind) {
            return false;
        }
        self.index.insert(kind, self.nodes.len());
        self.nodes.push(kind);
        self.dependencies.push(dependencies);
        true
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.index.contains_key(&kind)
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> &[ModuleKind] {
        &self.nodes
    }

    pub fn dependencies_of(&self, kind: ModuleKind) -> Option<&[ModuleKind]> {
        self.index
            .get(&kind)
            .map(|&i| self.dependencies[i].as_slice())
    }

    /// Nodes with no dependencies, in registration order.
    pub fn entry_points(&self) -> Vec<ModuleKind> {
        self.nodes
            .iter()
            .zip(&self.dependencies)
            .filter(|(_, deps)| deps.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// For each node index, the indices of the nodes that depend on it.
    fn build_dependents(&self) -> Vec<Vec<usize>> {
        let mut dependents = vec![Vec::new(); self.nodes.len()];
        for (i, deps) in self.dependencies.iter().enumerate() {
            for dep in deps {
                if let Some(&d) = self.index.get(dep) {
                    dependents[d].push(i);
                }
            }
        }
        dependents
    }

    /// Every declared dependency must name a node in the graph.
    pub fn validate_references(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for (kind, deps) in self.nodes.iter().zip(&self.dependencies) {
            for dep in deps {
                if !self.index.contains_key(dep) {
                    errors.push(ValidationError::UnresolvedDependency {
                        module: kind.to_string(),
                        missing_dependency: dep.to_string(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve a deterministic execution order.
    ///
    /// Fails with every unresolved dependency, or with one cycle when the
    /// references are sound but the graph is cyclic.
    pub fn topological_order(&self) -> Result<Vec<ModuleKind>, Vec<ValidationError>> {
        self.validate_references()?;

        let dependents = self.build_dependents();
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(|d| d.len()).collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(current)) = ready.pop() {
            order.push(self.nodes[current]);
            for &dependent in &dependents[current] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        let resolved: HashSet<ModuleKind> = order.into_iter().collect();
        let stalled: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| !resolved.contains(&self.nodes[i]))
            .collect();
        let cycle = self.find_cycle(&stalled, &dependents).unwrap_or_else(|| {
            stalled.iter().map(|&i| self.nodes[i].to_string()).collect()
        });

        Err(vec![ValidationError::CyclicDependency { cycle }])
    }

    fn find_cycle(&self, stalled: &[usize], dependents: &[Vec<usize>]) -> Option<Vec<String>> {
        let candidates: HashSet<usize> = stalled.iter().copied().collect();
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for &start in stalled {
            if visited.contains(&start) {
                continue;
            }
            if let Some(cycle) = self.dfs_cycle_detection(
                start,
                dependents,
                &candidates,
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                return Some(cycle.into_iter().map(|i| self.nodes[i].to_string()).collect());
            }
        }
        None
    }

    /// Three-colour DFS: `rec_stack` holds the grey nodes on the current
    /// path; reaching a grey node closes a cycle.
    fn dfs_cycle_detection(
        &self,
        node: usize,
        dependents: &[Vec<usize>],
        candidates: &HashSet<usize>,
        visited: &mut HashSet<usize>,
        rec_stack: &mut HashSet<usize>,
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(node);

        for &neighbor in &dependents[node] {
            if !candidates.contains(&neighbor) {
                continue;
            }
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle_detection(
                    neighbor, dependents, candidates, visited, rec_stack, path,
                ) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                if let Some(cycle_start) = path.iter().position(|&x| x == neighbor) {
                    let mut cycle = path[cycle_start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
            }
        }

        rec_stack.remove(&node);
        path.pop();
        None
    }
}
