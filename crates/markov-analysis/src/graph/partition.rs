//! Partition of the vertex set into communicating classes.

use serde::Serialize;

use markov_core::GraphError;

const UNASSIGNED: usize = usize::MAX;

/// One communicating class: a non-empty set of mutually reachable vertices.
///
/// Vertices are kept in the order the decomposition emitted them (stack pop
/// order); no further ordering is implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    /// 0-based vertex ids.
    pub vertices: Vec<usize>,
}

impl Class {
    /// Number of vertices in the class.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false` for classes produced by a decomposition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Return `true` if `v` belongs to the class.
    #[must_use]
    pub fn contains(&self, v: usize) -> bool {
        self.vertices.contains(&v)
    }

    /// Vertex ids as they appear in the text format (1-based).
    #[must_use]
    pub fn one_based(&self) -> Vec<usize> {
        self.vertices.iter().map(|v| v + 1).collect()
    }
}

/// Ordered, disjoint classes covering every vertex, plus the total
/// vertex → class map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    classes: Vec<Class>,
    vertex_to_class: Vec<usize>,
}

impl Partition {
    /// Start an empty partition for `n` vertices.
    pub(crate) fn with_vertex_count(n: usize) -> Result<Self, GraphError> {
        let mut vertex_to_class = Vec::new();
        vertex_to_class
            .try_reserve_exact(n)
            .map_err(|_| GraphError::Allocation {
                what: "vertex-to-class map",
                count: n,
            })?;
        vertex_to_class.resize(n, UNASSIGNED);
        Ok(Self {
            classes: Vec::new(),
            vertex_to_class,
        })
    }

    /// Append a class and map its vertices to it. Returns the class index.
    ///
    /// Callers guarantee the vertices are in range and not yet assigned.
    pub(crate) fn push_class(&mut self, vertices: Vec<usize>) -> usize {
        let idx = self.classes.len();
        for &v in &vertices {
            self.vertex_to_class[v] = idx;
        }
        self.classes.push(Class { vertices });
        idx
    }

    /// Build a partition from explicit classes.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Structural`] if a class is empty, a vertex is out
    /// of range or listed twice, or some vertex is not covered.
    pub fn from_classes(n: usize, classes: Vec<Vec<usize>>) -> Result<Self, GraphError> {
        let mut partition = Self::with_vertex_count(n)?;
        for vertices in classes {
            if vertices.is_empty() {
                return Err(GraphError::Structural("empty class".to_string()));
            }
            let idx = partition.classes.len();
            for &v in &vertices {
                match partition.vertex_to_class.get_mut(v) {
                    None => {
                        return Err(GraphError::Structural(format!(
                            "vertex {v} outside 0..{n}"
                        )));
                    }
                    Some(slot) if *slot != UNASSIGNED => {
                        return Err(GraphError::Structural(format!(
                            "vertex {v} listed twice"
                        )));
                    }
                    Some(slot) => *slot = idx,
                }
            }
            partition.classes.push(Class { vertices });
        }
        if let Some(v) = partition.vertex_to_class.iter().position(|&c| c == UNASSIGNED) {
            return Err(GraphError::Structural(format!(
                "vertex {v} belongs to no class"
            )));
        }
        Ok(partition)
    }

    /// Number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of vertices covered.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_class.len()
    }

    /// Classes in discovery order.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Index of the class containing `v`.
    #[must_use]
    pub fn class_of(&self, v: usize) -> Option<usize> {
        self.vertex_to_class
            .get(v)
            .copied()
            .filter(|&c| c != UNASSIGNED)
    }

    /// Return `true` if `u` and `v` are in the same class.
    #[must_use]
    pub fn same_class(&self, u: usize, v: usize) -> bool {
        matches!((self.class_of(u), self.class_of(v)), (Some(a), Some(b)) if a == b)
    }

    /// Number of classes with more than one vertex.
    #[must_use]
    pub fn multi_vertex_count(&self) -> usize {
        self.classes.iter().filter(|c| c.len() > 1).count()
    }
}
