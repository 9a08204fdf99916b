use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{Error, Result};

use super::graph::StationGraph;
use super::types::StationId;

/// Which lines traverse each directed step between adjacent stations.
///
/// Steps are recorded per direction; [`EdgeOverlapIndex::overlaps_for`]
/// merges both directions, since they occupy the same physical corridor.
#[derive(Debug, Clone, Default)]
pub struct EdgeOverlapIndex {
    edges: HashMap<(StationId, StationId), BTreeSet<String>>,
    station_count: usize,
}

impl EdgeOverlapIndex {
    pub fn build(graph: &StationGraph) -> Self {
        let mut edges: HashMap<(StationId, StationId), BTreeSet<String>> = HashMap::new();

        for line in graph.lines() {
            for pair in line.station_ids.windows(2) {
                edges
                    .entry((pair[0], pair[1]))
                    .or_default()
                    .insert(line.label.clone());
            }
        }

        let index = Self {
            edges,
            station_count: graph.station_count(),
        };
        tracing::debug!(
            directed_edges = index.edges.len(),
            corridors = index.corridor_count(),
            "edge overlap index built"
        );
        index
    }

    /// Labels recorded for exactly the step `from -> to`.
    pub fn directed(&self, from: StationId, to: StationId) -> Option<&BTreeSet<String>> {
        self.edges.get(&(from, to))
    }

    /// Every line sharing the corridor between `from` and `to`, regardless
    /// of traversal direction, in ascending label order.
    ///
    /// Known stations with no corridor between them give an empty list; ids
    /// the graph never issued are an error.
    pub fn overlaps_for(&self, from: StationId, to: StationId) -> Result<Vec<String>> {
        for id in [from, to] {
            if id.0 as usize >= self.station_count {
                return Err(Error::UnknownStation(id));
            }
        }

        let union: BTreeSet<&String> = self
            .directed(from, to)
            .into_iter()
            .chain(self.directed(to, from))
            .flat_map(|labels| labels.iter())
            .collect();
        Ok(union.into_iter().cloned().collect())
    }

    /// Number of distinct undirected station pairs carrying at least one line.
    pub fn corridor_count(&self) -> usize {
        self.edges
            .keys()
            .map(|&(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect::<HashSet<_>>()
            .len()
    }
}
