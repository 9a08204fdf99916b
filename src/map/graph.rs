use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};

use super::types::{GridPos, StationId, SubwayRecord};

/// A line after ingestion: its record data plus the deduplicated station path.
#[derive(Debug, Clone)]
pub struct LinePath {
    pub label: String,
    pub color: String,
    pub cars: GridPos,
    pub size: u32,
    /// Same length and order as the line's raw station list.
    pub station_ids: Vec<StationId>,
}

impl LinePath {
    pub fn last_station(&self) -> Option<StationId> {
        self.station_ids.last().copied()
    }
}

/// Canonical station identities for one loaded map.
///
/// Every distinct grid position seen while ingesting line data maps to
/// exactly one [`StationId`], and back.
#[derive(Debug, Clone, Default)]
pub struct StationGraph {
    positions: Vec<GridPos>,
    ids: HashMap<(u64, u64), StationId>,
    members: Vec<BTreeSet<String>>,
    lines: Vec<LinePath>,
    line_index: HashMap<String, usize>,
}

impl StationGraph {
    /// Build the graph from all lines in one pass.
    ///
    /// Ids are handed out in first-encounter order: lines in input order,
    /// stations in line order.
    pub fn ingest(subways: &[SubwayRecord]) -> Result<Self> {
        let mut graph = Self::default();

        for subway in subways {
            if graph.line_index.contains_key(&subway.label) {
                return Err(Error::DuplicateLine(subway.label.clone()));
            }

            let mut station_ids = Vec::with_capacity(subway.stations.len());
            for pos in &subway.stations {
                let id = graph.resolve_or_insert(*pos, &subway.label)?;
                graph.members[id.0 as usize].insert(subway.label.clone());
                station_ids.push(id);
            }

            graph
                .line_index
                .insert(subway.label.clone(), graph.lines.len());
            graph.lines.push(LinePath {
                label: subway.label.clone(),
                color: subway.color.clone(),
                cars: subway.cars,
                size: subway.size,
                station_ids,
            });
        }

        tracing::debug!(
            lines = graph.lines.len(),
            stations = graph.positions.len(),
            "station graph built"
        );
        Ok(graph)
    }

    fn resolve_or_insert(&mut self, pos: GridPos, label: &str) -> Result<StationId> {
        if !pos.is_finite() {
            return Err(Error::InvalidInput {
                message: format!(
                    "line '{}' has a non-finite station coordinate ({}, {})",
                    label, pos.x, pos.y
                ),
            });
        }

        if let Some(id) = self.ids.get(&pos.key()) {
            return Ok(*id);
        }

        let id = StationId(self.positions.len() as u32);
        self.ids.insert(pos.key(), id);
        self.positions.push(pos);
        self.members.push(BTreeSet::new());
        Ok(id)
    }

    pub fn station_id(&self, pos: GridPos) -> Result<StationId> {
        self.ids
            .get(&pos.key())
            .copied()
            .ok_or(Error::UnknownCoordinate(pos))
    }

    pub fn station_pos(&self, id: StationId) -> Result<GridPos> {
        self.positions
            .get(id.0 as usize)
            .copied()
            .ok_or(Error::UnknownStation(id))
    }

    /// Labels of every line passing through or ending at `id`.
    pub fn members_of(&self, id: StationId) -> Result<&BTreeSet<String>> {
        self.members
            .get(id.0 as usize)
            .ok_or(Error::UnknownStation(id))
    }

    /// Labels of the lines whose final station is `id`, in input order.
    pub fn terminating_lines(&self, id: StationId) -> Result<Vec<&str>> {
        if id.0 as usize >= self.station_count() {
            return Err(Error::UnknownStation(id));
        }
        Ok(self
            .lines
            .iter()
            .filter(|line| line.last_station() == Some(id))
            .map(|line| line.label.as_str())
            .collect())
    }

    pub fn line(&self, label: &str) -> Result<&LinePath> {
        self.line_index
            .get(label)
            .map(|&ix| &self.lines[ix])
            .ok_or_else(|| Error::UnknownLine(label.to_string()))
    }

    /// Lines in input order.
    pub fn lines(&self) -> &[LinePath] {
        &self.lines
    }

    /// Stations in id order.
    pub fn stations(&self) -> impl Iterator<Item = (StationId, GridPos)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(|(ix, pos)| (StationId(ix as u32), *pos))
    }

    pub fn station_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn subway(label: &str, stations: &[[f64; 2]]) -> SubwayRecord {
        SubwayRecord {
            label: label.to_string(),
            stations: stations.iter().map(|&p| GridPos::from(p)).collect(),
            color: "#000000".to_string(),
            cars: GridPos::new(0.0, 0.0),
            size: 3,
        }
    }

    #[test]
    fn shared_coordinates_become_one_station() {
        let graph = StationGraph::ingest(&[
            subway("A", &[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            subway("B", &[[1.0, 0.0], [1.0, 1.0]]),
        ])
        .unwrap();

        assert_eq!(graph.station_count(), 4);
        let shared = graph.station_id(GridPos::new(1.0, 0.0)).unwrap();
        assert_eq!(graph.line("A").unwrap().station_ids[1], shared);
        assert_eq!(graph.line("B").unwrap().station_ids[0], shared);

        let members: Vec<_> = graph.members_of(shared).unwrap().iter().cloned().collect();
        assert_eq!(members, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn ids_follow_first_encounter_order() {
        let graph = StationGraph::ingest(&[
            subway("A", &[[5.0, 5.0], [0.0, 0.0]]),
            subway("B", &[[0.0, 0.0], [9.0, 9.0]]),
        ])
        .unwrap();

        let ids: Vec<_> = graph.stations().map(|(id, pos)| (id.0, pos)).collect();
        assert_eq!(
            ids,
            vec![
                (0, GridPos::new(5.0, 5.0)),
                (1, GridPos::new(0.0, 0.0)),
                (2, GridPos::new(9.0, 9.0)),
            ]
        );
    }

    #[test]
    fn station_id_sequence_keeps_raw_length_and_order() {
        let graph =
            StationGraph::ingest(&[subway("loop", &[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]])])
                .unwrap();
        let ids = &graph.line("loop").unwrap().station_ids;
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], ids[2]);
        assert_eq!(graph.members_of(ids[0]).unwrap().len(), 1);
    }

    #[test]
    fn unknown_lookups_fail() {
        let graph = StationGraph::ingest(&[subway("A", &[[0.0, 0.0]])]).unwrap();

        assert!(matches!(
            graph.station_id(GridPos::new(3.0, 3.0)),
            Err(Error::UnknownCoordinate(_))
        ));
        assert!(matches!(
            graph.station_pos(StationId(7)),
            Err(Error::UnknownStation(StationId(7)))
        ));
        assert!(matches!(graph.members_of(StationId(7)), Err(Error::UnknownStation(_))));
        assert!(matches!(graph.line("Z"), Err(Error::UnknownLine(_))));
        assert!(matches!(
            graph.terminating_lines(StationId(1)),
            Err(Error::UnknownStation(StationId(1)))
        ));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let result = StationGraph::ingest(&[
            subway("A", &[[0.0, 0.0]]),
            subway("A", &[[1.0, 0.0]]),
        ]);
        assert!(matches!(result, Err(Error::DuplicateLine(label)) if label == "A"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let result = StationGraph::ingest(&[subway("A", &[[f64::NAN, 0.0]])]);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn terminating_lines_match_last_station() {
        let graph = StationGraph::ingest(&[
            subway("A", &[[0.0, 0.0], [1.0, 0.0]]),
            subway("B", &[[2.0, 0.0], [1.0, 0.0]]),
            subway("C", &[[1.0, 0.0], [1.0, 1.0]]),
        ])
        .unwrap();
        let end = graph.station_id(GridPos::new(1.0, 0.0)).unwrap();
        assert_eq!(graph.terminating_lines(end).unwrap(), vec!["A", "B"]);
    }
}
