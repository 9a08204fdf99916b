use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::style::{MapStyle, StationStyle};

use super::graph::{LinePath, StationGraph};
use super::overlap::EdgeOverlapIndex;
use super::types::{GridPos, Point, StationId};

/// Grid to display space mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Projection {
    pub fn from_style(station: &StationStyle) -> Self {
        Self {
            scale_x: station.scale_x,
            scale_y: station.scale_y,
            offset_x: station.offset_x,
            offset_y: station.offset_y,
        }
    }

    pub fn to_display(&self, pos: GridPos) -> Point {
        Point::new(
            self.offset_x + self.scale_x * pos.x,
            self.offset_y + self.scale_y * pos.y,
        )
    }
}

/// Outer box of a line's train, plus the top-left corner of each car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarsBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cells: Vec<Point>,
}

impl CarsBox {
    pub fn for_line(line: &LinePath, style: &MapStyle, projection: &Projection) -> Self {
        let cars = &style.cars;
        let origin = projection.to_display(line.cars);

        let size = f64::from(line.size);
        let gaps = f64::from(line.size.saturating_sub(1));
        let width = size * cars.car_width + 2.0 * cars.horizontal_padding + gaps * cars.car_gap;
        let height = cars.car_height + 2.0 * cars.vertical_padding;

        let x = if cars.center_first_car {
            origin.x - cars.car_width / 2.0
        } else {
            origin.x
        };
        let y = origin.y - height / 2.0;

        let cells = (0..line.size)
            .map(|car| {
                Point::new(
                    x + cars.horizontal_padding + (cars.car_width + cars.car_gap) * f64::from(car),
                    y + cars.vertical_padding,
                )
            })
            .collect();

        Self {
            x,
            y,
            width,
            height,
            cells,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Layout problems that don't stop rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryWarning {
    /// Two consecutive stations project to the same display point, so the
    /// corridor has no direction to offset against.
    ZeroLengthSegment {
        line: String,
        from: StationId,
        to: StationId,
    },
}

impl fmt::Display for GeometryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryWarning::ZeroLengthSegment { line, from, to } => write!(
                f,
                "line '{}' has a zero-length segment between stations {} and {}; left unoffset",
                line, from, to
            ),
        }
    }
}

/// One offset segment of a line's track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentLayout {
    pub from: StationId,
    pub to: StationId,
    /// This line's slot in the corridor, 0-based.
    pub slot: usize,
    pub slot_count: usize,
    /// Signed distance from the corridor centerline.
    pub offset: f64,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLayout {
    pub label: String,
    pub color: String,
    /// Polyline: track start, first station, then the offset segment points.
    pub points: Vec<Point>,
    pub segments: Vec<SegmentLayout>,
    pub cars: CarsBox,
    pub label_center: Point,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<GeometryWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationLayout {
    pub id: StationId,
    pub grid: GridPos,
    pub center: Point,
    pub members: Vec<String>,
    /// Lines ending here, in input order.
    pub terminating: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, x: f64, y: f64, pad: f64) {
        self.min_x = self.min_x.min(x - pad);
        self.min_y = self.min_y.min(y - pad);
        self.max_x = self.max_x.max(x + pad);
        self.max_y = self.max_y.max(y + pad);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_x - self.min_x }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_y - self.min_y }
    }
}

/// Everything a renderer needs for one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayout {
    pub tracks: Vec<TrackLayout>,
    pub stations: Vec<StationLayout>,
    pub warnings: Vec<GeometryWarning>,
}

impl MapLayout {
    pub fn track(&self, label: &str) -> Option<&TrackLayout> {
        self.tracks.iter().find(|track| track.label == label)
    }

    /// Extent of every drawn primitive.
    pub fn bounds(&self, style: &MapStyle) -> Bounds {
        let mut bounds = Bounds::empty();
        let track_pad = style.track.stroke_width / 2.0;
        let station_pad = style.station.radius + style.station.stroke_width / 2.0;

        for track in &self.tracks {
            for point in &track.points {
                bounds.include(point.x, point.y, track_pad);
            }
            let cars = &track.cars;
            bounds.include(cars.x, cars.y, 0.0);
            bounds.include(cars.x + cars.width, cars.y + cars.height, 0.0);
            bounds.include(track.label_center.x, track.label_center.y, style.label.radius);
        }
        for station in &self.stations {
            let rings = station.terminating.len() as f64 * style.station.stroke_width;
            bounds.include(station.center.x, station.center.y, station_pad + rings);
        }

        bounds
    }
}

/// Order a corridor's lines so every line walking it agrees on slot
/// assignment: ascending labels, descending when the step goes from a
/// higher to a lower station id.
pub fn ordered_overlaps(mut overlaps: Vec<String>, prev: StationId, next: StationId) -> Vec<String> {
    // Byte order, not locale collation: "B" sorts before "a". Slot sides for
    // mixed-case labels depend on this, so keep it stable.
    match next.cmp(&prev) {
        Ordering::Greater => overlaps.sort(),
        Ordering::Less => overlaps.sort_by(|a, b| b.cmp(a)),
        Ordering::Equal => {}
    }
    overlaps
}

/// Unit vector perpendicular to the corridor `prev -> next`.
///
/// Axis-aligned corridors swap the deltas; diagonal ones rotate them.
/// Returns `None` for a zero-length corridor.
pub fn corridor_normal(prev: Point, next: Point) -> Option<(f64, f64)> {
    let rise = prev.y - next.y;
    let run = prev.x - next.x;

    let dist = (rise * rise + run * run).sqrt();
    if dist == 0.0 {
        return None;
    }

    let (perp_x, perp_y) = if rise == 0.0 || run == 0.0 {
        (rise, run)
    } else {
        (rise, -run)
    };
    Some((perp_x / dist, perp_y / dist))
}

/// Signed distance of slot `slot` (of `slot_count`) from the centerline of
/// an axis `axis_len` wide.
pub fn slot_offset(slot: usize, slot_count: usize, axis_len: f64) -> f64 {
    let slot_len = axis_len / slot_count as f64;
    -axis_len / 2.0 + (slot as f64 + 0.5) * slot_len
}

/// Turns station graph and corridor overlaps into display geometry.
pub struct TrackLayoutEngine<'a> {
    graph: &'a StationGraph,
    overlaps: &'a EdgeOverlapIndex,
    style: &'a MapStyle,
    projection: Projection,
}

impl<'a> TrackLayoutEngine<'a> {
    pub fn new(graph: &'a StationGraph, overlaps: &'a EdgeOverlapIndex, style: &'a MapStyle) -> Self {
        Self {
            graph,
            overlaps,
            style,
            projection: Projection::from_style(&style.station),
        }
    }

    fn station_point(&self, id: StationId) -> Result<Point> {
        Ok(self.projection.to_display(self.graph.station_pos(id)?))
    }

    pub fn layout_line(&self, label: &str) -> Result<TrackLayout> {
        let line = self.graph.line(label)?;
        let cars = CarsBox::for_line(line, self.style, &self.projection);
        let label_center = self.projection.to_display(GridPos::new(
            line.cars.x + self.style.label.grid_offset_x,
            line.cars.y,
        ));

        let mut points = vec![cars.center()];
        let mut segments = Vec::new();
        let mut warnings = Vec::new();

        if let Some(&first) = line.station_ids.first() {
            points.push(self.station_point(first)?);
        }

        let axis_len = 2.0 * self.style.station.radius;
        let last_ix = line.station_ids.len().saturating_sub(1);

        for (ix, pair) in line.station_ids.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            let prev_pt = self.station_point(prev)?;
            let next_pt = self.station_point(next)?;

            let overlaps = ordered_overlaps(self.overlaps.overlaps_for(prev, next)?, prev, next);
            let slot = overlaps
                .iter()
                .position(|l| l == &line.label)
                .ok_or_else(|| Error::InvalidInput {
                    message: format!(
                        "line '{}' is missing from its own corridor {} -> {}",
                        line.label, prev, next
                    ),
                })?;

            let (offset, start, end) = match corridor_normal(prev_pt, next_pt) {
                Some((perp_x, perp_y)) => {
                    let offset = slot_offset(slot, overlaps.len(), axis_len);
                    let (dx, dy) = (perp_x * offset, perp_y * offset);
                    (
                        offset,
                        Point::new(prev_pt.x + dx, prev_pt.y + dy),
                        Point::new(next_pt.x + dx, next_pt.y + dy),
                    )
                }
                None => {
                    let warning = GeometryWarning::ZeroLengthSegment {
                        line: line.label.clone(),
                        from: prev,
                        to: next,
                    };
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                    (0.0, prev_pt, next_pt)
                }
            };

            points.push(start);
            points.push(end);
            if ix + 1 == last_ix && overlaps.len() > 1 {
                points.push(next_pt);
            }

            segments.push(SegmentLayout {
                from: prev,
                to: next,
                slot,
                slot_count: overlaps.len(),
                offset,
                start,
                end,
            });
        }

        Ok(TrackLayout {
            label: line.label.clone(),
            color: line.color.clone(),
            points,
            segments,
            cars,
            label_center,
            warnings,
        })
    }

    pub fn layout_map(&self) -> Result<MapLayout> {
        let tracks = self
            .graph
            .lines()
            .iter()
            .map(|line| self.layout_line(&line.label))
            .collect::<Result<Vec<_>>>()?;

        let stations = self
            .graph
            .stations()
            .map(|(id, grid)| -> Result<StationLayout> {
                Ok(StationLayout {
                    id,
                    grid,
                    center: self.projection.to_display(grid),
                    members: self.graph.members_of(id)?.iter().cloned().collect(),
                    terminating: self
                        .graph
                        .terminating_lines(id)?
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let warnings: Vec<_> = tracks
            .iter()
            .flat_map(|track| track.warnings.iter().cloned())
            .collect();

        tracing::debug!(
            tracks = tracks.len(),
            stations = stations.len(),
            warnings = warnings.len(),
            "map layout computed"
        );

        Ok(MapLayout {
            tracks,
            stations,
            warnings,
        })
    }
}
