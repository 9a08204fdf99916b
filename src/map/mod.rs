mod graph;
mod layout;
mod load;
mod overlap;
mod render;
mod types;

pub use graph::{LinePath, StationGraph};
pub use layout::{
    Bounds, CarsBox, GeometryWarning, MapLayout, Projection, SegmentLayout, StationLayout,
    TrackLayout, TrackLayoutEngine, corridor_normal, ordered_overlaps, slot_offset,
};
pub use load::{load_subways, parse_subways};
pub use overlap::EdgeOverlapIndex;
pub use render::render_map;
pub use types::{GridPos, Point, StationId, SubwayRecord};

use crate::error::Result;
use crate::style::MapStyle;

/// Station graph, overlap index and track layout for one map, in one call.
pub fn build_layout(subways: &[SubwayRecord], style: &MapStyle) -> Result<MapLayout> {
    let graph = StationGraph::ingest(subways)?;
    let overlaps = EdgeOverlapIndex::build(&graph);
    TrackLayoutEngine::new(&graph, &overlaps, style).layout_map()
}
