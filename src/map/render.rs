use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::style::MapStyle;
use crate::xml::{class_token, escape_xml};

use super::layout::{MapLayout, StationLayout, TrackLayout};
use super::types::Point;

/// Render a computed map layout to an SVG fragment.
///
/// Returns the fragment with its top-left corner at the origin, plus its
/// width and height.
pub fn render_map(layout: &MapLayout, style: &MapStyle) -> Result<(String, f64, f64)> {
    let bounds = layout.bounds(style);
    let (dx, dy) = if bounds.is_empty() {
        (0.0, 0.0)
    } else {
        (-bounds.min_x, -bounds.min_y)
    };

    let colors: HashMap<&str, &str> = layout
        .tracks
        .iter()
        .map(|track| (track.label.as_str(), track.color.as_str()))
        .collect();

    let mut svg = String::new();
    svg.push_str(&format!(r#"<g transform="translate({:.2},{:.2})">"#, dx, dy));

    for track in &layout.tracks {
        render_track(&mut svg, track, style);
        render_cars(&mut svg, track, style);
        render_label(&mut svg, track, style);
    }

    for station in &layout.stations {
        render_station(&mut svg, station, style, &colors)?;
    }

    svg.push_str("</g>");
    Ok((svg, bounds.width(), bounds.height()))
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_track(svg: &mut String, track: &TrackLayout, style: &MapStyle) {
    svg.push_str(&format!(
        r#"<polyline class="track line-{}" points="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linejoin="round" stroke-linecap="round" />"#,
        class_token(&track.label),
        points_attr(&track.points),
        escape_xml(&track.color),
        style.track.stroke_width,
    ));
}

fn render_cars(svg: &mut String, track: &TrackLayout, style: &MapStyle) {
    let cars = &track.cars;
    let body_radius = style.cars.horizontal_padding.min(cars.height / 2.0);

    svg.push_str(&format!(
        r#"<g class="cars line-{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" />"#,
        class_token(&track.label),
        cars.x,
        cars.y,
        cars.width,
        cars.height,
        body_radius,
        escape_xml(&track.color),
    ));

    for cell in &cars.cells {
        svg.push_str(&format!(
            r#"<rect class="car" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
            cell.x,
            cell.y,
            style.cars.car_width,
            style.cars.car_height,
            escape_xml(&style.cars.window_fill),
        ));
    }

    svg.push_str("</g>");
}

fn render_label(svg: &mut String, track: &TrackLayout, style: &MapStyle) {
    let label = &style.label;
    let center = track.label_center;

    svg.push_str(&format!(
        r#"<g class="label"><circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" /><text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{:.2}" font-weight="700" fill="{}">{}</text></g>"#,
        center.x,
        center.y,
        label.radius,
        escape_xml(&track.color),
        center.x,
        center.y,
        escape_xml(&label.font_family),
        label.font_size,
        escape_xml(&label.text_color),
        escape_xml(&track.label),
    ));
}

fn render_station(
    svg: &mut String,
    station: &StationLayout,
    style: &MapStyle,
    colors: &HashMap<&str, &str>,
) -> Result<()> {
    let s = &style.station;

    svg.push_str(&format!(
        r#"<g class="station" id="station-{}"><circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}" />"#,
        station.id,
        station.center.x,
        station.center.y,
        s.radius,
        escape_xml(&s.fill),
        escape_xml(&s.stroke),
        s.stroke_width,
    ));

    // One ring per line ending here, stacked outwards.
    for (ix, label) in station.terminating.iter().enumerate() {
        let color = colors.get(label.as_str()).ok_or_else(|| Error::Render {
            message: format!(
                "station {} lists terminating line '{}' with no track",
                station.id, label
            ),
        })?;
        svg.push_str(&format!(
            r#"<circle class="station-end" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
            station.center.x,
            station.center.y,
            s.radius + s.stroke_width * (ix as f64 + 1.0),
            escape_xml(color),
            s.stroke_width,
        ));
    }

    svg.push_str("</g>");
    Ok(())
}
