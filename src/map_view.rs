use gtk::prelude::*;
use gtk::{Align, Label, Orientation};
use libshumate::prelude::{LocationExt, MarkerExt};

use crate::plot::{graticule, MapPlot};
use crate::summary::Extent;

const TILE_URL: &str = "https://a.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png";

/// Builds the distribution map: basemap tiles, graticule, one dot per
/// occurrence and a legend with the species label.
pub fn create_map_view(plot: &MapPlot) -> gtk::Overlay {
    // Create the map widget using libshumate
    let map = libshumate::SimpleMap::new();

    // Dark basemap tiles carry both coastlines and country borders
    let map_source = libshumate::RasterRenderer::from_url(TILE_URL);
    map.set_map_source(Some(&map_source));

    // Zoom buttons stand in for a pan/zoom toolbar; dragging pans
    map.set_show_zoom_buttons(true);

    // Make the map expand to fill its grid cell
    map.set_vexpand(true);
    map.set_hexpand(true);

    if let Some(map_view) = map.map() {
        if let Some(viewport) = map_view.viewport() {
            // Min zoom 1 keeps the whole world reachable
            viewport.set_min_zoom_level(1);
            viewport.set_max_zoom_level(10);

            // Draw each graticule line as its own path layer, with a degree
            // label at the right (parallels) or top (meridians) end
            let label_layer = libshumate::MarkerLayer::new(&viewport);
            for line in graticule() {
                let path = libshumate::PathLayer::new(&viewport);
                path.set_stroke_width(1.0);
                path.set_stroke_color(Some(&gdk::RGBA::new(0.6, 0.6, 0.6, 0.45)));
                for &(lat, lon) in &line.nodes {
                    path.add_node(&libshumate::Coordinate::new_full(lat, lon));
                }
                map_view.add_layer(&path);

                let label = Label::builder()
                    .label(&line.label)
                    .build();
                label.add_css_class("graticule-label");

                let marker = libshumate::Marker::new();
                marker.set_child(Some(&label));
                marker.set_location(line.label_at.0, line.label_at.1);
                label_layer.add_marker(&marker);
            }
            map_view.add_layer(&label_layer);

            // Create a marker layer with one dot per occurrence
            let marker_layer = libshumate::MarkerLayer::new(&viewport);
            for &(lon, lat) in &plot.points {
                let dot = gtk::Box::builder()
                    .width_request(8)
                    .height_request(8)
                    .build();
                dot.add_css_class("occurrence-dot");

                let marker = libshumate::Marker::new();
                marker.set_child(Some(&dot));
                marker.set_location(lat, lon);
                marker_layer.add_marker(&marker);
            }
            map_view.add_layer(&marker_layer);

            // Center on the occurrences at a world-overview zoom
            let (lat, lon) = plot_center(plot);
            map_view.go_to_full(lat, lon, 2.0);
        }
    } else {
        tracing::warn!("map widget has no map view, occurrences not drawn");
    }

    if plot.is_empty() {
        tracing::info!(label = %plot.label, "no coordinates to plot, showing empty map");
    } else {
        tracing::debug!(points = plot.points.len(), label = %plot.label, "rendered distribution map");
    }

    // Layer the legend on top of the map
    let overlay = gtk::Overlay::new();
    overlay.set_child(Some(&map));
    overlay.add_overlay(&create_legend(&plot.label));
    overlay
}

fn create_legend(label: &str) -> gtk::Box {
    let legend = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(8)
        .halign(Align::End)
        .valign(Align::Start)
        .margin_top(12)
        .margin_end(12)
        .build();
    legend.add_css_class("map-legend");

    // Dot swatch matching the occurrence markers
    let swatch = gtk::Box::builder()
        .width_request(10)
        .height_request(10)
        .valign(Align::Center)
        .build();
    swatch.add_css_class("occurrence-dot");
    legend.append(&swatch);

    // Binomial name next to the swatch
    let name = Label::builder().label(label).build();
    name.add_css_class("legend-label");
    legend.append(&name);

    legend
}

/// Middle of the points' bounding box, or the origin for an empty plot.
fn plot_center(plot: &MapPlot) -> (f64, f64) {
    let lons: Vec<f64> = plot.points.iter().map(|(lon, _)| *lon).collect();
    let lats: Vec<f64> = plot.points.iter().map(|(_, lat)| *lat).collect();
    match (Extent::of(&lats), Extent::of(&lons)) {
        (Some(lat), Some(lon)) => ((lat.min + lat.max) / 2.0, (lon.min + lon.max) / 2.0),
        _ => (0.0, 0.0),
    }
}
