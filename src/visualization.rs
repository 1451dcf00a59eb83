//! Visualization utilities for planned routes.
//!
//! Generates SVG charts of a route (longitude on x, latitude on y, equal
//! aspect) and side-by-side comparisons of two routes. PNG output uses the
//! native renderer when the `resvg` feature is on, otherwise external tools.

use crate::instance::Place;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::FitTo;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;

/// SVG visualization generator
pub struct Visualizer {
    /// Width of one route panel
    pub width: f64,
    /// Height of one route panel
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Place marker radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 60.0,
            node_radius: 6.0,
        }
    }
}

const STYLE: &str = r##"<style>
    .place { fill: #3498db; stroke: #2c3e50; stroke-width: 1.5; }
    .start { fill: #e74c3c; stroke: #c0392b; stroke-width: 1.5; }
    .edge { stroke: #e74c3c; stroke-width: 2; fill: none; }
    .badge { fill: #f1c40f; stroke: #2c3e50; stroke-width: 1; }
    .order { font-family: Arial; font-size: 9px; fill: #2c3e50; }
    .label { font-family: Arial; font-size: 11px; fill: #2c3e50; }
    .title { font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }
    .axis { font-family: Arial; font-size: 11px; fill: #7f8c8d; }
    .grid { stroke: #d5dbdb; stroke-width: 1; }
</style>
<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#e74c3c"/>
</marker>
</defs>
"##;

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an SVG chart of a single route
    pub fn route_svg(&self, places: &[Place], route: &[usize], title: &str) -> String {
        let mut svg = self.header(self.width, self.height);
        self.draw_route(&mut svg, places, route, title, 0.0);
        svg.push_str("</svg>");
        svg
    }

    /// Generate a side-by-side comparison of two routes over the same places
    pub fn comparison_svg(
        &self,
        places: &[Place],
        original: &[usize],
        improved: &[usize],
        original_distance: f64,
        improved_distance: f64,
    ) -> String {
        let header_height = 40.0;
        let mut svg = self.header(2.0 * self.width, self.height + header_height);

        let improvement = if original_distance > 0.0 {
            (original_distance - improved_distance) / original_distance * 100.0
        } else {
            0.0
        };
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="28" class="title" text-anchor="middle">Route Optimization: {:.2}% improvement</text>
"#,
            self.width, improvement
        ));

        svg.push_str(&format!(r#"<g transform="translate(0,{})">
"#, header_height));
        self.draw_route(
            &mut svg,
            places,
            original,
            &format!("Original Route | Distance: {:.2} km", original_distance),
            0.0,
        );
        self.draw_route(
            &mut svg,
            places,
            improved,
            &format!("Improved Route | Distance: {:.2} km", improved_distance),
            self.width,
        );
        svg.push_str("</g>\n</svg>");
        svg
    }

    fn header(&self, width: f64, height: f64) -> String {
        format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
{}<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            width, height, width, height, STYLE
        )
    }

    /// Draw one panel whose left edge sits at `offset_x`
    fn draw_route(&self, svg: &mut String, places: &[Place], route: &[usize], title: &str, offset_x: f64) {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="25" class="title">{}</text>
"#,
            offset_x + self.margin,
            escape(title)
        ));

        if route.is_empty() {
            return;
        }

        let (min_lon, max_lon, min_lat, max_lat) = self.get_bounds(places, route);
        let pad_lon = ((max_lon - min_lon) * 0.1).max(1e-3);
        let pad_lat = ((max_lat - min_lat) * 0.1).max(1e-3);
        let (min_lon, max_lon) = (min_lon - pad_lon, max_lon + pad_lon);
        let (min_lat, max_lat) = (min_lat - pad_lat, max_lat + pad_lat);

        let plot_w = self.width - 2.0 * self.margin;
        let plot_h = self.height - 2.0 * self.margin;
        let scale = (plot_w / (max_lon - min_lon)).min(plot_h / (max_lat - min_lat));

        // Centre the equal-aspect plot inside the panel
        let used_w = (max_lon - min_lon) * scale;
        let used_h = (max_lat - min_lat) * scale;
        let left = offset_x + self.margin + (plot_w - used_w) / 2.0;
        let bottom = self.height - self.margin - (plot_h - used_h) / 2.0;

        let transform = |lon: f64, lat: f64| -> (f64, f64) {
            (left + (lon - min_lon) * scale, bottom - (lat - min_lat) * scale)
        };

        svg.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" class="grid" fill="none"/>
<text x="{:.2}" y="{:.2}" class="axis" text-anchor="middle">Longitude</text>
<text x="{:.2}" y="{:.2}" class="axis" text-anchor="middle" transform="rotate(-90 {:.2} {:.2})">Latitude</text>
"#,
            left,
            bottom - used_h,
            used_w,
            used_h,
            left + used_w / 2.0,
            bottom + 30.0,
            left - 20.0,
            bottom - used_h / 2.0,
            left - 20.0,
            bottom - used_h / 2.0
        ));

        for leg in route.windows(2) {
            let (x1, y1) = transform(places[leg[0]].lon, places[leg[0]].lat);
            let (x2, y2) = transform(places[leg[1]].lon, places[leg[1]].lat);
            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                x1, y1, x2, y2
            ));
        }

        let mut labelled = vec![false; places.len()];
        for (i, &idx) in route.iter().enumerate() {
            let place = &places[idx];
            let (x, y) = transform(place.lon, place.lat);

            if !labelled[idx] {
                labelled[idx] = true;
                let class = if i == 0 { "start" } else { "place" };
                svg.push_str(&format!(
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
<text x="{:.2}" y="{:.2}" class="label">{}</text>
"#,
                    x,
                    y,
                    self.node_radius,
                    class,
                    x + self.node_radius + 2.0,
                    y - self.node_radius - 2.0,
                    escape(&place.name)
                ));
            }

            let (bx, by) = (x - 14.0 - 4.0 * (i % 2) as f64, y + 14.0);
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="7" class="badge"/>
<text x="{:.2}" y="{:.2}" class="order" text-anchor="middle">{}</text>
"#,
                bx,
                by,
                bx,
                by + 3.0,
                i + 1
            ));
        }
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save a chart, choosing SVG or PNG from the file extension.
    ///
    /// A failed PNG conversion falls back to writing the SVG next to it and
    /// returns the path actually written.
    pub fn save_chart<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<std::path::PathBuf> {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if !is_png {
            self.save_svg(svg, path)?;
            return Ok(path.to_path_buf());
        }

        match self.save_png(svg, path) {
            Ok(()) => Ok(path.to_path_buf()),
            Err(e) => {
                let svg_path = path.with_extension("svg");
                log::warn!("PNG conversion failed ({}); writing {:?} instead", e, svg_path);
                self.save_svg(svg, &svg_path)?;
                Ok(svg_path)
            }
        }
    }

    /// Save SVG as PNG using the native renderer or an external converter.
    /// Tries `rsvg-convert`, then `magick convert`, then `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        #[cfg(feature = "resvg")]
        {
            match self.render_png(svg, path) {
                Ok(()) => return Ok(()),
                Err(e) => log::warn!("Native PNG rendering failed ({}); trying external converters", e),
            }
        }

        // Fallback: write temporary svg and try external converters
        let tmp_svg = path.with_extension("svg.tmp");
        {
            let mut f = File::create(&tmp_svg)?;
            f.write_all(svg.as_bytes())?;
        }

        let out = path.to_string_lossy().into_owned();
        let tmp = tmp_svg.to_string_lossy().into_owned();
        let converters: [(&str, Vec<&str>); 3] = [
            ("rsvg-convert", vec!["-o", out.as_str(), tmp.as_str()]),
            ("magick", vec!["convert", tmp.as_str(), out.as_str()]),
            ("inkscape", vec![tmp.as_str(), "--export-type=png", "--export-filename", out.as_str()]),
        ];

        for (program, args) in converters {
            match Command::new(program).args(&args).status() {
                Ok(status) if status.success() => {
                    let _ = std::fs::remove_file(&tmp_svg);
                    log::debug!("Rendered {:?} with {}", path, program);
                    return Ok(());
                }
                Ok(status) => log::debug!("{} exited with {}", program, status),
                Err(e) => log::debug!("{} unavailable: {}", program, e),
            }
        }

        let _ = std::fs::remove_file(&tmp_svg);
        Err(std::io::Error::new(std::io::ErrorKind::Other, "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)"))
    }

    #[cfg(feature = "resvg")]
    fn render_png(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let opt = usvg::Options::default();
        let rtree = usvg::Tree::from_str(svg, &opt).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("usvg parse error: {}", e)))?;
        let (w, h) = svg_size(svg).unwrap_or((self.width as u32, self.height as u32));
        let mut pixmap = Pixmap::new(w.max(1), h.max(1)).ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "Failed to create pixmap"))?;
        render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut()).ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "resvg render failed"))?;
        pixmap.save_png(path).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("save_png failed: {}", e)))
    }

    /// Get coordinate bounds (min_lon, max_lon, min_lat, max_lat) of the visited places
    fn get_bounds(&self, places: &[Place], route: &[usize]) -> (f64, f64, f64, f64) {
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;

        for &idx in route {
            let place = &places[idx];
            min_lon = min_lon.min(place.lon);
            max_lon = max_lon.max(place.lon);
            min_lat = min_lat.min(place.lat);
            max_lat = max_lat.max(place.lat);
        }

        (min_lon, max_lon, min_lat, max_lat)
    }
}

/// Read the pixel size from the root element's width/height attributes
#[cfg_attr(not(feature = "resvg"), allow(dead_code))]
fn svg_size(svg: &str) -> Option<(u32, u32)> {
    let attr = |name: &str| -> Option<u32> {
        let (_, rest) = svg.split_once(&format!(" {}=\"", name))?;
        let (value, _) = rest.split_once('"')?;
        value.parse::<f64>().ok().map(|v| v as u32)
    };
    Some((attr("width")?, attr("height")?))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places() -> Vec<Place> {
        vec![
            Place::new("Eiffel Tower", 48.8584, 2.2945),
            Place::new("Louvre Museum", 48.8606, 2.3376),
            Place::new("Notre-Dame & Co", 48.8530, 2.3499),
        ]
    }

    #[test]
    fn test_route_svg() {
        let viz = Visualizer::new();
        let svg = viz.route_svg(&places(), &[0, 1, 2, 0], "Optimized Route");

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Optimized Route"));
        assert!(svg.contains("Notre-Dame &amp; Co"));
        assert_eq!(svg.matches("class=\"edge\"").count(), 3);
        // one badge per route step, one marker per distinct place
        assert_eq!(svg.matches("class=\"badge\"").count(), 4);
        assert_eq!(svg.matches("class=\"start\"").count(), 1);
        assert_eq!(svg.matches("class=\"place\"").count(), 2);
    }

    #[test]
    fn test_single_place_svg() {
        let viz = Visualizer::new();
        let svg = viz.route_svg(&places()[..1], &[0], "Solo");
        assert!(svg.contains("class=\"start\""));
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn test_comparison_svg() {
        let viz = Visualizer::new();
        let svg = viz.comparison_svg(&places(), &[0, 2, 1], &[0, 1, 2], 10.0, 7.5);

        assert!(svg.contains("25.00% improvement"));
        assert!(svg.contains("Original Route | Distance: 10.00 km"));
        assert!(svg.contains("Improved Route | Distance: 7.50 km"));
        assert!(svg.contains("width=\"1600\""));
        assert_eq!(svg.matches("class=\"edge\"").count(), 4);
    }

    #[test]
    fn test_svg_size() {
        let viz = Visualizer::new();
        let svg = viz.route_svg(&places(), &[0, 1], "t");
        assert_eq!(svg_size(&svg), Some((800, 800)));
    }

    #[test]
    fn test_save_chart_as_svg() {
        let viz = Visualizer::new();
        let path = std::env::temp_dir().join(format!("city-tour-{}-chart.svg", std::process::id()));
        let svg = viz.route_svg(&places(), &[0, 1, 2], "t");

        let written = viz.save_chart(&svg, &path).unwrap();
        let text = std::fs::read_to_string(&written).unwrap();
        std::fs::remove_file(&written).ok();

        assert_eq!(written, path);
        assert_eq!(text, svg);
    }

    #[test]
    fn test_save_chart_as_png_always_writes_a_file() {
        let viz = Visualizer::new();
        let path = std::env::temp_dir().join(format!("city-tour-{}-png-chart.png", std::process::id()));
        let svg = viz.route_svg(&places(), &[0, 1, 2], "t");

        let written = viz.save_chart(&svg, &path).unwrap();
        let exists = written.exists();
        std::fs::remove_file(&written).ok();

        assert!(exists);
        assert!(written == path || written == path.with_extension("svg"));
        assert!(!path.with_extension("svg.tmp").exists());
    }
}
