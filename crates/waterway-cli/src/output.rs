//! Output formatting for route rendering.

use std::fmt::Write;

use clap::ValueEnum;
use waterway_lib::{Route, SnappedEndpoint};

use crate::terminal::{format_with_separators, ColorPalette};

/// Metres in one nautical mile.
const NAUTICAL_MILE_M: f64 = 1852.0;

/// Output format for route results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with the waypoint list.
    #[default]
    Text,
    /// The serialised route as pretty-printed JSON.
    Json,
}

/// Render a route in the requested format.
pub fn render(route: &Route, format: OutputFormat, palette: ColorPalette) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(route, palette)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(route)?),
    }
}

/// Human-friendly route view.
pub fn render_text(route: &Route, palette: ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Route: {}{}{} ({:.2} nmi), {}{}{}, {} waypoints",
        p.white_bold,
        format_distance(route.distance_m),
        p.reset,
        route.distance_m / NAUTICAL_MILE_M,
        p.white_bold,
        format_duration(route.duration_s),
        p.reset,
        route.coordinates.len()
    );
    let _ = writeln!(
        out,
        "{}START{} {}",
        p.tag_start,
        p.reset,
        describe_endpoint(&route.start)
    );
    let _ = writeln!(
        out,
        "{}END  {} {}",
        p.tag_end,
        p.reset,
        describe_endpoint(&route.end)
    );

    for (index, coordinate) in route.coordinates.iter().enumerate() {
        let branch = if index + 1 == route.coordinates.len() {
            "└─"
        } else {
            "├─"
        };
        let _ = writeln!(
            out,
            "{}{}{} {}{:.6}, {:.6}{}",
            p.gray, branch, p.reset, p.cyan, coordinate.lat, coordinate.lon, p.reset
        );
    }

    let _ = write!(
        out,
        "{}Graph: {} nodes, {} segments ({} features used, {} skipped){}",
        p.gray,
        format_with_separators(route.stats.nodes as u64),
        format_with_separators(route.stats.segments as u64),
        route.stats.accepted,
        route.stats.rejected,
        p.reset
    );
    out
}

fn describe_endpoint(endpoint: &SnappedEndpoint) -> String {
    let how = if endpoint.snapped {
        "snapped onto waterway"
    } else {
        "nearest node"
    };
    format!(
        "{:.6}, {:.6} (node {}, {})",
        endpoint.coordinate.lat, endpoint.coordinate.lon, endpoint.node, how
    )
}

/// Metres below one kilometre, kilometres with two decimals above.
pub fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{:.0} m", metres)
    } else {
        format!("{:.2} km", metres / 1000.0)
    }
}

/// `1h 05m` style for an hour or more, `4m 10s` below.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m {:02}s", minutes, secs)
    }
}
