//! Subcommand handlers
//!
//! Each handler talks to the client traits only and returns the text to print,
//! so they can be exercised against mocks.

use std::fmt::Write as _;

use domain::{Coordinate, Costing};
use integration_valhalla::{Reachability, ReachabilityFilter, RouteOutcome, RoutingClient, Trip};

/// Route through `locations`; `None` when no endpoint produced a trip
pub async fn route(
    client: &dyn RoutingClient,
    locations: &[Coordinate],
    costing: Costing,
) -> Option<String> {
    let outcome = client.compute_route(locations, costing).await;
    let header = route_header(&outcome, locations.len(), costing);
    outcome.trip().map(|trip| format!("{header}\n{}", format_trip(trip)))
}

fn route_header(outcome: &RouteOutcome, stops: usize, costing: Costing) -> String {
    let via = match (outcome.endpoint(), outcome.primary_error()) {
        (Some(endpoint), Some(e)) => format!("via {} (optimized_route failed: {e})", endpoint.path()),
        (Some(endpoint), None) => format!("via {}", endpoint.path()),
        (None, _) => "no route".to_string(),
    };
    format!(
        "{} {} · {stops} stops · {via}",
        costing.emoji(),
        costing.label()
    )
}

/// Human-readable trip report
pub fn format_trip(trip: &Trip) -> String {
    let mut out = String::new();

    let unit = trip.length_unit();
    let _ = writeln!(out, "📏 Total: {}", trip.summary.describe(unit));
    let _ = writeln!(out, "🛣️  {}", trip.summary.format_flags());

    for (index, leg) in trip.legs.iter().enumerate() {
        let points = leg.coordinates().map_or(0, |path| path.len());
        let _ = writeln!(
            out,
            "Leg {}: {} · {} maneuvers · {points} points",
            index + 1,
            leg.summary.describe(unit),
            leg.maneuvers.len()
        );
        for (step, maneuver) in leg.maneuvers.iter().enumerate() {
            let _ = writeln!(out, "   {}. {maneuver}", step + 1);
        }
    }

    out
}

/// Classify candidates against the isochrone around `center`
pub async fn reachable(
    filter: &dyn ReachabilityFilter,
    center: Coordinate,
    minutes: u32,
    candidates: &[Coordinate],
    costing: Costing,
) -> String {
    let classified = filter
        .classify_reachability(center, minutes, candidates, costing)
        .await;

    let mut out = format!(
        "{} {} · {minutes} min from {center}\n",
        costing.emoji(),
        costing.label()
    );
    out.push_str(&format_reachability(&classified));
    out
}

/// One line per candidate plus the reachable share
pub fn format_reachability(classified: &[Reachability]) -> String {
    let mut out = String::new();

    for entry in classified {
        let mark = if entry.reachable { "✅" } else { "❌" };
        let _ = writeln!(out, "{mark} {}", entry.coordinate);
    }

    let reachable = classified.iter().filter(|r| r.reachable).count();
    let _ = writeln!(
        out,
        "Reachable: {reachable}/{} ({:.0}%)",
        classified.len(),
        Reachability::ratio(classified) * 100.0
    );

    out
}
