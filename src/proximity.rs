//! Nearest-transit lookup around a point of interest.
//!
//! Given one origin point and the full stop catalogue across all routes,
//! find stops within a radius, group them by owning route, and cap each
//! group for display. Data volumes are small enough for a linear scan.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::geo_utils::haversine_distance;
use crate::{Coordinate, ProximityGroup, ProximityMatch, Route, Stop};

/// Configuration for the nearest-transit finder.
///
/// Radius and cap are display tunables sized for a mobile result popup,
/// not load-bearing invariants.
#[derive(Debug, Clone)]
pub struct ProximityConfig {
    /// Maximum stop distance from the origin, in meters.
    /// Default: 600.0
    pub radius_m: f64,

    /// Maximum matches kept per route (closest first).
    /// Default: 4
    pub per_route_cap: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_m: 600.0,
            per_route_cap: 4,
        }
    }
}

/// Find transit stops near an origin, grouped by route.
///
/// Stops without a usable coordinate or without a resolvable owning route
/// are excluded. Matches within each group are sorted ascending by distance
/// and truncated to the per-route cap; the groups themselves are ordered by
/// route display number so the result list reads deterministically,
/// independent of which stop happened to be closest.
///
/// An absent or unusable origin yields an empty result; that is the normal
/// "location not yet available" state, not an error. Either the full
/// filtered/grouped/sorted result is returned, or nothing.
pub fn find_nearby(
    origin: Option<Coordinate>,
    stops: &[Stop],
    routes: &[Route],
    config: &ProximityConfig,
) -> Vec<ProximityGroup> {
    let origin = match origin.filter(Coordinate::is_valid) {
        Some(o) => o,
        None => return Vec::new(),
    };

    let routes_by_id: HashMap<&str, &Route> =
        routes.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut matches: Vec<ProximityMatch> = stops
        .iter()
        .filter(|stop| routes_by_id.contains_key(stop.route_id.as_str()))
        .filter_map(|stop| {
            let location = stop.usable_location()?;
            let distance_m = haversine_distance(&origin, &location);
            (distance_m <= config.radius_m).then(|| ProximityMatch {
                stop: stop.clone(),
                distance_m,
            })
        })
        .collect();

    matches.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    // Group by route, preserving ascending distance order within each group
    let mut grouped: Vec<(String, Vec<ProximityMatch>)> = Vec::new();
    for m in matches {
        match grouped.iter_mut().find(|(id, _)| *id == m.stop.route_id) {
            Some((_, group)) => group.push(m),
            None => grouped.push((m.stop.route_id.clone(), vec![m])),
        }
    }

    let mut groups: Vec<ProximityGroup> = grouped
        .into_iter()
        .map(|(route_id, mut group_matches)| {
            group_matches.truncate(config.per_route_cap);
            ProximityGroup {
                route: (*routes_by_id[route_id.as_str()]).clone(),
                matches: group_matches,
            }
        })
        .collect();

    groups.sort_by(|a, b| compare_route_numbers(&a.route.number, &b.route.number));
    groups
}

/// Order route display numbers the way a rider reads them: numerically when
/// both are numeric ("2" before "10"), lexicographically otherwise.
pub fn compare_route_numbers(a: &str, b: &str) -> Ordering {
    let (a_num, a_rest) = split_numeric_prefix(a);
    let (b_num, b_rest) = split_numeric_prefix(b);

    match (a_num, b_num) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| a_rest.to_lowercase().cmp(&b_rest.to_lowercase())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn split_numeric_prefix(s: &str) -> (Option<u64>, &str) {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return (None, s);
    }
    (s[..digits].parse().ok(), &s[digits..])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Meters per degree of latitude for the haversine radius in use.
    const METERS_PER_DEG_LAT: f64 = 111_194.92664455873;

    fn point_north_of(origin: &Coordinate, meters: f64) -> Coordinate {
        Coordinate::new(origin.lat + meters / METERS_PER_DEG_LAT, origin.lng)
    }

    fn test_route(id: &str, number: &str) -> Route {
        Route::new(id, number, &format!("Linea {}", number), "#2980b9")
    }

    fn stop_at(id: &str, route_id: &str, location: Coordinate, order: u32) -> Stop {
        Stop::new(id, route_id, &format!("Parada {}", id), Some(location), order)
    }

    #[test]
    fn test_absent_origin_yields_empty() {
        let routes = vec![test_route("r1", "1")];
        let stops = vec![stop_at("s1", "r1", Coordinate::new(-2.9, -79.0), 0)];

        assert!(find_nearby(None, &stops, &routes, &ProximityConfig::default()).is_empty());
        assert!(find_nearby(
            Some(Coordinate::new(f64::NAN, 0.0)),
            &stops,
            &routes,
            &ProximityConfig::default()
        )
        .is_empty());
    }

    #[test]
    fn test_radius_filter() {
        // Stops at 120 m, 580 m, and 650 m: only the first two qualify,
        // closest first.
        let origin = Coordinate::new(-2.8974, -79.0045);
        let routes = vec![test_route("r1", "1")];
        let stops = vec![
            stop_at("near", "r1", point_north_of(&origin, 120.0), 0),
            stop_at("mid", "r1", point_north_of(&origin, 580.0), 1),
            stop_at("far", "r1", point_north_of(&origin, 650.0), 2),
        ];

        let groups = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        assert_eq!(groups.len(), 1);

        let matches = &groups[0].matches;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].stop.id, "near");
        assert_eq!(matches[1].stop.id, "mid");
        assert!((matches[0].distance_m - 120.0).abs() < 1.0);
        assert!((matches[1].distance_m - 580.0).abs() < 1.0);
        for m in matches {
            assert!(m.distance_m <= 600.0);
        }
    }

    #[test]
    fn test_per_route_cap_keeps_closest() {
        let origin = Coordinate::new(-2.8974, -79.0045);
        let routes = vec![test_route("r1", "1")];
        let stops: Vec<Stop> = (0..6)
            .map(|i| {
                stop_at(
                    &format!("s{}", i),
                    "r1",
                    point_north_of(&origin, 100.0 + i as f64 * 50.0),
                    i,
                )
            })
            .collect();

        let groups = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].matches.len(), 4);

        let ids: Vec<&str> = groups[0].matches.iter().map(|m| m.stop.id.as_str()).collect();
        assert_eq!(ids, vec!["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn test_unlocated_and_orphan_stops_excluded() {
        let origin = Coordinate::new(-2.8974, -79.0045);
        let routes = vec![test_route("r1", "1")];
        let stops = vec![
            stop_at("ok", "r1", point_north_of(&origin, 100.0), 0),
            Stop::new("no-coord", "r1", "Sin ubicar", None, 1),
            stop_at("orphan", "r-deleted", point_north_of(&origin, 100.0), 0),
        ];

        let groups = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].matches.len(), 1);
        assert_eq!(groups[0].matches[0].stop.id, "ok");
    }

    #[test]
    fn test_groups_ordered_by_route_number() {
        let origin = Coordinate::new(-2.8974, -79.0045);
        let routes = vec![
            test_route("r10", "10"),
            test_route("r2", "2"),
            test_route("rt", "T3"),
        ];
        // The stop on route 10 is closest, but group order follows the
        // display number, not proximity.
        let stops = vec![
            stop_at("a", "r10", point_north_of(&origin, 50.0), 0),
            stop_at("b", "r2", point_north_of(&origin, 300.0), 0),
            stop_at("c", "rt", point_north_of(&origin, 200.0), 0),
        ];

        let groups = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        let numbers: Vec<&str> = groups.iter().map(|g| g.route.number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "10", "T3"]);
    }

    #[test]
    fn test_deterministic() {
        let origin = Coordinate::new(-2.8974, -79.0045);
        let routes = vec![test_route("r1", "1"), test_route("r2", "2")];
        let stops = vec![
            stop_at("a", "r1", point_north_of(&origin, 150.0), 0),
            stop_at("b", "r2", point_north_of(&origin, 250.0), 0),
            stop_at("c", "r1", point_north_of(&origin, 350.0), 1),
        ];

        let first = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        let second = find_nearby(Some(origin), &stops, &routes, &ProximityConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_compare_route_numbers() {
        assert_eq!(compare_route_numbers("2", "10"), Ordering::Less);
        assert_eq!(compare_route_numbers("10", "2"), Ordering::Greater);
        assert_eq!(compare_route_numbers("3", "3"), Ordering::Equal);
        assert_eq!(compare_route_numbers("12", "T3"), Ordering::Less);
        assert_eq!(compare_route_numbers("T3", "t10"), Ordering::Greater);
        assert_eq!(compare_route_numbers("12A", "12B"), Ordering::Less);
    }
}
