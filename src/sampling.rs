//! Stop downsampling for legible map display.
//!
//! Dense routes can carry many dozens of stops; rendering every one of them
//! produces an unreadable marker cloud. The downsampler reduces an ordered
//! stop sequence to a "main stops" subset: endpoints, a fixed stride, and
//! every stop classified as a hub by its name.

use std::collections::HashSet;

use crate::{DisplayMode, Stop};

/// Configuration for the stop downsampler.
///
/// The stride formula and the dense threshold are tunable display
/// parameters, not load-bearing invariants; defaults reproduce the portal's
/// observed behavior.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Sequences at or below this length are returned unchanged.
    /// Default: 12
    pub dense_threshold: usize,

    /// Lower bound on the sampling stride.
    /// Default: 4
    pub min_step: usize,

    /// Divisor for the stride: `step = max(min_step, count / target_segments)`.
    /// Default: 12
    pub target_segments: usize,

    /// Keywords marking a stop as a hub, matched against the normalized
    /// stop name. Stored pre-normalized.
    pub hub_keywords: Vec<String>,

    /// Name normalization applied before keyword matching.
    /// Default: lowercase + Latin diacritic folding.
    pub normalize: fn(&str) -> String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        // Landmark vocabulary of the covered locale, plus English forms for
        // mixed-language stop catalogues.
        let keywords = [
            "terminal",
            "plaza",
            "hospital",
            "universidad",
            "university",
            "escuela",
            "school",
            "mercado",
            "market",
            "catedral",
            "cathedral",
            "parque",
            "park",
            "puente",
            "bridge",
            "gobernacion",
            "municipalidad",
            "municipal",
        ];

        Self {
            dense_threshold: 12,
            min_step: 4,
            target_segments: 12,
            hub_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            normalize: normalize_name,
        }
    }
}

/// Lowercase a stop name and fold common Latin diacritics, so that
/// "Catedral" matches "CATEDRAL" and "Calderón" matches "calderon".
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Whether a stop's name marks it as a hub (terminal, hospital, plaza, ...).
pub fn is_hub(stop: &Stop, config: &SamplerConfig) -> bool {
    let normalized = (config.normalize)(&stop.name);
    config
        .hub_keywords
        .iter()
        .any(|keyword| normalized.contains(keyword.as_str()))
}

/// Reduce an ordered stop sequence to a legible subset.
///
/// The input is one route's stops, already filtered to those with usable
/// coordinates and ordered by `order_index`. Sequences of at most
/// `dense_threshold` stops, and any sequence in [`DisplayMode::All`], are
/// returned unchanged.
///
/// For dense sequences the result always contains the first and last stop,
/// every stop at stride `max(min_step, count / target_segments)`, and every
/// hub stop; duplicates are removed keeping the first occurrence, and the
/// result is re-sorted by `order_index` so rendering order matches the
/// physical route order.
pub fn downsample_stops(stops: &[Stop], mode: DisplayMode, config: &SamplerConfig) -> Vec<Stop> {
    if mode == DisplayMode::All || stops.len() <= config.dense_threshold {
        return stops.to_vec();
    }

    let step = (stops.len() / config.target_segments).max(config.min_step.max(1));

    let include = |index: usize, result: &mut Vec<Stop>, seen: &mut HashSet<String>| {
        let stop = &stops[index];
        if seen.insert(stop.id.clone()) {
            result.push(stop.clone());
        }
    };

    let mut result: Vec<Stop> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    // Endpoints first
    include(0, &mut result, &mut seen_ids);
    include(stops.len() - 1, &mut result, &mut seen_ids);

    // Fixed stride through the sequence
    let mut i = 0;
    while i < stops.len() {
        include(i, &mut result, &mut seen_ids);
        i += step;
    }

    // Hubs are always shown regardless of stride
    for (index, stop) in stops.iter().enumerate() {
        if is_hub(stop, config) {
            include(index, &mut result, &mut seen_ids);
        }
    }

    result.sort_by_key(|s| s.order_index);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;

    fn plain_stops(count: u32) -> Vec<Stop> {
        (0..count)
            .map(|i| {
                Stop::new(
                    &format!("s{}", i),
                    "r1",
                    &format!("Calle {}", i),
                    Some(Coordinate::new(-2.90 + i as f64 * 0.001, -79.00)),
                    i,
                )
            })
            .collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("PARQUE CALDERÓN"), "parque calderon");
        assert_eq!(normalize_name("Año Nuevo"), "ano nuevo");
        assert_eq!(normalize_name("Terminal"), "terminal");
    }

    #[test]
    fn test_hub_classification() {
        let config = SamplerConfig::default();
        let hub = Stop::new("s1", "r1", "Catedral Vieja", Some(Coordinate::new(-2.9, -79.0)), 0);
        let plain = Stop::new("s2", "r1", "Calle Larga 3", Some(Coordinate::new(-2.9, -79.0)), 1);
        assert!(is_hub(&hub, &config));
        assert!(!is_hub(&plain, &config));

        // Diacritics and case in the catalogue name do not defeat matching
        let accented = Stop::new("s3", "r1", "HOSPITAL REGIONAL", Some(Coordinate::new(-2.9, -79.0)), 2);
        assert!(is_hub(&accented, &config));
    }

    #[test]
    fn test_short_sequence_unchanged() {
        let config = SamplerConfig::default();
        let stops = plain_stops(12);
        let result = downsample_stops(&stops, DisplayMode::MainOnly, &config);
        assert_eq!(result, stops);
    }

    #[test]
    fn test_show_all_bypasses_sampler() {
        let config = SamplerConfig::default();
        let stops = plain_stops(40);
        let result = downsample_stops(&stops, DisplayMode::All, &config);
        assert_eq!(result, stops);
    }

    #[test]
    fn test_degenerate_sequences_unchanged() {
        let config = SamplerConfig::default();
        assert!(downsample_stops(&[], DisplayMode::MainOnly, &config).is_empty());

        let one = plain_stops(1);
        assert_eq!(downsample_stops(&one, DisplayMode::MainOnly, &config), one);
    }

    #[test]
    fn test_forty_evenly_spaced_stops() {
        // 40 stops, no hub names: stride is max(4, 40 / 12) = 4, so the
        // result is indices {0, 4, 8, ..., 36} plus the final stop 39.
        let config = SamplerConfig::default();
        let stops = plain_stops(40);
        let result = downsample_stops(&stops, DisplayMode::MainOnly, &config);

        let indices: Vec<u32> = result.iter().map(|s| s.order_index).collect();
        let expected: Vec<u32> = (0..10).map(|i| i * 4).chain(std::iter::once(39)).collect();
        assert_eq!(indices, expected);
        assert_eq!(result.len(), 11);
    }

    #[test]
    fn test_subset_invariants() {
        let config = SamplerConfig::default();
        let mut stops = plain_stops(30);
        stops[7].name = "Mercado 10 de Agosto".to_string();
        stops[22].name = "Universidad Estatal".to_string();

        let result = downsample_stops(&stops, DisplayMode::MainOnly, &config);

        // Strict subset of the input
        assert!(result.len() < stops.len());
        for stop in &result {
            assert!(stops.iter().any(|s| s.id == stop.id));
        }

        // Endpoints always present
        assert_eq!(result.first().unwrap().order_index, 0);
        assert_eq!(result.last().unwrap().order_index, 29);

        // Hubs included even when off-stride
        assert!(result.iter().any(|s| s.id == "s7"));
        assert!(result.iter().any(|s| s.id == "s22"));

        // Monotonic in order_index, no duplicate ids
        let indices: Vec<u32> = result.iter().map(|s| s.order_index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_all_hubs_still_bounded() {
        let config = SamplerConfig::default();
        let stops: Vec<Stop> = (0..20)
            .map(|i| {
                Stop::new(
                    &format!("s{}", i),
                    "r1",
                    &format!("Plaza {}", i),
                    Some(Coordinate::new(-2.90 + i as f64 * 0.001, -79.00)),
                    i,
                )
            })
            .collect();

        let result = downsample_stops(&stops, DisplayMode::MainOnly, &config);
        // Every stop is a hub, so everything is kept exactly once
        assert_eq!(result.len(), stops.len());
        assert_eq!(result, stops);
    }
}
