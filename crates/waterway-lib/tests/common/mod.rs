//! Common test utilities and fixture helpers.
//!
//! Builds small synthetic waterway networks and provides a scripted
//! [`CorridorFetcher`] that records every request it receives.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use futures::future::BoxFuture;
use waterway_lib::{BoundingBox, Coordinate, CorridorFetcher, Error, Feature, FeatureCollection, Result};

/// Metres per degree of longitude on the equator for a 6,371 km sphere.
pub const METRES_PER_DEGREE: f64 = 111_194.926_644_558_73;

/// Longitude offset (degrees) covering `metres` along the equator.
pub fn equator_degrees(metres: f64) -> f64 {
    metres / METRES_PER_DEGREE
}

pub fn line(points: &[(f64, f64)], tags: &[(&str, &str)]) -> Feature {
    Feature::line(
        points
            .iter()
            .map(|&(lat, lon)| Coordinate::new(lat, lon))
            .collect(),
        tags.iter().copied(),
    )
}

pub fn canal(points: &[(f64, f64)]) -> Feature {
    line(points, &[("waterway", "canal")])
}

/// A straight 1,000 m canal along the equator split into three segments,
/// plus a 50 m wide river closed to boats branching north from its middle.
pub fn canal_with_closed_branch() -> FeatureCollection {
    let step = equator_degrees(1_000.0) / 3.0;
    let canal_a = canal(&[(0.0, 0.0), (0.0, step)]);
    let canal_b = canal(&[(0.0, step), (0.0, 2.0 * step)]);
    let canal_c = canal(&[(0.0, 2.0 * step), (0.0, 3.0 * step)]);
    let branch = line(
        &[(0.0, 1.5 * step), (0.002, 1.5 * step), (0.004, 1.6 * step)],
        &[("waterway", "river"), ("width", "50"), ("boat", "no")],
    );
    FeatureCollection::new(vec![canal_a, branch, canal_b, canal_c])
}

/// Scripted fetcher keyed by request label (`corridor`, `tile-0`, ...).
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, FeatureCollection>,
    failing: HashSet<String>,
    fail_all: bool,
    calls: Mutex<Vec<(String, BoundingBox)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_everything() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn respond(mut self, label: &str, collection: FeatureCollection) -> Self {
        self.responses.insert(label.to_string(), collection);
        self
    }

    pub fn fail(mut self, label: &str) -> Self {
        self.failing.insert(label.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, BoundingBox)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|(label, _)| label).collect()
    }
}

impl CorridorFetcher for MockFetcher {
    fn fetch<'a>(
        &'a self,
        bbox: BoundingBox,
        label: &'a str,
    ) -> BoxFuture<'a, Result<FeatureCollection>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((label.to_string(), bbox));

        let result = if self.fail_all || self.failing.contains(label) {
            Err(Error::UpstreamStatus {
                status: 504,
                body: "gateway timeout".to_string(),
            })
        } else {
            Ok(self.responses.get(label).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }
}
