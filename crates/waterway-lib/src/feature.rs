//! Tagged geometry features and the navigability policy applied to them.
//!
//! Features arrive in the shape produced by an Overpass `out geom` query:
//! `way` elements carry a `geometry` array of `{lat, lon}` vertices, `node`
//! elements carry a single `lat`/`lon`. Both carry a free-form `tags` map.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::Coordinate;

/// Rivers narrower than this (metres) need an explicit access tag.
pub const MIN_RIVER_WIDTH_M: f64 = 10.0;

/// Tag keys that grant or deny access to powered and commercial craft.
pub const ACCESS_TAGS: [&str; 3] = ["boat", "motorboat", "ship"];

/// Geometry type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Point,
    Line,
}

/// A tagged point or line feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Option<i64>,
    pub kind: FeatureKind,
    pub coordinates: Vec<Coordinate>,
    pub tags: BTreeMap<String, String>,
}

impl Feature {
    /// Line feature with the given vertices and tags.
    pub fn line<I, K, V>(coordinates: Vec<Coordinate>, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: None,
            kind: FeatureKind::Line,
            coordinates,
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Waterway type declared by the `waterway` tag, if it is a navigable one.
    pub fn waterway_kind(&self) -> Option<WaterwayKind> {
        self.tag("waterway").and_then(WaterwayKind::parse)
    }

    /// Declared width in metres. Only the leading numeric part of the tag is
    /// read, so `"7 m"` yields `7.0`.
    pub fn width_m(&self) -> Option<f64> {
        let raw = self.tag("width")?.trim();
        let end = raw
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(raw.len());
        raw[..end].parse::<f64>().ok().filter(|w| w.is_finite())
    }

    /// Classify the feature against the navigability policy.
    pub fn navigability(&self) -> std::result::Result<WaterwayKind, Rejection> {
        if self.kind != FeatureKind::Line {
            return Err(Rejection::NotALine);
        }
        let kind = self.waterway_kind().ok_or(Rejection::NotNavigableType)?;

        if kind == WaterwayKind::River {
            let access: Vec<Access> = ACCESS_TAGS
                .iter()
                .map(|key| Access::from_tag(self.tag(key)))
                .collect();

            if access.contains(&Access::Denied) {
                return Err(Rejection::AccessDenied);
            }

            let narrow = self.width_m().is_some_and(|w| w < MIN_RIVER_WIDTH_M);
            if narrow && !access.contains(&Access::Granted) {
                return Err(Rejection::NarrowRiver);
            }
        }

        if self.coordinates.len() < 2 {
            return Err(Rejection::TooFewVertices);
        }

        Ok(kind)
    }

    pub fn is_navigable(&self) -> bool {
        self.navigability().is_ok()
    }
}

/// Waterway types considered navigable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterwayKind {
    Canal,
    River,
    Fairway,
    Shipyard,
    NavigationChannel,
}

impl WaterwayKind {
    pub const ALL: [WaterwayKind; 5] = [
        WaterwayKind::Canal,
        WaterwayKind::River,
        WaterwayKind::Fairway,
        WaterwayKind::Shipyard,
        WaterwayKind::NavigationChannel,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "canal" => Some(WaterwayKind::Canal),
            "river" => Some(WaterwayKind::River),
            "fairway" => Some(WaterwayKind::Fairway),
            "shipyard" => Some(WaterwayKind::Shipyard),
            "navigation_channel" | "navigation-channel" => Some(WaterwayKind::NavigationChannel),
            _ => None,
        }
    }

    /// Canonical tag value.
    pub fn tag_value(self) -> &'static str {
        match self {
            WaterwayKind::Canal => "canal",
            WaterwayKind::River => "river",
            WaterwayKind::Fairway => "fairway",
            WaterwayKind::Shipyard => "shipyard",
            WaterwayKind::NavigationChannel => "navigation_channel",
        }
    }
}

impl fmt::Display for WaterwayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Granted,
    Denied,
    Unspecified,
}

impl Access {
    fn from_tag(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("yes" | "designated" | "permissive") => Access::Granted,
            Some("no") => Access::Denied,
            _ => Access::Unspecified,
        }
    }
}

/// Why a feature was left out of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotALine,
    NotNavigableType,
    NarrowRiver,
    AccessDenied,
    TooFewVertices,
}

/// Ordered set of features handed to the graph builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Append `other`, skipping features whose id has already been seen.
    /// Features without an id are always kept.
    pub fn merge(&mut self, other: FeatureCollection) {
        let mut seen: HashSet<(FeatureKind, i64)> = self
            .features
            .iter()
            .filter_map(|f| f.id.map(|id| (f.kind, id)))
            .collect();
        for feature in other.features {
            if let Some(id) = feature.id {
                if !seen.insert((feature.kind, id)) {
                    continue;
                }
            }
            self.features.push(feature);
        }
    }

    /// Parse an Overpass JSON response (`out geom`).
    pub fn from_overpass_json(json: &str) -> Result<Self> {
        let response: OverpassResponse = serde_json::from_str(json)?;
        let features = response
            .elements
            .into_iter()
            .filter_map(OverpassElement::into_feature)
            .collect();
        Ok(Self { features })
    }

    /// Serialise back to the Overpass JSON shape accepted by
    /// [`FeatureCollection::from_overpass_json`].
    pub fn to_overpass_json(&self) -> Result<String> {
        let response = OverpassResponse {
            elements: self.features.iter().map(OverpassElement::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&response)?)
    }

    /// Read an Overpass JSON file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_overpass_json(&json)
    }

    /// Write the collection to disk in the shape [`FeatureCollection::load`] reads.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_overpass_json()?)?;
        Ok(())
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    geometry: Vec<Option<Coordinate>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
}

impl OverpassElement {
    fn into_feature(self) -> Option<Feature> {
        match self.element_type.as_str() {
            "way" => {
                let coordinates: Vec<Coordinate> = self.geometry.into_iter().flatten().collect();
                if coordinates.is_empty() {
                    return None;
                }
                Some(Feature {
                    id: self.id,
                    kind: FeatureKind::Line,
                    coordinates,
                    tags: self.tags,
                })
            }
            "node" => Some(Feature {
                id: self.id,
                kind: FeatureKind::Point,
                coordinates: vec![Coordinate::new(self.lat?, self.lon?)],
                tags: self.tags,
            }),
            _ => None,
        }
    }
}

impl From<&Feature> for OverpassElement {
    fn from(feature: &Feature) -> Self {
        match feature.kind {
            FeatureKind::Line => OverpassElement {
                element_type: "way".to_string(),
                id: feature.id,
                lat: None,
                lon: None,
                geometry: feature.coordinates.iter().copied().map(Some).collect(),
                tags: feature.tags.clone(),
            },
            FeatureKind::Point => OverpassElement {
                element_type: "node".to_string(),
                id: feature.id,
                lat: feature.coordinates.first().map(|c| c.lat),
                lon: feature.coordinates.first().map(|c| c.lon),
                geometry: Vec::new(),
                tags: feature.tags.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn river(tags: &[(&str, &str)]) -> Feature {
        let mut all = vec![("waterway", "river")];
        all.extend_from_slice(tags);
        Feature::line(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01)],
            all,
        )
    }

    #[test]
    fn recognises_navigable_types() {
        assert_eq!(WaterwayKind::parse("canal"), Some(WaterwayKind::Canal));
        assert_eq!(
            WaterwayKind::parse("navigation-channel"),
            Some(WaterwayKind::NavigationChannel)
        );
        assert_eq!(WaterwayKind::parse("stream"), None);
        assert_eq!(WaterwayKind::parse("ditch"), None);
        assert_eq!(WaterwayKind::parse("drain"), None);
    }

    #[test]
    fn untagged_and_stream_features_are_rejected() {
        let untagged = Feature::line(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)],
            Vec::<(String, String)>::new(),
        );
        assert_eq!(untagged.navigability(), Err(Rejection::NotNavigableType));

        let stream = Feature::line(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)],
            [("waterway", "stream")],
        );
        assert_eq!(stream.navigability(), Err(Rejection::NotNavigableType));
    }

    #[test]
    fn narrow_river_needs_affirmative_access() {
        assert_eq!(
            river(&[("width", "5")]).navigability(),
            Err(Rejection::NarrowRiver)
        );
        assert!(river(&[("width", "5"), ("motorboat", "yes")]).is_navigable());
        assert!(river(&[("width", "5"), ("ship", "designated")]).is_navigable());
        assert!(river(&[("width", "12")]).is_navigable());
        assert!(river(&[]).is_navigable());
    }

    #[test]
    fn negative_access_rejects_any_river() {
        assert_eq!(
            river(&[("width", "50"), ("boat", "no")]).navigability(),
            Err(Rejection::AccessDenied)
        );
        assert_eq!(
            river(&[("boat", "no"), ("ship", "yes")]).navigability(),
            Err(Rejection::AccessDenied)
        );
    }

    #[test]
    fn access_tags_do_not_affect_canals() {
        let canal = Feature::line(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)],
            [("waterway", "canal"), ("boat", "no"), ("width", "3")],
        );
        assert!(canal.is_navigable());
    }

    #[test]
    fn width_reads_leading_number() {
        assert_eq!(river(&[("width", "7 m")]).width_m(), Some(7.0));
        assert_eq!(river(&[("width", "12.5")]).width_m(), Some(12.5));
        assert_eq!(river(&[("width", "wide")]).width_m(), None);
    }

    #[test]
    fn single_vertex_line_is_rejected() {
        let stub = Feature::line(vec![Coordinate::new(0.0, 0.0)], [("waterway", "canal")]);
        assert_eq!(stub.navigability(), Err(Rejection::TooFewVertices));
    }

    #[test]
    fn parses_overpass_elements() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "way", "id": 10, "tags": {"waterway": "canal"},
                 "geometry": [{"lat": 52.0, "lon": 4.0}, null, {"lat": 52.001, "lon": 4.0}]},
                {"type": "node", "id": 11, "lat": 52.0, "lon": 4.0, "tags": {"leisure": "marina"}},
                {"type": "relation", "id": 12}
            ]
        }"#;
        let collection = FeatureCollection::from_overpass_json(json).expect("valid json");
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].kind, FeatureKind::Line);
        assert_eq!(collection.features[0].coordinates.len(), 2);
        assert_eq!(collection.features[0].tag("waterway"), Some("canal"));
        assert_eq!(collection.features[1].kind, FeatureKind::Point);
    }

    #[test]
    fn merge_skips_repeated_ids() {
        let a = Feature::line(vec![Coordinate::new(0.0, 0.0)], [("waterway", "canal")]);
        let mut left = FeatureCollection::new(vec![a.clone().with_id(1)]);
        left.merge(FeatureCollection::new(vec![
            a.clone().with_id(1),
            a.clone().with_id(2),
            a.clone(),
        ]));
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn merge_keeps_points_and_lines_sharing_an_id() {
        let line =
            Feature::line(vec![Coordinate::new(0.0, 0.0)], [("waterway", "canal")]).with_id(5);
        let point = Feature {
            kind: FeatureKind::Point,
            ..line.clone()
        };
        let mut merged = FeatureCollection::new(vec![line.clone()]);
        merged.merge(FeatureCollection::new(vec![point, line]));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.features[1].kind, FeatureKind::Point);
    }

    #[test]
    fn files_are_written_and_read_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("geometry.json");
        let collection = FeatureCollection::new(vec![river(&[("width", "20")]).with_id(8)]);

        collection.save(&path).expect("writes");
        assert_eq!(FeatureCollection::load(&path).expect("reads"), collection);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            FeatureCollection::load(&missing),
            Err(crate::error::Error::Io(_))
        ));
    }

    #[test]
    fn overpass_serialisation_is_readable_again() {
        let collection = FeatureCollection::new(vec![river(&[("width", "20")]).with_id(4)]);
        let json = collection.to_overpass_json().expect("serialises");
        let parsed = FeatureCollection::from_overpass_json(&json).expect("parses");
        assert_eq!(parsed, collection);
    }
}
