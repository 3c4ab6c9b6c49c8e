// GeoJSON boundary collections

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geo::{MultiPolygon, Polygon};
use geojson::{feature, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};

use geobounds_recon::model::{Attributes, BoundaryCollection, Region, Role};
use geobounds_recon::Crs;

use crate::IoError;

/// Load a FeatureCollection of (multi)polygons as a boundary collection.
///
/// `crs` is what the caller says the coordinates are in. A legacy `crs` member
/// in the file is only checked against it, never used in its place.
pub fn load_collection(
    path: &Path,
    role: Role,
    id_field: &str,
    crs: &Crs,
) -> Result<BoundaryCollection, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let collection = parse_collection(&text, path, role, id_field, crs)?;
    log::info!(
        "loaded {} {} regions from {}",
        collection.len(),
        role,
        path.display()
    );
    Ok(collection)
}

/// Parse GeoJSON text. `path` is only used in error messages.
pub fn parse_collection(
    text: &str,
    path: &Path,
    role: Role,
    id_field: &str,
    crs: &Crs,
) -> Result<BoundaryCollection, IoError> {
    let geojson_error = |message: String| IoError::GeoJson {
        path: path.to_path_buf(),
        message,
    };

    let fc = match text.parse::<GeoJson>() {
        Ok(GeoJson::FeatureCollection(fc)) => fc,
        Ok(_) => return Err(geojson_error("expected a FeatureCollection".into())),
        Err(e) => return Err(geojson_error(e.to_string())),
    };

    check_declared_crs(&fc, path, role, crs)?;

    let mut regions = Vec::with_capacity(fc.features.len());
    for (index, feature) in fc.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let id = region_id(&properties, id_field).ok_or_else(|| IoError::MissingId {
            path: path.to_path_buf(),
            feature: index,
            field: id_field.to_string(),
        })?;
        let geometry = match feature.geometry {
            Some(geometry) => to_multipolygon(geometry, path, index)?,
            // Kept so the engine reports it as empty.
            None => MultiPolygon::new(Vec::new()),
        };
        regions.push(Region::new(id, geometry).with_attributes(properties));
    }

    Ok(BoundaryCollection::new(role, crs.clone(), regions)?)
}

fn region_id(properties: &JsonObject, id_field: &str) -> Option<String> {
    match properties.get(id_field)? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_multipolygon(geometry: Geometry, path: &Path, index: usize) -> Result<MultiPolygon<f64>, IoError> {
    let converted = match &geometry.value {
        geojson::Value::Polygon(_) => {
            Polygon::<f64>::try_from(geometry.value).map(|p| MultiPolygon::new(vec![p]))
        }
        geojson::Value::MultiPolygon(_) => MultiPolygon::<f64>::try_from(geometry.value),
        other => {
            return Err(IoError::UnsupportedGeometry {
                path: path.to_path_buf(),
                feature: index,
                kind: kind_name(other).to_string(),
            })
        }
    };
    converted.map_err(|e| IoError::GeoJson {
        path: path.to_path_buf(),
        message: format!("feature {index}: {e}"),
    })
}

fn kind_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// `{"crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::4326"}}}`
fn check_declared_crs(
    fc: &FeatureCollection,
    path: &Path,
    role: Role,
    configured: &Crs,
) -> Result<(), IoError> {
    let Some(name) = fc
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str)
    else {
        return Ok(());
    };

    match Crs::parse(name) {
        Ok(declared) if &declared == configured => Ok(()),
        Ok(declared) => Err(IoError::DeclaredCrs {
            path: path.to_path_buf(),
            role,
            declared,
            configured: configured.clone(),
        }),
        Err(_) => {
            log::warn!("{}: ignoring unrecognised crs member '{name}'", path.display());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Build a feature with the region id as the feature id.
pub fn feature(id: Option<String>, geometry: &MultiPolygon<f64>, properties: Attributes) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(geometry))),
        id: id.map(feature::Id::String),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write a collection with its attributes, plus `match_id` / `match_fraction`
/// on regions that carry a match record.
pub fn write_collection(path: &Path, collection: &BoundaryCollection) -> Result<(), IoError> {
    let features = collection
        .regions()
        .iter()
        .map(|region| {
            let mut properties = region.attributes.clone();
            if let Some(record) = &region.match_record {
                properties.insert("match_id".into(), record.matched_region_id.clone().into());
                properties.insert("match_fraction".into(), record.overlap_fraction.into());
            }
            feature(Some(region.id.clone()), &region.geometry, properties)
        })
        .collect();
    write_features(path, features)
}

pub fn write_features(path: &Path, features: Vec<Feature>) -> Result<(), IoError> {
    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    serde_json::to_writer(BufWriter::new(file), &fc).map_err(|e| IoError::write(path, e))?;
    log::debug!("wrote {} features to {}", fc.features.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Rect};
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"OBJECTID": 7, "name": "North"},
      "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
    },
    {
      "type": "Feature",
      "properties": {"OBJECTID": "B-2", "name": "South"},
      "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,-1],[1,-1],[1,0],[0,0],[0,-1]]]]}
    }
  ]
}"#;

    fn parse(text: &str) -> Result<BoundaryCollection, IoError> {
        parse_collection(text, Path::new("test.geojson"), Role::Reference, "OBJECTID", &Crs::wgs84())
    }

    #[test]
    fn parses_polygons_and_ids() {
        let c = parse(SAMPLE).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.role(), Role::Reference);
        assert_eq!(c.regions()[0].id, "7");
        assert_eq!(c.regions()[1].id, "B-2");
        assert_eq!(c.regions()[0].attributes["name"], "North");
        assert!((c.regions()[1].geometry.unsigned_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_id_is_an_error() {
        let text = SAMPLE.replace("\"OBJECTID\": 7, ", "");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, IoError::MissingId { feature: 0, .. }));
        assert!(err.to_string().contains("'OBJECTID'"));
    }

    #[test]
    fn rejects_points() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"OBJECTID":1},"geometry":{"type":"Point","coordinates":[0,0]}}]}"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn null_geometry_becomes_empty_region() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"OBJECTID":1},"geometry":null}]}"#;
        let c = parse(text).unwrap();
        assert!(c.regions()[0].geometry.0.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let text = SAMPLE.replace("\"B-2\"", "7");
        assert!(matches!(parse(&text), Err(IoError::Collection(_))));
    }

    #[test]
    fn declared_crs_must_agree() {
        let with_crs = |name: &str| {
            SAMPLE.replacen(
                "\"type\": \"FeatureCollection\",",
                &format!(
                    "\"type\": \"FeatureCollection\", \"crs\": {{\"type\": \"name\", \"properties\": {{\"name\": \"{name}\"}}}},"
                ),
                1,
            )
        };
        assert!(parse(&with_crs("urn:ogc:def:crs:OGC:1.3:CRS84")).is_ok());
        let err = parse(&with_crs("urn:ogc:def:crs:EPSG::3857")).unwrap_err();
        assert!(matches!(err, IoError::DeclaredCrs { .. }));
    }

    #[test]
    fn not_a_feature_collection() {
        let err = parse(r#"{"type":"Point","coordinates":[0,0]}"#).unwrap_err();
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn write_then_load_keeps_ids_and_match_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidate_bounds.geojson");

        let mut attrs = Attributes::new();
        attrs.insert("OBJECTID".into(), "c1".into());
        let region = Region::new("c1", Rect::new((0.0, 0.0), (2.0, 1.0)).to_polygon())
            .with_attributes(attrs)
            .with_match(Some(geobounds_recon::MatchRecord {
                matched_region_id: "r9".into(),
                overlap_fraction: 0.5,
            }));
        let c = BoundaryCollection::new(Role::Candidate, Crs::wgs84(), vec![region]).unwrap();
        write_collection(&path, &c).unwrap();

        let loaded = load_collection(&path, Role::Candidate, "OBJECTID", &Crs::wgs84()).unwrap();
        let r = &loaded.regions()[0];
        assert_eq!(r.id, "c1");
        assert_eq!(r.attributes["match_id"], "r9");
        assert_eq!(r.attributes["match_fraction"], 0.5);
        assert!((r.geometry.unsigned_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_collection(
            Path::new("/nonexistent/bounds.geojson"),
            Role::Reference,
            "id",
            &Crs::wgs84(),
        )
        .unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}
