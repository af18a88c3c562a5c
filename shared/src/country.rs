use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use geojson::{Feature, GeoJson, PolygonType, Value as GeoValue};

use crate::properties::{self, Properties};

/// Where the host serves the boundary collection.
pub const BOUNDARY_DATA_PATH: &str = "/data/countries.geojson";

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(#[from] geojson::Error),
    #[error("payload is not a FeatureCollection")]
    NotFeatureCollection,
}

/// One country boundary with its descriptive properties. Coordinates are
/// `x = longitude`, `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub boundary: MultiPolygon<f64>,
    pub properties: Properties,
}

impl CountryFeature {
    pub fn new(boundary: MultiPolygon<f64>, properties: Properties) -> Self {
        Self {
            boundary,
            properties,
        }
    }

    /// Convert a GeoJSON feature. Geometry kinds other than Polygon and
    /// MultiPolygon yield an empty boundary so the feature is still counted.
    pub fn from_geojson(feature: Feature) -> Self {
        let boundary = feature
            .geometry
            .as_ref()
            .map(|geometry| boundary_from_value(&geometry.value))
            .unwrap_or_else(|| MultiPolygon(Vec::new()));
        Self::new(boundary, feature.properties.unwrap_or_default())
    }

    pub fn display_name(&self) -> String {
        properties::display_name(&self.properties)
    }

    pub fn popup_name(&self) -> String {
        properties::popup_name(&self.properties)
    }

    pub fn iso_code(&self) -> Option<String> {
        properties::iso_code(&self.properties)
    }

    /// Native-language name, only when it differs from the display name.
    pub fn native_name(&self) -> Option<String> {
        let native = properties::native_name(&self.properties)?;
        (native != self.display_name()).then_some(native)
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.boundary.bounding_rect()
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.boundary.contains(&Point::new(lng, lat))
    }
}

/// Parse a GeoJSON FeatureCollection body into country features, keeping
/// payload order.
pub fn parse_feature_collection(body: &str) -> Result<Vec<CountryFeature>, BoundaryError> {
    let geojson: GeoJson = body.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(BoundaryError::NotFeatureCollection);
    };
    Ok(collection
        .features
        .into_iter()
        .map(CountryFeature::from_geojson)
        .collect())
}

fn boundary_from_value(value: &GeoValue) -> MultiPolygon<f64> {
    match value {
        GeoValue::Polygon(rings) => MultiPolygon(polygon_from_rings(rings).into_iter().collect()),
        GeoValue::MultiPolygon(polygons) => MultiPolygon(
            polygons
                .iter()
                .filter_map(|rings| polygon_from_rings(rings))
                .collect(),
        ),
        _ => MultiPolygon(Vec::new()),
    }
}

fn polygon_from_rings(rings: &PolygonType) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| Coord {
                x: position[0],
                y: position[1],
            })
            .collect::<LineString<f64>>()
    });
    let exterior = rings.next()?;
    if exterior.0.is_empty() {
        return None;
    }
    Some(Polygon::new(exterior, rings.collect()))
}
