use super::{mismatch, ValueError, ValueHandler, ValueNode, ValueResult};
use crate::core::vocabulary::{geo, xsd};
use crate::core::Vocabulary;
use crate::model::{DataValue, GlobeCoordinateValue};
use crate::sink::RdfObject;

pub const GLOBE_EARTH: &str = "http://www.wikidata.org/entity/Q2";

pub struct GlobeCoordinateHandler;

impl GlobeCoordinateHandler {
    fn coordinate(value: &DataValue) -> ValueResult<&GlobeCoordinateValue> {
        match value {
            DataValue::GlobeCoordinate(c) if c.latitude.is_finite() && c.longitude.is_finite() => Ok(c),
            DataValue::GlobeCoordinate(_) => Err(ValueError::Malformed("non-finite coordinate".to_string())),
            other => Err(mismatch("globecoordinate", other)),
        }
    }
}

impl ValueHandler for GlobeCoordinateHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        let coordinate = Self::coordinate(value)?;
        let point = format!("Point({} {})", coordinate.longitude, coordinate.latitude);

        let wkt = if coordinate.globe.is_empty() || coordinate.globe == GLOBE_EARTH {
            point
        } else {
            format!("<{}> {}", coordinate.globe, point)
        };
        Ok(RdfObject::typed(wkt, geo::WKT_LITERAL))
    }

    fn value_node(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<Option<ValueNode>> {
        let coordinate = Self::coordinate(value)?;

        let mut node = ValueNode::new("GlobecoordinateValue")
            .with("geoLatitude", RdfObject::typed(coordinate.latitude.to_string(), xsd::DOUBLE))
            .with("geoLongitude", RdfObject::typed(coordinate.longitude.to_string(), xsd::DOUBLE));
        if let Some(precision) = coordinate.precision {
            node = node.with("geoPrecision", RdfObject::typed(precision.to_string(), xsd::DOUBLE));
        }

        let globe = if coordinate.globe.is_empty() { GLOBE_EARTH } else { coordinate.globe.as_str() };
        Ok(Some(node.with("geoGlobe", RdfObject::iri(globe))))
    }
}
