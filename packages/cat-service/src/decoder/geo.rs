use serde_json::Value;

use cat_domain::{GeoRelation, GeoShape, Query};

use super::QueryIntent;
use crate::{Error, Result};

const DEFAULT_GEOPROPERTY: &str = "location";
const DETAIL_INVALID_GEO_PARAMETER: &str = "Missing/Invalid geo parameters";
const DETAIL_POLYGON_MISMATCH: &str = "Coordinate mismatch (Polygon)";

pub(super) fn build(intent: &QueryIntent) -> Result<Query> {
	let geometry = intent.geometry.as_deref().unwrap_or_default().to_ascii_lowercase();
	let coordinates = intent.coordinates.as_ref();
	let shape = match geometry.as_str() {
		"point" => GeoShape::Circle {
			center: position(coordinates.ok_or_else(invalid_parameter)?)?,
			radius_m: intent.max_distance.ok_or_else(invalid_parameter)?,
		},
		"polygon" => {
			let rings = rings(coordinates.ok_or_else(invalid_parameter)?)?;

			if !is_closed(&rings) {
				return Err(Error::InvalidGeoValue { detail: DETAIL_POLYGON_MISMATCH.to_string() });
			}

			GeoShape::Polygon(rings)
		},
		"linestring" => GeoShape::LineString(positions(coordinates.ok_or_else(invalid_parameter)?)?),
		"bbox" => {
			let corners = positions(coordinates.ok_or_else(invalid_parameter)?)?;
			let [upper_left, lower_right] = corners.as_slice() else {
				return Err(invalid_parameter());
			};

			GeoShape::Envelope([*upper_left, *lower_right])
		},
		_ => return Err(invalid_parameter()),
	};
	let relation = intent
		.georelation
		.as_deref()
		.and_then(GeoRelation::parse)
		.ok_or_else(invalid_parameter)?;
	let geoproperty = intent
		.geoproperty
		.as_deref()
		.map(str::trim)
		.filter(|property| !property.is_empty())
		.unwrap_or(DEFAULT_GEOPROPERTY);

	Ok(Query::GeoShape { field: format!("{geoproperty}.geometry"), shape, relation })
}

/// A ring is closed when its first and last positions are equal in both components.
fn is_closed(rings: &[Vec<[f64; 2]>]) -> bool {
	let Some(outer) = rings.first() else {
		return false;
	};

	match (outer.first(), outer.last()) {
		(Some(first), Some(last)) => first[0] == last[0] && first[1] == last[1],
		_ => false,
	}
}

fn position(value: &Value) -> Result<[f64; 2]> {
	let Some([lon, lat]) = value.as_array().map(Vec::as_slice) else {
		return Err(invalid_parameter());
	};

	match (lon.as_f64(), lat.as_f64()) {
		(Some(lon), Some(lat)) => Ok([lon, lat]),
		_ => Err(invalid_parameter()),
	}
}

fn positions(value: &Value) -> Result<Vec<[f64; 2]>> {
	let items = value.as_array().ok_or_else(invalid_parameter)?;

	if items.is_empty() {
		return Err(invalid_parameter());
	}

	items.iter().map(position).collect()
}

fn rings(value: &Value) -> Result<Vec<Vec<[f64; 2]>>> {
	let items = value.as_array().ok_or_else(invalid_parameter)?;

	if items.is_empty() {
		return Err(invalid_parameter());
	}

	items.iter().map(positions).collect()
}

fn invalid_parameter() -> Error {
	Error::InvalidGeoParameter { detail: DETAIL_INVALID_GEO_PARAMETER.to_string() }
}
