use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::store::error::StoreError;

/// Marker every accepted image payload must carry. Payloads are stored
/// verbatim and never decoded server-side.
const EMBEDDED_IMAGE_PREFIX: &str = "data:image/";

/// Number of random characters appended to the millisecond timestamp when
/// generating record ids.
const ID_SUFFIX_LEN: usize = 9;

/// Sensor reading captured alongside a screenshot.
///
/// `water` and `light` are normalized fractions but may exceed 1.0 for
/// over-range sensor conditions. Any extra fields the client sent are kept
/// verbatim so the stored snapshot round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSnapshot {
    pub segment_id: i64,

    #[serde(default)]
    pub water: f64,

    #[serde(default)]
    pub light: f64,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One persisted capture: an embedded image payload plus the sensor reading
/// at capture time. Records are append-only; once written they are never
/// mutated, only cleared along with the whole collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRecord {
    /// Unique token assigned at creation
    pub id: String,

    /// Server-assigned creation time (ISO-8601 on the wire)
    pub timestamp: DateTime<Utc>,

    /// Camera/segment the capture belongs to; 0 is a legitimate id
    pub robot_id: i64,

    /// Embedded base64 image payload, stored verbatim
    pub image: String,

    /// Sensor snapshot at capture time
    pub segment_data: SegmentSnapshot,

    /// `[x, y]` in the simulation's coordinate space, if supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
}

/// Wire input for a save operation.
///
/// Every field is optional at the serde layer so presence is checked
/// explicitly: `robotId = 0` must be accepted, and a missing field must be
/// reported by name rather than as a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub robot_id: Option<i64>,
    pub image: Option<String>,
    pub segment_data: Option<Value>,
    pub position: Option<Value>,
}

impl ScreenshotRecord {
    /// Validates a save request and builds the record that will be appended,
    /// assigning `id` and `timestamp`. Runs before any storage access so a
    /// rejected request can never leave a partial write behind.
    pub fn from_request(request: SaveRequest) -> Result<Self, StoreError> {
        let robot_id = request.robot_id.ok_or_else(|| StoreError::missing("robotId"))?;

        let image = match request.image {
            Some(image) if image.is_empty() => {
                return Err(StoreError::invalid("image", "must not be empty"))
            }
            Some(image) => image,
            None => return Err(StoreError::missing("image")),
        };
        if !image.starts_with(EMBEDDED_IMAGE_PREFIX) {
            return Err(StoreError::invalid(
                "image",
                "must be an embedded data:image/ payload",
            ));
        }

        let segment_value = request
            .segment_data
            .ok_or_else(|| StoreError::missing("segmentData"))?;
        if !segment_value.is_object() {
            return Err(StoreError::invalid("segmentData", "must be an object"));
        }
        match segment_value.get("segmentId") {
            Some(id) if id.is_i64() || id.is_u64() => {}
            Some(_) => {
                return Err(StoreError::invalid(
                    "segmentData.segmentId",
                    "must be an integer",
                ))
            }
            None => return Err(StoreError::missing("segmentData.segmentId")),
        }
        let segment_data: SegmentSnapshot = serde_json::from_value(segment_value)
            .map_err(|e| StoreError::invalid("segmentData", &e.to_string()))?;

        let position = match request.position {
            Some(value) => Some(parse_position(&value)?),
            None => None,
        };

        let record = Self {
            id: new_record_id(),
            timestamp: Utc::now(),
            robot_id,
            image,
            segment_data,
            position,
        };
        trace!("Built screenshot record {} for robot {}", record.id, record.robot_id);
        Ok(record)
    }
}

/// Generates a record id: millisecond timestamp plus a random alphanumeric
/// suffix. Practical collision avoidance only; the store re-checks against
/// the loaded collection before appending.
pub(crate) fn new_record_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
}

fn parse_position(value: &Value) -> Result<[f64; 2], StoreError> {
    let items = value
        .as_array()
        .ok_or_else(|| StoreError::invalid("position", "must be an [x, y] pair"))?;
    if items.len() != 2 {
        return Err(StoreError::invalid("position", "must contain exactly two numbers"));
    }
    let x = items[0]
        .as_f64()
        .ok_or_else(|| StoreError::invalid("position", "coordinates must be numbers"))?;
    let y = items[1]
        .as_f64()
        .ok_or_else(|| StoreError::invalid("position", "coordinates must be numbers"))?;
    Ok([x, y])
}
