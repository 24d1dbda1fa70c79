use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TacticalError, TacticalResult};

/// Width of the normalized pitch coordinate space.
pub const PITCH_UNITS_X: f64 = 37.0;
/// Height of the normalized pitch coordinate space.
pub const PITCH_UNITS_Y: f64 = 100.0;

/// One detection on the pitch, in normalized pitch units (`0..37` x `0..100`).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackedEntity {
    #[serde(rename = "cls", alias = "classId", alias = "class_id")]
    pub class_id: u32,
    pub team: u8,
    pub x: f64,
    pub y: f64,
}

impl TrackedEntity {
    pub fn is_class(&self, class_id: u32) -> bool {
        self.class_id == class_id
    }
}

/// All detections of one analysed frame.
pub type FrameCoordinates = Vec<TrackedEntity>;

/// Inclusive range of frame indices that carry data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBounds {
    pub first: FrameIndex,
    pub last: FrameIndex,
}

impl FrameBounds {
    /// Bounds of a contiguous, 0-based dataset with `len` frames.
    pub fn from_len(len: u64) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            first: FrameIndex(0),
            last: FrameIndex(len - 1),
        })
    }
}

/// Per-frame detections returned by a successful analysis job.
///
/// Keys are analysed frame numbers at the backend's nominal rate. Depending on the
/// producer they start at 0 or 1. The dataset is immutable once built; a new job result
/// replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoordinateDataset {
    frames: BTreeMap<u64, FrameCoordinates>,
}

impl CoordinateDataset {
    pub fn new(frames: BTreeMap<u64, FrameCoordinates>) -> Self {
        let ds = Self { frames };
        if !ds.is_contiguous() {
            tracing::warn!(
                frames = ds.len(),
                first = ?ds.bounds().map(|b| b.first.0),
                last = ?ds.bounds().map(|b| b.last.0),
                "coordinate dataset has gaps; missing frames render as empty"
            );
        }
        ds
    }

    /// Build from the wire map (`{"0": [...], "1": [...]}`).
    pub fn from_wire(wire: HashMap<String, FrameCoordinates>) -> TacticalResult<Self> {
        let mut frames = BTreeMap::new();
        for (key, entities) in wire {
            let idx = key.trim().parse::<u64>().map_err(|_| {
                TacticalError::serde(format!("frame key '{key}' is not a frame number"))
            })?;
            frames.insert(idx, entities);
        }
        Ok(Self::new(frames))
    }

    pub fn to_wire(&self) -> BTreeMap<String, &FrameCoordinates> {
        self.frames
            .iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    pub fn from_json_str(s: &str) -> TacticalResult<Self> {
        let wire: HashMap<String, FrameCoordinates> = serde_json::from_str(s)
            .map_err(|e| TacticalError::serde(format!("parse coordinate dataset: {e}")))?;
        Self::from_wire(wire)
    }

    pub fn to_json_string(&self) -> TacticalResult<String> {
        serde_json::to_string_pretty(&self.to_wire())
            .map_err(|e| TacticalError::serde(format!("encode coordinate dataset: {e}")))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&FrameCoordinates> {
        self.frames.get(&frame.0)
    }

    pub fn bounds(&self) -> Option<FrameBounds> {
        let first = *self.frames.keys().next()?;
        let last = *self.frames.keys().next_back()?;
        Some(FrameBounds {
            first: FrameIndex(first),
            last: FrameIndex(last),
        })
    }

    pub fn is_contiguous(&self) -> bool {
        match self.bounds() {
            // Keys are distinct, so the span equals len - 1 exactly when there are no holes.
            Some(b) => b.last.0 - b.first.0 == (self.frames.len() as u64).saturating_sub(1),
            None => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &FrameCoordinates)> {
        self.frames.iter().map(|(k, v)| (FrameIndex(*k), v))
    }
}

impl serde::Serialize for CoordinateDataset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for CoordinateDataset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = HashMap::<String, FrameCoordinates>::deserialize(deserializer)?;
        Self::from_wire(wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/track/model.rs"]
mod tests;
