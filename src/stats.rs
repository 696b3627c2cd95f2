//! Summary statistics for the stats panel shown next to the room table.

use crate::output::RoomRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and square-footage summary over a room list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomStats {
    pub total_rooms: usize,
    pub complete_rooms: usize,
    pub partial_rooms: usize,
    /// Rooms per college (trimmed name).
    pub by_college: BTreeMap<String, usize>,
    /// Rooms per room type (trimmed name).
    pub by_type: BTreeMap<String, usize>,
    /// `None` when no record has a numeric square footage.
    pub square_footage: Option<SquareFootage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareFootage {
    /// Records whose sqft parsed as a number.
    pub counted: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl RoomStats {
    pub fn from_records(records: &[RoomRecord]) -> Self {
        let mut stats = RoomStats {
            total_rooms: records.len(),
            ..Self::default()
        };

        let mut areas = Vec::new();
        for record in records {
            if record.is_complete() {
                stats.complete_rooms += 1;
            } else {
                stats.partial_rooms += 1;
            }
            if let Some(college) = record.college.as_deref() {
                *stats.by_college.entry(college.trim().to_string()).or_default() += 1;
            }
            if let Some(kind) = record.room_type.as_deref() {
                *stats.by_type.entry(kind.trim().to_string()).or_default() += 1;
            }
            if let Some(area) = record.sqft.as_deref().and_then(parse_sqft) {
                areas.push(area);
            }
        }

        stats.square_footage = summarise(&areas);
        stats
    }
}

/// Parse a square-footage cell such as `"450"`, `" 1,200 "` or `"312.5"`.
pub fn parse_sqft(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn summarise(areas: &[f64]) -> Option<SquareFootage> {
    if areas.is_empty() {
        return None;
    }
    let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let max = areas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = areas.iter().sum::<f64>() / areas.len() as f64;
    Some(SquareFootage {
        counted: areas.len(),
        min,
        max,
        mean,
    })
}
