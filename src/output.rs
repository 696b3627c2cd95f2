//! Result types produced by an extraction.
//!
//! A [`RoomRecord`] is built from five consecutive data tokens of one page.
//! Pages produce [`PageRooms`]; the whole document produces an
//! [`ExtractionOutput`] whose `rooms` list is the concatenation of every
//! page's records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five positional columns of the room table, in token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomField {
    College,
    Building,
    Room,
    Type,
    Sqft,
}

impl RoomField {
    /// Number of tokens that make up one record.
    pub const COUNT: usize = 5;

    /// All fields in fill order.
    pub const ALL: [RoomField; Self::COUNT] = [
        RoomField::College,
        RoomField::Building,
        RoomField::Room,
        RoomField::Type,
        RoomField::Sqft,
    ];

    /// Field addressed by a 0-based token position within a page.
    pub fn at(position: usize) -> RoomField {
        Self::ALL[position % Self::COUNT]
    }

    /// Key used for this field in serialised output.
    pub fn name(self) -> &'static str {
        match self {
            RoomField::College => "college",
            RoomField::Building => "building",
            RoomField::Room => "room",
            RoomField::Type => "type",
            RoomField::Sqft => "sqft",
        }
    }

    /// Whether this field closes a record.
    pub fn is_last(self) -> bool {
        self == RoomField::Sqft
    }
}

impl fmt::Display for RoomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the room table.
///
/// Fields are `None` only for the trailing partial record of a page whose
/// data-token count is not a multiple of five.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqft: Option<String>,
}

impl RoomRecord {
    /// Build a complete record from five values.
    pub fn new(
        college: impl Into<String>,
        building: impl Into<String>,
        room: impl Into<String>,
        room_type: impl Into<String>,
        sqft: impl Into<String>,
    ) -> Self {
        Self {
            college: Some(college.into()),
            building: Some(building.into()),
            room: Some(room.into()),
            room_type: Some(room_type.into()),
            sqft: Some(sqft.into()),
        }
    }

    pub fn get(&self, field: RoomField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: RoomField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Number of fields that hold a value.
    pub fn filled(&self) -> usize {
        RoomField::ALL
            .iter()
            .filter(|&&f| self.slot(f).is_some())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled() == RoomField::COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    fn slot(&self, field: RoomField) -> &Option<String> {
        match field {
            RoomField::College => &self.college,
            RoomField::Building => &self.building,
            RoomField::Room => &self.room,
            RoomField::Type => &self.room_type,
            RoomField::Sqft => &self.sqft,
        }
    }

    fn slot_mut(&mut self, field: RoomField) -> &mut Option<String> {
        match field {
            RoomField::College => &mut self.college,
            RoomField::Building => &mut self.building,
            RoomField::Room => &mut self.room,
            RoomField::Type => &mut self.room_type,
            RoomField::Sqft => &mut self.sqft,
        }
    }
}

/// Records extracted from a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRooms {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Text items the decoder returned for this page.
    pub token_count: usize,
    /// Items that survived the token filter.
    pub data_token_count: usize,
    /// Records in token order.
    pub records: Vec<RoomRecord>,
}

/// Aggregate numbers for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub total_tokens: usize,
    pub data_tokens: usize,
    pub total_records: usize,
    pub partial_records: usize,
    pub duration_ms: u64,
}

/// Everything an extraction produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The Document Result: all records, concatenated in merge order.
    pub rooms: Vec<RoomRecord>,
    /// Per-page results, in the same order their records appear in `rooms`.
    pub pages: Vec<PageRooms>,
    pub stats: ExtractionStats,
}
