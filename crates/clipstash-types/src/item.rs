//! Clipboard items and their identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds in one day, the unit of retention windows.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Identity and sort key of a history item (milliseconds since the Unix epoch).
///
/// A timestamp names exactly one live item at any instant. Re-copying an item
/// assigns it a new timestamp, after which the old value no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// The smallest timestamp strictly greater than this one.
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn saturating_add_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Cutoff for a retention window of `days` ending at this instant.
    pub const fn days_before(self, days: u32) -> Self {
        Self(self.0.saturating_sub(days as i64 * MILLIS_PER_DAY))
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

/// Discriminant of [`ItemContent`], also the value of the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
        }
    }
}

/// An image capture. `bytes` holds the encoded payload (PNG) as delivered by
/// the clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// The captured payload. Always exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemContent {
    Text(String),
    Image(ImageContent),
}

impl ItemContent {
    pub fn text(text: impl Into<String>) -> Self {
        ItemContent::Text(text.into())
    }

    pub fn image(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        ItemContent::Image(ImageContent {
            width,
            height,
            bytes,
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ItemContent::Text(_) => ContentKind::Text,
            ItemContent::Image(_) => ContentKind::Image,
        }
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        match self {
            ItemContent::Text(text) => text.as_bytes(),
            ItemContent::Image(image) => &image.bytes,
        }
    }

    /// Same kind and byte-identical payload. Images must also declare the
    /// same dimensions, since the bytes alone may not carry them.
    pub fn is_duplicate_of(&self, other: &ItemContent) -> bool {
        match (self, other) {
            (ItemContent::Text(a), ItemContent::Text(b)) => a == b,
            (ItemContent::Image(a), ItemContent::Image(b)) => {
                a.width == b.width && a.height == b.height && a.bytes == b.bytes
            }
            _ => false,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.payload().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.payload().is_empty()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ItemContent::Text(text) => Some(text),
            ItemContent::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageContent> {
        match self {
            ItemContent::Text(_) => None,
            ItemContent::Image(image) => Some(image),
        }
    }
}

/// One captured clipboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identity and sort key.
    pub timestamp: Timestamp,
    pub content: ItemContent,
    /// Size of the stored payload.
    pub size_bytes: u64,
    /// Application that produced the content, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_app: Option<String>,
}

/// What the system clipboard currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    pub content: ItemContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_app: Option<String>,
}

impl ClipboardSnapshot {
    pub fn new(content: ItemContent, source_app: Option<String>) -> Self {
        Self {
            content,
            source_app,
        }
    }
}
