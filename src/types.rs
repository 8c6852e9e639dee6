use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Caption given to a picture until the user edits it.
pub const DEFAULT_CAPTION: &str = "Enter caption";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMetadata {
    pub title: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub club_name: String,
}

/// Picture added to the report. Holds the decoded pixels so the renderer never re-reads the file.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub caption: String,
    pub image: DynamicImage,
}

#[derive(Debug, Clone)]
pub struct FlyerImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub sr_no: usize,
    pub name: String,
    pub application_id: String,
}

/// Participant list after normalization: `sr_no` is always 1..=n in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTable {
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Takeaway {
    /// `None` when the line had no colon; `Some("")` for a line starting with one.
    pub title: Option<String>,
    pub description: String,
}

impl Takeaway {
    /// Split on the first colon; a line without one is all description.
    pub fn parse(line: &str) -> Self {
        match line.split_once(':') {
            Some((title, description)) => Takeaway {
                title: Some(title.to_string()),
                description: description.to_string(),
            },
            None => Takeaway {
                title: None,
                description: line.to_string(),
            },
        }
    }

    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }
}

/// Everything the user has entered during one editing session.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub event: EventMetadata,
    pub description: String,
    pub images: Vec<ImageEntry>,
    pub flyer: Option<FlyerImage>,
    pub attendance: Option<AttendanceTable>,
    /// Replaces the default takeaways prompt when set.
    pub takeaway_prompt: Option<String>,
}

impl FormState {
    pub fn participant_count(&self) -> usize {
        self.attendance.as_ref().map(AttendanceTable::len).unwrap_or(0)
    }
}

/// On-disk form description (`--form form.json`). Image paths are decoded when applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFile {
    #[serde(flatten)]
    pub event: EventMetadata,
    pub description: String,
    pub images: Vec<FormFileImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flyer: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takeaway_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFileImage {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}
