//! Form state -> ordered, render-agnostic report sections.

use image::DynamicImage;

use crate::ai::Summarizer;
use crate::error::{ReportError, Result};
use crate::types::{AttendanceTable, FormState, Takeaway};

pub const REPORT_HEADING: &str = "Event Report";
pub const SUMMARY_HEADING: &str = "Summary";
pub const DRAFT_SUMMARY_HEADING: &str = "Pre AI Summary";
pub const TAKEAWAYS_HEADING: &str = "Key Problem-Focused Takeaways";
pub const PICTURES_HEADING: &str = "Pictures";
pub const FLYER_HEADING: &str = "Event Flyer";
pub const ATTENDANCE_HEADING: &str = "Participants List";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Picture<'a> {
    pub image: &'a DynamicImage,
    pub caption: &'a str,
}

#[derive(Debug, Clone)]
pub enum Section<'a> {
    Header,
    Metadata(Vec<MetadataField>),
    Summary { heading: &'static str, text: String },
    Takeaways(Vec<Takeaway>),
    Pictures(Vec<Picture<'a>>),
    Flyer(&'a DynamicImage),
    Attendance(&'a AttendanceTable),
}

/// Borrows pictures and the attendance table from the form it was built from.
#[derive(Debug, Clone)]
pub struct ReportModel<'a> {
    pub sections: Vec<Section<'a>>,
}

impl<'a> ReportModel<'a> {
    pub fn metadata(&self) -> Option<&[MetadataField]> {
        self.sections.iter().find_map(|s| match s {
            Section::Metadata(fields) => Some(fields.as_slice()),
            _ => None,
        })
    }

    pub fn has_pictures(&self) -> bool {
        self.sections.iter().any(|s| matches!(s, Section::Pictures(_)))
    }

    pub fn has_attendance(&self) -> bool {
        self.sections.iter().any(|s| matches!(s, Section::Attendance(_)))
    }
}

fn metadata_fields(form: &FormState) -> Vec<MetadataField> {
    let field = |label, value: &str| MetadataField {
        label,
        value: value.to_string(),
    };
    vec![
        field("Title", &form.event.title),
        field("Date", &form.event.date),
        field("Time", &form.event.time),
        field("Venue", &form.event.venue),
        MetadataField {
            label: "Number of Participants",
            value: form.participant_count().to_string(),
        },
        field("Name of Student Led Club", &form.event.club_name),
    ]
}

fn media_sections(form: &FormState) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    if !form.images.is_empty() {
        sections.push(Section::Pictures(
            form.images
                .iter()
                .map(|entry| Picture {
                    image: &entry.image,
                    caption: &entry.caption,
                })
                .collect(),
        ));
    }
    if let Some(flyer) = &form.flyer {
        sections.push(Section::Flyer(&flyer.image));
    }
    if let Some(table) = &form.attendance {
        sections.push(Section::Attendance(table));
    }
    sections
}

/// Assemble the final report. Calls the summarizer exactly twice and caches nothing.
pub fn build_report<'a>(form: &'a FormState, summarizer: &dyn Summarizer) -> Result<ReportModel<'a>> {
    if form.event.title.trim().is_empty() {
        return Err(ReportError::MissingField("title"));
    }
    let description = form.description.trim();
    let summary = summarizer.summarize(description)?;
    let takeaways = summarizer.takeaways(description, form.takeaway_prompt.as_deref())?;

    let mut sections = vec![
        Section::Header,
        Section::Metadata(metadata_fields(form)),
        Section::Summary {
            heading: SUMMARY_HEADING,
            text: summary,
        },
        Section::Takeaways(takeaways),
    ];
    sections.extend(media_sections(form));
    Ok(ReportModel { sections })
}

/// Same layout with the raw description and no takeaways. Never calls the model.
pub fn draft_report(form: &FormState) -> ReportModel<'_> {
    let mut sections = vec![
        Section::Header,
        Section::Metadata(metadata_fields(form)),
        Section::Summary {
            heading: DRAFT_SUMMARY_HEADING,
            text: form.description.clone(),
        },
    ];
    sections.extend(media_sections(form));
    ReportModel { sections }
}

/// `Event Report <title>.docx` with spaces turned into underscores. Nothing else is filtered.
pub fn report_filename(title: &str) -> String {
    format!("{} {}.docx", REPORT_HEADING, title).replace(' ', "_")
}
