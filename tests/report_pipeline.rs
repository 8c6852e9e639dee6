use event_report_lib::ai::{parse_takeaways, GeminiSummarizer, Summarizer};
use event_report_lib::attendance::import_attendance;
use event_report_lib::commands::generate_report_with;
use event_report_lib::config::AiConfig;
use event_report_lib::error::{ReportError, Result};
use event_report_lib::types::{EventMetadata, FormState, Takeaway};
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Answers like the model would, from canned text.
struct CannedModel {
    raw_takeaways: &'static str,
}

impl Summarizer for CannedModel {
    fn summarize(&self, text: &str) -> Result<String> {
        Ok(format!("The unit organised an event. {}", text))
    }

    fn takeaways(&self, _text: &str, _prompt: Option<&str>) -> Result<Vec<Takeaway>> {
        Ok(parse_takeaways(self.raw_takeaways))
    }
}

fn document_xml(path: &Path) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

fn blood_drive() -> FormState {
    FormState {
        event: EventMetadata {
            title: "Blood Drive".into(),
            date: "2024-01-05".into(),
            venue: "Main Hall".into(),
            ..EventMetadata::default()
        },
        description: "Forty students donated blood.".into(),
        ..FormState::default()
    }
}

#[test]
fn blood_drive_without_media_or_key() {
    let dir = tempfile::tempdir().unwrap();
    let ai = GeminiSummarizer::new(None, AiConfig::default()).unwrap();
    let out = generate_report_with(&blood_drive(), &ai, dir.path()).unwrap();

    assert_eq!(out.path.file_name().unwrap(), "Event_Report_Blood_Drive.docx");
    let xml = document_xml(&out.path);
    assert!(xml.contains(">Number of Participants: </w:t>"));
    assert!(xml.contains(">0</w:t>"));
    assert!(xml.contains(">2024-01-05</w:t>"));
    // Pass-through summary.
    assert!(xml.contains(">Forty students donated blood.</w:t>"));
    assert!(!xml.contains(">Pictures</w:t>"));
    assert!(!xml.contains(">Participants List</w:t>"));
    assert!(!xml.contains("<w:tbl>"));
}

#[test]
fn takeaways_from_mixed_model_output() {
    let dir = tempfile::tempdir().unwrap();
    let model = CannedModel {
        raw_takeaways: "1. Fear of needles: many first-time donors hesitated\n\
                        - a stray bullet\n\
                        * **bold artefact**\n\
                        2. Iron levels: several volunteers were turned away at 9:00 am\n\
                        Thank you",
    };
    let out = generate_report_with(&blood_drive(), &model, dir.path()).unwrap();
    assert_eq!(out.takeaways, 3);

    let xml = document_xml(&out.path);
    assert!(xml.contains(">1. Fear of needles:</w:t>"));
    assert!(xml.contains("> several volunteers were turned away at 9:00 am</w:t>"));
    assert!(xml.contains(">Thank you</w:t>"));
    assert!(!xml.contains("stray bullet"));
    assert!(!xml.contains("bold artefact"));
    assert!(xml.contains(">The unit organised an event. Forty students donated blood.</w:t>"));
}

#[test]
fn spreadsheet_attendance_feeds_participant_count() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("participants.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "S.No").unwrap();
    sheet.write_string(0, 1, "APPLICATION_ID").unwrap();
    sheet.write_string(0, 2, "Name").unwrap();
    for (i, (id, name)) in [(1001, "Meera"), (1002, "Kabir"), (1003, "Zoya")].iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, (10 - i) as f64).unwrap();
        sheet.write_number(row, 1, *id as f64).unwrap();
        sheet.write_string(row, 2, *name).unwrap();
    }
    workbook.save(&list).unwrap();

    let table = import_attendance(&list).unwrap();
    let seq: Vec<usize> = table.rows.iter().map(|r| r.sr_no).collect();
    assert_eq!(seq, vec![1, 2, 3]);
    assert_eq!(table.rows[0].name, "Meera");
    assert_eq!(table.rows[0].application_id, "1001");

    let mut form = blood_drive();
    form.attendance = Some(table);
    let ai = GeminiSummarizer::new(None, AiConfig::default()).unwrap();
    let out = generate_report_with(&form, &ai, dir.path()).unwrap();
    assert_eq!(out.participants, 3);
    let xml = document_xml(&out.path);
    assert!(xml.contains(">Participants List</w:t>"));
    assert!(xml.contains(">Zoya</w:t>"));
}

#[test]
fn spreadsheet_missing_name_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("participants.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Student").unwrap();
    sheet.write_string(0, 1, "Application_ID").unwrap();
    workbook.save(&list).unwrap();

    match import_attendance(&list) {
        Err(ReportError::MissingColumns(cols)) => assert_eq!(cols, vec!["name".to_string()]),
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}
