//! Live HTML preview. Recomputed on every edit, so it must stay cheap: no model calls, no image encoding.

use quick_xml::escape::escape;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::report::{
    draft_report, Section, ATTENDANCE_HEADING, FLYER_HEADING, PICTURES_HEADING, REPORT_HEADING,
};
use crate::types::{AttendanceTable, FormState};

const HEADING_STYLE: &str = "font-size: 14pt;";
const CENTERED_HEADING_STYLE: &str = "font-size: 14pt; text-align: center;";

pub fn load_stylesheet(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReportError::Stylesheet(format!("{} not found", path.display()))
        } else {
            ReportError::Stylesheet(e.to_string())
        }
    })
}

fn attendance_html(out: &mut String, table: &AttendanceTable) {
    out.push_str("<table border=\"1\">\n<thead><tr><th>sr_no</th><th>name</th><th>application_id</th></tr></thead>\n<tbody>\n");
    for row in &table.rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.sr_no,
            escape(&row.name),
            escape(&row.application_id)
        );
    }
    out.push_str("</tbody>\n</table>\n");
}

/// Project the current form into preview markup. The stylesheet, if any, is embedded verbatim.
pub fn render_preview(form: &FormState, stylesheet: Option<&str>) -> String {
    let model = draft_report(form);
    let mut out = String::new();
    if let Some(css) = stylesheet {
        let _ = writeln!(out, "<style>\n{}\n</style>", css);
    }
    out.push_str("<div style=\"font-family: 'Times New Roman'; font-size: 12pt;\">\n");

    for section in &model.sections {
        match section {
            Section::Header => {
                let _ = writeln!(
                    out,
                    "<h1 style=\"text-align: center; font-size: 14pt;\">{}</h1>",
                    REPORT_HEADING
                );
            }
            Section::Metadata(fields) => {
                for field in fields {
                    let _ = writeln!(out, "<p><b>{}:</b> {}</p>", field.label, escape(&field.value));
                }
            }
            Section::Summary { heading, text } => {
                let _ = writeln!(out, "<h2 style=\"{}\">{}</h2>", HEADING_STYLE, heading);
                let _ = writeln!(out, "<p>{}</p>", escape(text).replace('\n', "<br>"));
            }
            // Drafts never carry takeaways.
            Section::Takeaways(_) => {}
            Section::Pictures(pictures) => {
                let _ = writeln!(out, "<h2 style=\"{}\">{}</h2>", CENTERED_HEADING_STYLE, PICTURES_HEADING);
                for picture in pictures {
                    out.push_str("<p style=\"text-align: center;\">[Image Placeholder]</p>\n");
                    let _ = writeln!(out, "<p style=\"text-align: center;\">{}</p>", escape(picture.caption));
                }
            }
            Section::Flyer(_) => {
                let _ = writeln!(out, "<h2 style=\"{}\">{}</h2>", CENTERED_HEADING_STYLE, FLYER_HEADING);
                out.push_str("<p style=\"text-align: center;\">[Event Flyer Placeholder]</p>\n");
            }
            Section::Attendance(table) => {
                let _ = writeln!(
                    out,
                    "<h2 style=\"{}\">{} (Will only take reqd. columns)</h2>",
                    HEADING_STYLE, ATTENDANCE_HEADING
                );
                attendance_html(&mut out, table);
            }
        }
    }
    out.push_str("</div>\n");
    out
}
