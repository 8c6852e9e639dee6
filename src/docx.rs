//! Word (.docx) output. Writes the Office Open XML parts directly with quick-xml and packs them with zip.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{ReportError, Result};
use crate::images::{prepare_for_document, PreparedImage};
use crate::report::{
    ReportModel, Section, ATTENDANCE_HEADING, FLYER_HEADING, PICTURES_HEADING, REPORT_HEADING,
    TAKEAWAYS_HEADING,
};
use crate::types::{AttendanceTable, Takeaway};

const FONT: &str = "Times New Roman";
/// Half-points, as WordprocessingML counts them.
const BODY_SIZE: u32 = 24;
const HEADING_SIZE: u32 = 28;
const EMU_PER_INCH: u64 = 914_400;
/// Pictures are placed 6 inches wide.
const PICTURE_WIDTH_EMU: u64 = 6 * EMU_PER_INCH;
const ATTENDANCE_HEADERS: [&str; 3] = ["Sr. No.", "Name", "Application ID"];
/// Column widths in twentieths of a point.
const ATTENDANCE_WIDTHS: [u32; 3] = [1500, 4500, 3000];

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_OFFICE_DOC: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_CORE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

type XmlResult = std::result::Result<(), String>;

/// Thin event writer; every failure becomes a message string.
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> std::result::Result<Self, String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| e.to_string())?;
        Ok(Xml { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> XmlResult {
        let el = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(el)).map_err(|e| e.to_string())
    }

    fn end(&mut self, name: &str) -> XmlResult {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| e.to_string())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> XmlResult {
        let el = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(el)).map_err(|e| e.to_string())
    }

    fn text(&mut self, text: &str) -> XmlResult {
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))
            .map_err(|e| e.to_string())
    }

    /// `<name>text</name>` with escaping.
    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> XmlResult {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// XML 1.0 allows no C0 controls other than tab, LF and CR; the rest become spaces.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let illegal = |c: char| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r');
    if text.contains(illegal) {
        Cow::Owned(text.chars().map(|c| if illegal(c) { ' ' } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct Run<'a> {
    text: &'a str,
    bold: bool,
    size: u32,
}

impl<'a> Run<'a> {
    fn plain(text: &'a str) -> Self {
        Run { text, bold: false, size: BODY_SIZE }
    }

    fn bold(text: &'a str) -> Self {
        Run { text, bold: true, size: BODY_SIZE }
    }
}

/// Body builder: tracks embedded media and relationship ids.
struct DocumentBody {
    xml: Xml,
    media: Vec<(String, Vec<u8>)>,
}

impl DocumentBody {
    fn new() -> std::result::Result<Self, String> {
        let mut xml = Xml::new()?;
        xml.start(
            "w:document",
            &[
                ("xmlns:w", NS_W),
                ("xmlns:r", NS_R),
                ("xmlns:wp", NS_WP),
                ("xmlns:a", NS_A),
                ("xmlns:pic", NS_PIC),
            ],
        )?;
        xml.start("w:body", &[])?;
        Ok(DocumentBody { xml, media: Vec::new() })
    }

    fn run(&mut self, run: &Run) -> XmlResult {
        let size = run.size.to_string();
        let x = &mut self.xml;
        x.start("w:r", &[])?;
        x.start("w:rPr", &[])?;
        x.empty("w:rFonts", &[("w:ascii", FONT), ("w:hAnsi", FONT), ("w:cs", FONT)])?;
        if run.bold {
            x.empty("w:b", &[])?;
        }
        x.empty("w:color", &[("w:val", "000000")])?;
        x.empty("w:sz", &[("w:val", size.as_str())])?;
        x.empty("w:szCs", &[("w:val", size.as_str())])?;
        x.end("w:rPr")?;
        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                x.empty("w:br", &[])?;
            }
            x.leaf("w:t", &[("xml:space", "preserve")], line)?;
        }
        x.end("w:r")
    }

    fn paragraph_start(&mut self, align: Align) -> XmlResult {
        self.xml.start("w:p", &[])?;
        if align == Align::Center {
            self.xml.start("w:pPr", &[])?;
            self.xml.empty("w:jc", &[("w:val", "center")])?;
            self.xml.end("w:pPr")?;
        }
        Ok(())
    }

    fn paragraph(&mut self, align: Align, runs: &[Run]) -> XmlResult {
        self.paragraph_start(align)?;
        for run in runs {
            self.run(run)?;
        }
        self.xml.end("w:p")
    }

    fn heading(&mut self, text: &str, align: Align) -> XmlResult {
        self.paragraph(align, &[Run { text, bold: true, size: HEADING_SIZE }])
    }

    fn labelled(&mut self, label: &str, value: &str) -> XmlResult {
        let label = format!("{}: ", label);
        self.paragraph(Align::Left, &[Run::bold(&label), Run::plain(value)])
    }

    fn page_break(&mut self) -> XmlResult {
        self.xml.start("w:p", &[])?;
        self.xml.start("w:r", &[])?;
        self.xml.empty("w:br", &[("w:type", "page")])?;
        self.xml.end("w:r")?;
        self.xml.end("w:p")
    }

    fn takeaway(&mut self, takeaway: &Takeaway) -> XmlResult {
        match &takeaway.title {
            Some(title) => {
                let title = format!("{}:", title);
                self.paragraph(Align::Left, &[Run::bold(&title), Run::plain(&takeaway.description)])
            }
            None => self.paragraph(Align::Left, &[Run::plain(&takeaway.description)]),
        }
    }

    /// Centered inline picture at the fixed document width.
    fn picture(&mut self, image: &PreparedImage) -> XmlResult {
        let index = self.media.len() + 1;
        // rId1 is the styles part.
        let rel_id = format!("rId{}", index + 1);
        let file_name = format!("image{}.png", index);
        let cx = PICTURE_WIDTH_EMU;
        let cy = (PICTURE_WIDTH_EMU as f64 * image.height as f64 / image.width as f64).round() as u64;
        let (cx, cy) = (cx.to_string(), cy.to_string());
        let id = index.to_string();
        let name = format!("Picture {}", index);

        self.paragraph_start(Align::Center)?;
        let x = &mut self.xml;
        x.start("w:r", &[])?;
        x.start("w:drawing", &[])?;
        x.start("wp:inline", &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")])?;
        x.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        x.empty("wp:docPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        x.start("wp:cNvGraphicFramePr", &[])?;
        x.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
        x.end("wp:cNvGraphicFramePr")?;
        x.start("a:graphic", &[])?;
        x.start("a:graphicData", &[("uri", NS_PIC)])?;
        x.start("pic:pic", &[])?;
        x.start("pic:nvPicPr", &[])?;
        x.empty("pic:cNvPr", &[("id", "0"), ("name", file_name.as_str())])?;
        x.empty("pic:cNvPicPr", &[])?;
        x.end("pic:nvPicPr")?;
        x.start("pic:blipFill", &[])?;
        x.empty("a:blip", &[("r:embed", rel_id.as_str())])?;
        x.start("a:stretch", &[])?;
        x.empty("a:fillRect", &[])?;
        x.end("a:stretch")?;
        x.end("pic:blipFill")?;
        x.start("pic:spPr", &[])?;
        x.start("a:xfrm", &[])?;
        x.empty("a:off", &[("x", "0"), ("y", "0")])?;
        x.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        x.end("a:xfrm")?;
        x.start("a:prstGeom", &[("prst", "rect")])?;
        x.empty("a:avLst", &[])?;
        x.end("a:prstGeom")?;
        x.end("pic:spPr")?;
        x.end("pic:pic")?;
        x.end("a:graphicData")?;
        x.end("a:graphic")?;
        x.end("wp:inline")?;
        x.end("w:drawing")?;
        x.end("w:r")?;
        x.end("w:p")?;

        self.media.push((file_name, image.png.clone()));
        Ok(())
    }

    fn table_cell(&mut self, width: u32, text: &str, bold: bool) -> XmlResult {
        let width = width.to_string();
        self.xml.start("w:tc", &[])?;
        self.xml.start("w:tcPr", &[])?;
        self.xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        self.xml.end("w:tcPr")?;
        let run = if bold { Run::bold(text) } else { Run::plain(text) };
        self.paragraph(Align::Left, &[run])?;
        self.xml.end("w:tc")
    }

    fn table_row(&mut self, cells: [&str; 3], bold: bool) -> XmlResult {
        self.xml.start("w:tr", &[])?;
        for (text, width) in cells.iter().zip(ATTENDANCE_WIDTHS) {
            self.table_cell(width, text, bold)?;
        }
        self.xml.end("w:tr")
    }

    /// Always three bordered columns: sequence, name, application id.
    fn attendance(&mut self, table: &AttendanceTable) -> XmlResult {
        let x = &mut self.xml;
        x.start("w:tbl", &[])?;
        x.start("w:tblPr", &[])?;
        x.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
        x.start("w:tblBorders", &[])?;
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            x.empty(
                edge,
                &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "000000")],
            )?;
        }
        x.end("w:tblBorders")?;
        x.end("w:tblPr")?;
        x.start("w:tblGrid", &[])?;
        for width in ATTENDANCE_WIDTHS {
            x.empty("w:gridCol", &[("w:w", width.to_string().as_str())])?;
        }
        x.end("w:tblGrid")?;

        self.table_row(ATTENDANCE_HEADERS, true)?;
        for row in &table.rows {
            let sr_no = row.sr_no.to_string();
            self.table_row([sr_no.as_str(), row.name.as_str(), row.application_id.as_str()], false)?;
        }
        self.xml.end("w:tbl")?;
        // Word expects a paragraph after a trailing table.
        self.paragraph(Align::Left, &[])
    }

    fn finish(mut self) -> std::result::Result<(Vec<u8>, Vec<(String, Vec<u8>)>), String> {
        let x = &mut self.xml;
        x.start("w:sectPr", &[])?;
        x.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        x.empty(
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1440"),
                ("w:bottom", "1440"),
                ("w:left", "1440"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        x.end("w:sectPr")?;
        x.end("w:body")?;
        x.end("w:document")?;
        Ok((self.xml.into_bytes(), self.media))
    }
}

fn document_xml(model: &ReportModel) -> std::result::Result<(Vec<u8>, Vec<(String, Vec<u8>)>), String> {
    let mut body = DocumentBody::new()?;
    for section in &model.sections {
        match section {
            Section::Header => body.heading(REPORT_HEADING, Align::Center)?,
            Section::Metadata(fields) => {
                for field in fields {
                    body.labelled(field.label, &field.value)?;
                }
            }
            Section::Summary { heading, text } => {
                body.heading(heading, Align::Left)?;
                body.paragraph(Align::Left, &[Run::plain(text)])?;
            }
            Section::Takeaways(takeaways) => {
                body.heading(TAKEAWAYS_HEADING, Align::Left)?;
                for takeaway in takeaways {
                    body.takeaway(takeaway)?;
                }
            }
            Section::Pictures(pictures) => {
                body.page_break()?;
                body.heading(PICTURES_HEADING, Align::Center)?;
                for picture in pictures {
                    let prepared = prepare_for_document(picture.image).map_err(|e| e.to_string())?;
                    body.picture(&prepared)?;
                    body.paragraph(Align::Center, &[Run::plain(picture.caption)])?;
                }
            }
            Section::Flyer(image) => {
                body.page_break()?;
                body.heading(FLYER_HEADING, Align::Center)?;
                let prepared = prepare_for_document(image).map_err(|e| e.to_string())?;
                body.picture(&prepared)?;
            }
            Section::Attendance(table) => {
                body.page_break()?;
                body.heading(ATTENDANCE_HEADING, Align::Left)?;
                body.attendance(table)?;
            }
        }
    }
    body.finish()
}

fn styles_xml() -> std::result::Result<Vec<u8>, String> {
    let size = BODY_SIZE.to_string();
    let mut x = Xml::new()?;
    x.start("w:styles", &[("xmlns:w", NS_W)])?;
    x.start("w:docDefaults", &[])?;
    x.start("w:rPrDefault", &[])?;
    x.start("w:rPr", &[])?;
    x.empty("w:rFonts", &[("w:ascii", FONT), ("w:hAnsi", FONT), ("w:cs", FONT), ("w:eastAsia", FONT)])?;
    x.empty("w:sz", &[("w:val", size.as_str())])?;
    x.empty("w:szCs", &[("w:val", size.as_str())])?;
    x.end("w:rPr")?;
    x.end("w:rPrDefault")?;
    x.end("w:docDefaults")?;
    x.start("w:style", &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")])?;
    x.empty("w:name", &[("w:val", "Normal")])?;
    x.empty("w:qFormat", &[])?;
    x.start("w:rPr", &[])?;
    x.empty("w:rFonts", &[("w:ascii", FONT), ("w:hAnsi", FONT), ("w:cs", FONT)])?;
    x.empty("w:sz", &[("w:val", size.as_str())])?;
    x.empty("w:szCs", &[("w:val", size.as_str())])?;
    x.end("w:rPr")?;
    x.end("w:style")?;
    x.end("w:styles")?;
    Ok(x.into_bytes())
}

fn content_types_xml() -> std::result::Result<Vec<u8>, String> {
    let mut x = Xml::new()?;
    x.start("Types", &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")])?;
    x.empty(
        "Default",
        &[("Extension", "rels"), ("ContentType", "application/vnd.openxmlformats-package.relationships+xml")],
    )?;
    x.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    x.empty("Default", &[("Extension", "png"), ("ContentType", "image/png")])?;
    for (part, content_type) in [
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        ("/word/styles.xml", "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
    ] {
        x.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    x.end("Types")?;
    Ok(x.into_bytes())
}

fn relationships_xml(rels: &[(String, &str, String)]) -> std::result::Result<Vec<u8>, String> {
    let mut x = Xml::new()?;
    x.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
    for (id, rel_type, target) in rels {
        x.empty("Relationship", &[("Id", id.as_str()), ("Type", *rel_type), ("Target", target.as_str())])?;
    }
    x.end("Relationships")?;
    Ok(x.into_bytes())
}

fn core_xml(title: &str) -> std::result::Result<Vec<u8>, String> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut x = Xml::new()?;
    x.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties"),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    x.leaf("dc:title", &[], title)?;
    x.leaf("dc:creator", &[], "Event Report Generator")?;
    x.leaf("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &now)?;
    x.leaf("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &now)?;
    x.end("cp:coreProperties")?;
    Ok(x.into_bytes())
}

fn app_xml() -> std::result::Result<Vec<u8>, String> {
    let mut x = Xml::new()?;
    x.start(
        "Properties",
        &[("xmlns", "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties")],
    )?;
    x.leaf("Application", &[], "Event Report Generator")?;
    x.end("Properties")?;
    Ok(x.into_bytes())
}

/// Every part of the package as (zip path, bytes), in write order.
fn build_package(model: &ReportModel) -> std::result::Result<Vec<(String, Vec<u8>)>, String> {
    let title = model
        .metadata()
        .and_then(|fields| fields.iter().find(|f| f.label == "Title"))
        .map(|f| f.value.as_str())
        .unwrap_or(REPORT_HEADING);
    let (document, media) = document_xml(model)?;

    let mut doc_rels = vec![("rId1".to_string(), REL_STYLES, "styles.xml".to_string())];
    for (i, (name, _)) in media.iter().enumerate() {
        doc_rels.push((format!("rId{}", i + 2), REL_IMAGE, format!("media/{}", name)));
    }
    let package_rels = [
        ("rId1".to_string(), REL_OFFICE_DOC, "word/document.xml".to_string()),
        ("rId2".to_string(), REL_CORE, "docProps/core.xml".to_string()),
        ("rId3".to_string(), REL_APP, "docProps/app.xml".to_string()),
    ];

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types_xml()?),
        ("_rels/.rels".to_string(), relationships_xml(&package_rels)?),
        ("docProps/core.xml".to_string(), core_xml(title)?),
        ("docProps/app.xml".to_string(), app_xml()?),
        ("word/document.xml".to_string(), document),
        ("word/styles.xml".to_string(), styles_xml()?),
        ("word/_rels/document.xml.rels".to_string(), relationships_xml(&doc_rels)?),
    ];
    for (name, bytes) in media {
        parts.push((format!("word/media/{}", name), bytes));
    }
    Ok(parts)
}

fn write_package(parts: &[(String, Vec<u8>)], path: &Path) -> std::result::Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Could not create {}: {}", path.display(), e))?;
    let mut zip_writer = ZipWriter::new(file);
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in parts {
        zip_writer.start_file(name.as_str(), opts).map_err(|e| e.to_string())?;
        zip_writer.write_all(bytes).map_err(|e| e.to_string())?;
    }
    let file = zip_writer.finish().map_err(|e| e.to_string())?;
    file.sync_all().map_err(|e| e.to_string())?;
    Ok(())
}

/// Render the report to `path`. The target is only replaced once the whole package is written.
pub fn render_document(model: &ReportModel, path: &Path) -> Result<()> {
    let parts = build_package(model).map_err(ReportError::Document)?;
    let temp_path = path.with_extension("tmp.docx");
    if let Err(e) = write_package(&parts, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ReportError::Document(e));
    }
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ReportError::Document(format!("Could not replace {}: {}", path.display(), e))
    })?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{blood_drive, FakeSummarizer};
    use crate::report::{build_report, draft_report};
    use crate::types::{AttendanceRow, FlyerImage, ImageEntry};
    use quick_xml::Reader;
    use image::{DynamicImage, RgbImage};
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    fn part_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn plain_report_has_metadata_and_no_optional_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let form = blood_drive();
        let model = build_report(&form, &FakeSummarizer::new()).unwrap();
        render_document(&model, &path).unwrap();

        let doc = read_part(&path, "word/document.xml");
        assert!(doc.contains(">Number of Participants: </w:t>"));
        assert!(doc.contains(">Main Hall</w:t>"));
        assert!(doc.contains(">Key Problem-Focused Takeaways</w:t>"));
        assert!(doc.contains(">Awareness:</w:t>"));
        assert!(!doc.contains(">Pictures</w:t>"));
        assert!(!doc.contains(">Participants List</w:t>"));
        assert!(!doc.contains("w:type=\"page\""));
        assert!(!part_names(&path).iter().any(|n| n.starts_with("word/media/")));
        assert!(!dir.path().join("out.tmp.docx").exists());
    }

    #[test]
    fn pictures_flyer_and_table_are_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.docx");
        let mut form = blood_drive();
        form.images.push(ImageEntry {
            path: "a.png".into(),
            caption: "Donor <queue> & nurses".into(),
            image: DynamicImage::ImageRgb8(RgbImage::new(400, 200)),
        });
        form.flyer = Some(FlyerImage {
            path: "f.png".into(),
            image: DynamicImage::ImageRgb8(RgbImage::new(100, 100)),
        });
        form.attendance = Some(AttendanceTable {
            rows: vec![
                AttendanceRow { sr_no: 1, name: "Asha".into(), application_id: "A-1".into() },
                AttendanceRow { sr_no: 2, name: "Ravi".into(), application_id: "A-2".into() },
            ],
        });
        let model = build_report(&form, &FakeSummarizer::new()).unwrap();
        render_document(&model, &path).unwrap();

        let names = part_names(&path);
        assert!(names.contains(&"word/media/image1.png".to_string()));
        assert!(names.contains(&"word/media/image2.png".to_string()));

        let doc = read_part(&path, "word/document.xml");
        assert_eq!(doc.matches("w:type=\"page\"").count(), 3);
        assert!(doc.contains("Donor &lt;queue&gt; &amp; nurses"));
        // 400x200 source at 6in wide: half as tall.
        assert!(doc.contains("cx=\"5486400\" cy=\"2743200\""));
        assert!(doc.contains("cx=\"5486400\" cy=\"5486400\""));
        assert_eq!(doc.matches("<w:gridCol").count(), 3);
        assert_eq!(doc.matches("<w:tr>").count(), 3);
        assert!(doc.contains(">Application ID</w:t>"));
        assert!(doc.contains(">Ravi</w:t>"));

        let rels = read_part(&path, "word/_rels/document.xml.rels");
        assert!(rels.contains("Target=\"media/image2.png\""));
    }

    #[test]
    fn control_characters_in_user_text_become_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pasted.docx");
        let mut form = blood_drive();
        form.description = "Page one\u{0C}page two\u{0B}tab\there".into();
        render_document(&draft_report(&form), &path).unwrap();

        let doc = read_part(&path, "word/document.xml");
        assert!(!doc.contains('\u{0C}'));
        assert!(!doc.contains('\u{0B}'));

        let mut reader = Reader::from_str(&doc);
        let mut text = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Text(t)) => text.push_str(&t.unescape().unwrap()),
                Ok(_) => {}
                Err(e) => panic!("document.xml is not well-formed: {}", e),
            }
        }
        assert!(text.contains("Page one page two tab\there"));
    }

    #[test]
    fn takeaway_with_leading_colon_keeps_bold_colon() {
        let model = ReportModel {
            sections: vec![Section::Takeaways(vec![
                Takeaway::parse(": unclear point"),
                Takeaway::parse("no colon here"),
            ])],
        };
        let (doc, _) = document_xml(&model).unwrap();
        let doc = String::from_utf8(doc).unwrap();
        assert!(doc.contains("<w:b/>"));
        assert!(doc.contains(">:</w:t>"));
        assert!(doc.contains("> unclear point</w:t>"));
        assert_eq!(doc.matches("<w:b/>").count(), 2);
    }

    #[test]
    fn package_parts_are_declared() {
        let form = blood_drive();
        let model = build_report(&form, &FakeSummarizer::new()).unwrap();
        let parts = build_package(&model).unwrap();
        let names: Vec<&str> = parts.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names[0], "[Content_Types].xml");
        assert!(names.contains(&"word/styles.xml"));
        let core = String::from_utf8(parts[2].1.clone()).unwrap();
        assert!(core.contains("<dc:title>Blood Drive</dc:title>"));
        let styles = String::from_utf8(parts[5].1.clone()).unwrap();
        assert!(styles.contains("w:ascii=\"Times New Roman\""));
    }

    #[test]
    fn unwritable_target_fails_without_leaving_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.docx");
        let form = blood_drive();
        let model = build_report(&form, &FakeSummarizer::new()).unwrap();
        assert!(matches!(render_document(&model, &path), Err(ReportError::Document(_))));
        assert!(!path.exists());
    }

    #[test]
    fn overwrites_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        fs::write(&path, b"old").unwrap();
        let form = blood_drive();
        let model = build_report(&form, &FakeSummarizer::new()).unwrap();
        render_document(&model, &path).unwrap();
        assert!(read_part(&path, "word/document.xml").contains("Blood Drive"));
    }
}
