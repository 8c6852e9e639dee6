use std::path::{Path, PathBuf};

use crate::ai::{GeminiSummarizer, Summarizer};
use crate::attendance;
use crate::config::AppConfig;
use crate::credentials;
use crate::docx;
use crate::images;
use crate::preview;
use crate::report;
use crate::types::{EventMetadata, FlyerImage, FormFile, FormState, ImageEntry, DEFAULT_CAPTION};

/// One editing session: the form plus its collaborators.
pub struct AppState {
    pub config: AppConfig,
    pub form: FormState,
    pub ai: GeminiSummarizer,
    pub stylesheet: Option<String>,
}

#[derive(Debug)]
pub struct AttendanceSummary {
    pub participants: usize,
}

#[derive(Debug)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub participants: usize,
    pub takeaways: usize,
}

impl AppState {
    /// Reads the stored API key (file first, then `GEMINI_API_KEY`).
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let api_key = load_api_key_on_startup(&config)?;
        let ai = GeminiSummarizer::new(api_key, config.ai.clone()).map_err(|e| e.to_string())?;
        Ok(AppState {
            config,
            form: FormState::default(),
            ai,
            stylesheet: None,
        })
    }
}

fn load_api_key_on_startup(config: &AppConfig) -> Result<Option<String>, String> {
    let stored = credentials::get_stored_api_key(&config.api_key_file).map_err(|e| e.to_string())?;
    Ok(stored.or_else(|| config.env_api_key.clone()))
}

pub fn get_ai_status(state: &AppState) -> String {
    if state.ai.is_configured() {
        "configured".to_string()
    } else {
        "not_configured".to_string()
    }
}

pub fn save_api_key(state: &mut AppState, api_key: String) -> Result<(), String> {
    credentials::save_api_key_to_file(&state.config.api_key_file, &api_key).map_err(|e| e.to_string())?;
    state.ai.set_api_key(Some(api_key.trim().to_string()));
    Ok(())
}

/// Applied verbatim to the preview. A missing file is reported but leaves the preview usable.
pub fn load_styles(state: &mut AppState) -> Result<(), String> {
    match preview::load_stylesheet(&state.config.stylesheet) {
        Ok(css) => {
            state.stylesheet = Some(css);
            Ok(())
        }
        Err(e) => {
            state.stylesheet = None;
            Err(e.to_string())
        }
    }
}

pub fn set_event_details(state: &mut AppState, event: EventMetadata) {
    state.form.event = event;
}

pub fn set_description(state: &mut AppState, description: String) {
    state.form.description = description;
}

pub fn set_takeaway_prompt(state: &mut AppState, prompt: Option<String>) {
    state.form.takeaway_prompt = prompt.filter(|p| !p.trim().is_empty());
}

pub fn set_caption(state: &mut AppState, index: usize, caption: String) -> Result<(), String> {
    let entry = state
        .form
        .images
        .get_mut(index)
        .ok_or_else(|| format!("No picture at position {}", index + 1))?;
    entry.caption = caption;
    Ok(())
}

/// Decode and append pictures. Files that fail to decode are skipped and reported together.
pub fn add_images(state: &mut AppState, paths: &[PathBuf]) -> Result<usize, String> {
    let mut failures = Vec::new();
    let mut added = 0;
    for path in paths {
        match images::load_image(path) {
            Ok(image) => {
                state.form.images.push(ImageEntry {
                    path: path.clone(),
                    caption: DEFAULT_CAPTION.to_string(),
                    image,
                });
                added += 1;
            }
            Err(e) => failures.push(e.to_string()),
        }
    }
    if failures.is_empty() {
        Ok(added)
    } else {
        Err(failures.join("\n"))
    }
}

pub fn add_flyer(state: &mut AppState, path: &Path) -> Result<(), String> {
    let image = images::load_image(path).map_err(|e| format!("Error adding flyer: {}", e))?;
    state.form.flyer = Some(FlyerImage {
        path: path.to_path_buf(),
        image,
    });
    Ok(())
}

/// Replaces any previous list. A rejected file leaves no participants list at all.
pub fn upload_attendance(state: &mut AppState, path: &Path) -> Result<AttendanceSummary, String> {
    match attendance::import_attendance(path) {
        Ok(table) => {
            let participants = table.len();
            state.form.attendance = Some(table);
            Ok(AttendanceSummary { participants })
        }
        Err(e) => {
            state.form.attendance = None;
            Err(e.to_string())
        }
    }
}

pub fn update_preview(state: &AppState) -> String {
    preview::render_preview(&state.form, state.stylesheet.as_deref())
}

/// Fill the form from a JSON form file. Relative paths resolve against `base_dir`.
pub fn apply_form_file(state: &mut AppState, file: FormFile, base_dir: &Path) -> Result<(), String> {
    let resolve = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base_dir.join(p) };

    set_event_details(state, file.event);
    set_description(state, file.description);
    set_takeaway_prompt(state, file.takeaway_prompt);

    let mut errors = Vec::new();
    for image in &file.images {
        let start = state.form.images.len();
        if let Err(e) = add_images(state, &[resolve(&image.path)]) {
            errors.push(e);
            continue;
        }
        if let Some(caption) = &image.caption {
            set_caption(state, start, caption.clone())?;
        }
    }
    if let Some(flyer) = &file.flyer {
        if let Err(e) = add_flyer(state, &resolve(flyer)) {
            errors.push(e);
        }
    }
    if let Some(list) = &file.attendance {
        if let Err(e) = upload_attendance(state, &resolve(list)) {
            errors.push(e);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

pub fn read_form_file(path: &Path) -> Result<FormFile, String> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            "Form file not found.".to_string()
        } else {
            format!("Could not read form file: {}", e)
        }
    })?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid form file: {}", e))
}

/// Build the report (two model calls) and write it into `output_dir`.
pub fn generate_report_with(
    form: &FormState,
    summarizer: &dyn Summarizer,
    output_dir: &Path,
) -> Result<GeneratedReport, String> {
    let model = report::build_report(form, summarizer).map_err(|e| e.to_string())?;
    let takeaways = model
        .sections
        .iter()
        .find_map(|s| match s {
            report::Section::Takeaways(t) => Some(t.len()),
            _ => None,
        })
        .unwrap_or(0);
    let path = output_dir.join(report::report_filename(&form.event.title));
    docx::render_document(&model, &path).map_err(|e| e.to_string())?;
    Ok(GeneratedReport {
        path,
        participants: form.participant_count(),
        takeaways,
    })
}

pub fn generate_report(state: &AppState, output_dir: Option<&Path>) -> Result<GeneratedReport, String> {
    let dir = output_dir.unwrap_or(state.config.output_dir.as_path());
    generate_report_with(&state.form, &state.ai, dir)
}

pub fn open_report(path: &Path) -> Result<(), String> {
    opener::open(path).map_err(|e| e.to_string())
}
