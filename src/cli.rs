use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::commands::{self, AppState};
use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "event-report", version, about = "Turn event details into a formatted Word report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the live preview (HTML) without calling the model
    Preview {
        #[command(flatten)]
        form: FormArgs,
        /// Write the preview here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Summarize the description and write the .docx report
    Generate {
        #[command(flatten)]
        form: FormArgs,
        /// Directory for the report (default: REPORT_OUTPUT_DIR or .)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Open the report when done
        #[arg(long)]
        open: bool,
    },
    /// Store the Gemini API key
    SaveKey { api_key: String },
    /// Check a participants list and print the normalized table as JSON
    ImportAttendance { file: PathBuf },
    /// Show whether an API key is configured
    Status,
}

#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// JSON form file; flags below override its fields
    #[arg(long)]
    pub form: Option<PathBuf>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub venue: Option<String>,
    /// Name of the student led club
    #[arg(long)]
    pub club: Option<String>,
    #[arg(long, conflicts_with = "description_file")]
    pub description: Option<String>,
    #[arg(long)]
    pub description_file: Option<PathBuf>,
    /// Event picture (repeatable)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
    /// Caption for the picture at the same position (repeatable)
    #[arg(long = "caption")]
    pub captions: Vec<String>,
    #[arg(long)]
    pub flyer: Option<PathBuf>,
    /// Participants list (.csv, .xlsx, .xls)
    #[arg(long)]
    pub attendance: Option<PathBuf>,
    /// Replace the default takeaways prompt
    #[arg(long)]
    pub takeaway_prompt: Option<String>,
}

/// Mirror the form's edit actions: each flag is one field change.
fn fill_form(state: &mut AppState, args: FormArgs) -> Result<(), String> {
    if let Some(path) = &args.form {
        let file = commands::read_form_file(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        commands::apply_form_file(state, file, base)?;
    }

    let mut event = state.form.event.clone();
    let overrides = [
        (&mut event.title, args.title),
        (&mut event.date, args.date),
        (&mut event.time, args.time),
        (&mut event.venue, args.venue),
        (&mut event.club_name, args.club),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }
    commands::set_event_details(state, event);

    if let Some(text) = args.description {
        commands::set_description(state, text);
    } else if let Some(path) = &args.description_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
        commands::set_description(state, text);
    }
    if args.takeaway_prompt.is_some() {
        commands::set_takeaway_prompt(state, args.takeaway_prompt);
    }

    let first_new = state.form.images.len();
    commands::add_images(state, &args.images)?;
    for (i, caption) in args.captions.into_iter().enumerate() {
        commands::set_caption(state, first_new + i, caption)?;
    }
    if let Some(flyer) = &args.flyer {
        commands::add_flyer(state, flyer)?;
    }
    if let Some(list) = &args.attendance {
        commands::upload_attendance(state, list)?;
    }
    Ok(())
}

pub fn execute(cli: Cli, config: AppConfig) -> Result<(), String> {
    let mut state = AppState::new(config)?;
    match cli.command {
        Command::Preview { form, out } => {
            if let Err(e) = commands::load_styles(&mut state) {
                log::error!("{}", e);
                eprintln!("Error: {}", e);
            }
            fill_form(&mut state, form)?;
            let html = commands::update_preview(&state);
            match out {
                Some(path) => std::fs::write(&path, html)
                    .map_err(|e| format!("Could not write {}: {}", path.display(), e))?,
                None => print!("{}", html),
            }
        }
        Command::Generate { form, output_dir, open } => {
            fill_form(&mut state, form)?;
            if !state.ai.is_configured() {
                log::warn!("No API key configured; the description is used as the summary");
            }
            let report = commands::generate_report(&state, output_dir.as_deref())?;
            println!("Report generated successfully as {}", report.path.display());
            if open {
                commands::open_report(&report.path)?;
            }
        }
        Command::SaveKey { api_key } => {
            commands::save_api_key(&mut state, api_key)?;
            println!("API Key saved successfully!");
        }
        Command::ImportAttendance { file } => {
            commands::upload_attendance(&mut state, &file)?;
            let table = state.form.attendance.unwrap_or_default();
            let json = serde_json::to_string_pretty(&table).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Status => println!("{}", commands::get_ai_status(&state)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_images_and_captions() {
        let cli = Cli::try_parse_from([
            "event-report", "generate", "--title", "Blood Drive", "--image", "a.png", "--image", "b.png",
            "--caption", "Desk", "--open",
        ])
        .unwrap();
        match cli.command {
            Command::Generate { form, open, .. } => {
                assert_eq!(form.title.as_deref(), Some("Blood Drive"));
                assert_eq!(form.images.len(), 2);
                assert_eq!(form.captions, vec!["Desk"]);
                assert!(open);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn description_sources_conflict() {
        let res = Cli::try_parse_from([
            "event-report", "preview", "--description", "x", "--description-file", "d.txt",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn flags_override_form_fields() {
        let dir = tempfile::tempdir().unwrap();
        let form_path = dir.path().join("form.json");
        std::fs::write(&form_path, r#"{"title": "Old", "venue": "Main Hall"}"#).unwrap();
        let config = AppConfig {
            api_key_file: dir.path().join("api_key.txt"),
            ..AppConfig::default()
        };
        let mut state = AppState::new(config).unwrap();
        let args = FormArgs {
            form: Some(form_path),
            title: Some("New".into()),
            ..FormArgs::default()
        };
        fill_form(&mut state, args).unwrap();
        assert_eq!(state.form.event.title, "New");
        assert_eq!(state.form.event.venue, "Main Hall");
    }
}
