use std::path::{Path, PathBuf};

use clap::Parser;
use strata_doc::StageHandle;
use strata_editor::{Editor, StageView, log_capture, project};

/// Headless Strata editor.
#[derive(Parser, Debug)]
#[command(
    name = "strata",
    about = "Editing session for layered scene documents",
    long_about = "Opens the documents listed in the project file and on the command line, \
        runs the editor for a number of frames and logs what happened.\n\n\
        Files are handled like files dropped onto the editor window: an empty \
        file becomes a new stage, anything else is opened as a layer.",
    version
)]
struct Args {
    /// Project configuration file.
    #[arg(long, default_value = "strata.toml")]
    project: PathBuf,

    /// Documents to open.
    files: Vec<PathBuf>,

    /// Number of frames to run before exiting.
    #[arg(long, default_value = "1")]
    frames: u64,
}

/// Stands in for a viewport and logs the stage it is shown.
struct LoggingViewport;

impl StageView for LoggingViewport {
    fn set_stage(&mut self, stage: Option<&StageHandle>) {
        match stage {
            Some(stage) => log::info!(
                "Viewport: {} ({} prims)",
                stage.display_name(),
                stage.prim_paths().len()
            ),
            None => log::debug!("Viewport: no stage"),
        }
    }
}

fn main() {
    let args = Args::parse();

    // The logger has to exist before the project load can report anything.
    let settings = project::load_project(&args.project)
        .map(|config| config.editor)
        .unwrap_or_default();
    let session_log = log_capture::install(&settings.log_filter, settings.log_capacity);
    if let Err(e) = &session_log {
        eprintln!("Logging unavailable: {e}");
    }
    let config = project::load_or_default(&args.project);

    let mut editor = Editor::with_settings(&config.editor);
    editor.session_mut().attach_view(Box::new(LoggingViewport));

    let base = args.project.parent().unwrap_or(Path::new("."));
    let mut startup = config.startup_paths(base);
    startup.extend(args.files);

    for frame in 0..args.frames {
        let report = editor.frame(|ctx| {
            if frame == 0 && !startup.is_empty() {
                ctx.drop_files(&startup);
            }
        });
        if !report.is_ok() {
            log::warn!(
                "Frame {frame}: {} of {} commands failed",
                report.failures.len(),
                report.processed
            );
        }
    }

    let session = editor.session();
    log::info!(
        "{}: {} stages, {} layers, current layer {}",
        config.project.name,
        session.stage_cache().len(),
        session.layer_set().len(),
        session
            .current_layer()
            .map_or("<none>", |layer| layer.display_name())
    );
    if editor.has_unsaved_changes() {
        log::warn!("Exiting with unsaved changes");
    }
    if let Ok(buffer) = session_log {
        let warnings = buffer.lock().at_least(log::Level::Warn).count();
        log::debug!("{warnings} warnings logged");
    }
}
