use anyhow::{bail, Context};
use borderly::{
    collect_image_paths, BatchResult, BatchScheduler, Cli, Commands, ProfileSelection,
    SettingsDocument, TransformPipeline,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Process {
            inputs,
            profile,
            all_profiles,
            output,
            after,
            move_to,
            workers,
            recursive,
        } => {
            let options = ProcessOptions {
                inputs,
                profile,
                all_profiles,
                output,
                after,
                move_to,
                workers,
                recursive,
            };
            process_images(&cli.settings, options)?;
        }
        Commands::Profiles => list_profiles(&cli.settings)?,
        Commands::Init { force } => init_settings(&cli.settings, force)?,
        Commands::Recent { clear } => recent_files(&cli.settings, clear)?,
    }

    Ok(())
}

struct ProcessOptions {
    inputs: Vec<PathBuf>,
    profile: Option<String>,
    all_profiles: bool,
    output: Option<PathBuf>,
    after: Option<borderly::AfterProcessing>,
    move_to: Option<PathBuf>,
    workers: Option<usize>,
    recursive: bool,
}

fn process_images(settings_path: &Path, options: ProcessOptions) -> anyhow::Result<()> {
    let from_disk = settings_path.exists();
    let mut document = SettingsDocument::load_or_default(settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    if let Some(output) = options.output {
        document.settings.output_directory = output;
    }
    if let Some(after) = options.after {
        document.settings.processed_file_option = after.into();
    }
    if let Some(move_to) = options.move_to {
        document.settings.processed_directory = Some(move_to);
    }

    // Configuration errors surface here, before anything is touched.
    let policy = document.settings.disposition_policy()?;

    let selection = if options.all_profiles {
        ProfileSelection::All
    } else {
        match options.profile {
            Some(name) => ProfileSelection::Single(name),
            None => match document.profiles.first() {
                Some(first) => ProfileSelection::Single(first.name.clone()),
                None => bail!("No profiles configured in {}", settings_path.display()),
            },
        }
    };
    let profiles = selection.select(&document.profiles)?;

    let files = collect_image_paths(&options.inputs, options.recursive)?;

    let mut scheduler =
        BatchScheduler::new(TransformPipeline::new(&document.settings.output_directory));
    if let Some(workers) = options.workers {
        scheduler = scheduler.with_workers(workers);
    }

    let pb = create_progress_bar(files.len() * profiles.len());
    let result = scheduler.run(&files, &profiles, &policy, &pb)?;
    pb.finish_and_clear();

    print_summary(&result, &document.settings.output_directory);

    for file in &files {
        document.settings.add_recent_file(file.clone());
    }
    if from_disk {
        document
            .save(settings_path)
            .with_context(|| format!("Failed to save settings to {}", settings_path.display()))?;
    }

    if !result.is_success() {
        bail!(
            "{} of {} tasks failed, {} originals could not be disposed of",
            result.failed(),
            result.attempted,
            result.disposition_failures.len()
        );
    }

    Ok(())
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn print_summary(result: &BatchResult, output_dir: &Path) {
    println!(
        "Processed {}/{} tasks into {}",
        result.succeeded,
        result.attempted,
        output_dir.display()
    );

    for failure in &result.failures {
        println!("  failed: {}", failure);
    }

    if result.disposed > 0 {
        println!("Disposed of {} originals", result.disposed);
    }
    for failure in &result.disposition_failures {
        println!("  not disposed: {}: {}", failure.path.display(), failure.error);
    }
}

fn list_profiles(settings_path: &Path) -> anyhow::Result<()> {
    let document = SettingsDocument::load_or_default(settings_path)?;

    println!("=== Profiles ===");
    for profile in &document.profiles {
        let resize = match (&profile.resize_width, &profile.resize_height) {
            (None, None) => "none".to_string(),
            (w, h) => format!(
                "{} x {}",
                w.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "auto".to_string()),
                h.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "auto".to_string())
            ),
        };
        println!(
            "{:20} border: {:8} colour: {} quality: {:3} resize: {}",
            profile.name,
            profile.border_width.to_string(),
            profile.border_color,
            profile.quality,
            resize
        );
    }

    Ok(())
}

fn init_settings(settings_path: &Path, force: bool) -> anyhow::Result<()> {
    if settings_path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite",
            settings_path.display()
        );
    }

    SettingsDocument::default().save(settings_path)?;
    println!("Wrote default settings to {}", settings_path.display());
    Ok(())
}

fn recent_files(settings_path: &Path, clear: bool) -> anyhow::Result<()> {
    let mut document = SettingsDocument::load(settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    if clear {
        document.settings.clear_recent_files();
        document.save(settings_path)?;
        println!("Cleared recent files");
        return Ok(());
    }

    let pruned = document.settings.prune_missing_recent_files();
    if pruned > 0 {
        log::info!("Removed {} missing files from the recent list", pruned);
        document.save(settings_path)?;
    }

    if document.settings.recent_files.is_empty() {
        println!("(No recent files)");
    }
    for file in &document.settings.recent_files {
        println!("{}", file.display());
    }

    Ok(())
}
