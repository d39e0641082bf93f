//! Todo CLI - command-line front end for the local to-do store.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use todo_capture::{acquire_image, FilePicker, ImageSource, StaticPermissions};
use todo_core::{Alert, AlertLevel, StoreError, Task, TaskDraft, TaskId, TodoConfig};
use todo_storage::{StatusFilter, TaskFilter, TaskStore};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the data directory looked up from the working directory.
const DATA_DIR_NAME: &str = ".todo";

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo - personal task list with photos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (defaults to the nearest .todo directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new data directory
    Init {
        /// Path to initialize (defaults to current directory)
        path: Option<String>,
    },

    /// Add a to-do
    Add {
        /// To-do title
        title: String,

        /// To-do description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Due time: RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (defaults to now)
        #[arg(long)]
        due: Option<String>,

        /// Attach an image from the photo library
        #[arg(long, conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// Attach a camera capture
        #[arg(long)]
        camera: Option<PathBuf>,
    },

    /// Edit a to-do
    Edit {
        /// To-do ID (or unique prefix)
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New due time
        #[arg(long)]
        due: Option<String>,

        /// Replace the image from the photo library
        #[arg(long, conflicts_with_all = ["camera", "clear_image"])]
        image: Option<PathBuf>,

        /// Replace the image with a camera capture
        #[arg(long, conflicts_with = "clear_image")]
        camera: Option<PathBuf>,

        /// Remove the attached image
        #[arg(long)]
        clear_image: bool,
    },

    /// Mark a to-do completed, or pending again
    Toggle {
        /// To-do ID (or unique prefix)
        id: String,
    },

    /// Delete a to-do
    Delete {
        /// To-do ID (or unique prefix)
        id: String,

        /// Force delete without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// List to-dos
    List {
        /// Only show to-dos whose title or description contains this text
        query: Option<String>,

        /// Only pending to-dos
        #[arg(long, conflicts_with = "completed")]
        pending: bool,

        /// Only completed to-dos
        #[arg(long)]
        completed: bool,
    },

    /// Show to-do details
    Show {
        /// To-do ID (or unique prefix)
        id: String,
    },

    /// Export the attached image
    Image {
        /// To-do ID (or unique prefix)
        id: String,

        /// Where to write the image
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

/// Find the data directory by walking up from the current directory.
fn find_data_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return Err(anyhow!(
                    "No {} directory found. Run 'todo init' to create one.",
                    DATA_DIR_NAME
                ));
            }
        }
    }
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => Err(anyhow!("Data directory {} does not exist", dir.display())),
        None => find_data_dir(),
    }
}

/// Open the store and pick up persisted tasks. A missing document is a first
/// run; anything else is reported so a damaged file is never overwritten.
async fn open_store(data_dir: &Path, config: &TodoConfig) -> Result<TaskStore> {
    let mut store = TaskStore::open(data_dir, config);
    if let Err(e) = store.load().await {
        if store.document().path().exists() {
            return Err(e.into());
        }
        debug!("Starting with an empty list: {}", e);
    }
    Ok(store)
}

/// Parse a due time given on the command line. Times without an offset are
/// local; a bare date means midnight.
fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = match NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map_err(|_| {
                anyhow!(
                    "Invalid due time '{}': use RFC 3339, 'YYYY-MM-DD HH:MM' or 'YYYY-MM-DD'",
                    input
                )
            })?
            .and_time(NaiveTime::MIN),
    };

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("Due time '{}' does not exist in the local timezone", input))
}

/// Match a full id or a unique prefix of one.
fn resolve_id(tasks: &[Task], prefix: &str) -> Result<TaskId> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(StoreError::not_found(prefix).into());
    }

    let matches: Vec<TaskId> = tasks
        .iter()
        .map(|t| t.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(StoreError::not_found(prefix).into()),
        _ => Err(anyhow!(
            "ID prefix '{}' matches {} to-dos; use more characters",
            prefix,
            matches.len()
        )),
    }
}

fn status_filter(pending: bool, completed: bool) -> StatusFilter {
    match (pending, completed) {
        (true, _) => StatusFilter::Pending,
        (_, true) => StatusFilter::Completed,
        _ => StatusFilter::All,
    }
}

/// True when image bytes were handed to the store but the task did not end up
/// with a new file: no image at all, or still the one it had before.
fn image_dropped(supplied: bool, before: Option<&str>, after: Option<&str>) -> bool {
    supplied && (after.is_none() || after == before)
}

/// Run the permission-gated picker for whichever image flag was given.
async fn acquire(
    config: &TodoConfig,
    library: Option<PathBuf>,
    camera: Option<PathBuf>,
) -> Result<Option<Vec<u8>>> {
    let (source, picker) = match (camera, library) {
        (Some(path), _) => (ImageSource::Camera, FilePicker::new().with_camera_file(path)),
        (None, Some(path)) => (
            ImageSource::PhotoLibrary,
            FilePicker::new().with_library_file(path),
        ),
        (None, None) => return Ok(None),
    };

    let permissions = StaticPermissions::from(&config.permissions);
    let acquisition = acquire_image(&permissions, &picker, source).await?;
    if let Some(alert) = acquisition.alert() {
        print_alert(&alert);
    }
    Ok(acquisition.into_bytes())
}

fn print_alert(alert: &Alert) {
    match alert.level {
        AlertLevel::Success => println!("{}", format!("✓ {}", alert.message).green().bold()),
        AlertLevel::Info => println!("{}", alert.message.yellow()),
        AlertLevel::Error => eprintln!(
            "{} {}",
            format!("{}:", alert.title).red().bold(),
            alert.message
        ),
    }
}

fn short_id(id: &TaskId) -> String {
    id.to_string()[..8].to_string()
}

fn colored_status(task: &Task) -> colored::ColoredString {
    if task.is_completed {
        task.status_label().green()
    } else {
        task.status_label().yellow()
    }
}

fn print_task(task: &Task) {
    println!("{}", "━".repeat(80));
    println!("{} {}", "To-Do:".bold(), task.id.to_string().bright_cyan());
    println!("{}", "━".repeat(80));
    println!();
    println!("{:<15} {}", "Title:".bold(), task.title);
    println!("{:<15} {}", "Status:".bold(), colored_status(task));
    println!("{:<15} {}", "Due:".bold(), task.due_label());
    match &task.image_file_name {
        Some(name) => println!("{:<15} {}", "Image:".bold(), name),
        None => println!("{:<15} {}", "Image:".bold(), "No Image Selected".bright_black()),
    }
    println!();
    println!("{}", "Description:".bold());
    println!("{}", task.description);
    println!();
    println!("{}", "━".repeat(80));
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { path } = &cli.command {
        let target = path.clone().unwrap_or_else(|| ".".to_string());
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| Path::new(&target).join(DATA_DIR_NAME));

        if !data_dir.join(todo_core::config::CONFIG_FILE).exists() {
            TodoConfig::write_default(&data_dir)?;
        }
        let config = TodoConfig::load_or_default(&data_dir)?;
        std::fs::create_dir_all(config.image_path(&data_dir))?;

        println!("{}", "✓ Initialized to-do directory".green().bold());
        println!("  Tasks:  {}", config.data_path(&data_dir).display());
        println!("  Images: {}", config.image_path(&data_dir).display());
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = TodoConfig::load_or_default(&data_dir)?;
    info!("Using data directory {}", data_dir.display());

    match cli.command {
        Commands::Init { .. } => Ok(()),

        Commands::Add {
            title,
            description,
            due,
            image,
            camera,
        } => {
            let due_time = match due {
                Some(text) => parse_due(&text)?,
                None => Utc::now(),
            };
            let mut store = open_store(&data_dir, &config).await?;
            let draft = TaskDraft::new(title, description, due_time);
            draft.validate().map_err(StoreError::from)?;

            let image = acquire(&config, image, camera).await?;
            let task = store.create(draft, image.as_deref()).await?;

            if image_dropped(image.is_some(), None, task.image_file_name.as_deref()) {
                print_alert(&Alert::image_dropped());
            }
            print_alert(&Alert::saved());
            println!("  ID:    {}", task.id.to_string().bright_cyan());
            println!("  Title: {}", task.title);
            println!("  Due:   {}", task.due_label());
            Ok(())
        }

        Commands::Edit {
            id,
            title,
            description,
            due,
            image,
            camera,
            clear_image,
        } => {
            let mut store = open_store(&data_dir, &config).await?;
            let id = resolve_id(store.tasks(), &id)?;
            let current = store.get(id).ok_or_else(|| StoreError::not_found(id))?;

            let mut draft = current.to_draft();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(text) = due {
                draft.due_time = parse_due(&text)?;
            }
            draft.validate().map_err(StoreError::from)?;

            let previous_image = current.image_file_name.clone();
            let image = acquire(&config, image, camera).await?;
            let mut task = store.update(id, draft, image.as_deref()).await?;
            if image_dropped(
                image.is_some(),
                previous_image.as_deref(),
                task.image_file_name.as_deref(),
            ) {
                print_alert(&Alert::image_dropped());
            }
            if clear_image {
                task = store.clear_image(id).await?;
            }
            print_alert(&Alert::saved());
            println!("  ID:    {}", task.id.to_string().bright_cyan());
            println!("  Title: {}", task.title);
            Ok(())
        }

        Commands::Toggle { id } => {
            let mut store = open_store(&data_dir, &config).await?;
            let id = resolve_id(store.tasks(), &id)?;
            let task = store.toggle_completion(id).await?;

            println!(
                "{} {} is now {}",
                "✓".green().bold(),
                task.title,
                colored_status(&task)
            );
            Ok(())
        }

        Commands::Delete { id, force } => {
            let mut store = open_store(&data_dir, &config).await?;
            let id = resolve_id(store.tasks(), &id)?;
            let task = store.get(id).ok_or_else(|| StoreError::not_found(id))?;

            if !force {
                println!(
                    "{}",
                    format!("About to delete to-do: {}", task.title)
                        .yellow()
                        .bold()
                );
                print!("Are you sure you want to delete this to-do? [y/N]: ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("{}", "Deletion cancelled".yellow());
                    return Ok(());
                }
            }

            store.delete(id).await?;
            print_alert(&Alert::deleted());
            Ok(())
        }

        Commands::List {
            query,
            pending,
            completed,
        } => {
            let store = open_store(&data_dir, &config).await?;

            if store.is_empty() {
                println!("{}", "No ToDos available".yellow());
                return Ok(());
            }

            let filter = TaskFilter::query(query.unwrap_or_default())
                .with_status(status_filter(pending, completed));
            let tasks = store.filter(&filter);

            if tasks.is_empty() {
                println!("{}", "No matching to-dos".yellow());
                return Ok(());
            }

            println!(
                "{:<10} {:<10} {:<26} {}",
                "ID".bold(),
                "STATUS".bold(),
                "DUE".bold(),
                "TITLE".bold()
            );
            println!("{}", "─".repeat(80));

            for task in tasks {
                let marker = if task.has_image() { " [img]" } else { "" };
                println!(
                    "{:<10} {:<10} {:<26} {}{}",
                    short_id(&task.id).bright_cyan(),
                    colored_status(task),
                    task.due_label(),
                    task.title,
                    marker.bright_black()
                );
            }

            Ok(())
        }

        Commands::Show { id } => {
            let store = open_store(&data_dir, &config).await?;
            let id = resolve_id(store.tasks(), &id)?;
            let task = store.get(id).ok_or_else(|| StoreError::not_found(id))?;

            print_task(task);
            Ok(())
        }

        Commands::Image { id, output } => {
            let store = open_store(&data_dir, &config).await?;
            let id = resolve_id(store.tasks(), &id)?;

            match store.image_for(id).await {
                Some(bytes) => {
                    tokio::fs::write(&output, bytes).await?;
                    println!(
                        "{}",
                        format!("✓ Wrote image to {}", output.display()).green().bold()
                    );
                }
                None => println!("{}", "No image available".yellow()),
            }
            Ok(())
        }

        Commands::Config => {
            println!("{:<24} {}", "Data directory:".bold(), data_dir.display());
            println!(
                "{:<24} {}",
                "Task document:".bold(),
                config.data_path(&data_dir).display()
            );
            println!(
                "{:<24} {}",
                "Image directory:".bold(),
                config.image_path(&data_dir).display()
            );
            println!(
                "{:<24} {}",
                "Delete replaced image:".bold(),
                config.delete_replaced_image
            );
            println!("{:<24} {}", "Camera access:".bold(), config.permissions.camera);
            println!(
                "{:<24} {}",
                "Photo library access:".bold(),
                config.permissions.photo_library
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<StoreError>() {
            Some(err) => print_alert(&Alert::from(err)),
            None => eprintln!("{} {}", "error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn task(title: &str) -> Task {
        Task::new(TaskDraft::new(title, "d", Utc::now()), None)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "todo", "add", "Buy milk", "-d", "2 liters", "--due", "2024-10-22 15:05",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                title,
                description,
                due,
                image,
                camera,
            } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(description, "2 liters");
                assert_eq!(due.as_deref(), Some("2024-10-22 15:05"));
                assert!(image.is_none() && camera.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_image_flags_conflict() {
        let result = Cli::try_parse_from([
            "todo", "add", "t", "--image", "a.jpg", "--camera", "b.jpg",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["todo", "edit", "abc", "--image", "a.jpg", "--clear-image"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_due_rfc3339() {
        let due = parse_due("2024-10-22T15:05:00Z").unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 10, 22, 15, 5, 0).unwrap());

        let due = parse_due("2024-10-22T17:05:00+02:00").unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 10, 22, 15, 5, 0).unwrap());
    }

    #[test]
    fn test_parse_due_local_formats() {
        let expected = Local
            .with_ymd_and_hms(2024, 10, 22, 15, 5, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_due("2024-10-22 15:05").unwrap(), expected);

        let midnight = Local
            .with_ymd_and_hms(2024, 10, 22, 0, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_due("2024-10-22").unwrap(), midnight);
    }

    #[test]
    fn test_parse_due_invalid() {
        assert!(parse_due("tomorrow").is_err());
        assert!(parse_due("2024-13-01").is_err());
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let tasks = vec![task("a"), task("b")];
        let full = tasks[1].id.to_string();

        assert_eq!(resolve_id(&tasks, &full).unwrap(), tasks[1].id);
        assert_eq!(resolve_id(&tasks, &full.to_uppercase()).unwrap(), tasks[1].id);
    }

    #[test]
    fn test_resolve_id_unknown() {
        let tasks = vec![task("a")];
        let err = resolve_id(&tasks, "zzzz").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound { .. })
        ));
        assert!(resolve_id(&tasks, "  ").is_err());
    }

    #[test]
    fn test_status_filter_flags() {
        assert_eq!(status_filter(false, false), StatusFilter::All);
        assert_eq!(status_filter(true, false), StatusFilter::Pending);
        assert_eq!(status_filter(false, true), StatusFilter::Completed);
    }

    #[tokio::test]
    async fn test_edit_with_rejected_image_reports_drop() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = TodoConfig::default();
        let mut store = open_store(temp_dir.path(), &config).await.unwrap();
        let jpeg: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
        let task = store
            .create(TaskDraft::new("t", "d", Utc::now()), Some(jpeg))
            .await
            .unwrap();
        let before = task.image_file_name.clone();
        assert!(before.is_some());

        let rejected = store
            .update(task.id, task.to_draft(), Some(b"not a jpeg".as_slice()))
            .await
            .unwrap();
        assert!(image_dropped(
            true,
            before.as_deref(),
            rejected.image_file_name.as_deref()
        ));

        let replaced = store
            .update(task.id, task.to_draft(), Some(jpeg))
            .await
            .unwrap();
        assert!(!image_dropped(
            true,
            before.as_deref(),
            replaced.image_file_name.as_deref()
        ));
    }

    #[test]
    fn test_image_dropped_on_add() {
        assert!(image_dropped(true, None, None));
        assert!(!image_dropped(true, None, Some("a.jpg")));
        assert!(!image_dropped(false, None, None));
        assert!(!image_dropped(false, Some("a.jpg"), Some("a.jpg")));
    }

    #[tokio::test]
    async fn test_open_store_first_run_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = open_store(temp_dir.path(), &TodoConfig::default())
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_open_store_rejects_damaged_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("todos.json"), "not json").unwrap();

        let result = open_store(temp_dir.path(), &TodoConfig::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_acquire_camera_denied_by_default() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let shot = temp_dir.path().join("shot.jpg");
        std::fs::write(&shot, [0xFF, 0xD8, 0xFF]).unwrap();
        let config = TodoConfig::default();

        let denied = acquire(&config, None, Some(shot.clone())).await.unwrap();
        assert!(denied.is_none());

        let picked = acquire(&config, Some(shot), None).await.unwrap();
        assert_eq!(picked, Some(vec![0xFF, 0xD8, 0xFF]));
    }
}
