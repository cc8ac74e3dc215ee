use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use shelves_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    layout::{allocate, ContainerSlot, LayoutError, ShelfLayout},
    logging::{self, LoggerConfig},
    services::ImportService,
};
use slog::Logger;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan(args) => handle_plan(args, cli.json)?,
        Commands::Migrate => {
            let context = CliContext::initialize().await?;
            db::run_migrations(&context.db)
                .await
                .context("failed to apply migrations")?;
            println!("Migrations applied");
        }
        Commands::Import(args) => {
            let context = CliContext::initialize().await?;
            handle_import(&context, args, cli.json).await?
        }
        Commands::Uploads(args) => {
            let context = CliContext::initialize().await?;
            handle_uploads(&context, args, cli.json).await?
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "shelves", about = "Shelves CLI for imports and layout planning", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Import customers from a CSV file
    Import(ImportArgs),
    /// List past imports of an author
    Uploads(UploadsArgs),
    /// Print the containers a shelf of the given size would get
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// CSV file with a header row naming name, code and note columns
    file: PathBuf,
    /// Author owning the imported customers
    #[arg(long)]
    author: Uuid,
}

#[derive(Debug, Args)]
struct UploadsArgs {
    #[arg(long)]
    author: Uuid,
}

#[derive(Debug, Args)]
struct PlanArgs {
    #[arg(long)]
    cols: Option<i32>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long)]
    nums: Option<i32>,
    /// Capacity limit; defaults to the configured value
    #[arg(long)]
    max_cells: Option<u32>,
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
    logger: Logger,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let logger = logging::setup_logger(LoggerConfig {
            use_color: false,
            ..LoggerConfig::with_level(config.log_level())
        });

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;

        Ok(Self {
            config,
            db: Arc::new(db_pool),
            logger,
        })
    }

    fn import_service(&self) -> ImportService {
        ImportService::new(
            self.db.clone(),
            self.logger.clone(),
            self.config.import_sniff_bytes,
            self.config.max_upload_bytes,
        )
    }
}

async fn handle_import(context: &CliContext, args: ImportArgs, json: bool) -> Result<()> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    let report = context
        .import_service()
        .import(args.author, &file_name, &bytes)
        .await
        .context("import failed")?;

    if json {
        print_json(&report)?;
    } else {
        println!(
            "Imported {}: {} created, {} existing (upload {})",
            report.file_name, report.created, report.existing, report.upload_id
        );
    }
    Ok(())
}

async fn handle_uploads(context: &CliContext, args: UploadsArgs, json: bool) -> Result<()> {
    let uploads = context
        .import_service()
        .uploads(args.author)
        .await
        .context("failed to list uploads")?;

    if json {
        print_json(&uploads)?;
    } else if uploads.is_empty() {
        println!("No uploads");
    } else {
        for upload in uploads {
            println!(
                "- {} • {} • {} created, {} existing • {}",
                upload.id,
                upload.file_name,
                upload.created_count,
                upload.existing_count,
                upload.created_at.to_rfc3339()
            );
        }
    }
    Ok(())
}

fn handle_plan(args: PlanArgs, json: bool) -> Result<()> {
    let max_cells = match args.max_cells {
        Some(max) => max,
        None => config::load_config()
            .map(|cfg| cfg.max_shelf_cells)
            .unwrap_or(shelves_api::layout::DEFAULT_MAX_CELLS),
    };

    let (layout, slots) = plan_containers(&args, max_cells)?;

    if json {
        #[derive(Serialize)]
        struct Plan<'a> {
            layout: ShelfLayout,
            containers: &'a [ContainerSlot],
        }
        print_json(&Plan {
            layout,
            containers: &slots,
        })?;
    } else {
        println!("{} containers", slots.len());
        for slot in &slots {
            match (slot.col, slot.row) {
                (Some(col), Some(row)) => println!("#{:>3}  col {} row {}", slot.position, col, row),
                _ => println!("#{:>3}", slot.position),
            }
        }
    }
    Ok(())
}

/// The layout and container slots a shelf of the requested size would get
fn plan_containers(
    args: &PlanArgs,
    max_cells: u32,
) -> Result<(ShelfLayout, Vec<ContainerSlot>), LayoutError> {
    let layout = ShelfLayout::from_dimensions(args.cols, args.rows, args.nums)?;
    let slots = allocate(layout, max_cells)?;
    Ok((layout, slots))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shelves_api::layout::DEFAULT_MAX_CELLS;

    fn plan_args(cols: Option<i32>, rows: Option<i32>, nums: Option<i32>) -> PlanArgs {
        PlanArgs {
            cols,
            rows,
            nums,
            max_cells: None,
        }
    }

    #[test]
    fn grid_plan_lists_every_cell() {
        let (layout, slots) =
            plan_containers(&plan_args(Some(2), Some(3), None), DEFAULT_MAX_CELLS).unwrap();

        assert_eq!(layout, ShelfLayout::Grid { cols: 2, rows: 3 });
        assert_eq!(slots.len(), 6);
        assert_eq!(slots.last().map(|s| s.position), Some(6));
    }

    #[test]
    fn oversized_plan_exceeds_capacity() {
        assert_matches!(
            plan_containers(&plan_args(None, None, Some(65)), DEFAULT_MAX_CELLS),
            Err(LayoutError::CapacityExceeded { cells: 65, max: 64 })
        );
    }

    #[test]
    fn plan_parses_from_the_command_line() {
        let cli = Cli::try_parse_from(["shelves", "plan", "--cols", "2", "--rows", "3"]).unwrap();
        assert_matches!(
            cli.command,
            Commands::Plan(PlanArgs { cols: Some(2), rows: Some(3), nums: None, max_cells: None })
        );
    }
}
