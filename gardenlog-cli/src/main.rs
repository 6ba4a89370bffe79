use clap::{Parser, Subcommand, ValueEnum};
use gardenlog::corrections::{CorrectionCatalog, CorrectionPatch, NewCorrection};
use gardenlog::dashboard::DashboardResolver;
use gardenlog::journal::{self, UpdateAction};
use gardenlog::{Config, PlantStore};
use std::process;

/// gardenlog CLI for inspecting and updating the garden journal
#[derive(Parser)]
#[command(name = "gardenlog", version, about)]
struct Cli {
    /// Data directory (default: gardenlog.yaml / GARDENLOG_DATA_DIR)
    #[arg(long)]
    data_dir: Option<String>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusFilter {
    Active,
    Inactive,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    JournalEntry,
    PlantMainData,
}

impl From<ActionArg> for UpdateAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::JournalEntry => UpdateAction::JournalEntry,
            ActionArg::PlantMainData => UpdateAction::PlantMainData,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List plants, sorted by display name
    List {
        /// Only plants with this status
        #[arg(long)]
        status: Option<StatusFilter>,
    },

    /// Get a single plant by ID
    Get {
        /// Plant ID (e.g. basil_001)
        plant_id: String,
    },

    /// Apply one update fragment to a plant and persist it
    Journal {
        /// Plant ID
        plant_id: String,
        /// Update mode
        #[arg(long, default_value = "journal-entry")]
        action: ActionArg,
        /// Read the JSON fragment from a file instead of stdin
        #[arg(long)]
        file: Option<String>,
    },

    /// Show the dashboard categories with their resolved plants
    Dashboard,

    /// Manage the correction catalog
    Corrections {
        #[command(subcommand)]
        command: CorrectionsCommand,
    },
}

#[derive(Subcommand)]
enum CorrectionsCommand {
    /// List all corrections
    List,

    /// Get a correction by ID
    Get { id: String },

    /// Create a correction (ID assigned from the title unless --id is given)
    Create {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sub_category: Option<String>,
        #[arg(long, default_value = "")]
        trigger_if: String,
        #[arg(long, default_value = "")]
        response_then: String,
        #[arg(long = "anti-pattern")]
        anti_patterns: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Overwrite selected fields of a correction
    Update {
        id: String,
        #[arg(long)]
        trigger_if: Option<String>,
        #[arg(long)]
        response_then: Option<String>,
        #[arg(long = "anti-pattern")]
        anti_patterns: Option<Vec<String>>,
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },

    /// Bump a correction's usage counter
    Increment { id: String },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.into();
    }
    let store = PlantStore::new(config.plants_dir());

    match cli.command {
        Command::List { status } => {
            let plants = match status {
                None => store.list()?,
                Some(StatusFilter::Active) => store.list_active()?,
                Some(StatusFilter::Inactive) => store.list_inactive()?,
            };
            print_output(&serde_json::to_value(&plants)?, &cli.format);
        }

        Command::Get { plant_id } => {
            let plant = store.get(&plant_id)?;
            print_output(&serde_json::to_value(&plant)?, &cli.format);
        }

        Command::Journal {
            plant_id,
            action,
            file,
        } => {
            let fragment = read_fragment(file)?;
            let plant = journal::apply_update(&store, &plant_id, action.into(), fragment)?;
            print_output(&serde_json::to_value(&plant)?, &cli.format);
        }

        Command::Dashboard => {
            let resolver = DashboardResolver::new(config.dashboard_order_file());
            let categories = resolver.resolve(&store)?;
            print_output(&serde_json::to_value(&categories)?, &cli.format);
        }

        Command::Corrections { command } => {
            let catalog = CorrectionCatalog::new(config.corrections_file());
            run_corrections(&catalog, command, &cli.format)?;
        }
    }

    Ok(())
}

fn run_corrections(
    catalog: &CorrectionCatalog,
    command: CorrectionsCommand,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CorrectionsCommand::List => {
            let corrections = catalog.list()?;
            print_output(&serde_json::to_value(&corrections)?, format);
        }

        CorrectionsCommand::Get { id } => {
            let correction = catalog.get(&id)?;
            print_output(&serde_json::to_value(&correction)?, format);
        }

        CorrectionsCommand::Create {
            id,
            title,
            category,
            sub_category,
            trigger_if,
            response_then,
            anti_patterns,
            tags,
        } => {
            let assigned = catalog.create(NewCorrection {
                id,
                title,
                category,
                sub_category,
                trigger_if,
                response_then,
                anti_patterns: anti_patterns.into_iter().collect(),
                tags: tags.into_iter().collect(),
            })?;
            print_output(&serde_json::json!({ "id": assigned }), format);
        }

        CorrectionsCommand::Update {
            id,
            trigger_if,
            response_then,
            anti_patterns,
            tags,
        } => {
            catalog.update(
                &id,
                CorrectionPatch {
                    trigger_if,
                    response_then,
                    anti_patterns: anti_patterns.map(|v| v.into_iter().collect()),
                    tags: tags.map(|v| v.into_iter().collect()),
                },
            )?;
            print_output(&serde_json::json!({ "ok": true, "id": id }), format);
        }

        CorrectionsCommand::Increment { id } => {
            let found = catalog.increment(&id)?;
            print_output(&serde_json::json!({ "ok": found, "id": id }), format);
        }
    }

    Ok(())
}

fn read_fragment(file: Option<String>) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let raw = if let Some(path) = file {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read fragment file '{path}': {e}"))?
    } else {
        use std::io::Read;
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        raw
    };
    Ok(serde_json::from_str(&raw)?)
}

fn print_output(value: &serde_json::Value, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value).unwrap());
        }
    }
}
