use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timekeeper::config::{Config, HOME_ENV};
use timekeeper::registry::ProjectRegistry;
use timekeeper::storage::{FileVault, ProjectStorage};
use timekeeper::summary::{self, Period, ReportStyle};
use timekeeper::tracking::{self, ToggleTracking};
use timekeeper::workflow::{self, StdinPrompt, WorkflowOutcome, CANCELLED_MESSAGE};

#[derive(Parser)]
#[command(name = "tk")]
#[command(about = "Time tracking utility.")]
struct Cli {
    /// Default vault directory, also holding the project index
    #[arg(long, global = true, env = HOME_ENV)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project
    Init,
    /// Toggle time tracking for a project
    #[command(alias = "t")]
    Toggle {
        /// Name of the project
        project_name: String,
        /// The role you want to track time for
        role: Option<String>,
    },
    /// Summarize time spent on projects
    #[command(alias = "s")]
    Sum {
        /// Summary period
        #[arg(long, value_enum, default_value_t = PeriodArg::Weekly)]
        period: PeriodArg,
        /// Display sum for a specific project
        #[arg(long)]
        project: Option<String>,
        /// Display totals as H:MM:SS instead of decimal hours
        #[arg(long)]
        precise: bool,
        /// Display the billable amount next to each total
        #[arg(long)]
        billable: bool,
    },
    /// Show project info
    Info {
        /// Name of the project
        project_name: String,
    },
    /// Add a role to an existing project
    #[command(name = "add_role")]
    AddRole {
        /// Name of the project
        project_name: String,
    },
    /// List all projects
    #[command(alias = "p")]
    Projects,
    /// List all vaults
    #[command(alias = "v")]
    Vaults,
    /// Show the timekeeper index
    #[command(alias = "i")]
    Index,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Daily => Period::Daily,
            PeriodArg::Weekly => Period::Weekly,
            PeriodArg::Monthly => Period::Monthly,
        }
    }
}

/// Logs go to stderr so reports on stdout stay clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "timekeeper=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match cli.home {
        Some(home) => Config::new(home),
        None => Config::from_env()?,
    };

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let mut registry = ProjectRegistry::open(&config.home)?;

    match command {
        Commands::Init => {
            let outcome =
                workflow::initialize_project(&mut StdinPrompt, &mut registry, &config.home)?;
            return Ok(finish(&outcome));
        }
        Commands::Toggle { project_name, role } => {
            let vault = open_vault(&registry, &project_name)?;
            let mut project = vault.load(&project_name)?;
            let role_name = role.unwrap_or_default();

            let outcome = ToggleTracking::new(&vault).execute(&mut project, &role_name)?;
            if let Some(notice) = outcome.notice() {
                println!("{}", notice);
            }
            println!("{}", outcome);
        }
        Commands::Sum {
            period,
            project,
            precise,
            billable,
        } => {
            let style = ReportStyle { precise, billable };
            let report =
                summary::report_projects(&registry, project.as_deref(), period.into(), style)?;
            print!("{}", report);
        }
        Commands::Info { project_name } => {
            let project = open_vault(&registry, &project_name)?.load(&project_name)?;
            println!("{}", tracking::status_line(&project));
        }
        Commands::AddRole { project_name } => {
            let outcome = workflow::add_role(&mut StdinPrompt, &registry, &project_name)?;
            return Ok(finish(&outcome));
        }
        Commands::Projects => {
            for name in registry.list_projects() {
                println!("{}", name);
            }
        }
        Commands::Vaults => {
            for vault in registry.list_vaults() {
                println!("{}", vault.display());
            }
        }
        Commands::Index => {
            println!("{}", serde_json::to_string_pretty(registry.index())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open_vault(registry: &ProjectRegistry, project_name: &str) -> anyhow::Result<FileVault> {
    let vault_path = registry.get_vault_path(project_name)?;
    Ok(FileVault::open(vault_path)?)
}

/// A cancelled workflow exits non-zero with a goodbye, but is not an error.
fn finish<T>(outcome: &WorkflowOutcome<T>) -> ExitCode {
    if outcome.is_cancelled() {
        eprintln!("\n{}", CANCELLED_MESSAGE);
    }
    ExitCode::from(outcome.exit_code())
}
