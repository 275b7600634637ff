use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use karactl::{
    commands::{self, BasicRuleSpec, WriteOptions},
    config::ConfigRepository,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "karactl")]
#[command(about = "Karabiner-Elements config manager - inspect and edit karabiner.json with automatic backups")]
#[command(version)]
struct Cli {
    /// Operate on this profile instead of the selected one
    #[arg(long, global = true, value_name = "NAME")]
    profile: Option<String>,

    /// Do not back up karabiner.json before writing it
    #[arg(long, global = true)]
    no_backup: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all profile names
    ListProfiles,

    /// Show the selected profile's name
    CurrentProfile,

    /// List complex modification rules of the selected profile
    ListRules,

    /// Show simple modifications of the selected profile
    ListSimple,

    /// Create a timestamped backup of karabiner.json
    Backup,

    /// Map one key to another (replaces an existing mapping for the same key)
    AddSimple {
        /// Source key code
        from_key: String,
        /// Target key code
        to_key: String,
    },

    /// Add a complex modification rule with one basic manipulator
    AddRule {
        /// Rule description
        description: String,
        /// Source key code
        from_key: String,
        /// Target key code
        to_key: String,
        /// Modifier that must be held on the source key (repeatable)
        #[arg(long = "from-mandatory", value_name = "MODIFIER")]
        from_mandatory: Vec<String>,
        /// Modifier that may be held on the source key (repeatable)
        #[arg(long = "from-optional", value_name = "MODIFIER")]
        from_optional: Vec<String>,
        /// Modifier sent with the target key (repeatable)
        #[arg(long = "to-modifier", value_name = "MODIFIER")]
        to_modifiers: Vec<String>,
    },

    /// Remove the first complex modification rule with this description
    RemoveRule {
        /// Exact rule description
        description: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Write the profile's rules to assets/complex_modifications/<FILENAME>.json
    ExportRules {
        /// File name without the .json extension
        filename: String,
        /// Title stored in the file (defaults to "<profile> rules")
        #[arg(long)]
        title: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_help() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    let command = match cli.command {
        None => return print_help(),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "karactl", &mut std::io::stdout());
            return Ok(());
        }
        Some(command) => command,
    };

    let repo = ConfigRepository::new(Paths::new()?);
    debug!(config = %repo.config_path().display(), "using config");

    let profile = cli.profile.as_deref();
    let opts = WriteOptions {
        profile,
        backup: !cli.no_backup,
    };

    match command {
        Commands::ListProfiles => {
            commands::reject_profile_option(profile, "list-profiles")?;
            commands::list_profiles(&repo, ui)
        }
        Commands::CurrentProfile => {
            commands::reject_profile_option(profile, "current-profile")?;
            commands::current_profile(&repo, ui)
        }
        Commands::ListRules => commands::list_rules(&repo, profile, ui),
        Commands::ListSimple => commands::list_simple(&repo, profile, ui),
        Commands::Backup => commands::backup(&repo, ui),
        Commands::AddSimple { from_key, to_key } => {
            commands::add_simple(&repo, opts, &from_key, &to_key, ui)
        }
        Commands::AddRule {
            description,
            from_key,
            to_key,
            from_mandatory,
            from_optional,
            to_modifiers,
        } => {
            let spec = BasicRuleSpec {
                description,
                from_key,
                to_key,
                from_mandatory,
                from_optional,
                to_modifiers,
            };
            commands::add_rule(&repo, opts, &spec, ui)
        }
        Commands::RemoveRule { description, force } => {
            commands::remove_rule(&repo, opts, &description, force, ui)
        }
        Commands::ExportRules { filename, title } => {
            commands::export_rules(&repo, profile, &filename, title.as_deref(), ui)
        }
        Commands::Completions { .. } => Ok(()),
        Commands::Unknown(args) => {
            debug!(?args, "unrecognized command");
            print_help()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ui = Ui::new(cli.color, cli.no_color);

    match run(cli, &ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.err(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
