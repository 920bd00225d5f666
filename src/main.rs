use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitaldesk::cli::{
    handle_backup_command, handle_export_command, handle_patient_command, handle_vital_command,
    BackupCommands, ExportCommands, PatientCommands, VitalCommands,
};
use vitaldesk::config::{paths::VitalPaths, settings::Settings};
use vitaldesk::services::BackupService;
use vitaldesk::storage::Storage;

/// Environment variable holding the log filter
const LOG_ENV: &str = "VITALDESK_LOG";

#[derive(Parser)]
#[command(
    name = "vitaldesk",
    version,
    about = "Clinic desk tool for inpatients and their vital signs",
    long_about = "VitalDesk keeps a register of inpatients and their periodic vital-sign \
                  measurements, and writes complete CSV backups that can be restored \
                  into an empty or existing installation."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Patient management commands
    #[command(subcommand)]
    Patient(PatientCommands),

    /// Vital sign commands
    #[command(subcommand)]
    Vital(VitalCommands),

    /// Complete backup and restore
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Plain CSV list exports
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show the most recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show current configuration and paths, or change settings
    Config {
        /// Days a backup is kept before `backup prune` removes it
        #[arg(long)]
        retention_days: Option<u32>,

        /// Write a backup after every command that changes data
        #[arg(long)]
        backup_on_exit: Option<bool>,

        /// Date format for terminal output (strftime)
        #[arg(long)]
        date_format: Option<String>,
    },
}

impl Commands {
    fn mutates(&self) -> bool {
        match self {
            Commands::Patient(cmd) => cmd.mutates(),
            Commands::Vital(cmd) => cmd.mutates(),
            Commands::Backup(cmd) => cmd.mutates(),
            Commands::Export(_) | Commands::Audit { .. } | Commands::Config { .. } => false,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = VitalPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let mutates = cli.command.as_ref().is_some_and(Commands::mutates);

    match cli.command {
        Some(Commands::Patient(cmd)) => handle_patient_command(&storage, &settings, cmd)?,
        Some(Commands::Vital(cmd)) => handle_vital_command(&storage, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Config {
            retention_days,
            backup_on_exit,
            date_format,
        }) => {
            let changed = retention_days.is_some() || backup_on_exit.is_some() || date_format.is_some();
            if let Some(days) = retention_days {
                settings.backup_retention_days = days;
            }
            if let Some(enabled) = backup_on_exit {
                settings.backup_on_exit = enabled;
            }
            if let Some(format) = date_format {
                settings.date_format = format;
            }
            if changed {
                settings.save(&paths)?;
                println!("Settings saved to {}", paths.settings_file().display());
                println!();
            }

            println!("VitalDesk Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Backup retention: {} day(s)", settings.backup_retention_days);
            println!("  Backup on exit:   {}", settings.backup_on_exit);
            println!("  Date format:      {}", settings.date_format);
        }
        None => {
            println!("VitalDesk - inpatient and vital sign register");
            println!();
            println!("Run 'vitaldesk --help' for usage information.");
        }
    }

    if mutates && settings.backup_on_exit {
        // best effort; the command itself already succeeded
        match BackupService::new(&storage).create() {
            Ok(path) => tracing::info!(path = %path.display(), "exit backup written"),
            Err(e) => tracing::warn!(error = %e, "exit backup failed"),
        }
    }

    Ok(())
}
