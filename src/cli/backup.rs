//! Backup CLI commands
//!
//! Implements CLI commands for complete backups and restores.

use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{VitalError, VitalResult};
use crate::services::BackupService;
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write a complete backup of all patients and vital signs
    Create {
        /// Write to this path instead of the backup directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Replace all data with the contents of a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete backups older than the retention window
    Prune {
        /// Retention in days, overriding the configured value
        #[arg(long)]
        days: Option<u32>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl BackupCommands {
    /// Whether the command changes stored data
    pub fn mutates(&self) -> bool {
        matches!(self, Self::Restore { force: true, .. })
    }
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> VitalResult<()> {
    let service = BackupService::new(storage);

    match cmd {
        BackupCommands::Create { output } => {
            println!("Creating backup...");
            let backup_path = match output {
                Some(path) => {
                    service.create_at(&path)?;
                    path
                }
                None => service.create()?,
            };
            println!(
                "Backup created: {} patient(s), {} vital sign(s)",
                storage.patients.count()?,
                storage.vitals.count()?
            );
            println!("Location: {}", backup_path.display());
        }

        BackupCommands::List { verbose } => {
            let backups = service.catalog().list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: vitaldesk backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            let now = Local::now().naive_local();
            for (i, backup) in backups.iter().enumerate() {
                let age_str = format_duration(now.signed_duration_since(backup.created_at));

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S"),
                        format_size(backup.size_bytes),
                        age_str,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        backup.filename,
                        age_str,
                        format_size(backup.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = service.catalog().resolve(&backup)?;

            println!("Backup: {}", backup_path.display());
            println!(
                "Current data: {} patient(s), {} vital sign(s)",
                storage.patients.count()?,
                storage.vitals.count()?
            );
            println!();

            if !force {
                println!("WARNING: This will replace ALL current patients and vital signs!");
                println!("To proceed, run again with --force flag:");
                println!("  vitaldesk backup restore {} --force", backup);
                return Ok(());
            }

            println!("Restoring from backup...");
            match service.restore(&backup_path) {
                Ok(report) => {
                    println!("Restore complete!");
                    println!("Patients restored: {}", report.patients_restored);
                    println!("Vitals restored:   {}", report.vitals_restored);
                    if report.skipped + report.dropped + report.failed > 0 {
                        println!(
                            "Rows not restored: {} skipped, {} dropped, {} failed",
                            report.skipped, report.dropped, report.failed
                        );
                    }
                    if let Some(log) = report.log_path {
                        println!("Restore log: {}", log.display());
                    }
                }
                Err(VitalError::Import { message, log_path }) => {
                    println!("Restore failed: {}", message);
                    println!("Your previous data has been kept.");
                    println!("Restore log: {}", log_path.display());
                    return Err(VitalError::Import { message, log_path });
                }
                Err(e) => return Err(e),
            }
        }

        BackupCommands::Prune { days, force } => {
            let retention_days = days.unwrap_or(settings.backup_retention_days);
            let cutoff = Local::now().naive_local() - chrono::Duration::days(i64::from(retention_days));

            let backups = service.catalog().list_backups()?;
            let expired = backups.iter().filter(|b| b.created_at < cutoff).count();

            if expired == 0 {
                println!("No backups to prune.");
                println!("Retention: {} day(s), {} backup(s) kept.", retention_days, backups.len());
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention: {} day(s)", retention_days);
            println!("Current backups: {}", backups.len());
            println!("To be deleted: {}", expired);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  vitaldesk backup prune --force");
                return Ok(());
            }

            let deleted = service.prune(retention_days)?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
