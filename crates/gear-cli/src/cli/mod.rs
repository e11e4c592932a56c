use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `gearbox` binary.
#[derive(Debug, Parser)]
#[command(name = "gearbox", version, about = "Gearbox - driving school back office")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .gearbox)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::{LessonCommands, SchedulerCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "gearbox",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "dashboard",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Dashboard));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["gearbox", "dashboard", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Dashboard));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["gearbox", "--format", "xml", "dashboard"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["gearbox", "--project", "/tmp/demo", "dashboard"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }

    #[test]
    fn lesson_schedule_takes_resources() {
        let cli = Cli::try_parse_from([
            "gearbox",
            "lesson",
            "schedule",
            "--student",
            "stu-1",
            "--start",
            "2026-05-01T15:00:00Z",
            "--instructor",
            "ins-1",
        ])
        .expect("cli should parse");

        let Commands::Lesson { action } = cli.command else {
            panic!("expected lesson command");
        };
        let LessonCommands::Schedule {
            student,
            instructor,
            end,
            ..
        } = action
        else {
            panic!("expected schedule action");
        };
        assert_eq!(student, "stu-1");
        assert_eq!(instructor.as_deref(), Some("ins-1"));
        assert!(end.is_none());
    }

    #[test]
    fn scheduler_loop_accepts_interval() {
        let cli = Cli::try_parse_from(["gearbox", "scheduler", "loop", "--interval-secs", "5"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Scheduler {
                action: SchedulerCommands::Loop {
                    interval_secs: Some(5)
                }
            }
        ));
    }
}
