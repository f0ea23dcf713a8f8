pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    pub signal_dir: String,
    pub history_file: String,
    pub prompt_file: String,
    pub signal_prefix: String,
    /// Lines at the top of each signal file that are not items
    pub header_lines: usize,
    /// Items must be strictly longer than this many characters
    pub min_item_chars: usize,
    /// Archived signal files are moved here, relative to `signal_dir`
    pub processed_dir: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            signal_dir: "news_data".to_string(),
            history_file: "ZenAI_History.csv".to_string(),
            prompt_file: "Latest_AI_Prompt.txt".to_string(),
            signal_prefix: "wiki_".to_string(),
            header_lines: 3,
            min_item_chars: 5,
            processed_dir: "archived".to_string(),
        }
    }
}

impl ConfigProvider for ArchiveSettings {
    fn signal_dir(&self) -> &str {
        &self.signal_dir
    }

    fn history_file(&self) -> &str {
        &self.history_file
    }

    fn prompt_file(&self) -> &str {
        &self.prompt_file
    }

    fn signal_prefix(&self) -> &str {
        &self.signal_prefix
    }

    fn header_lines(&self) -> usize {
        self.header_lines
    }

    fn min_item_chars(&self) -> usize {
        self.min_item_chars
    }

    fn processed_dir(&self) -> &str {
        &self.processed_dir
    }
}

impl Validate for ArchiveSettings {
    fn validate(&self) -> Result<()> {
        validate_path("archive.signal_dir", &self.signal_dir)?;
        validate_path("archive.history_file", &self.history_file)?;
        validate_path("archive.prompt_file", &self.prompt_file)?;
        validate_non_empty_string("archive.signal_prefix", &self.signal_prefix)?;
        validate_path("archive.processed_dir", &self.processed_dir)?;
        validate_range("archive.header_lines", self.header_lines, 0, 100)?;
        validate_range("archive.min_item_chars", self.min_item_chars, 0, 1000)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use self::args::{ArchiveArgs, CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use super::ArchiveSettings;
    use chrono::{NaiveDate, NaiveDateTime};
    use clap::{Args, Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "ganzhi-archive")]
    #[command(about = "Stem-branch time coordinates and signal archiving")]
    pub struct CliConfig {
        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        /// Path to TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        /// CSV calendar table used instead of the computed calendar
        #[arg(long, global = true)]
        pub table: Option<String>,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Print the four pillars of a date and clock time
        Pillars {
            /// Gregorian date, YYYY-MM-DD
            date: NaiveDate,

            #[arg(long, default_value = "0")]
            hour: u32,

            #[arg(long, default_value = "0")]
            minute: u32,

            #[arg(long, help = "Print the result as JSON")]
            json: bool,
        },
        /// Archive signal files into the history log and prompt file
        Archive(ArchiveArgs),
        /// Check the Start-of-Spring boundary case and the current moment
        Verify,
    }

    #[derive(Debug, Clone, Args)]
    pub struct ArchiveArgs {
        #[arg(long)]
        pub signal_dir: Option<String>,

        #[arg(long)]
        pub history: Option<String>,

        #[arg(long)]
        pub prompt: Option<String>,

        #[arg(long)]
        pub prefix: Option<String>,

        /// Archive moment, YYYY-MM-DD HH:MM (defaults to the local clock)
        #[arg(long, value_parser = parse_moment)]
        pub at: Option<NaiveDateTime>,
    }

    impl ArchiveArgs {
        pub fn apply(&self, settings: &mut ArchiveSettings) {
            if let Some(dir) = &self.signal_dir {
                settings.signal_dir = dir.clone();
            }
            if let Some(history) = &self.history {
                settings.history_file = history.clone();
            }
            if let Some(prompt) = &self.prompt {
                settings.prompt_file = prompt.clone();
            }
            if let Some(prefix) = &self.prefix {
                settings.signal_prefix = prefix.clone();
            }
        }
    }

    fn parse_moment(value: &str) -> Result<NaiveDateTime, String> {
        ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM, got {:?}", value))
    }

}
