use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jiff::civil::Date;

use crate::bootstrap::ListPreset;
use crate::commands::FilterOptions;
use crate::types::parse_date;

#[derive(Parser)]
#[command(name = "archiefbeheer")]
#[command(about = "Select case records and build destruction lists")]
#[command(version)]
pub struct Cli {
    /// Read page bootstrap data from a JSON file instead of fetching the page
    #[arg(long, global = true, value_name = "FILE")]
    pub bootstrap: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and show zaken
    #[command(visible_alias = "ls")]
    List {
        /// Show closed zaken without an archive action date instead of zaken due for destruction
        #[arg(long)]
        without_archive_date: bool,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a destruction list from selected zaken
    CreateList {
        /// Name of the destruction list
        #[arg(long)]
        name: String,

        /// First reviewer (user id)
        #[arg(long = "reviewer-1")]
        reviewer_1: Option<String>,

        /// Second reviewer (user id); required unless all zaaktypes are short-review
        #[arg(long = "reviewer-2")]
        reviewer_2: Option<String>,

        /// Mark the list as not containing sensitive information
        #[arg(long)]
        no_sensitive_info: bool,

        /// Zaak to include, by identificatie or url (repeatable)
        #[arg(long = "zaak", value_name = "ZAAK", required_unless_present = "all")]
        zaken: Vec<String>,

        /// Include every available zaak of the filtered list
        #[arg(long, conflicts_with = "zaken")]
        all: bool,

        /// Print the form fields instead of posting them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the export link for zaken without an archive action date
    Export {
        /// Zaak to include, by identificatie or url (repeatable)
        #[arg(long = "zaak", value_name = "ZAAK", required_unless_present = "all")]
        zaken: Vec<String>,

        /// Include every available zaak of the filtered list
        #[arg(long, conflicts_with = "zaken")]
        all: bool,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the zaaktype tree
    Zaaktypes {
        /// Use the page of zaken without an archive action date
        #[arg(long)]
        without_archive_date: bool,

        /// Zaaktype url to mark as selected (repeatable)
        #[arg(long = "selected", value_name = "URL")]
        selected: Vec<String>,

        /// List the zaaktypes of every group
        #[arg(long)]
        expand_all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Filters of the case list
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Zaaktype url (repeatable)
    #[arg(long = "zaaktype", value_name = "URL")]
    pub zaaktypen: Vec<String>,

    /// Select every zaaktype of a group, by group description (repeatable)
    #[arg(long = "zaaktype-group", value_name = "GROUP")]
    pub zaaktype_groups: Vec<String>,

    /// Bronorganisatie code (repeatable)
    #[arg(long = "bronorganisatie", value_name = "RSIN")]
    pub bronorganisaties: Vec<String>,

    /// Only zaken whose identificatie contains this text
    #[arg(long)]
    pub identificatie: Option<String>,

    /// Only zaken started on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub startdatum: Option<Date>,
}

impl From<FilterArgs> for FilterOptions {
    fn from(args: FilterArgs) -> Self {
        FilterOptions {
            zaaktypen: args.zaaktypen,
            zaaktype_groups: args.zaaktype_groups,
            bronorganisaties: args.bronorganisaties,
            identificatie: args.identificatie.filter(|s| !s.is_empty()),
            startdatum: args.startdatum,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, auth.session_id, remote_timeout, ...)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (base_url, auth.session_id, remote_timeout, ...)
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn preset(without_archive_date: bool) -> ListPreset {
    if without_archive_date {
        ListPreset::WithoutArchiveDate
    } else {
        ListPreset::Destruction
    }
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    parse_date(s).map_err(|e| e.to_string())
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "archiefbeheer", &mut io::stdout());
}
