use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use archiefbeheer::cli::{Cli, Commands, ConfigAction, generate_completions, preset};
use archiefbeheer::commands::{
    CreateListOptions, FilterOptions, cmd_config_get, cmd_config_set, cmd_config_show,
    cmd_create_list, cmd_export, cmd_list, cmd_zaaktypes,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("archiefbeheer=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let bootstrap = cli.bootstrap.as_deref();

    let result = match cli.command {
        Commands::List {
            without_archive_date,
            filters,
            json,
        } => {
            let filters = FilterOptions::from(filters);
            cmd_list(preset(without_archive_date), &filters, bootstrap, json).await
        }

        Commands::CreateList {
            name,
            reviewer_1,
            reviewer_2,
            no_sensitive_info,
            zaken,
            all,
            dry_run,
            filters,
            json,
        } => {
            cmd_create_list(
                CreateListOptions {
                    name,
                    reviewer_1,
                    reviewer_2,
                    contains_sensitive_info: !no_sensitive_info,
                    zaken,
                    all,
                    dry_run,
                    filters: filters.into(),
                },
                bootstrap,
                json,
            )
            .await
        }

        Commands::Export {
            zaken,
            all,
            filters,
            json,
        } => {
            let filters = FilterOptions::from(filters);
            cmd_export(&zaken, all, &filters, bootstrap, json).await
        }

        Commands::Zaaktypes {
            without_archive_date,
            selected,
            expand_all,
            json,
        } => {
            cmd_zaaktypes(
                preset(without_archive_date),
                &selected,
                expand_all,
                bootstrap,
                json,
            )
            .await
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(json),
            ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
            ConfigAction::Get { key, json } => cmd_config_get(&key, json),
        },

        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
