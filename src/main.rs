mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, DepsArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("include_graph={}", cli.log_level()).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let ctx = cli.context();

    match cli.command {
        Commands::Scan => {
            cli::scan(&ctx)?;
        }
        Commands::Deps {
            projects,
            direct,
            reuse_database,
            format,
            dot,
            dot_config,
            example_dot_config,
        } => {
            cli::deps(
                &ctx,
                DepsArgs {
                    projects: &projects,
                    direct,
                    reuse_database,
                    format,
                    dot,
                    dot_config: dot_config.as_deref(),
                    example_dot_config,
                },
            )?;
        }
        Commands::Includes {
            project,
            target,
            kind,
            unresolved,
        } => {
            cli::includes(&ctx, &project, target, kind, unresolved)?;
        }
        Commands::Stats => {
            cli::stats(&ctx)?;
        }
        Commands::ExampleConfig => {
            cli::example_config()?;
        }
    }

    Ok(())
}
