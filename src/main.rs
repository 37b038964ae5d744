use anyhow::Result;
use clap::Parser;

use aliawan::cli::commands::images::RotateImagesCommand;
use aliawan::cli::commands::slb::AddBackendCommand;
use aliawan::cli::{show_usage, Cli, Commands};
use aliawan::config::config;
use aliawan::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The global config loads .env as a side effect; telemetry falls back to
    // defaults when no configuration is available so a config problem is
    // reported by the command instead of being masked here.
    let (log_level, json_logs) = config()
        .map(|cfg| (cfg.observability.log_level.clone(), cfg.observability.json_logs))
        .unwrap_or_else(|_| ("info".to_string(), false));
    init_telemetry(&log_level, json_logs)?;

    // The command layer owns the exit-status contract: a returned error makes
    // the process exit 1, the workflows themselves never terminate anything.
    match cli.command {
        None => {
            show_usage();
            Ok(())
        }
        Some(Commands::Images {
            oldname,
            newname,
            deleteold,
        }) => tokio::runtime::Runtime::new()?.block_on(async {
            RotateImagesCommand::new(oldname, newname, deleteold)
                .execute()
                .await
        }),
        Some(Commands::Slb {
            vgroupname,
            instanceid,
            slbport,
        }) => tokio::runtime::Runtime::new()?.block_on(async {
            AddBackendCommand::new(vgroupname, instanceid, slbport)
                .execute()
                .await
        }),
    }
}
