use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use nanomesh::config::{CliArgs, ConvertConfig};
use nanomesh::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("nanomesh=debug")
    } else {
        EnvFilter::new("nanomesh=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config: ConvertConfig = args.into();

    match Pipeline::run(&config) {
        Ok(result) => {
            if config.json {
                let json = serde_json::to_string_pretty(&result.stats)
                    .context("Failed to serialize mesh statistics")?;
                println!("{json}");
            } else {
                println!("Done in {:.2}s", result.duration.as_secs_f64());
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Conversion failed");
            Err(anyhow::anyhow!(e)).context("nanomesh conversion failed")
        }
    }
}
