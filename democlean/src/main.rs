use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

fn main() -> std::process::ExitCode {
    let cli = democlean::Cli::parse();

    let level = cli.log_level();
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::filter_fn(move |meta| {
            let target = meta.target();
            (target.contains("democlean") || target.contains("cleaning")) && *meta.level() <= level
        }));
    if let Err(e) = tracing::subscriber::set_global_default(registry) {
        eprintln!("Could not install logger: {}", e);
    }

    tracing::info!("Starting...");

    match democlean::run(&cli.command) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(summary) => println!("{}", summary),
                Err(e) => tracing::error!("Serializing summary: {}", e),
            };
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
