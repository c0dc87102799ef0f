use clap::Parser as _;
use luxtronik_tools::commands;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(clap::Parser)]
#[clap(version, about, author)]
enum Commands {
    Fields(commands::fields::Args),
    Read(commands::read::Args),
}

fn end<E: std::error::Error>(r: Result<(), E>) {
    std::process::exit(match r {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(e) = cause {
                eprintln!("  because: {e}");
                cause = e.source();
            }
            1
        }
    });
}

fn main() {
    let filter = std::env::var("LUXTRONIK_TOOLS_LOG")
        .ok()
        .and_then(|description| {
            description.parse::<tracing_subscriber::filter::targets::Targets>().ok()
        })
        .unwrap_or_else(|| {
            tracing_subscriber::filter::targets::Targets::new()
                .with_default(tracing_subscriber::filter::LevelFilter::WARN)
        });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    match Commands::parse() {
        Commands::Fields(args) => end(commands::fields::run(args)),
        Commands::Read(args) => end(commands::read::run(args)),
    }
}
