mod engine;
mod utils;

use clap::Parser;

use engine::EngineResult;
use engine::cli::Cli;
use engine::headless::HeadlessDemo;

fn main() {
    utils::logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> EngineResult<()> {
    let config = cli.app_config()?;
    log::info!("variant {:?}", config.variant);

    let mut platform = cli.platform(&config);

    if cli.headless {
        let report = HeadlessDemo::new(cli.frames).run(config, &mut platform)?;
        log::info!(
            "platform: {} capability queries, {} session requests, {} end requests",
            platform.capability_queries,
            platform.session_requests,
            platform.end_requests
        );
        log::debug!("{report:?}");
        Ok(())
    } else {
        engine::Windowing::run_app(config, platform)
    }
}
