use std::path::PathBuf;

use clap::ArgMatches;
use server::config::Config;

pub async fn run(matches: &ArgMatches) {
    let mut config = Config::from_env();
    if let Some(port) = matches.get_one::<u16>("port") {
        config = config.with_port(*port);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }

    if let Err(e) = server::run(config).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
