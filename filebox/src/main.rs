use std::path::PathBuf;

use clap::{arg, command, crate_name, value_parser, ArgMatches, Command};
use cli::client::Target;

mod cli;

#[tokio::main]
async fn main() {
    let cli = command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(Command::new(cli::VERSION_SUBCOMMAND).about(cli::VERSION_DESCRIPTION))
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(
            Command::new(cli::SERVER_SUBCOMMAND)
                .about(cli::SERVER_DESCRIPTION)
                .arg(
                    arg!(-p --port <PORT>)
                        .required(false)
                        .value_parser(value_parser!(u16))
                        .help("Port to listen on. Overrides FILEBOX_PORT"),
                )
                .arg(
                    arg!(-d --"data-dir" <DIR>)
                        .required(false)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory holding users, uploads registry and files. Overrides FILEBOX_DATA_DIR"),
                ),
        )
        .subcommand(with_account(
            Command::new(cli::SIGNUP_SUBCOMMAND).about(cli::SIGNUP_DESCRIPTION),
        ))
        .subcommand(with_account(
            Command::new(cli::STATUS_SUBCOMMAND).about(cli::STATUS_DESCRIPTION),
        ))
        .subcommand(with_account(
            Command::new(cli::UPLOAD_SUBCOMMAND)
                .about(cli::UPLOAD_DESCRIPTION)
                .arg(
                    arg!(-f --file <FILE>)
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to file to upload"),
                ),
        ))
        .subcommand(with_account(
            Command::new(cli::LIST_SUBCOMMAND).about(cli::LIST_DESCRIPTION),
        ))
        .subcommand(with_account(
            Command::new(cli::DELETE_SUBCOMMAND)
                .about(cli::DELETE_DESCRIPTION)
                .arg(
                    arg!(-n --name <NAME>)
                        .required(true)
                        .help("Generated file name as shown by list"),
                ),
        ))
        .arg_required_else_help(true)
        .disable_version_flag(true)
        .get_matches();

    let result = match cli.subcommand() {
        Some((cli::VERSION_SUBCOMMAND, _)) => {
            cli::version::run();
            Ok(())
        }
        Some((cli::BUGREPORT_SUBCOMMAND, _)) => {
            cli::bugreport::run();
            Ok(())
        }
        Some((cli::SERVER_SUBCOMMAND, matches)) => {
            cli::server::run(matches).await;
            Ok(())
        }
        Some((cli::SIGNUP_SUBCOMMAND, matches)) => cli::client::signup(&target(matches)).await,
        Some((cli::STATUS_SUBCOMMAND, matches)) => cli::client::status(&target(matches)).await,
        Some((cli::UPLOAD_SUBCOMMAND, matches)) => {
            let file = matches.get_one::<PathBuf>("file").map(PathBuf::as_path);
            match file {
                Some(file) => cli::client::upload(&target(matches), file).await,
                None => Ok(()),
            }
        }
        Some((cli::LIST_SUBCOMMAND, matches)) => cli::client::list(&target(matches)).await,
        Some((cli::DELETE_SUBCOMMAND, matches)) => {
            let name = matches.get_one::<String>("name").map(String::as_str);
            match name {
                Some(name) => cli::client::delete(&target(matches), name).await,
                None => Ok(()),
            }
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn with_account(command: Command) -> Command {
    command
        .arg(arg!(-u --uri <URI>).required(true).help("Filebox URI, e.g. http://localhost:3000"))
        .arg(arg!(--user <USER>).required(true).help("Account name"))
        .arg(arg!(--password <PASSWORD>).required(true).help("Account password"))
}

fn target(matches: &ArgMatches) -> Target<'_> {
    Target {
        uri: value(matches, "uri"),
        username: value(matches, "user"),
        password: value(matches, "password"),
    }
}

fn value<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}
