mod bruteforce;
mod config;
mod dns;
mod error;
mod merge;
mod model;
mod modules;
mod output;
mod pool;
mod ports;
mod results;
mod scan;
mod utils;

pub use error::{Error, Result};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use output::ConsoleSink;
use scan::{scan, ScanOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use utils::{ensure_dir, log::init_tracing_subscriber};

const DEFAULT_WORDLIST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/wordlists/names.txt");
const DEFAULT_RESOLVERS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/wordlists/resolvers.txt");

fn main() -> Result<()> {
    let cli = Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .subcommand(Command::new("engines").about("List all engines and their keys"))
        .subcommand(
            Command::new("scan")
                .about("Enumerate the subdomains of a domain")
                .arg(
                    Arg::new("domain")
                        .short('d')
                        .long("domain")
                        .help("Domain name to enumerate its subdomains")
                        .value_name("DOMAIN")
                        .required(true),
                )
                .arg(
                    Arg::new("engines")
                        .short('e')
                        .long("engines")
                        .help("Comma separated list of engines, overrides the config file")
                        .value_name("ENGINES"),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to the engines configuration file (YAML)")
                        .value_name("CONFIG")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("bruteforce")
                        .short('b')
                        .long("bruteforce")
                        .action(ArgAction::SetTrue)
                        .help("Enable the wordlist bruteforce"),
                )
                .arg(
                    Arg::new("threads")
                        .short('t')
                        .long("threads")
                        .help("Number of concurrent bruteforce resolutions")
                        .value_name("THREADS")
                        .value_parser(value_parser!(usize))
                        .default_value("30"),
                )
                .arg(
                    Arg::new("wordlist")
                        .short('w')
                        .long("wordlist")
                        .help("Bruteforce wordlist")
                        .value_name("WORDLIST")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_WORDLIST),
                )
                .arg(
                    Arg::new("resolvers")
                        .short('r')
                        .long("resolvers")
                        .help("Bruteforce resolver list, one IP per line")
                        .value_name("RESOLVERS")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_RESOLVERS),
                )
                .arg(
                    Arg::new("ports")
                        .short('p')
                        .long("ports")
                        .help("Scan the found subdomains against these comma separated TCP ports")
                        .value_name("PORTS"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Save the results to a text file")
                        .value_name("OUTPUT")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .action(ArgAction::SetTrue)
                        .help("Display the results in realtime and a summary"),
                )
                .arg(
                    Arg::new("no-color")
                        .short('n')
                        .long("no-color")
                        .action(ArgAction::SetTrue)
                        .help("Output without color"),
                )
                .arg(
                    Arg::new("logs")
                        .short('s')
                        .long("logs")
                        .action(ArgAction::SetTrue)
                        .help("Save logs into a .log file"),
                ),
        )
        .arg_required_else_help(true)
        .get_matches();

    match cli.subcommand() {
        Some(("engines", _)) => modules::display_all(),
        Some(("scan", args)) => run_scan(args)?,

        // fallback if a cmd is not handled (should not possible)
        _ => {
            error!("{:12} - Command not handled, exit program", "CLI ERROR");
            return Err(Error::CliUsage("Command not handled".into()));
        }
    }

    Ok(())
}

fn run_scan(args: &ArgMatches) -> Result<()> {
    let domain = args
        .get_one::<String>("domain")
        .ok_or_else(|| Error::CliUsage("missing --domain".into()))?
        .clone();

    // create filename
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let filename = format!("{}", timestamp);

    let log_dir = if args.get_flag("logs") {
        let dir = PathBuf::from(format!("output/subenum/{}", domain.replace(['/', ':'], "_")));
        ensure_dir(&dir)?;
        Some(dir)
    } else {
        None
    };
    init_tracing_subscriber(log_dir.as_deref(), &filename)?;

    let ports = args
        .get_one::<String>("ports")
        .map(|list| ports::parse_ports(list))
        .transpose()?;

    let options = ScanOptions {
        domain,
        engines: args.get_one::<String>("engines").cloned(),
        config: args.get_one::<PathBuf>("config").cloned(),
        bruteforce: args.get_flag("bruteforce"),
        threads: args.get_one::<usize>("threads").copied().unwrap_or(30),
        wordlist: path_arg(args, "wordlist", DEFAULT_WORDLIST),
        resolvers: path_arg(args, "resolvers", DEFAULT_RESOLVERS),
        ports,
        output: args.get_one::<PathBuf>("output").cloned(),
        verbose: args.get_flag("verbose"),
    };

    let sink = Arc::new(ConsoleSink::new(options.verbose, !args.get_flag("no-color")));
    info!("Scanning {} (run_{})", options.domain, timestamp);
    scan(options, sink)?;

    Ok(())
}

fn path_arg(args: &ArgMatches, id: &str, default: &str) -> PathBuf {
    args.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| Path::new(default).to_path_buf())
}
