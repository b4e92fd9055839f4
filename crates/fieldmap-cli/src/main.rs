use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use fieldmap_cli::manifest::Manifest;
use fieldmap_cli::render::{self, Format};
use fieldmap_engine::EngineConfig;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let manifest = Arg::new("manifest")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Manifest of shapes and mappings (.yaml, .yml or .json)");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Engine configuration (TOML)");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("fieldmap")
        .version(fieldmap_cli::VERSION)
        .about("Compile field mapping manifests into resolution plans")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More logging (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Log line format"),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the materialized plan of every mapping")
                .arg(manifest.clone())
                .arg(config.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Print diagnostics, fail when any is an error")
                .arg(manifest)
                .arg(config)
                .arg(json),
        )
}

fn init_tracing(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let json = matches
        .get_one::<String>("log-format")
        .is_some_and(|f| f == "json");
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn engine_config(args: &ArgMatches) -> anyhow::Result<EngineConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn run(command: &str, args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let path = args
        .get_one::<PathBuf>("manifest")
        .context("manifest path is required")?;
    let manifest = Manifest::load(path)?;
    let config = engine_config(args)?;
    let output = fieldmap_cli::compile(&manifest, config)
        .with_context(|| format!("cannot compile {}", path.display()))?;

    let format = if args.get_flag("json") {
        Format::Json
    } else {
        Format::Text
    };
    let mut stdout = std::io::stdout().lock();
    if command == "plan" {
        render::plans(&mut stdout, &output, format)?;
        stdout.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    render::diagnostics(&mut stdout, &output, format)?;
    stdout.flush()?;
    Ok(if output.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(&matches);

    let Some((command, args)) = matches.subcommand() else {
        return ExitCode::from(2);
    };
    match run(command, args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "fieldmap {command} failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["fieldmap", "check", "m.yaml", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "check");
        assert_eq!(args.get_one::<PathBuf>("manifest").unwrap(), &PathBuf::from("m.yaml"));
    }
}
