use super::*;
use clap::Parser;

#[test]
fn run_uses_fixed_period_and_runs_forever_by_default() {
    let cli = Cli::try_parse_from(["reviewwatch", "run"]).expect("parse");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.period_secs, 600);
            assert_eq!(args.max_cycles, 0);
            assert_eq!(args.from_date, None);
            assert_eq!(args.log_file.to_str(), Some("reviewwatch.log.jsonl"));
        }
        Commands::Check => panic!("expected run command"),
    }
}

#[test]
fn run_parses_bounded_options() {
    let cli = Cli::try_parse_from([
        "reviewwatch",
        "run",
        "--period-secs",
        "0",
        "--max-cycles",
        "3",
        "--from-date",
        "1000",
        "--log-file",
        "/tmp/watch.jsonl",
    ])
    .expect("parse");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.period_secs, 0);
            assert_eq!(args.max_cycles, 3);
            assert_eq!(args.from_date, Some(1000));
            assert_eq!(args.log_file.to_str(), Some("/tmp/watch.jsonl"));
        }
        Commands::Check => panic!("expected run command"),
    }
}

#[test]
fn negative_from_date_is_rejected() {
    let parsed = Cli::try_parse_from(["reviewwatch", "run", "--from-date", "-5"]);
    assert!(parsed.is_err(), "window must not be negative");
}

#[test]
fn check_takes_no_arguments() {
    let cli = Cli::try_parse_from(["reviewwatch", "check"]).expect("parse");
    assert!(matches!(cli.command, Commands::Check));
    assert!(Cli::try_parse_from(["reviewwatch", "check", "--verbose"]).is_err());
}
