use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use reviewwatch_core::config::required_env_report_from_env;
use reviewwatch_core::{
    HttpStatusSource, PollLog, PollWindow, TelegramChannel, WatchConfig, WatchState,
};
use serde::Serialize;

use crate::cli::{Commands, RunArgs};

mod watch;

use self::watch::{WatchOptions, run_watch_loop};

pub(crate) fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run_watch(&args),
        Commands::Check => run_check(),
    }
}

fn run_watch(args: &RunArgs) -> Result<()> {
    let log = PollLog::to_file(&args.log_file);
    let started = Instant::now();
    let window = args
        .from_date
        .map_or_else(PollWindow::now, PollWindow::from_secs);

    let config = match WatchConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log.log_error("startup", "startup", started, window, &err, None);
            return Err(err).context("Проверка при запуске не пройдена, программа остановлена");
        }
    };
    let source = HttpStatusSource::from_config(&config)
        .context("не удалось создать клиент источника статусов")?;
    let channel = TelegramChannel::from_config(&config)
        .context("не удалось создать клиент чата")?;
    log.log_status(
        "startup",
        "startup",
        started,
        window,
        Some(serde_json::json!({
            "endpoint": source.endpoint().as_str(),
            "chat_id": channel.chat_id(),
            "period_secs": args.period_secs,
            "max_cycles": args.max_cycles,
        })),
    );

    let options = WatchOptions {
        period: Duration::from_secs(args.period_secs),
        max_cycles: args.max_cycles,
    };
    let report = run_watch_loop(
        &source,
        &channel,
        &log,
        WatchState::starting_at(window),
        &options,
    );
    log.log_status(
        "shutdown",
        "shutdown",
        started,
        PollWindow::from_secs(report.window),
        Some(serde_json::to_value(&report)?),
    );
    print_json(&report)
}

#[derive(Debug, Serialize)]
struct CheckReport {
    ready: bool,
    variables: Vec<reviewwatch_core::config::RequiredEnvStatus>,
}

fn run_check() -> Result<()> {
    let variables = required_env_report_from_env();
    let report = CheckReport {
        ready: variables.iter().all(|status| status.present),
        variables,
    };
    print_json(&report)?;
    if !report.ready {
        let missing = report
            .variables
            .iter()
            .filter(|status| !status.present)
            .map(|status| status.name)
            .collect::<Vec<_>>();
        bail!(
            "Отсутствует обязательная переменная окружения: {}",
            missing.join(", ")
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
