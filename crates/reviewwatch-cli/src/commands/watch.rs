use std::thread;
use std::time::Duration;

use reviewwatch_core::{
    CycleOutcome, Delivery, NotificationChannel, PollLog, StatusSource, WatchState, run_cycle,
};

#[derive(Debug, Clone)]
pub(super) struct WatchOptions {
    pub(super) period: Duration,
    /// 0 means no limit.
    pub(super) max_cycles: u32,
}

#[derive(Debug, serde::Serialize, Default, PartialEq, Eq)]
pub(super) struct WatchReport {
    pub(super) cycles: u32,
    pub(super) idle: u32,
    pub(super) changes_delivered: u32,
    pub(super) failures_delivered: u32,
    pub(super) suppressed: u32,
    pub(super) undelivered: u32,
    pub(super) window: u64,
}

impl WatchReport {
    fn record(&mut self, outcome: &CycleOutcome) {
        let counter = match (outcome, outcome.delivery()) {
            (CycleOutcome::Idle, _) | (_, None) => &mut self.idle,
            (CycleOutcome::StatusChanged { .. }, Some(Delivery::Delivered)) => {
                &mut self.changes_delivered
            }
            (_, Some(Delivery::Delivered)) => &mut self.failures_delivered,
            (_, Some(Delivery::Suppressed)) => &mut self.suppressed,
            (_, Some(Delivery::Failed { .. })) => &mut self.undelivered,
        };
        *counter += 1;
    }
}

/// Runs cycles back to back with a full `period` pause after each one.
/// Cycles never fail, so only `max_cycles` ends the loop.
pub(super) fn run_watch_loop<S, C>(
    source: &S,
    channel: &C,
    log: &PollLog,
    initial: WatchState,
    options: &WatchOptions,
) -> WatchReport
where
    S: StatusSource + ?Sized,
    C: NotificationChannel + ?Sized,
{
    let mut report = WatchReport::default();
    let mut state = initial;
    let mut cycle = 0u32;

    loop {
        if options.max_cycles > 0 && cycle >= options.max_cycles {
            break;
        }
        cycle = cycle.saturating_add(1);

        let cycle_report = run_cycle(source, channel, log, state);
        state = cycle_report.state;
        report.cycles = cycle;
        report.window = state.window.as_secs();
        report.record(&cycle_report.outcome);

        if options.max_cycles == 0 || cycle < options.max_cycles {
            thread::sleep(options.period);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use reviewwatch_core::{FetchFailure, PollWindow, Result, WatchError};
    use serde_json::{Value, json};

    use super::*;

    struct ScriptedSource {
        responses: RefCell<VecDeque<std::result::Result<Value, FetchFailure>>>,
    }

    impl StatusSource for ScriptedSource {
        fn fetch(&self, _window: PollWindow) -> std::result::Result<Value, FetchFailure> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"homeworks": [], "current_date": 0})))
        }
    }

    struct FlakyChannel {
        sent: RefCell<Vec<String>>,
        failures_left: RefCell<u32>,
    }

    impl NotificationChannel for FlakyChannel {
        fn send(&self, text: &str) -> Result<()> {
            let mut left = self.failures_left.borrow_mut();
            if *left > 0 {
                *left -= 1;
                return Err(WatchError::Delivery("chat unavailable".to_string()));
            }
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn options(max_cycles: u32) -> WatchOptions {
        WatchOptions {
            period: Duration::ZERO,
            max_cycles,
        }
    }

    #[test]
    fn loop_survives_every_failure_kind_and_counts_outcomes() {
        let refused = FetchFailure {
            address: "http://source.test/?from_date=1".to_string(),
            status: None,
            reason: "connection refused".to_string(),
        };
        let source = ScriptedSource {
            responses: RefCell::new(VecDeque::from(vec![
                Err(refused.clone()),
                Err(refused),
                Ok(json!("not a mapping")),
                Ok(json!({
                    "homeworks": [{"homework_name": "hw1", "status": "archived"}],
                    "current_date": 5
                })),
                Ok(json!({
                    "homeworks": [{"homework_name": "hw1", "status": "approved"}],
                    "current_date": 9
                })),
                Ok(json!({"homeworks": [], "current_date": 12})),
            ])),
        };
        let channel = FlakyChannel {
            sent: RefCell::new(Vec::new()),
            failures_left: RefCell::new(0),
        };

        let report = run_watch_loop(
            &source,
            &channel,
            &PollLog::disabled(),
            WatchState::starting_at(PollWindow::from_secs(1)),
            &options(6),
        );

        assert_eq!(
            report,
            WatchReport {
                cycles: 6,
                idle: 1,
                changes_delivered: 1,
                failures_delivered: 3,
                suppressed: 1,
                undelivered: 0,
                window: 12,
            }
        );
        assert_eq!(channel.sent.borrow().len(), 4);
    }

    #[test]
    fn undelivered_failure_is_sent_again_next_cycle() {
        let refused = FetchFailure {
            address: "http://source.test/?from_date=1".to_string(),
            status: None,
            reason: "connection refused".to_string(),
        };
        let source = ScriptedSource {
            responses: RefCell::new(VecDeque::from(vec![
                Err(refused.clone()),
                Err(refused.clone()),
                Err(refused),
            ])),
        };
        let channel = FlakyChannel {
            sent: RefCell::new(Vec::new()),
            failures_left: RefCell::new(1),
        };

        let report = run_watch_loop(
            &source,
            &channel,
            &PollLog::disabled(),
            WatchState::starting_at(PollWindow::from_secs(1)),
            &options(3),
        );

        assert_eq!(report.undelivered, 1);
        assert_eq!(report.failures_delivered, 1);
        assert_eq!(report.suppressed, 1);
        assert_eq!(channel.sent.borrow().len(), 1);
    }
}
