use chrono::{DateTime, Utc};
use clap::Subcommand;
use roundclock_core::storage::{Config, SessionStore};
use roundclock_core::timer::{IntervalTimer, TickDriver};
use roundclock_core::Event;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer (resumes if paused)
    Start,
    /// Pause the timer
    Pause,
    /// Resume a paused timer
    Resume,
    /// Stop and return to the first interval
    Stop,
    /// Reset to the first interval of the first round
    Reset,
    /// Skip to the next interval
    Skip,
    /// Print current timer state as JSON
    Status,
    /// Run the timer in the foreground, printing transitions (Ctrl+C suspends)
    Run,
}

/// Rebuild the timer from config and fast-forward the saved session to `now`.
fn load_timer(
    config: &Config,
    store: &SessionStore,
    now: DateTime<Utc>,
) -> Result<(IntervalTimer, Vec<Event>), Box<dyn std::error::Error>> {
    let mut timer = IntervalTimer::new(config.sequence(), config.policy());
    let events = match store.load()? {
        Some(snapshot) => timer
            .restore_at(snapshot, now)
            .into_iter()
            .filter(|e| !matches!(e, Event::TimerRestored { .. }))
            .collect(),
        None => Vec::new(),
    };
    Ok((timer, events))
}

fn run_once(
    command: impl FnOnce(&mut IntervalTimer, DateTime<Utc>) -> Vec<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SessionStore::open()?;
    let now = Utc::now();

    let (mut timer, mut events) = load_timer(&config, &store, now)?;
    events.extend(command(&mut timer, now));
    events.push(timer.snapshot_event(now));
    println!("{}", serde_json::to_string_pretty(&events)?);

    store.save(&timer.suspend_at(now))?;
    Ok(())
}

fn run_live() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = Config::load()?;
        let store = SessionStore::open()?;
        let driver = TickDriver::new(IntervalTimer::new(config.sequence(), config.policy()))
            .with_tick_interval(config.tick_interval());

        // Subscribe before anything can tick so no transition is missed.
        let mut transitions = driver.subscribe();
        let mut events = match store.load()? {
            Some(snapshot) => driver.restore(snapshot).await,
            None => Vec::new(),
        };
        let ended_while_away = events
            .iter()
            .any(|e| e.transition().is_some_and(|t| t.is_terminal()));
        if !ended_while_away {
            // Start also resumes a paused timer.
            events.extend(driver.start().await);
        }
        // Transitions are printed as they come off the channel.
        for event in events.iter().filter(|e| e.transition().is_none()) {
            println!("{}", serde_json::to_string(event)?);
        }

        let mut finished = !driver.with_timer(|t| t.is_running()).await;
        if finished {
            while let Ok(transition) = transitions.try_recv() {
                println!("{}", serde_json::to_string(&transition)?);
            }
        }
        while !finished {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("suspending");
                    break;
                }
                received = transitions.recv() => match received {
                    Ok(transition) => {
                        println!("{}", serde_json::to_string(&transition)?);
                        finished = transition.is_terminal();
                    }
                    Err(RecvError::Lagged(missed)) => warn!(missed, "transitions dropped"),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        store.save(&driver.suspend().await)?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start => run_once(|timer, now| timer.start_at(now)),
        TimerAction::Pause => run_once(|timer, now| timer.pause_at(now)),
        TimerAction::Resume => run_once(|timer, now| timer.resume_at(now)),
        TimerAction::Stop => run_once(|timer, now| timer.stop_at(now)),
        TimerAction::Reset => run_once(|timer, now| timer.reset_at(now)),
        TimerAction::Skip => run_once(|timer, now| timer.skip_current_at(now)),
        TimerAction::Status => run_once(|_, _| Vec::new()),
        TimerAction::Run => run_live(),
    }
}
