use clap::Subcommand;
use roundclock_core::storage::{Config, SessionStore};
use roundclock_core::timer::Interval;
use roundclock_core::ValidationError;
use uuid::Uuid;

use crate::util::parse_duration_ms;

#[derive(Subcommand)]
pub enum IntervalsAction {
    /// List the intervals as JSON
    List,
    /// Add an interval
    Add {
        /// Interval title
        title: String,
        /// Duration (e.g. "45", "30s", "1m30s", "250ms")
        #[arg(value_parser = parse_duration_ms)]
        duration: u64,
        /// Insert at this 0-based position instead of appending
        #[arg(long)]
        at: Option<usize>,
    },
    /// Remove an interval by position or id
    Remove {
        /// 0-based position or interval id
        target: String,
    },
    /// Change an interval's title and/or duration
    Update {
        /// 0-based position or interval id
        target: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_duration_ms)]
        duration: Option<u64>,
    },
    /// Move intervals so they start at a new position
    Move {
        /// 0-based positions to move
        #[arg(required = true, num_args = 1..)]
        from: Vec<usize>,
        /// Destination offset in the current ordering
        #[arg(long)]
        to: usize,
    },
}

/// Resolve a position or id argument to an interval id.
fn resolve_target(config: &Config, target: &str) -> Result<Uuid, ValidationError> {
    if let Ok(index) = target.parse::<usize>() {
        return config
            .intervals
            .get(index)
            .map(|i| i.id)
            .ok_or_else(|| out_of_bounds(config, index));
    }
    let id = Uuid::parse_str(target).map_err(|e| ValidationError::InvalidValue {
        field: "target".into(),
        message: e.to_string(),
    })?;
    config
        .intervals
        .find(id)
        .map(|i| i.id)
        .ok_or_else(|| ValidationError::UnknownInterval(target.to_string()))
}

fn out_of_bounds(config: &Config, index: usize) -> ValidationError {
    ValidationError::OutOfBounds {
        collection: "intervals".into(),
        index,
        len: config.intervals.len(),
    }
}

pub fn run(action: IntervalsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        IntervalsAction::List => {
            println!("{}", serde_json::to_string_pretty(&config.intervals)?);
            return Ok(());
        }
        IntervalsAction::Add { title, duration, at } => {
            config.add_interval(Interval::new(title, duration), at)?;
        }
        IntervalsAction::Remove { target } => {
            let id = resolve_target(&config, &target)?;
            config.intervals.remove(id)?;
        }
        IntervalsAction::Update {
            target,
            title,
            duration,
        } => {
            if title.is_none() && duration.is_none() {
                return Err("nothing to update: pass --title and/or --duration".into());
            }
            let id = resolve_target(&config, &target)?;
            config.intervals.update(id, title, duration)?;
        }
        IntervalsAction::Move { from, to } => {
            if let Some(&index) = from.iter().find(|&&i| i >= config.intervals.len()) {
                return Err(out_of_bounds(&config, index).into());
            }
            config.intervals.move_intervals(&from, to);
        }
    }

    config.validate()?;
    config.save()?;
    // A saved position does not carry over to an edited sequence.
    SessionStore::open()?.clear()?;
    println!("{}", serde_json::to_string_pretty(&config.intervals)?);
    Ok(())
}
