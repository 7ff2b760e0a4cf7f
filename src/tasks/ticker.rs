//! Per-timer countdown drivers

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::state::{AppState, TimerId, TimerRecord};

/// Background task that keeps exactly one driver per counting-down timer.
///
/// Drivers are started when a timer is running with time left and aborted
/// when it pauses, reaches zero or is deleted.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task");

    let mut timer_rx = state.timer_update_tx.subscribe();
    let period = Duration::from_millis(state.tick_millis.max(1));
    let mut drivers: HashMap<TimerId, JoinHandle<()>> = HashMap::new();

    loop {
        let timers = timer_rx.borrow_and_update().clone();
        reconcile(&state, &mut drivers, &timers, period);

        // Wait for the next collection update
        if timer_rx.changed().await.is_err() {
            break;
        }
    }

    for (_, handle) in drivers {
        handle.abort();
    }
    info!("Ticker task stopped");
}

fn reconcile(
    state: &Arc<AppState>,
    drivers: &mut HashMap<TimerId, JoinHandle<()>>,
    timers: &[TimerRecord],
    period: Duration,
) {
    drivers.retain(|id, handle| {
        let wanted = timers.iter().any(|t| &t.id == id && t.is_counting_down());
        if !wanted {
            debug!("Stopping driver for timer {}", id);
            handle.abort();
        }
        wanted && !handle.is_finished()
    });

    for timer in timers.iter().filter(|t| t.is_counting_down()) {
        drivers.entry(timer.id.clone()).or_insert_with(|| {
            debug!("Starting driver for timer {}", timer.id);
            spawn_driver(Arc::clone(state), timer.id.clone(), period)
        });
    }
}

/// Tick `id` once per period until it reaches zero or is deleted.
/// Every tick re-reads the timer, so a tick landing after a pause is a no-op;
/// paused timers lose their driver only through `reconcile`.
fn spawn_driver(state: Arc<AppState>, id: TimerId, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match state.tick(&id) {
                Some(timer) if timer.remaining_time > 0 => {}
                Some(_) => {
                    debug!("Timer {} reached zero, driver done", id);
                    break;
                }
                None => {
                    debug!("Timer {} is gone, driver done", id);
                    break;
                }
            }
        }
    })
}
