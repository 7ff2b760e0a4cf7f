//! Looping audio alarm

use std::{sync::Mutex, time::Duration};

use tokio::{process::Command, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

/// Shared alarm sound. Both calls are idempotent.
pub trait Alarm: Send + Sync {
    fn start(&self);
    fn stop(&self);
}

/// Plays a sound command over and over until stopped.
///
/// Without a command the alarm only logs, which keeps headless runs quiet.
pub struct CommandAlarm {
    command: Option<String>,
    pause: Duration,
    playing: Mutex<Option<JoinHandle<()>>>,
}

impl CommandAlarm {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command,
            pause: Duration::from_millis(500),
            playing: Mutex::new(None),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
            .lock()
            .map(|playing| playing.is_some())
            .unwrap_or(false)
    }
}

impl Alarm for CommandAlarm {
    fn start(&self) {
        let Ok(mut playing) = self.playing.lock() else {
            warn!("Alarm lock poisoned, not starting");
            return;
        };
        if playing.is_some() {
            debug!("Alarm already playing");
            return;
        }

        info!("Alarm started");
        let command = self.command.clone();
        let pause = self.pause;
        *playing = Some(tokio::spawn(async move {
            loop {
                match &command {
                    Some(command) => {
                        if let Err(e) = play_once(command).await {
                            warn!("Alarm sound failed: {}", e);
                        }
                    }
                    None => info!("\u{7}Alarm ringing"),
                }
                sleep(pause).await;
            }
        }));
    }

    fn stop(&self) {
        let Ok(mut playing) = self.playing.lock() else {
            warn!("Alarm lock poisoned, not stopping");
            return;
        };
        if let Some(handle) = playing.take() {
            handle.abort();
            info!("Alarm stopped");
        }
    }
}

impl Drop for CommandAlarm {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run the sound command once through the shell
async fn play_once(command: &str) -> Result<(), String> {
    let status = Command::new("sh")
        .args(["-c", command])
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| format!("Failed to execute alarm command: {}", e))?;

    if !status.success() {
        return Err(format!("alarm command exited with {}", status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let alarm = CommandAlarm::new(None);

        alarm.start();
        alarm.start();
        assert!(alarm.is_playing());

        alarm.stop();
        alarm.stop();
        assert!(!alarm.is_playing());
    }
}
