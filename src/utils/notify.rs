//! Best-effort receive-side alerts. Dispatch never blocks frame handling
//! and failures stay contained here.

use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, sender: &str);
}

/// Pulses a GPIO buzzer through a detached helper process (Raspberry Pi
/// deployments). The child is never awaited; spawn errors are swallowed.
pub struct BuzzerNotifier;

const BUZZ_SCRIPT: &str =
    "from gpiozero import LED; from time import sleep; led=LED(20); led.on(); sleep(1); led.off()";

#[async_trait]
impl Notifier for BuzzerNotifier {
    async fn notify(&self, sender: &str) {
        match tokio::process::Command::new("python3")
            .arg("-c")
            .arg(BUZZ_SCRIPT)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => debug!("buzz dispatched for {sender}"),
            Err(err) => debug!("buzz dispatch failed: {err}"),
        }
    }
}

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _sender: &str) {}
}
