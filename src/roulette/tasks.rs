//! Cosmetic spin animation around a selection.
//!
//! The animation is a tokio task that shows random names until the spin time is up.
//! The selection itself runs only after the animation ends, and only for the most
//! recently started spin.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::task::JoinHandle;
use tracing::debug;

use super::core::Roulette;
use crate::types::Member;

/// Time between two spin frames.
pub const SPIN_FRAME_MS: u64 = 75;

/// How a spin ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    /// This spin was the latest one. `None` means the roster was empty.
    Revealed(Option<Member>),
    /// A newer spin started before this one settled; nothing was selected.
    Superseded,
}

/// Starts spins and makes sure only the newest one reveals a result.
pub struct Spinner {
    roulette: Roulette,
    duration: Duration,
    frame: Duration,
    generation: Arc<AtomicU64>,
    current: Mutex<Option<AbortHandle>>,
}

impl Spinner {
    pub fn new(roulette: Roulette, duration: Duration) -> Self {
        Self {
            roulette,
            duration,
            frame: Duration::from_millis(SPIN_FRAME_MS),
            generation: Arc::new(AtomicU64::new(0)),
            current: Mutex::new(None),
        }
    }

    pub fn with_frame(self, frame: Duration) -> Self {
        Self { frame, ..self }
    }

    /// Start a spin, cancelling the one in flight.
    ///
    /// `on_frame` receives the name shown on each animation frame.
    pub async fn start<F>(&self, on_frame: F) -> SpinHandle
    where
        F: FnMut(&str) + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let names: Vec<String> = self
            .roulette
            .roster()
            .await
            .iter()
            .map(|m| m.name.clone())
            .collect();

        let animation = tokio::spawn(animate(names, self.frame, self.duration, on_frame));
        if let Some(previous) = self
            .current
            .lock()
            .await
            .replace(animation.abort_handle())
        {
            debug!("Cancelling spin superseded by generation {}", generation);
            previous.abort();
        }

        SpinHandle {
            generation,
            latest: Arc::clone(&self.generation),
            animation,
            roulette: self.roulette.clone(),
        }
    }

    /// Start a spin and wait for its outcome.
    pub async fn spin<F>(&self, on_frame: F) -> Result<SpinOutcome>
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.start(on_frame).await.finish().await
    }
}

/// A spin in flight.
pub struct SpinHandle {
    generation: u64,
    latest: Arc<AtomicU64>,
    animation: JoinHandle<()>,
    roulette: Roulette,
}

impl SpinHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the animation; [`SpinHandle::finish`] then reports `Superseded`.
    pub fn cancel(&self) {
        self.animation.abort();
    }

    /// Wait for the animation, then select if this is still the newest spin.
    pub async fn finish(self) -> Result<SpinOutcome> {
        match self.animation.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => return Ok(SpinOutcome::Superseded),
            Err(e) => return Err(e.into()),
        }

        if self.latest.load(Ordering::SeqCst) != self.generation {
            return Ok(SpinOutcome::Superseded);
        }

        Ok(SpinOutcome::Revealed(self.roulette.select().await))
    }
}

async fn animate<F>(names: Vec<String>, frame: Duration, duration: Duration, mut on_frame: F)
where
    F: FnMut(&str) + Send + 'static,
{
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(frame);
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = ticker.tick() => {
                if !names.is_empty() {
                    let index = rng.gen_range(0..names.len());
                    on_frame(names[index].as_str());
                }
            }
        }
    }
}
