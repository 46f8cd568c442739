use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;

/// Spaces out requests issued from any number of threads.
///
/// The lock is held while sleeping, so concurrent callers queue up and
/// leave one `min_interval` apart.
pub struct Pacer {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Blocks until at least `min_interval` has passed since the previous call.
    pub fn wait(&self) {
        // A panic while holding the lock leaves only a timestamp behind.
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Pacing: waiting {:?}", wait_time);
                std::thread::sleep(wait_time);
            }
        }

        *last = Some(Instant::now());
    }
}
