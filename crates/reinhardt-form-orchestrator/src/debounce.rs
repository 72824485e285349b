//! Single shared debounce timer
//!
//! Every field of a form schedules through the same [`DebounceTimer`], so a
//! burst of edits across many fields still produces one validation pass.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Last-write-wins delayed task slot.
///
/// Scheduling aborts whatever task is still waiting. Dropping the timer
/// aborts the pending task too.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::DebounceTimer;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let timer = DebounceTimer::new(Duration::from_millis(350));
/// let runs = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..3 {
///     let runs = runs.clone();
///     timer.schedule(move || {
///         runs.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// tokio::time::sleep(Duration::from_millis(400)).await;
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct DebounceTimer {
	delay: Duration,
	pending: Mutex<Option<AbortHandle>>,
}

impl DebounceTimer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: Mutex::new(None),
		}
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Run `task` once the delay has elapsed without another `schedule`.
	///
	/// Outside a tokio runtime there is nothing to wait on, so the task runs
	/// immediately.
	pub fn schedule<F>(&self, task: F)
	where
		F: FnOnce() + Send + 'static,
	{
		let mut pending = self.pending.lock();
		if let Some(previous) = pending.take() {
			previous.abort();
		}

		match tokio::runtime::Handle::try_current() {
			Ok(runtime) => {
				let delay = self.delay;
				let handle = runtime.spawn(async move {
					tokio::time::sleep(delay).await;
					task();
				});
				*pending = Some(handle.abort_handle());
				tracing::debug!("Scheduled debounced task in {:?}", delay);
			}
			Err(_) => {
				drop(pending);
				tracing::warn!("No tokio runtime available, running debounced task inline");
				task();
			}
		}
	}

	/// Abort the pending task, if any. Returns whether one was waiting.
	pub fn cancel(&self) -> bool {
		match self.pending.lock().take() {
			Some(handle) => {
				let waiting = !handle.is_finished();
				handle.abort();
				if waiting {
					tracing::debug!("Cancelled pending debounced task");
				}
				waiting
			}
			None => false,
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending
			.lock()
			.as_ref()
			.is_some_and(|handle| !handle.is_finished())
	}
}

impl Drop for DebounceTimer {
	fn drop(&mut self) {
		if let Some(handle) = self.pending.lock().take() {
			handle.abort();
		}
	}
}
