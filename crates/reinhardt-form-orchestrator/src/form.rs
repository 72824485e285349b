//! Form orchestration
//!
//! A [`Form`] owns the data snapshot, the field registry and the debounce
//! timer for one mounted form. It installs a `validate` routine on every field
//! the schema walker discovers, runs full-schema validation passes, spreads
//! the resulting errors over the live fields and reports progress.
//!
//! ## Example
//!
//! ```
//! use reinhardt_form_orchestrator::{Form, InputField, SubmitOutcome};
//! use reinhardt_form_orchestrator::schema::{ObjectSchema, SchemaNode};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let form = Form::builder(ObjectSchema::new(vec![SchemaNode::string("message").required()]))
//!     .on_submit(|data| {
//!         assert_eq!(data, json!({"message": "hi"}));
//!         Ok(())
//!     })
//!     .on_submit_error(|_errors, _raw| Ok(()))
//!     .build()
//!     .unwrap();
//!
//! let message = Arc::new(InputField::new("message"));
//! form.register_field(message.clone());
//! message.change(json!("hi"));
//!
//! assert!(matches!(form.submit_form().unwrap(), SubmitOutcome::Submitted(_)));
//! ```

use crate::config::FormConfig;
use crate::data::FormData;
use crate::debounce::DebounceTimer;
use crate::error::{ConfigurationError, FormError, FormResult};
use crate::reconcile::{self, ErrorMap};
use crate::registry::{FieldHandle, FieldRegistry, FieldValidator};
use crate::schema::{FormSchema, ValidateOptions};
use crate::walker::SchemaWalker;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

type SubmitHandler = Box<dyn Fn(Value) -> anyhow::Result<()> + Send + Sync>;
type SubmitErrorHandler = Box<dyn Fn(&ErrorMap, &Value) -> anyhow::Result<()> + Send + Sync>;
type ProgressHandler = Box<dyn Fn(f64) + Send + Sync>;

/// Result of one full validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
	/// The schema's cast of the validated data.
	Valid(Value),
	/// Errors attributed to live fields.
	Invalid(ErrorMap),
}

impl ValidationOutcome {
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid(_))
	}

	pub fn data(&self) -> Option<&Value> {
		match self {
			Self::Valid(data) => Some(data),
			Self::Invalid(_) => None,
		}
	}

	pub fn errors(&self) -> Option<&ErrorMap> {
		match self {
			Self::Valid(_) => None,
			Self::Invalid(errors) => Some(errors),
		}
	}
}

/// Which submit callback ran, and with what.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
	Submitted(Value),
	Rejected(ErrorMap),
}

struct FormState {
	data: FormData,
	initial: Value,
	errors: ErrorMap,
	progress: f64,
	registry: FieldRegistry,
}

struct FormInner {
	schema: Box<dyn FormSchema>,
	config: FormConfig,
	state: Mutex<FormState>,
	// Serializes passes; reentrant so a field reacting to its error can validate again.
	pass_lock: ReentrantMutex<()>,
	timer: DebounceTimer,
	passes: AtomicUsize,
	on_submit: SubmitHandler,
	on_submit_error: SubmitErrorHandler,
	on_progress_change: Option<ProgressHandler>,
}

/// A schema-driven form.
///
/// Cloning is cheap; clones share the same state. When the last clone is
/// dropped the pending debounced pass, if any, is cancelled.
#[derive(Clone)]
pub struct Form {
	inner: Arc<FormInner>,
}

/// Builder for [`Form`].
pub struct FormBuilder {
	schema: Box<dyn FormSchema>,
	data: Value,
	config: FormConfig,
	on_submit: Option<SubmitHandler>,
	on_submit_error: Option<SubmitErrorHandler>,
	on_progress_change: Option<ProgressHandler>,
}

impl FormBuilder {
	/// Initial data. Defaults to an empty object.
	pub fn data(mut self, data: Value) -> Self {
		self.data = data;
		self
	}

	pub fn config(mut self, config: FormConfig) -> Self {
		self.config = config;
		self
	}

	/// Called with the cast data when a submit passes validation.
	pub fn on_submit<F>(mut self, handler: F) -> Self
	where
		F: Fn(Value) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.on_submit = Some(Box::new(handler));
		self
	}

	/// Called with the errors and the raw submitted data when a submit fails
	/// validation.
	pub fn on_submit_error<F>(mut self, handler: F) -> Self
	where
		F: Fn(&ErrorMap, &Value) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.on_submit_error = Some(Box::new(handler));
		self
	}

	/// Called with the progress score after every validation pass.
	pub fn on_progress_change<F>(mut self, handler: F) -> Self
	where
		F: Fn(f64) + Send + Sync + 'static,
	{
		self.on_progress_change = Some(Box::new(handler));
		self
	}

	/// Check the schema and create the form.
	///
	/// # Errors
	///
	/// Returns [`FormError::Configuration`] for a malformed schema or when
	/// either submit callback is missing.
	pub fn build(mut self) -> FormResult<Form> {
		self.schema.apply_config(&self.config);
		self.schema.check()?;
		let on_submit = self
			.on_submit
			.ok_or(ConfigurationError::MissingCallback("on_submit"))?;
		let on_submit_error = self
			.on_submit_error
			.ok_or(ConfigurationError::MissingCallback("on_submit_error"))?;

		let timer = DebounceTimer::new(self.config.debounce());
		Ok(Form {
			inner: Arc::new(FormInner {
				schema: self.schema,
				config: self.config,
				state: Mutex::new(FormState {
					data: FormData::new(self.data.clone()),
					initial: self.data,
					errors: ErrorMap::new(),
					progress: 0.0,
					registry: FieldRegistry::new(),
				}),
				pass_lock: ReentrantMutex::new(()),
				timer,
				passes: AtomicUsize::new(0),
				on_submit,
				on_submit_error,
				on_progress_change: self.on_progress_change,
			}),
		})
	}
}

impl Form {
	pub fn builder<S>(schema: S) -> FormBuilder
	where
		S: FormSchema + 'static,
	{
		FormBuilder {
			schema: Box::new(schema),
			data: Value::Object(serde_json::Map::new()),
			config: FormConfig::default(),
			on_submit: None,
			on_submit_error: None,
			on_progress_change: None,
		}
	}

	pub fn config(&self) -> &FormConfig {
		&self.inner.config
	}

	pub fn schema(&self) -> &dyn FormSchema {
		self.inner.schema.as_ref()
	}

	/// Register a field and (re)bind validators.
	///
	/// A path missing from the data is seeded with the field's value, or
	/// `null`, so array rows added by new fields are discovered. A field
	/// without a value receives the one already in the data.
	pub fn register_field(&self, handle: Arc<dyn FieldHandle>) {
		let path = handle.path();
		let own_value = handle.get_value();
		let (registry, existing) = {
			let mut state = self.inner.state.lock();
			state.registry.register_field(&handle);
			let existing = match state.data.get(&path).cloned() {
				Some(existing) => Some(existing),
				None => {
					let seed = own_value.clone().unwrap_or(Value::Null);
					if let Err(e) = state.data.set(&path, seed, false) {
						tracing::warn!("Could not seed data for field '{}': {}", path, e);
					}
					None
				}
			};
			(state.registry.clone(), existing)
		};
		if let (None, Some(existing)) = (own_value, existing) {
			if !existing.is_null() {
				registry.set_field_value(&path, existing);
			}
		}
		tracing::debug!("Registered field '{}'", path);
		self.bind_validators();
	}

	/// Returns `true` if a field was registered at `path`.
	pub fn unregister_field(&self, path: &str) -> bool {
		let mut state = self.inner.state.lock();
		let removed = state.registry.unregister_field(path);
		state.registry.prune();
		removed
	}

	/// Install a `validate` routine on every field the schema walker reaches.
	///
	/// Returns how many fields were bound.
	pub fn bind_validators(&self) -> usize {
		let (registry, data) = self.inner.registry_and_data();
		let mut bound = 0;
		SchemaWalker::new(&registry, &data).walk(self.inner.schema.root(), |visit| {
			visit
				.handle
				.install_validator(self.validator_for(visit.path));
			bound += 1;
		});
		tracing::debug!("Bound validators to {} fields", bound);
		bound
	}

	fn validator_for(&self, path: String) -> FieldValidator {
		let form = Arc::downgrade(&self.inner);
		FieldValidator::new(move |raw, ignore_debounce| {
			match form.upgrade() {
				Some(inner) => FormInner::request_validation(&inner, &path, raw, ignore_debounce),
				None => tracing::debug!("Ignoring validation for '{}' on a dropped form", path),
			}
		})
	}

	/// Run one full validation pass over `data`.
	///
	/// Errors previously shown on fields are cleared first, so the fields
	/// always reflect exactly this pass.
	pub fn validate(&self, data: &Value) -> ValidationOutcome {
		self.inner.run_pass(data)
	}

	/// Validate the current data right away and hand it to one of the submit
	/// callbacks.
	///
	/// # Errors
	///
	/// Returns [`FormError::SubmitCallback`] when the callback that ran fails.
	pub fn submit_form(&self) -> FormResult<SubmitOutcome> {
		let registry = self.inner.state.lock().registry.clone();
		registry.mark_all_dirty();
		self.inner.timer.cancel();

		let current = self.get_data();
		let raw = self.inner.overlaid_raw_data();
		self.inner.state.lock().data.replace(current.clone());

		match self.inner.run_pass(&current) {
			ValidationOutcome::Valid(data) => {
				tracing::debug!("Submitting form");
				(self.inner.on_submit)(data.clone()).map_err(FormError::SubmitCallback)?;
				Ok(SubmitOutcome::Submitted(data))
			}
			ValidationOutcome::Invalid(errors) => {
				tracing::debug!("Submit rejected with {} errors", errors.len());
				(self.inner.on_submit_error)(&errors, &raw).map_err(FormError::SubmitCallback)?;
				Ok(SubmitOutcome::Rejected(errors))
			}
		}
	}

	/// Current data with the values of live fields laid over it.
	pub fn get_data(&self) -> Value {
		self.inner.overlaid_data()
	}

	/// Replace the data, push it into the fields and rebind validators.
	pub fn set_data(&self, data: Value) {
		let registry = {
			let mut state = self.inner.state.lock();
			state.data.replace(data.clone());
			state.registry.clone()
		};
		registry.set_data(&data);
		self.bind_validators();
	}

	/// Show `errors` on the fields, replacing whatever was shown before.
	pub fn set_errors(&self, errors: ErrorMap) {
		let registry = {
			let mut state = self.inner.state.lock();
			state.errors = errors.clone();
			state.registry.clone()
		};
		registry.set_errors(&errors);
	}

	/// Errors from the most recent pass or [`Form::set_errors`] call.
	pub fn errors(&self) -> ErrorMap {
		self.inner.state.lock().errors.clone()
	}

	/// Progress score from the most recent pass.
	pub fn progress(&self) -> f64 {
		self.inner.state.lock().progress
	}

	/// Go back to the initial data, dropping any pending pass and all errors.
	pub fn reset(&self) {
		self.inner.timer.cancel();
		let (registry, initial) = {
			let mut state = self.inner.state.lock();
			let initial = state.initial.clone();
			state.data.replace(initial.clone());
			state.errors = ErrorMap::new();
			state.progress = 0.0;
			(state.registry.clone(), initial)
		};
		registry.clear_errors();
		registry.set_data(&initial);
		self.bind_validators();
		tracing::debug!("Form reset");
	}

	/// Make `data` the new initial data, then [`reset`](Self::reset).
	pub fn reset_to(&self, data: Value) {
		self.inner.state.lock().initial = data;
		self.reset();
	}

	/// Protect the subtree at `path` from writes by validation passes.
	pub fn freeze(&self, path: &str) -> FormResult<()> {
		self.inner.state.lock().data.freeze(path)?;
		Ok(())
	}

	/// Wait for the configured settle delay, then push the data into the
	/// fields that have mounted meanwhile.
	pub async fn settle(&self) {
		let delay = self.inner.config.settle_delay();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		let (registry, data) = self.inner.registry_and_data();
		registry.set_data(&data);
		self.bind_validators();
	}

	/// Number of validation passes run so far.
	pub fn validation_passes(&self) -> usize {
		self.inner.passes.load(Ordering::SeqCst)
	}

	pub fn has_pending_validation(&self) -> bool {
		self.inner.timer.is_pending()
	}

	pub fn registered_paths(&self) -> Vec<String> {
		self.inner.state.lock().registry.live_paths()
	}
}

impl FormInner {
	fn registry_and_data(&self) -> (FieldRegistry, Value) {
		let state = self.state.lock();
		(state.registry.clone(), state.data.value().clone())
	}

	fn overlaid_data(&self) -> Value {
		self.overlay_with(|field| field.get_value())
	}

	/// Current data with what the user entered in each live field, before
	/// the field formatted it.
	fn overlaid_raw_data(&self) -> Value {
		self.overlay_with(|field| field.get_raw_value())
	}

	/// A live field holding nothing overlays `null`, so a cleared field reads
	/// as missing instead of keeping its old value.
	fn overlay_with<F>(&self, read: F) -> Value
	where
		F: Fn(&dyn FieldHandle) -> Option<Value>,
	{
		let (registry, mut data) = {
			let state = self.state.lock();
			(state.registry.clone(), state.data.clone())
		};
		for (path, field) in registry.live_entries() {
			let value = read(field.as_ref()).unwrap_or(Value::Null);
			if let Err(e) = data.set(&path, value, false) {
				tracing::debug!("Not overlaying field '{}': {}", path, e);
			}
		}
		data.into_value()
	}

	fn request_validation(
		this: &Arc<Self>,
		path: &str,
		raw: Option<Value>,
		ignore_debounce: bool,
	) {
		this.timer.cancel();
		if ignore_debounce {
			this.apply_and_validate(path, raw);
			return;
		}

		let form: Weak<Self> = Arc::downgrade(this);
		let path = path.to_string();
		this.timer.schedule(move || match form.upgrade() {
			Some(inner) => {
				inner.apply_and_validate(&path, raw);
			}
			None => tracing::debug!("Form dropped before debounced pass for '{}'", path),
		});
	}

	/// Write `raw` at `path` into a fresh snapshot, commit it, and validate.
	fn apply_and_validate(&self, path: &str, raw: Option<Value>) -> ValidationOutcome {
		let overlaid = self.overlaid_data();
		let mut snapshot = self.state.lock().data.clone();
		snapshot.replace(overlaid);

		if let Some(raw) = raw {
			if !snapshot.is_object() {
				tracing::debug!("Data is not an object, not writing '{}'", path);
			} else if snapshot.is_frozen(path) {
				tracing::warn!("Skipping write to frozen path '{}'", path);
			} else if let Err(e) = snapshot.set(path, raw, true) {
				tracing::warn!("Could not write value for '{}': {}", path, e);
			}
		}

		let value = snapshot.value().clone();
		self.state.lock().data = snapshot;
		self.run_pass(&value)
	}

	fn run_pass(&self, data: &Value) -> ValidationOutcome {
		let (outcome, score) = {
			let _pass = self.pass_lock.lock();
			let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
			tracing::debug!("Validation pass {} started", pass);

			let registry = self.state.lock().registry.clone();
			registry.clear_errors();

			let (errors, outcome) = match self
				.schema
				.validate_sync(data, ValidateOptions::collect_all())
			{
				Ok(cast) => (ErrorMap::new(), ValidationOutcome::Valid(cast)),
				Err(failure) => {
					let errors = reconcile::distribute(&failure, &registry);
					(errors.clone(), ValidationOutcome::Invalid(errors))
				}
			};
			registry.set_errors(&errors);

			let required = SchemaWalker::new(&registry, data).required_paths(self.schema.root());
			let score = reconcile::progress(&required, &errors, outcome.is_valid());
			tracing::debug!(
				"Validation pass {} finished: {} errors, progress {:.1}",
				pass,
				errors.len(),
				score
			);

			let mut state = self.state.lock();
			state.errors = errors;
			state.progress = score;
			(outcome, score)
		};

		if let Some(on_progress_change) = &self.on_progress_change {
			on_progress_change(score);
		}
		outcome
	}
}

impl fmt::Debug for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Form")
			.field("data", state.data.value())
			.field("errors", &state.errors)
			.field("progress", &state.progress)
			.field("registry", &state.registry)
			.finish()
	}
}
