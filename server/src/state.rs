use localchat_core::{GenerationOptions, GeneratorRef};
use std::sync::{Arc, RwLock};

/// Lifecycle of the process-wide generator handle
#[derive(Clone)]
pub enum GeneratorState {
    /// Model still loading; requests are turned away
    Uninitialized,
    Ready(GeneratorRef),
    /// Loading failed; the process is about to exit
    Failed(String),
}

/// Shared, write-once handle to the generator.
///
/// Written by the startup task, read by every request.
#[derive(Clone)]
pub struct ModelHandle {
    state: Arc<RwLock<GeneratorState>>,
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GeneratorState::Uninitialized)),
        }
    }

    pub fn ready(generator: GeneratorRef) -> Self {
        let handle = Self::new();
        handle.mark_ready(generator);
        handle
    }

    pub fn mark_ready(&self, generator: GeneratorRef) {
        self.set(GeneratorState::Ready(generator));
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.set(GeneratorState::Failed(reason.into()));
    }

    pub fn state(&self) -> GeneratorState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The generator if loading has completed successfully
    pub fn generator(&self) -> Option<GeneratorRef> {
        match self.state() {
            GeneratorState::Ready(generator) => Some(generator),
            GeneratorState::Uninitialized | GeneratorState::Failed(_) => None,
        }
    }

    fn set(&self, next: GeneratorState) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = next;
    }
}

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub options: Arc<GenerationOptions>,
}

impl AppState {
    pub fn new(model: ModelHandle, options: GenerationOptions) -> Self {
        Self {
            model,
            options: Arc::new(options),
        }
    }
}
