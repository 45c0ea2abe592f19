//! In-memory daemon used by the orchestrator tests.

use crate::daemon::gateway::{
    ContainerState, CreateOptions, DaemonGateway, ImageInfo, RuntimeOptions,
};
use crate::error::{JunbanError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InspectContainer(String),
    InspectImage(String),
    Create(CreateOptions),
    Start(String, RuntimeOptions),
}

impl Call {
    /// Returns true for calls that change daemon state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Create(_) | Call::Start(..))
    }
}

#[derive(Default)]
struct State {
    images: HashMap<String, String>,
    containers: HashMap<String, ContainerState>,
    fail_create: HashSet<String>,
    fail_start: HashSet<String>,
    calls: Vec<Call>,
}

/// Daemon double holding images and containers in memory.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a local image.
    pub fn with_image(self, reference: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(reference.to_string(), id.to_string());
        self
    }

    /// Registers an existing container.
    pub fn with_container(self, name: &str, image_id: &str, running: bool) -> Self {
        self.state.lock().unwrap().containers.insert(
            name.to_string(),
            ContainerState {
                id: format!("id-{}", name),
                image_id: image_id.to_string(),
                running,
            },
        );
        self
    }

    /// Makes create fail for `name`.
    pub fn failing_create(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_create
            .insert(name.to_string());
        self
    }

    /// Makes start fail for `name`.
    pub fn failing_start(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_start
            .insert(name.to_string());
        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that changed daemon state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Names passed to create, in call order.
    pub fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(options) => Some(options.name),
                _ => None,
            })
            .collect()
    }

    /// Names passed to start, in call order.
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(name, _) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Current state of a container.
    pub fn container(&self, name: &str) -> Option<ContainerState> {
        self.state.lock().unwrap().containers.get(name).cloned()
    }
}

#[async_trait]
impl DaemonGateway for FakeGateway {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::InspectContainer(name.to_string()));
        Ok(state.containers.get(name).cloned())
    }

    async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::InspectImage(reference.to_string()));
        Ok(state
            .images
            .get(reference)
            .map(|id| ImageInfo { id: id.clone() }))
    }

    async fn create_container(&self, options: &CreateOptions) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(options.clone()));

        if state.fail_create.contains(&options.name) {
            return Err(JunbanError::daemon(format!(
                "Conflict creating container {}",
                options.name
            )));
        }

        let image_id = state
            .images
            .get(&options.image)
            .cloned()
            .unwrap_or_else(|| options.image.clone());
        state.containers.insert(
            options.name.clone(),
            ContainerState {
                id: format!("id-{}", options.name),
                image_id,
                running: false,
            },
        );
        Ok(())
    }

    async fn start_container(&self, name: &str, options: &RuntimeOptions) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Start(name.to_string(), options.clone()));

        if state.fail_start.contains(name) {
            return Err(JunbanError::daemon(format!(
                "Error starting container {}: port is already allocated",
                name
            )));
        }

        match state.containers.get_mut(name) {
            Some(container) => {
                container.running = true;
                Ok(())
            }
            None => Err(JunbanError::daemon(format!("No such container: {}", name))),
        }
    }
}
