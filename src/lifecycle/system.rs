use crate::config::ControllerConfig;
use crate::framework::{
    ControllerActor, ControllerClient, ControllerEvent, DataService, DbRecord, EventBus,
    RecordError,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A running controller: the actor task, its client, and its event bus.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryDataService::with_records(sample_stations()));
/// let system = ControllerSystem::start(store, ControllerConfig::default());
///
/// let mut events = system.subscribe();
/// system.client.load(1, false).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ControllerSystem<R: DbRecord> {
    pub client: ControllerClient<R>,
    events: EventBus,
    handle: JoinHandle<()>,
}

impl<R: DbRecord> ControllerSystem<R> {
    /// Creates the controller actor over `service` and spawns it.
    pub fn start(service: Arc<dyn DataService<R>>, config: ControllerConfig) -> Self {
        let (actor, client) = ControllerActor::new(service, config);
        let events = actor.events().clone();
        let handle = tokio::spawn(actor.run());
        info!(record_type = R::type_name(), "Controller system started");
        Self {
            client,
            events,
            handle,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Drops the client and waits for the actor to drain its queue and stop.
    ///
    /// Clones of the client held elsewhere keep the actor alive until they are dropped.
    pub async fn shutdown(self) -> Result<(), RecordError> {
        info!("Shutting down system...");
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!("Controller task failed: {:?}", e);
            return Err(RecordError::TaskFailed(e.to_string()));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
