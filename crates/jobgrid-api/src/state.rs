//! Application state.

use jobgrid_store::{
    ApplicationRepository, JobRepository, NotificationRepository, StoreClient, UserRepository,
};

use crate::config::ApiConfig;
use crate::services::{LifecycleService, NotificationDispatcher};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: StoreClient,
    pub users: UserRepository,
    pub jobs: JobRepository,
    pub applications: ApplicationRepository,
    pub notifications: NotificationRepository,
    pub lifecycle: LifecycleService,
    pub notifier: NotificationDispatcher,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let client = StoreClient::from_env().await?;
        Ok(Self::with_client(config, client))
    }

    /// Build state around an existing store client.
    pub fn with_client(config: ApiConfig, client: StoreClient) -> Self {
        let users = UserRepository::new(client.clone());
        let jobs = JobRepository::new(client.clone());
        let applications = ApplicationRepository::new(client.clone());
        let notifications = NotificationRepository::new(client.clone());

        let lifecycle = LifecycleService::new(
            JobRepository::new(client.clone()),
            ApplicationRepository::new(client.clone()),
        );
        let notifier = NotificationDispatcher::new(NotificationRepository::new(client.clone()));

        Self {
            config,
            store: client,
            users,
            jobs,
            applications,
            notifications,
            lifecycle,
            notifier,
        }
    }
}
