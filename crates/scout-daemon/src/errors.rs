#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("config: {0}")]
    Config(#[from] scout_core::errors::ConfigError),
    #[error("store: {0}")]
    Store(#[from] scout_core::errors::StoreError),
    #[error("forge: {0}")]
    Forge(#[from] scout_forge::ForgeError),
    #[error("workflow: {0}")]
    Workflow(#[from] scout_workflow::WorkflowError),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
