//! Error types for the command line front end.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] loco_project::ProjectError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] loco_sim::SimError),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
