//! Error type of the command-line front end.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] bs_project::ProjectError),

    #[error("Run failed: {0}")]
    Integrator(#[from] bs_integrator::IntegratorError),

    #[error("Results error: {0}")]
    Results(#[from] bs_results::ResultsError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
