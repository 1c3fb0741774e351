use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("required tool '{tool}' for stage '{stage}' not found on PATH")]
    ToolMissing { tool: String, stage: String },

    #[error("failed to install '{tool}': {reason}")]
    InstallFailed { tool: String, reason: String },

    #[error("'{tool}' failed in stage '{stage}' ({})", describe_code(.code))]
    ToolExecution {
        tool: String,
        stage: String,
        code: Option<i32>,
    },

    #[error("failed to start '{tool}': {reason}")]
    ToolSpawnFailed { tool: String, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
