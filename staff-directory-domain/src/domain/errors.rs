use crate::domain::validation::ValidationRule;
use std::fmt;
use thiserror::Error;

/// Boxed cause kept by errors that wrap a lower-level failure
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Gateway call that was attempted when a provider failure occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOperation {
    Create,
    Enable,
    Disable,
    SetPassword,
    AddToGroup { group: String },
    Get,
    List,
    ListGroups,
    UpdateAttributes,
}

impl GatewayOperation {
    pub fn add_to_group(group: impl Into<String>) -> Self {
        GatewayOperation::AddToGroup {
            group: group.into(),
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayOperation::Create => write!(f, "create"),
            GatewayOperation::Enable => write!(f, "enable"),
            GatewayOperation::Disable => write!(f, "disable"),
            GatewayOperation::SetPassword => write!(f, "set_password"),
            GatewayOperation::AddToGroup { group } => write!(f, "add_to_group({group})"),
            GatewayOperation::Get => write!(f, "get"),
            GatewayOperation::List => write!(f, "list"),
            GatewayOperation::ListGroups => write!(f, "list_groups"),
            GatewayOperation::UpdateAttributes => write!(f, "update_attributes"),
        }
    }
}

/// Domain error taxonomy surfaced by the orchestration layer
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        rule: ValidationRule,
        message: String,
    },

    #[error("Identity provider error on {operation}: {message}")]
    Provider {
        operation: GatewayOperation,
        message: String,
        #[source]
        source: GatewayError,
    },

    #[error("Identity not found: {handle}")]
    NotFound { handle: String },

    #[error("Unexpected error: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl DirectoryError {
    pub fn invalid(rule: ValidationRule) -> Self {
        DirectoryError::InvalidInput {
            rule,
            message: rule.message().to_string(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        DirectoryError::Unexpected {
            message: message.into(),
            source: None,
        }
    }

    /// Violated rule when this is a validation failure
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            DirectoryError::InvalidInput { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// Gateway operation that failed when this is a provider failure
    pub fn operation(&self) -> Option<&GatewayOperation> {
        match self {
            DirectoryError::Provider { operation, .. } => Some(operation),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound { .. })
    }
}

/// Result type for orchestration operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Failures reported by an identity gateway implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("User not found: {handle}")]
    UserNotFound { handle: String },

    #[error("Provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Malformed provider response: {message}")]
    MalformedResponse { message: String },
}

impl GatewayError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Provider-supplied message without the error-kind prefix
    pub fn provider_message(&self) -> String {
        match self {
            GatewayError::UserNotFound { handle } => format!("User {handle} does not exist"),
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Transport { message } => message.clone(),
            GatewayError::Timeout { seconds } => {
                format!("Request timed out after {seconds} seconds")
            }
            GatewayError::MalformedResponse { message } => message.clone(),
        }
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("HTTP client construction failed: {message}")]
    HttpClient { message: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
