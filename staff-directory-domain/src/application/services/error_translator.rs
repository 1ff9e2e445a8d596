use crate::domain::errors::{DirectoryError, GatewayError, GatewayOperation};
use tracing::{error, info_span, warn, Span};

/// Normalizes gateway failures into the directory error taxonomy.
///
/// Every translated failure is logged inside the span handed over at
/// construction, so provider errors carry the gateway's context.
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    span: Span,
}

impl ErrorTranslator {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn for_provider(provider: &str) -> Self {
        Self::new(info_span!("identity_provider", provider = %provider))
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn translate(
        &self,
        operation: GatewayOperation,
        handle: &str,
        failure: GatewayError,
    ) -> DirectoryError {
        self.span.in_scope(|| match failure {
            GatewayError::UserNotFound { .. } => {
                warn!(%operation, handle, "Identity not found in provider");
                DirectoryError::NotFound {
                    handle: handle.to_string(),
                }
            }
            GatewayError::MalformedResponse { .. } => {
                error!(%operation, handle, error = %failure, "Unclassified provider failure");
                DirectoryError::Unexpected {
                    message: format!("{operation} returned an unusable response"),
                    source: Some(Box::new(failure)),
                }
            }
            GatewayError::Rejected { .. }
            | GatewayError::Transport { .. }
            | GatewayError::Timeout { .. } => {
                let message = failure.provider_message();
                error!(%operation, handle, "Identity provider operation failed: {}", message);
                DirectoryError::Provider {
                    operation,
                    message,
                    source: failure,
                }
            }
        })
    }
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::for_provider("cognito")
    }
}
