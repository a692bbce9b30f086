//! Error types for locale resolution and template dispatch

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, LgError>;

/// Errors that can occur while resolving or rendering localized templates
#[derive(Debug, Error)]
pub enum LgError {
    #[error("Malformed locale policy: {0}")]
    MalformedPolicy(String),

    #[error("No supported language found for '{locale}'")]
    UnsupportedLocale { locale: String },

    #[error("No locale fallback available for '{locale}'")]
    NoFallbackAvailable { locale: String },

    #[error("No entry resource reachable for locale '{locale}'")]
    NoEntryForLocale { locale: String },

    #[error("Cannot import '{reference}' from '{source_id}' with locale '{locale}'")]
    ImportNotFound {
        source_id: String,
        reference: String,
        locale: String,
    },

    #[error("Template '{template}' failed in every candidate ({} diagnostics)", diagnostics.len())]
    TemplateEvaluation {
        template: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Failed to parse template '{name}' in {resource}: {message}")]
    TemplateParse {
        resource: String,
        name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LgError {
    /// Check if this error means no locale along the fallback chain matched
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            LgError::UnsupportedLocale { .. }
                | LgError::NoFallbackAvailable { .. }
                | LgError::NoEntryForLocale { .. }
                | LgError::ImportNotFound { .. }
        )
    }

    /// Diagnostics collected before the error was raised, if any
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            LgError::TemplateEvaluation { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

/// A template-level failure recorded for one candidate resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Resource identifier whose engine failed
    pub resource: String,
    /// Locale tag the candidate was built for
    pub locale: String,
    /// Error message from the engine
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locale = if self.locale.is_empty() { "<neutral>" } else { &self.locale };
        write!(f, "{} [{}]: {}", self.resource, locale, self.message)
    }
}
