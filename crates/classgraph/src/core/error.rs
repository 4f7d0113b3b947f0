//! Core error types for diagram generation
//!
//! This module defines the error types shared by the build, resolve, render
//! and write stages of the pipeline.

use thiserror::Error;

/// Core error types for diagram generation
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid declaration '{name}': {reason}")]
    InvalidDeclaration { name: String, reason: String },

    #[error("Alias collision: '{first}' and '{second}' both map to '{alias}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("Source error: {message}")]
    SourceError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new invalid declaration error
    pub fn invalid_declaration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new alias collision error
    pub fn alias_collision(
        alias: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::AliasCollision {
            alias: alias.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new declaration source error
    pub fn source_error(message: impl Into<String>) -> Self {
        Self::SourceError {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }
}
