//! Core renderer trait for diagram output
//!
//! A renderer turns a finished, read-only database into its output format.

use anyhow::Result;

use super::Database;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use classgraph::core::Renderer;
/// use classgraph::diagram::{DiagramModel, PlantUmlRenderer};
/// use classgraph::DiagramConfig;
///
/// let config = DiagramConfig::default();
/// let renderer = PlantUmlRenderer::new(&config);
/// let output = renderer.render(&DiagramModel::new()).unwrap();
/// assert!(output.starts_with("@startuml"));
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
