//! Pipeline orchestration for diagram generation
//!
//! The generator runs every stage in order:
//! Declaration Source → Model Builder → Relation Resolver → Renderer → output
//!
//! Output files are replaced, never patched: the previous artifact is removed
//! and the new text is written to a temporary file in the same directory,
//! then persisted under the final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::NamedTempFile;
use tracing::{debug, info, span, Level};

use crate::core::{DeclarationSource, DiagramConfig, DiagramError, Renderer};
use crate::diagram::{DiagramModel, ModelBuilder, PlantUmlRenderer, RelationResolver};

/// Runs the full build → resolve → render pipeline for one configuration
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: DiagramConfig,
}

impl Generator {
    pub fn new(config: DiagramConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    /// Build the entity set and resolve its relations
    pub fn build_model<S: DeclarationSource + ?Sized>(&self, source: &S) -> Result<DiagramModel> {
        self.config.validate()?;

        let mut model = ModelBuilder::new(&self.config).build(source)?;
        RelationResolver::new(&self.config).resolve(&mut model)?;
        debug!(
            entities = model.entity_count(),
            edges = model.graph().edge_count(),
            diamonds = model.graph().diamond_count(),
            "Model ready for rendering"
        );
        Ok(model)
    }

    /// Render a finished model as PlantUML
    pub fn render_model(&self, model: &DiagramModel) -> Result<String> {
        PlantUmlRenderer::new(&self.config).render(model)
    }

    /// Run the pipeline and return the diagram text
    pub fn generate<S: DeclarationSource + ?Sized>(&self, source: &S) -> Result<String> {
        let generate_span = span!(Level::INFO, "generate_diagram");
        let _enter = generate_span.enter();

        let model = self.build_model(source)?;
        let output = self.render_model(&model)?;
        info!(
            entities = model.entity_count(),
            bytes = output.len(),
            "Diagram generated"
        );
        Ok(output)
    }

    /// Run the pipeline and write `<dir>/<outputFileName>`
    ///
    /// Returns the path of the written file.
    pub fn generate_to_dir<S: DeclarationSource + ?Sized>(
        &self,
        source: &S,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let output = self.generate(source)?;
        let path = dir.as_ref().join(self.config.output_file_name.trim());
        write_output(&path, &output)?;
        Ok(path)
    }
}

/// Replace the file at `path` with `contents`
///
/// Parent directories are created as needed. Any existing file is removed
/// first; the new contents become visible only once fully written.
pub fn write_output(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let write_span = span!(Level::INFO, "write_output", path = %path.display());
    let _enter = write_span.enter();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(DiagramError::from)?;

    if path.exists() {
        debug!("Removing previous artifact");
        std::fs::remove_file(path).map_err(DiagramError::from)?;
    }

    let mut file = NamedTempFile::new_in(&dir).map_err(DiagramError::from)?;
    file.write_all(contents.as_bytes()).map_err(DiagramError::from)?;
    file.flush().map_err(DiagramError::from)?;
    file.persist(path)
        .map_err(|e| DiagramError::from(e.error))?;

    info!(bytes = contents.len(), "Output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Declaration, DeclarationKind, DeclarationTree, FieldDecl, TypeRef};

    fn sample_tree() -> DeclarationTree {
        DeclarationTree::new()
            .with_declaration(
                Declaration::new(DeclarationKind::Class, "p.Box", "p")
                    .with_field(FieldDecl::new("item", TypeRef::named("p.Item"))),
            )
            .with_declaration(Declaration::new(DeclarationKind::Class, "p.Item", "p"))
    }

    #[test]
    fn test_generate_runs_all_stages() {
        let output = Generator::default().generate(&sample_tree()).unwrap();
        assert!(output.starts_with("@startuml\n"));
        assert!(output.contains("class \"Box\" as p_Box {"));
        assert!(output.contains("p_Box o-- p_Item : item"));
        assert!(output.ends_with("@enduml\n"));
    }

    #[test]
    fn test_invalid_config_rejected_before_build() {
        let config = DiagramConfig {
            output_file_name: String::new(),
            ..DiagramConfig::default()
        };
        let err = Generator::new(config).generate(&sample_tree()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_generate_to_dir_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::default();
        let target = dir.path().join("class-diagram.puml");
        std::fs::write(&target, "stale").unwrap();

        let path = generator.generate_to_dir(&sample_tree(), dir.path()).unwrap();
        assert_eq!(path, target);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("@startuml"));
        assert!(!written.contains("stale"));

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_output_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.puml");
        write_output(&path, "@startuml\n@enduml\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "@startuml\n@enduml\n");
    }
}
