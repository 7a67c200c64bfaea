//! Writing composed configurations to disk

use std::path::{Path, PathBuf};

use crate::compose::ComposedConfig;
use crate::error::EnsembleError;
use crate::xml::RenderOptions;

/// Create the output directory (and parents) if needed
pub fn ensure_dir(dir: &Path) -> Result<(), EnsembleError> {
    std::fs::create_dir_all(dir).map_err(|e| EnsembleError::write(dir, e))
}

/// Render a configuration and write it as `<dir>/<scenario>.xml`
///
/// The directory is created if absent. An existing file with the same name
/// is overwritten.
pub fn write_config(
    config: &ComposedConfig,
    dir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf, EnsembleError> {
    let text = config.render(options)?;
    ensure_dir(dir)?;

    let path = dir.join(config.file_name());
    std::fs::write(&path, text).map_err(|e| EnsembleError::write(&path, e))?;
    tracing::debug!("Wrote {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::*;
    use crate::xml::{Document, Element};

    fn config(name: &str) -> ComposedConfig {
        let params = ScenarioParams::new(
            Ssp::SSP1,
            Rcp::Rcp2p6,
            Technology::Basic,
            Supply::Low,
            Allocation::Market,
            PolicyRate::new(0).unwrap(),
        );
        ComposedConfig {
            params,
            scenario_name: params.scenario_name(),
            document: Document::new(
                Element::new("Configuration").with_child(Element::new("scenarioName").with_text(name)),
            ),
        }
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("configs").join("sample");

        let path = write_config(&config("first"), &out, &RenderOptions::default()).unwrap();
        assert_eq!(path, out.join("SSP1_2p6_Basic_L_Mkt_PR0.xml"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("first"));
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_config(&config("first"), dir.path(), &RenderOptions::default()).unwrap();
        let path = write_config(&config("second"), dir.path(), &RenderOptions::default()).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("second"));
        assert!(!text.contains("first"));
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();

        let result = write_config(&config("x"), &blocker, &RenderOptions::default());
        assert!(matches!(result, Err(EnsembleError::Write { .. })));
    }
}
