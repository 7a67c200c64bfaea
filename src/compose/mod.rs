//! Scenario composition
//!
//! For one [`ScenarioParams`] the [`Composer`]:
//!
//! 1. looks up the SSP fragment (`Merge` error if none is loaded),
//! 2. clones the base template,
//! 3. merges the fragment into the components element (see [`merge_fragment`]),
//! 4. rewrites the scenario name, policy target, database location and,
//!    if configured, the policy rate.
//!
//! Every configured node must exist in the template; a missing one is a
//! `MissingField` error rather than being created. The shared template and
//! fragments are only ever read.

mod fields;
mod merge;

use crate::error::EnsembleError;
use crate::scenario::ScenarioParams;
use crate::template::{SspLibrary, Template};
use crate::xml::{Document, Element, NodePath, RenderOptions};

pub use fields::{render as render_pattern, FieldMap, Patterns};
pub use merge::{merge_fragment, MergeStats};

/// A composed configuration for a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedConfig {
    pub params: ScenarioParams,
    pub scenario_name: String,
    pub document: Document,
}

impl ComposedConfig {
    /// Output filename
    pub fn file_name(&self) -> String {
        self.params.file_name()
    }

    /// Render the document to text
    pub fn render(&self, options: &RenderOptions) -> Result<String, EnsembleError> {
        self.document.render(options)
    }
}

/// Field values written into one composed configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    pub scenario_name: String,
    pub policy_target: Option<String>,
    pub database_location: Option<String>,
    pub policy_rate: String,
}

/// Builds composed configurations from shared, read-only inputs
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    template: &'a Template,
    library: &'a SspLibrary,
    fields: &'a FieldMap,
    patterns: &'a Patterns,
}

impl<'a> Composer<'a> {
    pub fn new(
        template: &'a Template,
        library: &'a SspLibrary,
        fields: &'a FieldMap,
        patterns: &'a Patterns,
    ) -> Self {
        Self {
            template,
            library,
            fields,
            patterns,
        }
    }

    /// Compose the configuration for one scenario
    pub fn compose(&self, params: &ScenarioParams) -> Result<ComposedConfig, EnsembleError> {
        let fragment = self.library.require(params.ssp)?;
        let substitutions = self.substitutions(params)?;

        let mut document = self.template.instantiate();

        let target = self
            .fields
            .components
            .require_mut(&mut document.root, fields::COMPONENTS)?;
        let stats = merge_fragment(target, fragment);
        tracing::debug!(
            "{}: merged {} ({} replaced, {} appended)",
            substitutions.scenario_name,
            params.ssp,
            stats.replaced,
            stats.appended
        );

        self.apply(&mut document.root, &substitutions)?;

        Ok(ComposedConfig {
            params: *params,
            scenario_name: substitutions.scenario_name,
            document,
        })
    }

    /// Compute the field values for a scenario without touching a document
    pub fn substitutions(&self, params: &ScenarioParams) -> Result<Substitutions, EnsembleError> {
        let policy_target = if params.rcp.is_baseline() {
            None
        } else {
            Some(self.patterns.policy_target(params)?)
        };

        Ok(Substitutions {
            scenario_name: params.scenario_name(),
            policy_target,
            database_location: Some(self.patterns.database(params)?),
            policy_rate: params.policy_rate.to_string(),
        })
    }

    fn apply(&self, root: &mut Element, values: &Substitutions) -> Result<(), EnsembleError> {
        set_text(
            root,
            &self.fields.scenario_name,
            fields::SCENARIO_NAME,
            Some(&values.scenario_name),
        )?;

        if let Some(path) = &self.fields.policy_target {
            // Baseline scenarios keep the template's policy target
            set_text(root, path, fields::POLICY_TARGET, values.policy_target.as_deref())?;
        }
        if let Some(path) = &self.fields.database_location {
            set_text(
                root,
                path,
                fields::DATABASE_LOCATION,
                values.database_location.as_deref(),
            )?;
        }
        if let Some(path) = &self.fields.policy_rate {
            set_text(root, path, fields::POLICY_RATE, Some(&values.policy_rate))?;
        }

        Ok(())
    }
}

/// Resolve a required node and, when a value is given, replace its text
fn set_text(
    root: &mut Element,
    path: &NodePath,
    field: &str,
    value: Option<&str>,
) -> Result<(), EnsembleError> {
    let element = path.require_mut(root, field)?;
    match value {
        Some(value) => {
            element.set_text(value);
            tracing::debug!("Updated {} to: {}", field, value);
        }
        None => tracing::debug!("Left {} unchanged", field),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::*;
    use crate::template::SspFragment;

    const TEMPLATE: &str = r#"<Configuration>
    <Files>
        <Value name="xmldb-location">../output/database_basexdb</Value>
        <Value name="policy-target-file">../input/policy/reference.xml</Value>
    </Files>
    <Strings>
        <Value name="scenarioName">Reference</Value>
    </Strings>
    <ScenarioComponents>
        <Value name="energy">../input/energy.xml</Value>
    </ScenarioComponents>
</Configuration>"#;

    fn library() -> SspLibrary {
        let mut library = SspLibrary::new();
        for &ssp in Ssp::ALL {
            let xml = format!(
                r#"<FileSet><Value name="socioeconomics">socio_{ssp}.xml</Value></FileSet>"#
            );
            let document = Document::parse_str(&xml).unwrap();
            library.insert(SspFragment::from_document(ssp, document));
        }
        library
    }

    fn params(ssp: Ssp, rcp: Rcp) -> ScenarioParams {
        ScenarioParams::new(
            ssp,
            rcp,
            Technology::Basic,
            Supply::Low,
            Allocation::Market,
            PolicyRate::new(25).unwrap(),
        )
    }

    fn text_at(doc: &Document, path: &str) -> String {
        let path: NodePath = path.parse().unwrap();
        path.resolve(&doc.root).unwrap().text()
    }

    #[test]
    fn test_compose_gcam_layout() {
        let template: Template = TEMPLATE.parse().unwrap();
        let library = library();
        let fields = FieldMap::default();
        let patterns = Patterns::default();
        let composer = Composer::new(&template, &library, &fields, &patterns);

        let composed = composer.compose(&params(Ssp::SSP4, Rcp::Rcp4p5)).unwrap();
        let doc = &composed.document;

        assert_eq!(composed.file_name(), "SSP4_4p5_Basic_L_Mkt_PR25.xml");
        assert_eq!(
            text_at(doc, "Strings/Value[@name='scenarioName']"),
            "SSP4_4p5_Basic_L_Mkt_PR25"
        );
        assert_eq!(
            text_at(doc, "Files/Value[@name='policy-target-file']"),
            "../input/policy/policy_target_4p5_spa4.xml"
        );
        assert_eq!(
            text_at(doc, "Files/Value[@name='xmldb-location']"),
            "../output/db_SSP4_4p5_Basic_L_Mkt_PR25"
        );
        assert_eq!(
            text_at(doc, "ScenarioComponents/Value[@name='socioeconomics']"),
            "socio_SSP4.xml"
        );
        assert_eq!(
            text_at(doc, "ScenarioComponents/Value[@name='energy']"),
            "../input/energy.xml"
        );

        // The shared template is untouched
        assert_eq!(template, TEMPLATE.parse::<Template>().unwrap());
    }

    #[test]
    fn test_whitespace_value_survives_composition() {
        let xml = TEMPLATE.replace(
            "<Value name=\"scenarioName\">Reference</Value>",
            "<Value name=\"scenarioName\">Reference</Value>\n        <Value name=\"separator\"> </Value>",
        );
        let template: Template = xml.parse().unwrap();
        let library = library();
        let fields = FieldMap::default();
        let patterns = Patterns::default();
        let composer = Composer::new(&template, &library, &fields, &patterns);

        let composed = composer.compose(&params(Ssp::SSP2, Rcp::Rcp2p6)).unwrap();
        assert_eq!(
            text_at(&composed.document, "Strings/Value[@name='separator']"),
            " "
        );

        let text = composed.render(&RenderOptions::default()).unwrap();
        assert!(text.contains("<Value name=\"separator\"> </Value>"));
    }

    #[test]
    fn test_baseline_keeps_policy_target() {
        let template: Template = TEMPLATE.parse().unwrap();
        let library = library();
        let fields = FieldMap::default();
        let patterns = Patterns::default();
        let composer = Composer::new(&template, &library, &fields, &patterns);

        let composed = composer
            .compose(&params(Ssp::SSP1, Rcp::Baseline))
            .unwrap();
        assert_eq!(
            text_at(&composed.document, "Files/Value[@name='policy-target-file']"),
            "../input/policy/reference.xml"
        );
    }

    #[test]
    fn test_unknown_ssp_is_merge_error() {
        let template: Template = TEMPLATE.parse().unwrap();
        let library = library();
        let fields = FieldMap::default();
        let patterns = Patterns::default();
        let composer = Composer::new(&template, &library, &fields, &patterns);

        let result = composer.compose(&params(Ssp::new(6).unwrap(), Rcp::Rcp2p6));
        assert!(matches!(result, Err(EnsembleError::Merge { ssp }) if ssp == "SSP6"));
    }

    #[test]
    fn test_missing_policy_rate_node() {
        let template: Template = TEMPLATE.parse().unwrap();
        let library = library();
        let fields = FieldMap {
            policy_rate: Some("Ints/Value[@name='policy-rate']".parse().unwrap()),
            ..FieldMap::default()
        };
        let patterns = Patterns::default();
        let composer = Composer::new(&template, &library, &fields, &patterns);

        let result = composer.compose(&params(Ssp::SSP1, Rcp::Rcp2p6));
        match result {
            Err(EnsembleError::MissingField { field, path }) => {
                assert_eq!(field, "policy rate");
                assert_eq!(path, "Ints/Value[@name='policy-rate']");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }
}
