//! Node paths used as explicit accessors into a template
//!
//! A path is a `/`-separated list of steps relative to the root element. Each
//! step names a child tag and may require an attribute value:
//!
//! | Path | Selects |
//! |------|---------|
//! | `.` | the root element |
//! | `ScenarioComponents` | first `<ScenarioComponents>` child of the root |
//! | `Strings/Value[@name='scenarioName']` | first matching `<Value>` inside `<Strings>` |
//!
//! Each step picks the first matching child in document order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Element;
use crate::error::EnsembleError;

/// A validated path from the root element to a descendant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    raw: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Step {
    tag: String,
    predicate: Option<(String, String)>,
}

impl Step {
    fn matches(&self, element: &Element) -> bool {
        element.name == self.tag
            && match &self.predicate {
                Some((key, value)) => element.attr(key) == Some(value.as_str()),
                None => true,
            }
    }
}

impl NodePath {
    /// The path selecting the root element itself
    pub fn root() -> Self {
        Self {
            raw: ".".to_string(),
            steps: Vec::new(),
        }
    }

    /// Extend the path with a child tag
    pub fn child(mut self, tag: &str) -> Self {
        self.push(Step {
            tag: tag.to_string(),
            predicate: None,
        });
        self
    }

    /// Extend the path with a child tag carrying `key='value'`
    pub fn child_where(mut self, tag: &str, key: &str, value: &str) -> Self {
        self.push(Step {
            tag: tag.to_string(),
            predicate: Some((key.to_string(), value.to_string())),
        });
        self
    }

    fn push(&mut self, step: Step) {
        let rendered = match &step.predicate {
            Some((key, value)) => format!("{}[@{}='{}']", step.tag, key, value),
            None => step.tag.clone(),
        };
        if self.steps.is_empty() {
            self.raw = rendered;
        } else {
            self.raw = format!("{}/{}", self.raw, rendered);
        }
        self.steps.push(step);
    }

    /// Whether this path selects the root element
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Find the selected element
    pub fn resolve<'a>(&self, root: &'a Element) -> Option<&'a Element> {
        let mut current = root;
        for step in &self.steps {
            current = current.elements().find(|child| step.matches(child))?;
        }
        Some(current)
    }

    /// Find the selected element mutably
    pub fn resolve_mut<'a>(&self, root: &'a mut Element) -> Option<&'a mut Element> {
        let mut current = root;
        for step in &self.steps {
            current = current.elements_mut().find(|child| step.matches(child))?;
        }
        Some(current)
    }

    /// Like [`NodePath::resolve_mut`], failing with a `MissingField` error
    pub fn require_mut<'a>(
        &self,
        root: &'a mut Element,
        field: &str,
    ) -> Result<&'a mut Element, EnsembleError> {
        self.resolve_mut(root)
            .ok_or_else(|| EnsembleError::missing_field(field, self.raw.clone()))
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for NodePath {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() || raw == "." {
            return Ok(Self::root());
        }

        let invalid =
            |reason: &str| EnsembleError::Config(format!("invalid node path '{}': {}", raw, reason));

        let steps = split_steps(raw)
            .ok_or_else(|| invalid("unterminated quote or bracket"))?
            .into_iter()
            .map(|segment| parse_step(segment).map_err(|reason| invalid(&reason)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            steps,
        })
    }
}

/// Split on `/` outside brackets and quotes
fn split_steps(raw: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut in_bracket = false;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') if in_bracket => quote = Some(c),
            (None, '[') => in_bracket = true,
            (None, ']') => in_bracket = false,
            (None, '/') if !in_bracket => {
                segments.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() || in_bracket {
        return None;
    }
    segments.push(&raw[start..]);
    Some(segments)
}

fn parse_step(segment: &str) -> Result<Step, String> {
    let segment = segment.trim();
    let (tag, predicate) = match segment.find('[') {
        Some(open) => {
            let inner = segment[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("'{}' has text after its predicate", segment))?;
            (&segment[..open], Some(parse_predicate(inner)?))
        }
        None => (segment, None),
    };

    if tag.is_empty() {
        return Err("empty step".to_string());
    }
    if tag.chars().any(|c| c.is_whitespace() || "[]@='\"".contains(c)) {
        return Err(format!("'{}' is not a valid tag name", tag));
    }

    Ok(Step {
        tag: tag.to_string(),
        predicate,
    })
}

fn parse_predicate(inner: &str) -> Result<(String, String), String> {
    let inner = inner.trim();
    let body = inner
        .strip_prefix('@')
        .ok_or_else(|| format!("predicate '[{}]' must start with '@'", inner))?;
    let (key, value) = body
        .split_once('=')
        .ok_or_else(|| format!("predicate '[{}]' needs '@attr=value'", inner))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("predicate '[{}]' has no attribute name", inner));
    }

    let value = value.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .ok_or_else(|| format!("attribute value {} must be quoted", value))?;

    Ok((key.to_string(), unquoted.to_string()))
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for NodePath {
    type Error = EnsembleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    fn config() -> Document {
        Document::parse_str(
            r#"<Configuration>
                <Files>
                    <Value name="xmldb-location">../output/database</Value>
                    <Value name="policy-target-file">../input/policy/a/b.xml</Value>
                </Files>
                <Strings>
                    <Value name="scenarioName">Reference</Value>
                </Strings>
            </Configuration>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_with_predicate() {
        let doc = config();
        let path: NodePath = "Files/Value[@name='policy-target-file']".parse().unwrap();
        assert_eq!(
            path.resolve(&doc.root).unwrap().text(),
            "../input/policy/a/b.xml"
        );

        let path: NodePath = r#"Strings / Value[@name="scenarioName"]"#.parse().unwrap();
        assert_eq!(path.resolve(&doc.root).unwrap().text(), "Reference");
    }

    #[test]
    fn test_root_and_missing() {
        let mut doc = config();
        let root: NodePath = ".".parse().unwrap();
        assert!(root.is_root());
        assert_eq!(root.resolve(&doc.root).unwrap().name, "Configuration");

        let missing: NodePath = "Files/Value[@name='nope']".parse().unwrap();
        assert!(missing.resolve(&doc.root).is_none());
        assert!(matches!(
            missing.require_mut(&mut doc.root, "policy rate"),
            Err(EnsembleError::MissingField { .. })
        ));
    }

    #[test]
    fn test_builder_matches_parsed() {
        let built = NodePath::root()
            .child("Strings")
            .child_where("Value", "name", "scenarioName");
        let parsed: NodePath = "Strings/Value[@name='scenarioName']".parse().unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built.to_string(), "Strings/Value[@name='scenarioName']");
    }

    #[test]
    fn test_slash_inside_predicate_value() {
        let path: NodePath = "Files/Value[@name='a/b']".parse().unwrap();
        assert_eq!(path.steps.len(), 2);
        assert_eq!(
            path.steps[1].predicate,
            Some(("name".to_string(), "a/b".to_string()))
        );
    }

    #[test]
    fn test_invalid_paths() {
        for raw in [
            "Files//Value",
            "Files/Value[name='x']",
            "Files/Value[@name=x]",
            "Files/Value[@name='x'",
            "Files/Value[@name='x']tail",
            "Fi les",
        ] {
            assert!(
                matches!(raw.parse::<NodePath>(), Err(EnsembleError::Config(_))),
                "expected {} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let path: NodePath =
            serde_json::from_str(r#""Strings/Value[@name='scenarioName']""#).unwrap();
        assert_eq!(path.as_str(), "Strings/Value[@name='scenarioName']");
        assert_eq!(
            serde_json::to_string(&path).unwrap(),
            r#""Strings/Value[@name='scenarioName']""#
        );
        assert!(serde_json::from_str::<NodePath>(r#""a[b]""#).is_err());
    }
}
