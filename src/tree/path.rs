//! Path expressions over the node tree
//!
//! A restricted subset: `/name` steps, `[@attr]` attribute-existence and
//! `[@attr='value']` attribute-value predicates, plus `[i]` 0-based
//! positional selectors (counted among same-named siblings) so patch
//! operations can address keyless repeated children.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::tree::node::Element;

/// A predicate narrowing a path step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[@attr]` - the attribute is present.
    HasAttribute(String),
    /// `[@attr='value']` - the attribute has exactly this value.
    AttributeEquals(String, String),
    /// `[i]` - the i-th element with this name among its siblings, 0-based.
    Index(usize),
}

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// Element name to match.
    pub name: String,
    /// Optional narrowing predicate.
    pub predicate: Option<Predicate>,
}

/// A parsed path expression, e.g. `/base/widgets/widget[@name='ok_button']`.
///
/// The first step names the root element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    /// Steps from the root, in order.
    pub steps: Vec<PathStep>,
}

impl NodePath {
    /// A single-step path naming the root element.
    #[must_use]
    pub fn root(name: &str) -> Self {
        NodePath {
            steps: vec![PathStep {
                name: name.to_string(),
                predicate: None,
            }],
        }
    }

    /// Parses a path expression.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPathExpression`] on syntax errors.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidPathExpression {
            expr: expr.to_string(),
            message: message.to_string(),
        };

        let rest = expr
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        if rest.is_empty() {
            return Err(invalid("must contain at least one step"));
        }

        let mut steps = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty step"));
            }
            steps.push(parse_step(raw).map_err(|m| invalid(&m))?);
        }
        Ok(NodePath { steps })
    }

    /// Extends the path with a plain name step.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        self.join_step(PathStep {
            name: name.to_string(),
            predicate: None,
        })
    }

    /// Extends the path with an explicit step.
    #[must_use]
    pub fn join_step(&self, step: PathStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        NodePath { steps }
    }

    /// Splits off the final step, yielding the parent path. `None` when the
    /// path is the bare root step.
    #[must_use]
    pub fn split_last(&self) -> Option<(NodePath, &PathStep)> {
        if self.steps.len() < 2 {
            return None;
        }
        let (last, parent) = self.steps.split_last()?;
        Some((
            NodePath {
                steps: parent.to_vec(),
            },
            last,
        ))
    }
}

impl FromStr for NodePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NodePath::parse(s)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step.name)?;
            match &step.predicate {
                None => {}
                Some(Predicate::HasAttribute(attr)) => write!(f, "[@{attr}]")?,
                Some(Predicate::AttributeEquals(attr, value)) => {
                    write!(f, "[@{attr}='{value}']")?;
                }
                Some(Predicate::Index(i)) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

fn parse_step(raw: &str) -> std::result::Result<PathStep, String> {
    let Some(open) = raw.find('[') else {
        return Ok(PathStep {
            name: raw.to_string(),
            predicate: None,
        });
    };
    if !raw.ends_with(']') {
        return Err(format!("unterminated predicate in step '{raw}'"));
    }
    let name = &raw[..open];
    if name.is_empty() {
        return Err(format!("step '{raw}' has no element name"));
    }
    let body = &raw[open + 1..raw.len() - 1];
    let predicate = parse_predicate(body).ok_or_else(|| format!("bad predicate '[{body}]'"))?;
    Ok(PathStep {
        name: name.to_string(),
        predicate: Some(predicate),
    })
}

fn parse_predicate(body: &str) -> Option<Predicate> {
    if let Some(attr) = body.strip_prefix('@') {
        return match attr.split_once('=') {
            None if !attr.is_empty() => Some(Predicate::HasAttribute(attr.to_string())),
            Some((name, value)) if !name.is_empty() => {
                let value = value.strip_prefix('\'')?.strip_suffix('\'')?;
                Some(Predicate::AttributeEquals(
                    name.to_string(),
                    value.to_string(),
                ))
            }
            _ => None,
        };
    }
    body.parse::<usize>().ok().map(Predicate::Index)
}

/// Whether an element satisfies a step, given its occurrence index among
/// same-named siblings.
fn step_matches(el: &Element, step: &PathStep, occurrence: usize) -> bool {
    if &*el.name != step.name {
        return false;
    }
    match &step.predicate {
        None => true,
        Some(Predicate::HasAttribute(attr)) => el.has_attribute(attr),
        Some(Predicate::AttributeEquals(attr, value)) => el.attribute(attr) == Some(value),
        Some(Predicate::Index(i)) => occurrence == *i,
    }
}

/// Selects all elements matching the path, in document order.
#[must_use]
pub fn select_all<'a>(root: &'a Element, path: &NodePath) -> Vec<&'a Element> {
    let Some((first, rest)) = path.steps.split_first() else {
        return Vec::new();
    };
    if !step_matches(root, first, 0) {
        return Vec::new();
    }
    let mut current = vec![root];
    for step in rest {
        let mut next = Vec::new();
        for el in current {
            let mut occurrence = 0;
            for child in el.child_elements() {
                if &*child.name == step.name {
                    if step_matches(child, step, occurrence) {
                        next.push(child);
                    }
                    occurrence += 1;
                }
            }
        }
        current = next;
    }
    current
}

/// Selects the first element matching the path, in document order.
#[must_use]
pub fn select_single<'a>(root: &'a Element, path: &NodePath) -> Option<&'a Element> {
    select_all(root, path).into_iter().next()
}

/// Mutable variant of [`select_single`].
pub fn select_single_mut<'a>(root: &'a mut Element, path: &NodePath) -> Option<&'a mut Element> {
    let (first, rest) = path.steps.split_first()?;
    if !step_matches(root, first, 0) {
        return None;
    }
    descend_mut(root, rest)
}

fn descend_mut<'a>(el: &'a mut Element, steps: &[PathStep]) -> Option<&'a mut Element> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(el);
    };
    let index = child_matching_index(el, step)?;
    descend_mut(el.children[index].as_element_mut()?, rest)
}

/// Index (into `parent.children`) of the first child element satisfying a
/// step. Used by path descent and by patch operations that address a child
/// relative to its parent.
#[must_use]
pub fn child_matching_index(parent: &Element, step: &PathStep) -> Option<usize> {
    let mut occurrence = 0;
    for (i, child) in parent.children.iter().enumerate() {
        if let Some(child_el) = child.as_element() {
            if &*child_el.name == step.name {
                if step_matches(child_el, step, occurrence) {
                    return Some(i);
                }
                occurrence += 1;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::Node;

    fn make_tree() -> Element {
        let mut root = Element::new("base");
        let mut widgets = Element::new("widgets");
        for (name, style) in [("a", Some("flat")), ("b", None), ("c", Some("flat"))] {
            let mut w = Element::new("widget");
            w.set_attribute("name", name);
            if let Some(style) = style {
                w.set_attribute("style", style);
            }
            widgets.append_child(Node::Element(w));
        }
        root.append_child(Node::Element(widgets));
        root
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        for expr in [
            "/base",
            "/base/widgets/widget",
            "/base/widgets/widget[@name]",
            "/base/widgets/widget[@name='ok_button']",
            "/base/widgets/widget[2]",
        ] {
            let path = NodePath::parse(expr).unwrap();
            assert_eq!(path.to_string(), expr);
        }
    }

    #[test]
    fn test_parse_rejects_bad_expressions() {
        for expr in ["", "base", "/", "/base//widget", "/base/widget[", "/base/widget[name]"] {
            assert!(NodePath::parse(expr).is_err(), "accepted {expr:?}");
        }
    }

    #[test]
    fn test_select_all() {
        let root = make_tree();
        let path = NodePath::parse("/base/widgets/widget").unwrap();
        assert_eq!(select_all(&root, &path).len(), 3);
    }

    #[test]
    fn test_select_by_attribute_value() {
        let root = make_tree();
        let path = NodePath::parse("/base/widgets/widget[@name='b']").unwrap();
        let found = select_single(&root, &path).unwrap();
        assert_eq!(found.attribute("name"), Some("b"));
    }

    #[test]
    fn test_select_by_attribute_existence() {
        let root = make_tree();
        let path = NodePath::parse("/base/widgets/widget[@style]").unwrap();
        assert_eq!(select_all(&root, &path).len(), 2);
    }

    #[test]
    fn test_select_by_index() {
        let root = make_tree();
        let path = NodePath::parse("/base/widgets/widget[2]").unwrap();
        let found = select_single(&root, &path).unwrap();
        assert_eq!(found.attribute("name"), Some("c"));
    }

    #[test]
    fn test_select_no_match_returns_none() {
        let root = make_tree();
        let path = NodePath::parse("/base/widgets/widget[@name='zzz']").unwrap();
        assert!(select_single(&root, &path).is_none());
    }

    #[test]
    fn test_select_single_mut() {
        let mut root = make_tree();
        let path = NodePath::parse("/base/widgets/widget[@name='b']").unwrap();
        let el = select_single_mut(&mut root, &path).unwrap();
        el.set_attribute("style", "raised");
        let check = NodePath::parse("/base/widgets/widget[1]").unwrap();
        assert_eq!(
            select_single(&root, &check).unwrap().attribute("style"),
            Some("raised")
        );
    }
}
