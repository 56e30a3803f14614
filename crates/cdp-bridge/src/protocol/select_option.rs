// Select option variants for dropdown selection
//
// Options can be picked by value, label, index, or by passing the
// `<option>` element itself.

use crate::error::{Error, Result};
use crate::protocol::element_handle::ElementHandle;
use crate::protocol::evaluate_conversion::{js_string, js_typeof};
use serde::Serialize;
use serde_json::{Map, Value};

/// Option fields matched by the in-page routine. Every present field must
/// match; absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl OptionDescriptor {
    fn is_empty(&self) -> bool {
        self.value.is_none() && self.label.is_none() && self.index.is_none()
    }
}

/// Select option variant
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::SelectOption;
///
/// // Select by value
/// let opt = SelectOption::value("option1");
///
/// // Select by label (visible text)
/// let opt = SelectOption::label("First Option");
///
/// // Select by index (0-based)
/// let opt = SelectOption::index(0);
///
/// // Normalize loosely typed input; combined fields must all match
/// let opt = SelectOption::from_json(&serde_json::json!({"value": "b", "label": "Second"}))?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOption {
    /// Select options matching every present field
    Descriptor(OptionDescriptor),
    /// Select this `<option>` element
    Element(ElementHandle),
}

impl SelectOption {
    /// Select by option value attribute
    pub fn value(value: impl Into<String>) -> Self {
        SelectOption::Descriptor(OptionDescriptor {
            value: Some(value.into()),
            ..Default::default()
        })
    }

    /// Select by option label (visible text)
    pub fn label(label: impl Into<String>) -> Self {
        SelectOption::Descriptor(OptionDescriptor {
            label: Some(label.into()),
            ..Default::default()
        })
    }

    /// Select by option index (0-based)
    pub fn index(index: usize) -> Self {
        SelectOption::Descriptor(OptionDescriptor {
            index: Some(index),
            ..Default::default()
        })
    }

    /// Normalizes a JSON argument.
    ///
    /// - a string selects by value
    /// - a number selects by index
    /// - an object is checked field by field (`value` and `label` must be
    ///   strings, `index` a non-negative integer) and keeps every field
    /// - anything else is treated as `{value: arg}` and rejected
    pub fn from_json(arg: &Value) -> Result<Self> {
        match arg {
            Value::String(s) => Ok(SelectOption::value(s.clone())),
            Value::Number(_) => index_from(arg).map(SelectOption::index),
            Value::Object(fields) => from_descriptor(fields),
            other => value_from(other).map(SelectOption::value),
        }
    }

    /// Descriptor sent to the in-page routine. `None` for elements, which
    /// travel as handle arguments instead.
    pub(crate) fn to_json(&self) -> Option<Value> {
        match self {
            SelectOption::Descriptor(descriptor) => serde_json::to_value(descriptor).ok(),
            SelectOption::Element(_) => None,
        }
    }
}

fn from_descriptor(fields: &Map<String, Value>) -> Result<SelectOption> {
    let descriptor = OptionDescriptor {
        value: fields.get("value").map(value_from).transpose()?,
        label: fields.get("label").map(label_from).transpose()?,
        index: fields.get("index").map(index_from).transpose()?,
    };
    if descriptor.is_empty() {
        return Err(Error::TypeValidation(format!(
            "Option descriptor needs at least one of value, label or index. Found {}",
            Value::Object(fields.clone())
        )));
    }
    Ok(SelectOption::Descriptor(descriptor))
}

fn value_from(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::TypeValidation(format!(
            "Values must be strings. Found value \"{}\" of type \"{}\"",
            js_string(other),
            js_typeof(other)
        ))),
    }
}

fn label_from(label: &Value) -> Result<String> {
    match label {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::TypeValidation(format!(
            "Labels must be strings. Found label \"{}\" of type \"{}\"",
            js_string(other),
            js_typeof(other)
        ))),
    }
}

fn index_from(index: &Value) -> Result<usize> {
    let Value::Number(n) = index else {
        return Err(Error::TypeValidation(format!(
            "Indices must be numbers. Found index \"{}\" of type \"{}\"",
            js_string(index),
            js_typeof(index)
        )));
    };
    n.as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| {
            Error::TypeValidation(format!(
                "Indices must be non-negative integers. Found index \"{}\"",
                js_string(index)
            ))
        })
}

impl TryFrom<Value> for SelectOption {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        SelectOption::from_json(&value)
    }
}

// Implement From<&str> for convenience - treats string as value
impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        SelectOption::value(value)
    }
}

// Implement From<String> for convenience - treats string as value
impl From<String> for SelectOption {
    fn from(value: String) -> Self {
        SelectOption::value(value)
    }
}

impl From<usize> for SelectOption {
    fn from(index: usize) -> Self {
        SelectOption::index(index)
    }
}

impl From<OptionDescriptor> for SelectOption {
    fn from(descriptor: OptionDescriptor) -> Self {
        SelectOption::Descriptor(descriptor)
    }
}

impl From<ElementHandle> for SelectOption {
    fn from(element: ElementHandle) -> Self {
        SelectOption::Element(element)
    }
}

impl From<&ElementHandle> for SelectOption {
    fn from(element: &ElementHandle) -> Self {
        SelectOption::Element(element.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_arguments_normalize() {
        let args = [json!("b"), json!({"label": "Second"}), json!(2)];
        let options = args
            .iter()
            .map(SelectOption::from_json)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            options,
            vec![
                SelectOption::value("b"),
                SelectOption::label("Second"),
                SelectOption::index(2),
            ]
        );
        let descriptors: Vec<_> = options.iter().filter_map(SelectOption::to_json).collect();
        assert_eq!(
            descriptors,
            vec![json!({"value": "b"}), json!({"label": "Second"}), json!({"index": 2})]
        );
        // The object argument is untouched
        assert_eq!(args[1], json!({"label": "Second"}));
    }

    #[test]
    fn test_non_string_value_names_type() {
        let err = SelectOption::from_json(&json!({"value": 5})).unwrap_err();
        assert!(matches!(err, Error::TypeValidation(_)));
        assert_eq!(
            err.to_string(),
            "Values must be strings. Found value \"5\" of type \"number\""
        );
    }

    #[test]
    fn test_non_string_label_names_type() {
        let err = SelectOption::from_json(&json!({"label": true})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Labels must be strings. Found label \"true\" of type \"boolean\""
        );
    }

    #[test]
    fn test_non_number_index_names_type() {
        let err = SelectOption::from_json(&json!({"index": "1"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Indices must be numbers. Found index \"1\" of type \"string\""
        );
        assert!(SelectOption::from_json(&json!(-1)).is_err());
        assert!(SelectOption::from_json(&json!(1.5)).is_err());
    }

    #[test]
    fn test_other_arguments_are_treated_as_values() {
        let err = SelectOption::from_json(&json!(null)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Values must be strings. Found value \"null\" of type \"object\""
        );
        let err = SelectOption::from_json(&json!(false)).unwrap_err();
        assert!(err.to_string().contains("of type \"boolean\""));
    }

    #[test]
    fn test_descriptor_keeps_every_field() {
        let option = SelectOption::from_json(&json!({"value": "a", "label": "A", "other": 1})).unwrap();
        assert_eq!(
            option,
            SelectOption::Descriptor(OptionDescriptor {
                value: Some("a".to_string()),
                label: Some("A".to_string()),
                index: None,
            })
        );
        assert_eq!(option.to_json(), Some(json!({"value": "a", "label": "A"})));

        let option = SelectOption::from_json(&json!({"label": "A", "index": 0})).unwrap();
        assert_eq!(option.to_json(), Some(json!({"label": "A", "index": 0})));
    }

    #[test]
    fn test_descriptor_checks_each_field() {
        let err = SelectOption::from_json(&json!({"value": "a", "label": 3})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Labels must be strings. Found label \"3\" of type \"number\""
        );
        let err = SelectOption::from_json(&json!({"label": "A", "index": "0"})).unwrap_err();
        assert!(err.to_string().starts_with("Indices must be numbers"));
        assert!(SelectOption::from_json(&json!({})).is_err());
        assert!(SelectOption::from_json(&json!({"other": 1})).is_err());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(SelectOption::from("v"), SelectOption::value("v"));
        assert_eq!(SelectOption::from(String::from("v")), SelectOption::value("v"));
        assert_eq!(SelectOption::from(3usize), SelectOption::index(3));
    }
}
