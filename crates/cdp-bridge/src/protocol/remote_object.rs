// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Wire-level Runtime/DOM types
//
// Shapes of the DevTools results this crate depends on. Only the fields we
// read are modelled; everything else the browser sends is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier the browser assigns to an execution context.
pub type ExecutionContextId = i64;

/// Descriptor of a value living in the page (`Runtime.RemoteObject`).
///
/// At most one of `object_id`, `value` and `unserializable_value` carries
/// the value: live objects have an id, JSON-safe primitives are inlined,
/// and `-0`/`NaN`/`±Infinity`/bigints travel as tagged strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// `Some(Value::Null)` for an inlined `null`, `None` when absent
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl RemoteObject {
    /// The `undefined` descriptor.
    pub fn undefined() -> Self {
        Self {
            object_type: "undefined".to_string(),
            ..Default::default()
        }
    }

    /// Subtype if present, otherwise the type (`node`, `array`, `function`...).
    pub fn subtype_or_type(&self) -> &str {
        self.subtype.as_deref().unwrap_or(&self.object_type)
    }

    pub fn is_node(&self) -> bool {
        self.subtype.as_deref() == Some("node")
    }
}

// Distinguishes `"value": null` from a missing field
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Argument of `Runtime.callFunctionOn`. An empty argument means `undefined`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallArgument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default)]
    pub call_frames: Vec<CallFrame>,
}

/// Details of an exception thrown by evaluated code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
    pub exception: Option<RemoteObject>,
    pub stack_trace: Option<StackTrace>,
}

impl ExceptionDetails {
    /// Human-readable message: the thrown object's description when there is
    /// one, otherwise the exception text followed by the stack frames.
    pub fn message(&self) -> String {
        if let Some(exception) = &self.exception {
            if let Some(description) = &exception.description {
                return description.clone();
            }
            if let Some(value) = &exception.value {
                return match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
        }

        let mut message = self.text.clone();
        if let Some(stack) = &self.stack_trace {
            for frame in &stack.call_frames {
                let location = format!("{}:{}:{}", frame.url, frame.line_number, frame.column_number);
                let function_name = if frame.function_name.is_empty() {
                    "<anonymous>"
                } else {
                    &frame.function_name
                };
                message.push_str(&format!("\n    at {} ({})", function_name, location));
            }
        }
        message
    }

    /// Stack portion of the exception description, if the browser sent one.
    pub fn stack(&self) -> Option<String> {
        let description = self.exception.as_ref()?.description.as_ref()?;
        description
            .find("\n    at ")
            .map(|index| description[index + 1..].to_string())
    }
}

/// Result of `Runtime.evaluate` and `Runtime.callFunctionOn`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub result: RemoteObject,
    pub exception_details: Option<ExceptionDetails>,
}

impl EvaluateResponse {
    pub(crate) fn undefined() -> Self {
        Self {
            result: RemoteObject::undefined(),
            exception_details: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub value: Option<RemoteObject>,
    #[serde(default)]
    pub enumerable: bool,
}

/// Result of `Runtime.getProperties`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPropertiesResponse {
    pub result: Vec<PropertyDescriptor>,
}

/// Result of `DOM.resolveNode`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveNodeResponse {
    pub object: RemoteObject,
}

/// Result of `DOM.getContentQuads`: raw 8-number quads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentQuadsResponse {
    #[serde(default)]
    pub quads: Vec<Vec<f64>>,
}

/// Border/padding/content quads of a node (`DOM.BoxModel`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoxModel {
    #[serde(default)]
    pub content: Vec<f64>,
    #[serde(default)]
    pub padding: Vec<f64>,
    #[serde(default)]
    pub border: Vec<f64>,
    #[serde(default)]
    pub margin: Vec<f64>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxModelResponse {
    pub model: BoxModel,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutViewport {
    #[serde(default)]
    pub page_x: f64,
    #[serde(default)]
    pub page_y: f64,
    #[serde(default)]
    pub client_width: f64,
    #[serde(default)]
    pub client_height: f64,
}

/// Result of `Page.getLayoutMetrics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetrics {
    #[serde(default)]
    pub layout_viewport: LayoutViewport,
    /// Newer browsers report CSS pixels separately; preferred when present
    pub css_layout_viewport: Option<LayoutViewport>,
}

impl LayoutMetrics {
    pub fn viewport(&self) -> LayoutViewport {
        self.css_layout_viewport.unwrap_or(self.layout_viewport)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    #[serde(default)]
    pub backend_node_id: i64,
    #[serde(default)]
    pub node_name: String,
    pub frame_id: Option<String>,
}

/// Result of `DOM.describeNode`.
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeNodeResponse {
    pub node: NodeDescription,
}
