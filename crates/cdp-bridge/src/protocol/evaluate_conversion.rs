//! Value conversion between Rust and DevTools remote objects
//!
//! This module translates `Runtime.RemoteObject` descriptors into
//! [`JsValue`]s and Rust arguments into `Runtime.CallArgument`s.
//!
//! # Protocol Format
//!
//! JSON-safe primitives travel inline in `value`. Numbers JSON cannot carry
//! travel as tagged strings in `unserializableValue`:
//! - `"-0"`, `"NaN"`, `"Infinity"`, `"-Infinity"`
//! - bigints as their decimal digits followed by `n` (`"12345678901234567890n"`)
//!
//! Live objects are referenced by `objectId` and become handles instead of
//! values; see [`create_handle`](crate::protocol::js_handle::create_handle).
//!
//! # Example
//!
//! ```ignore
//! use cdp_bridge::protocol::{JsValue, call_argument_from_value};
//!
//! let arg = call_argument_from_value(&JsValue::Number(f64::NAN));
//! assert_eq!(arg.unserializable_value.as_deref(), Some("NaN"));
//! ```

use crate::error::{Error, Result};
use crate::protocol::element_handle::ElementHandle;
use crate::protocol::js_handle::{Handle, JsHandle};
use crate::protocol::remote_object::{CallArgument, RemoteObject};
use num_bigint::BigInt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Largest integer a double represents exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A JavaScript value materialized on the Rust side.
///
/// Unlike `serde_json::Value`, numbers keep `-0`, `NaN` and the infinities,
/// and bigints keep full precision. Arrays and plain objects are held as
/// JSON in [`JsValue::Json`].
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    /// Array or plain object
    Json(Value),
}

impl JsValue {
    /// `Object.is` equality: `NaN` equals itself, `0` and `-0` differ.
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            (a, b) => a == b,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Lossy JSON view: `undefined` and non-finite numbers become `null`,
    /// bigints become decimal strings.
    pub fn to_json(&self) -> Value {
        match self {
            JsValue::Undefined | JsValue::Null => Value::Null,
            JsValue::Bool(b) => json!(b),
            JsValue::Number(n) => number_to_json(*n),
            JsValue::BigInt(b) => json!(b.to_string()),
            JsValue::String(s) => json!(s),
            JsValue::Json(v) => v.clone(),
        }
    }

    /// Deserializes the value into a Rust type through its JSON view.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(Error::from)
    }
}

fn number_to_json(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    // Integral doubles go out as integers so they deserialize into ints
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !(n == 0.0 && n.is_sign_negative()) {
        return json!(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// JavaScript `String(value)` rendering.
impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => f.write_str("undefined"),
            JsValue::Null => f.write_str("null"),
            JsValue::Bool(b) => write!(f, "{}", b),
            JsValue::Number(n) => f.write_str(&js_number_string(*n)),
            JsValue::BigInt(b) => write!(f, "{}", b),
            JsValue::String(s) => f.write_str(s),
            JsValue::Json(v) => f.write_str(&js_string(v)),
        }
    }
}

fn js_number_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// JavaScript `typeof` of a JSON value.
pub(crate) fn js_typeof(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

/// JavaScript `String(value)` of a JSON value.
pub(crate) fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(js_number_string).unwrap_or_default(),
        Value::String(s) => s.clone(),
        // Array.prototype.toString renders null entries as empty strings
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

impl From<Value> for JsValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Bool(b),
            Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => JsValue::String(s),
            other => JsValue::Json(other),
        }
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        JsValue::String(value.to_string())
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        JsValue::String(value)
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        JsValue::Bool(value)
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        JsValue::Number(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        JsValue::Number(value as f64)
    }
}

impl From<i64> for JsValue {
    fn from(value: i64) -> Self {
        JsValue::Number(value as f64)
    }
}

impl From<BigInt> for JsValue {
    fn from(value: BigInt) -> Self {
        JsValue::BigInt(value)
    }
}

/// Resolves a remote descriptor into a plain value.
///
/// Unserializable tags win; otherwise the inlined value is returned, and a
/// descriptor without one (including live object references) yields
/// `undefined`.
pub fn value_from_remote_object(remote_object: &RemoteObject) -> Result<JsValue> {
    if let Some(tag) = &remote_object.unserializable_value {
        return parse_unserializable(tag);
    }
    match &remote_object.value {
        Some(value) => Ok(JsValue::from(value.clone())),
        None => Ok(JsValue::Undefined),
    }
}

fn parse_unserializable(tag: &str) -> Result<JsValue> {
    match tag {
        "-0" => Ok(JsValue::Number(-0.0)),
        "NaN" => Ok(JsValue::Number(f64::NAN)),
        "Infinity" => Ok(JsValue::Number(f64::INFINITY)),
        "-Infinity" => Ok(JsValue::Number(f64::NEG_INFINITY)),
        _ => tag
            .strip_suffix('n')
            .and_then(|digits| BigInt::from_str(digits).ok())
            .map(JsValue::BigInt)
            .ok_or_else(|| {
                Error::ProtocolError(format!("Unsupported unserializable value: {}", tag))
            }),
    }
}

/// Converts a plain value into a call argument.
///
/// ```ignore
/// JsValue::Number(-0.0)       -> {"unserializableValue": "-0"}
/// JsValue::BigInt(42)         -> {"unserializableValue": "42n"}
/// JsValue::Undefined          -> {}
/// JsValue::String("a")        -> {"value": "a"}
/// ```
pub fn call_argument_from_value(value: &JsValue) -> CallArgument {
    let unserializable = |tag: String| CallArgument {
        unserializable_value: Some(tag),
        ..Default::default()
    };

    match value {
        JsValue::Undefined => CallArgument::default(),
        JsValue::BigInt(b) => unserializable(format!("{}n", b)),
        JsValue::Number(n) if *n == 0.0 && n.is_sign_negative() => unserializable("-0".into()),
        JsValue::Number(n) if n.is_nan() => unserializable("NaN".into()),
        JsValue::Number(n) if n.is_infinite() && *n > 0.0 => unserializable("Infinity".into()),
        JsValue::Number(n) if n.is_infinite() => unserializable("-Infinity".into()),
        other => CallArgument {
            value: Some(other.to_json()),
            ..Default::default()
        },
    }
}

/// An argument to an evaluated function: a plain value or a handle.
#[derive(Debug, Clone)]
pub enum EvaluateArg {
    Value(JsValue),
    Handle(Handle),
}

impl EvaluateArg {
    /// Serializes any serde value into a plain-value argument.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(|v| EvaluateArg::Value(JsValue::from(v)))
            .map_err(|e| {
                Error::InvalidArgument(format!(
                    "{}. Are you passing a handle where a plain value is required?",
                    e
                ))
            })
    }
}

macro_rules! value_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for EvaluateArg {
                fn from(value: $ty) -> Self {
                    EvaluateArg::Value(JsValue::from(value))
                }
            }
        )*
    };
}

value_arg_from!(&str, String, bool, f64, i32, i64, BigInt, Value);

impl From<JsValue> for EvaluateArg {
    fn from(value: JsValue) -> Self {
        EvaluateArg::Value(value)
    }
}

impl From<Handle> for EvaluateArg {
    fn from(handle: Handle) -> Self {
        EvaluateArg::Handle(handle)
    }
}

impl From<&Handle> for EvaluateArg {
    fn from(handle: &Handle) -> Self {
        EvaluateArg::Handle(handle.clone())
    }
}

impl From<&JsHandle> for EvaluateArg {
    fn from(handle: &JsHandle) -> Self {
        EvaluateArg::Handle(Handle::Value(handle.clone()))
    }
}

impl From<&ElementHandle> for EvaluateArg {
    fn from(handle: &ElementHandle) -> Self {
        EvaluateArg::Handle(Handle::Element(handle.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_from(arg: CallArgument) -> RemoteObject {
        RemoteObject {
            object_type: "number".to_string(),
            value: arg.value,
            unserializable_value: arg.unserializable_value,
            object_id: arg.object_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_unserializable_numbers_round_trip_with_same_value() {
        for n in [-0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let original = JsValue::Number(n);
            let arg = call_argument_from_value(&original);
            assert!(arg.value.is_none(), "{n} must not be inlined");
            let back = value_from_remote_object(&descriptor_from(arg)).unwrap();
            assert!(back.same_value(&original), "{n} did not survive");
        }
    }

    #[test]
    fn test_unserializable_tags_are_exact() {
        let tag = |n: f64| call_argument_from_value(&JsValue::Number(n)).unserializable_value;
        assert_eq!(tag(-0.0).as_deref(), Some("-0"));
        assert_eq!(tag(f64::NAN).as_deref(), Some("NaN"));
        assert_eq!(tag(f64::INFINITY).as_deref(), Some("Infinity"));
        assert_eq!(tag(f64::NEG_INFINITY).as_deref(), Some("-Infinity"));
        assert_eq!(tag(0.0), None);
    }

    #[test]
    fn test_positive_zero_differs_from_negative_zero() {
        let back = value_from_remote_object(&RemoteObject {
            object_type: "number".to_string(),
            unserializable_value: Some("-0".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(!back.same_value(&JsValue::Number(0.0)));
        assert_eq!(back, JsValue::Number(0.0), "== still holds");
    }

    #[test]
    fn test_bigint_round_trip() {
        let big = BigInt::from_str("123456789012345678901234567890").unwrap();
        let arg = call_argument_from_value(&JsValue::BigInt(big.clone()));
        assert_eq!(
            arg.unserializable_value.as_deref(),
            Some("123456789012345678901234567890n")
        );
        let back = value_from_remote_object(&descriptor_from(arg)).unwrap();
        assert_eq!(back, JsValue::BigInt(big));

        let negative = parse_unserializable("-5n").unwrap();
        assert_eq!(negative, JsValue::BigInt(BigInt::from(-5)));
    }

    #[test]
    fn test_unknown_unserializable_tag_is_an_error() {
        assert!(matches!(
            parse_unserializable("Symbol()"),
            Err(Error::ProtocolError(_))
        ));
        assert!(parse_unserializable("n").is_err());
    }

    #[test]
    fn test_inline_values() {
        let value = |v: Value| {
            value_from_remote_object(&RemoteObject {
                object_type: "object".to_string(),
                value: Some(v),
                ..Default::default()
            })
            .unwrap()
        };
        assert_eq!(value(json!("hi")), JsValue::String("hi".into()));
        assert_eq!(value(json!(true)), JsValue::Bool(true));
        assert_eq!(value(json!(null)), JsValue::Null);
        assert_eq!(value(json!(2.5)), JsValue::Number(2.5));
        assert_eq!(value(json!([1, 2])), JsValue::Json(json!([1, 2])));
    }

    #[test]
    fn test_missing_value_is_undefined() {
        let value = value_from_remote_object(&RemoteObject::undefined()).unwrap();
        assert!(value.is_undefined());

        let object_ref = value_from_remote_object(&RemoteObject {
            object_type: "object".to_string(),
            object_id: Some("1.2.3".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(object_ref.is_undefined());
    }

    #[test]
    fn test_plain_arguments_are_inlined() {
        let arg = call_argument_from_value(&JsValue::from("text"));
        assert_eq!(arg.value, Some(json!("text")));

        let arg = call_argument_from_value(&JsValue::Number(42.0));
        assert_eq!(arg.value, Some(json!(42)));

        let arg = call_argument_from_value(&JsValue::Null);
        assert_eq!(arg.value, Some(Value::Null));

        let arg = call_argument_from_value(&JsValue::Undefined);
        assert_eq!(arg, CallArgument::default());
    }

    #[test]
    fn test_deserialize_into_typed_values() {
        let n: i32 = JsValue::Number(7.0).deserialize_into().unwrap();
        assert_eq!(n, 7);

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Size {
            width: u32,
            height: u32,
        }
        let size: Size = JsValue::Json(json!({"width": 800, "height": 600}))
            .deserialize_into()
            .unwrap();
        assert_eq!(
            size,
            Size {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn test_display_matches_js_string() {
        assert_eq!(JsValue::Number(1.0).to_string(), "1");
        assert_eq!(JsValue::Number(-0.0).to_string(), "0");
        assert_eq!(JsValue::Number(0.5).to_string(), "0.5");
        assert_eq!(JsValue::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(JsValue::Undefined.to_string(), "undefined");
        assert_eq!(JsValue::Json(json!([1, null, "a"])).to_string(), "1,,a");
        assert_eq!(JsValue::Json(json!({"a": 1})).to_string(), "[object Object]");
    }

    #[test]
    fn test_js_typeof() {
        assert_eq!(js_typeof(&json!(null)), "object");
        assert_eq!(js_typeof(&json!(1)), "number");
        assert_eq!(js_typeof(&json!(false)), "boolean");
        assert_eq!(js_typeof(&json!("s")), "string");
        assert_eq!(js_typeof(&json!([])), "object");
    }

    #[test]
    fn test_serialize_argument() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }
        match EvaluateArg::serialize(&Point { x: 1, y: 2 }).unwrap() {
            EvaluateArg::Value(JsValue::Json(v)) => assert_eq!(v, json!({"x": 1, "y": 2})),
            other => panic!("unexpected argument: {other:?}"),
        }
    }
}
