//! Read-only snapshots of a suspended program
//!
//! The diagram consumes the debuggee exclusively through [`Introspector`].
//! Each call returns owned snapshot data; nothing here holds on to the live
//! process between calls.
//!
//! - [`errors`]: [`IntrospectionError`], the single failure type
//! - [`policy`]: conventions that differ between introspection backends
//! - [`scripted`]: an in-memory introspector for tests and the demo host

pub mod errors;
pub mod policy;
pub mod scripted;

pub use errors::IntrospectionError;
pub use policy::{FirstLocalIsReturnValue, NoReturnValue, ReturnValuePolicy, NO_RETURN_VALUE};
pub use scripted::ScriptedProcess;

/// Stable identity of a live object
pub type ObjectId = u64;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

/// Drop the package prefix: `java.util.ArrayList` → `ArrayList`
pub fn short_type_name(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(i) => &qualified[i + 1..],
        None => qualified,
    }
}

/// A debug target (one launched program)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub handle: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub handle: u64,
    pub name: String,
    /// Runtime-internal threads are never shown and never reported
    pub is_system: bool,
}

/// One activation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub handle: u64,
    /// Backend-provided display name, used when type information is missing
    pub name: String,
    pub declaring_type: Option<String>,
    pub method: Option<String>,
    pub argument_types: Vec<String>,
    /// Current source line; values below 1 mean unknown
    pub line: i32,
}

impl FrameInfo {
    /// A frame with full type information
    pub fn method(declaring_type: &str, method: &str, argument_types: &[&str], line: i32) -> Self {
        FrameInfo {
            handle: 0,
            name: format!("{}.{}", declaring_type, method),
            declaring_type: Some(declaring_type.to_string()),
            method: Some(method.to_string()),
            argument_types: argument_types.iter().map(|s| s.to_string()).collect(),
            line,
        }
    }

    /// A frame the backend could only name
    pub fn named(name: &str) -> Self {
        FrameInfo {
            handle: 0,
            name: name.to_string(),
            declaring_type: None,
            method: None,
            argument_types: Vec::new(),
            line: 0,
        }
    }
}

/// A resolved value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Primitive, already formatted by the backend
    Primitive(String),
    Null,
    /// String objects are shown inline rather than as boxes
    Str { text: String, id: Option<ObjectId> },
    /// Any other non-null reference
    Object { type_name: String, id: ObjectId },
}

impl Value {
    /// Identity of the referenced object that gets its own box, if any
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Object { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Text shown in a value cell
    pub fn display_string(&self) -> String {
        match self {
            Value::Primitive(text) => text.clone(),
            Value::Null => "null".to_string(),
            Value::Str { text, id: None } => format!("\"{}\"", text),
            Value::Str { text, id: Some(id) } => format!("\"{}\" (id={})", text, id),
            Value::Object { type_name, id } => {
                format!("{} (id={})", short_type_name(type_name), id)
            }
        }
    }
}

/// A local variable, argument, or field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub declared_type: String,
    pub is_static: bool,
    pub value: Value,
}

impl Variable {
    pub fn new(name: &str, declared_type: &str, value: Value) -> Self {
        Variable {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            is_static: false,
            value,
        }
    }

    pub fn primitive(name: &str, declared_type: &str, display: &str) -> Self {
        Self::new(name, declared_type, Value::Primitive(display.to_string()))
    }

    pub fn string(name: &str, text: &str) -> Self {
        Self::new(
            name,
            "java.lang.String",
            Value::Str {
                text: text.to_string(),
                id: None,
            },
        )
    }

    pub fn object(name: &str, type_name: &str, id: ObjectId) -> Self {
        Self::new(
            name,
            type_name,
            Value::Object {
                type_name: type_name.to_string(),
                id,
            },
        )
    }

    pub fn null(name: &str, declared_type: &str) -> Self {
        Self::new(name, declared_type, Value::Null)
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Current state of one heap object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectState {
    pub type_name: String,
    /// `Some` for arrays
    pub array_length: Option<usize>,
    pub fields: Vec<Variable>,
}

impl ObjectState {
    pub fn new(type_name: &str, fields: Vec<Variable>) -> Self {
        ObjectState {
            type_name: type_name.to_string(),
            array_length: None,
            fields,
        }
    }

    /// Array elements are exposed as fields named `[0]`, `[1]`, ...
    pub fn array(type_name: &str, elements: Vec<Value>) -> Self {
        let element_type = type_name.trim_end_matches("[]");
        let fields = elements
            .into_iter()
            .enumerate()
            .map(|(i, value)| Variable::new(&format!("[{}]", i), element_type, value))
            .collect::<Vec<_>>();
        ObjectState {
            type_name: type_name.to_string(),
            array_length: Some(fields.len()),
            fields,
        }
    }
}

/// Process introspection service
///
/// Frames are listed innermost (currently executing) first. Every call may
/// fail, e.g. when the program resumes or terminates while a pass runs.
pub trait Introspector {
    fn targets(&self) -> Result<Vec<Target>>;

    fn threads(&self, target: &Target) -> Result<Vec<ThreadInfo>>;

    fn frames(&self, thread: &ThreadInfo) -> Result<Vec<FrameInfo>>;

    fn variables(&self, frame: &FrameInfo) -> Result<Vec<Variable>>;

    fn object(&self, id: ObjectId) -> Result<ObjectState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("java.util.ArrayList"), "ArrayList");
        assert_eq!(short_type_name("Node"), "Node");
        assert_eq!(short_type_name("a.b.Outer$Inner"), "Outer$Inner");
    }

    #[test]
    fn test_value_display_strings() {
        assert_eq!(Value::Primitive("1".into()).display_string(), "1");
        assert_eq!(Value::Null.display_string(), "null");
        assert_eq!(
            Variable::string("y", "hi").value.display_string(),
            "\"hi\""
        );
        assert_eq!(
            Value::Str {
                text: "hi".into(),
                id: Some(7)
            }
            .display_string(),
            "\"hi\" (id=7)"
        );
        assert_eq!(
            Variable::object("n", "demo.Node", 42).value.display_string(),
            "Node (id=42)"
        );
    }

    #[test]
    fn test_only_plain_objects_get_boxes() {
        assert_eq!(Variable::object("n", "Node", 3).value.object_id(), Some(3));
        assert_eq!(Variable::string("s", "x").value.object_id(), None);
    }

    #[test]
    fn test_array_state_names_elements() {
        let state = ObjectState::array(
            "int[]",
            vec![Value::Primitive("1".into()), Value::Primitive("2".into())],
        );
        assert_eq!(state.array_length, Some(2));
        assert_eq!(state.fields[1].name, "[1]");
        assert_eq!(state.fields[1].declared_type, "int");
    }
}
