use serde::Deserialize;
use serde_json::Value;

/// One submitted form field: its text, plus the raw bytes and original
/// filename when the field carried a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValue {
    pub text: String,
    pub content: Option<Vec<u8>>,
    pub filename: Option<String>,
}

impl FieldValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content: None,
            filename: None,
        }
    }

    pub fn file(filename: impl Into<String>, content: Vec<u8>) -> Self {
        let filename = filename.into();
        Self {
            text: filename.clone(),
            content: Some(content),
            filename: Some(filename),
        }
    }

    pub fn is_file(&self) -> bool {
        self.content.is_some()
    }
}

/// Ordered multipart form. Lives for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmittedForm {
    fields: Vec<(String, FieldValue)>,
}

impl SubmittedForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    /// Builder-style text field, mostly for callers assembling forms by hand.
    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, FieldValue::text(text));
        self
    }

    pub fn with_file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        self.insert(name, FieldValue::file(filename, content));
        self
    }

    /// First field with this name; duplicates after it are ignored.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decoded structured body. Field types are checked by serde when the body is
/// decoded at the HTTP boundary, so resolution applies only defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InlinePayload {
    #[serde(default)]
    pub network: Option<Value>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub calibration: Option<bool>,
    #[serde(default)]
    pub directed: Option<bool>,
}

impl InlinePayload {
    /// The `network` entry, if it is a non-empty object.
    pub fn usable_network(&self) -> Option<&Value> {
        self.network
            .as_ref()
            .filter(|network| network.as_object().is_some_and(|map| !map.is_empty()))
    }
}

/// Which input shape a request used, decided once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestInput {
    Form(SubmittedForm),
    Payload(InlinePayload),
}
