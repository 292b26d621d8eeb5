use crate::error::{GatewayError, Result};
use crate::intake::form::SubmittedForm;

/// Read a strict boolean form field.
///
/// Only the exact literals `"true"` and `"false"` are accepted, with no case
/// folding. Any other text yields `default` when one is given, returned as-is
/// without re-validation, which is why the result type is generic: callers may
/// pass a non-boolean sentinel (e.g. a `serde_json::Value`) as the default.
///
/// A field that is absent fails with `FieldMissing` whether or not a default
/// was supplied.
pub fn extract_bool<D>(form: &SubmittedForm, field: &str, default: Option<D>) -> Result<D>
where
    D: From<bool>,
{
    let value = form
        .get(field)
        .ok_or_else(|| GatewayError::field_missing(field))?;

    match value.text.as_str() {
        "true" => Ok(D::from(true)),
        "false" => Ok(D::from(false)),
        _ => default.ok_or_else(|| {
            GatewayError::type_mismatch(field, format!("{} must be a boolean", field))
        }),
    }
}
