use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{PollWindow, ResponseEnvelope, StatusRecord};

pub const HOMEWORKS_FIELD: &str = "homeworks";
pub const CURRENT_DATE_FIELD: &str = "current_date";
pub const HOMEWORK_NAME_FIELD: &str = "homework_name";
pub const STATUS_FIELD: &str = "status";

const ENVELOPE_FIELDS: [&str; 2] = [HOMEWORKS_FIELD, CURRENT_DATE_FIELD];

/// Checks the decoded response before any field is trusted.
///
/// The envelope holds exactly `homeworks` and `current_date`; both are
/// required, any other top-level key is rejected, and nothing is defaulted: a
/// missing `homeworks` is an error, never "no records". Every record must carry
/// string `homework_name` and `status` values; the status tag itself is
/// checked later by change detection.
pub fn validate_response(raw: &Value) -> Result<ResponseEnvelope, ValidationError> {
    let Value::Object(fields) = raw else {
        return Err(ValidationError::NotAMapping {
            found: json_type_name(raw),
        });
    };

    let homeworks = required_field(fields, HOMEWORKS_FIELD)?;
    let current_date = required_field(fields, CURRENT_DATE_FIELD)?;
    if let Some(extra) = fields
        .keys()
        .find(|key| !ENVELOPE_FIELDS.contains(&key.as_str()))
    {
        return Err(ValidationError::UnexpectedField {
            field: extra.clone(),
        });
    }

    let Value::Array(items) = homeworks else {
        return Err(ValidationError::NotASequence {
            field: HOMEWORKS_FIELD.to_string(),
            found: json_type_name(homeworks),
        });
    };
    let current_date =
        current_date
            .as_u64()
            .ok_or_else(|| ValidationError::InvalidField {
                field: CURRENT_DATE_FIELD.to_string(),
                expected: "неотрицательное целое число",
            })?;

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_record(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResponseEnvelope {
        records,
        current_date: PollWindow::from_secs(current_date),
    })
}

fn required_field<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Value, ValidationError> {
    fields.get(name).ok_or_else(|| ValidationError::MissingField {
        field: name.to_string(),
    })
}

fn parse_record(index: usize, item: &Value) -> Result<StatusRecord, ValidationError> {
    let Value::Object(fields) = item else {
        return Err(ValidationError::InvalidField {
            field: format!("{HOMEWORKS_FIELD}[{index}]"),
            expected: "словарь",
        });
    };
    let string_field = |name: &str| {
        let path = format!("{HOMEWORKS_FIELD}[{index}].{name}");
        match fields.get(name) {
            None => Err(ValidationError::MissingField { field: path }),
            Some(Value::String(value)) => Ok(value.clone()),
            Some(_) => Err(ValidationError::InvalidField {
                field: path,
                expected: "строка",
            }),
        }
    };
    Ok(StatusRecord {
        homework_name: string_field(HOMEWORK_NAME_FIELD)?,
        status: string_field(STATUS_FIELD)?,
    })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "логическое значение",
        Value::Number(_) => "число",
        Value::String(_) => "строка",
        Value::Array(_) => "список",
        Value::Object(_) => "словарь",
    }
}
