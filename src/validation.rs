//! Checks on inbound split payloads and path identifiers.
//!
//! Payload validation never stops at the first problem: every field error is
//! collected so the client sees the whole list in one response.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schemas::{BillSplit, SplitAmount};

const SPLIT_KEYS: &[&str] = &[
    "date",
    "amount",
    "paid",
    "name",
    "description",
    "id",
    "expenseId",
    "sharedId",
];
const AMOUNT_KEYS: &[&str] = &["fromValue", "toValue", "fromCurrency", "toCurrency"];

// Largest magnitude an f64 holds without skipping integers (2^53 - 1).
const MAX_SAFE_NUMBER: f64 = 9_007_199_254_740_991.0;

const SHARED_ID_LEN: usize = 31;
const SPLIT_ID_LEN: usize = 30;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    prefix: &'static str,
    errors: &'a mut Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn fail(&mut self, key: &str, message: &str) {
        let field = self.path(key);
        self.errors.push(FieldError::new(field, message));
    }

    fn required(&mut self, key: &str) -> Option<&'a Value> {
        let value = self.object.get(key);
        if value.is_none() {
            self.fail(key, "is required");
        }
        value
    }

    fn number(&mut self, key: &str) -> Option<f64> {
        let value = self.required(key)?;
        let Some(number) = coerce_number(value) else {
            self.fail(key, "must be a number");
            return None;
        };
        if number.abs() > MAX_SAFE_NUMBER {
            self.fail(key, "must be a safe number");
            return None;
        }
        Some(number)
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        let value = self.required(key)?;
        let flag = coerce_boolean(value);
        if flag.is_none() {
            self.fail(key, "must be a boolean");
        }
        flag
    }

    fn string(&mut self, key: &str) -> Option<String> {
        let value = self.required(key)?;
        self.non_empty_string(key, value)
    }

    fn non_empty_string(&mut self, key: &str, value: &Value) -> Option<String> {
        match value.as_str() {
            Some("") => {
                self.fail(key, "is not allowed to be empty");
                None
            }
            Some(text) => Some(text.to_string()),
            None => {
                self.fail(key, "must be a string");
                None
            }
        }
    }

    fn reject_unknown(&mut self, allowed: &[&str]) {
        let unknown: Vec<String> = self
            .object
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.fail(&key, "is not allowed");
        }
    }
}

/// JSON numbers, or strings holding a plain decimal that parses to a finite
/// value. Spellings such as `inf` or `NaN` are not numbers here.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            let plain = !text.is_empty()
                && text
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
            if !plain {
                return None;
            }
            text.parse::<f64>().ok().filter(|number| number.is_finite())
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn validate_amount(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<SplitAmount> {
    let Some(value) = value else {
        errors.push(FieldError::new("amount", "is required"));
        return None;
    };
    let Some(object) = value.as_object() else {
        errors.push(FieldError::new("amount", "must be an object"));
        return None;
    };
    let mut fields = Fields {
        object,
        prefix: "amount",
        errors,
    };
    let from_value = fields.number("fromValue");
    let to_value = fields.number("toValue");
    let from_currency = fields.string("fromCurrency");
    let to_currency = fields.string("toCurrency");
    fields.reject_unknown(AMOUNT_KEYS);

    Some(SplitAmount {
        from_value: from_value?,
        to_value: to_value?,
        from_currency: from_currency?,
        to_currency: to_currency?,
    })
}

/// Validates the `billSplit` member of a `POST /splits` body.
///
/// `sharedId` may be absent or `null`, both of which become an empty string.
pub fn validate_bill_split(payload: Option<&Value>) -> Result<BillSplit, Vec<FieldError>> {
    let Some(object) = payload.and_then(Value::as_object) else {
        return Err(vec![FieldError::new("billSplit", "must be an object")]);
    };

    let mut errors = Vec::new();
    let amount = validate_amount(object.get("amount"), &mut errors);

    let mut fields = Fields {
        object,
        prefix: "",
        errors: &mut errors,
    };
    let date = fields.number("date");
    let paid = fields.boolean("paid");
    let name = fields.string("name");
    let description = fields.string("description");
    let id = fields.string("id");
    let expense_id = fields.string("expenseId");
    let shared_id = match object.get("sharedId") {
        None | Some(Value::Null) => Some(String::new()),
        Some(value) => fields.non_empty_string("sharedId", value),
    };
    fields.reject_unknown(SPLIT_KEYS);

    match (date, amount, paid, name, description, id, expense_id, shared_id) {
        (
            Some(date),
            Some(amount),
            Some(paid),
            Some(name),
            Some(description),
            Some(id),
            Some(expense_id),
            Some(shared_id),
        ) if errors.is_empty() => Ok(BillSplit {
            date,
            amount,
            paid,
            name,
            description,
            id,
            expense_id,
            shared_id,
        }),
        _ => Err(errors),
    }
}

// Lengths are counted in UTF-16 code units, which is what clients generating
// these identifiers measure.
fn utf16_len(id: &str) -> usize {
    id.encode_utf16().count()
}

/// Shape of a shared-group identifier accepted by the batch delete route.
pub fn is_shared_id(id: &str) -> bool {
    utf16_len(id) == SHARED_ID_LEN && id.contains("sharedId")
}

/// Shape of a single split identifier accepted by the delete route.
pub fn is_split_id(id: &str) -> bool {
    utf16_len(id) == SPLIT_ID_LEN && id.contains("expense")
}
