use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere;

impl FilterWhere {
    /// Render one condition as a `(column, "op.value")` query pair.
    pub fn to_postgrest(condition: &FilterWhereInfo) -> Result<(String, String), FilterError> {
        let op = condition.operator.to_postgrest();
        let rendered = match condition.operator {
            FilterOp::In => {
                let values = condition.data.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("$in on '{}' requires an array", condition.column))
                })?;
                let items: Vec<String> = values.iter().map(Self::quote_list_item).collect();
                format!("{}.({})", op, items.join(","))
            }
            FilterOp::Is => match &condition.data {
                Value::Null => format!("{}.null", op),
                Value::Bool(b) => format!("{}.{}", op, b),
                other => {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "$is on '{}' accepts null, true or false, got {}",
                        condition.column, other
                    )))
                }
            },
            _ => format!("{}.{}", op, Self::plain(&condition.data)?),
        };
        Ok((condition.column.clone(), rendered))
    }

    /// Evaluate one condition against a row, with SQL null semantics.
    pub fn matches(condition: &FilterWhereInfo, row: &Value) -> Result<bool, FilterError> {
        let field = row.get(&condition.column).unwrap_or(&Value::Null);
        let data = &condition.data;

        Ok(match condition.operator {
            FilterOp::Is => match data {
                Value::Null => field.is_null(),
                Value::Bool(b) => field.as_bool() == Some(*b),
                other => {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "$is accepts null, true or false, got {}",
                        other
                    )))
                }
            },
            FilterOp::In => {
                let values = data.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("$in on '{}' requires an array", condition.column))
                })?;
                values.iter().any(|v| compare_values(field, v) == Some(Ordering::Equal))
            }
            FilterOp::Eq => compare_values(field, data) == Some(Ordering::Equal),
            FilterOp::Neq => matches!(compare_values(field, data), Some(o) if o != Ordering::Equal),
            FilterOp::Gt => compare_values(field, data) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(compare_values(field, data), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => compare_values(field, data) == Some(Ordering::Less),
            FilterOp::Lte => matches!(compare_values(field, data), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::Like | FilterOp::ILike => {
                let (Some(text), Some(pattern)) = (field.as_str(), data.as_str()) else {
                    return Ok(false);
                };
                if condition.operator == FilterOp::ILike {
                    like_match(&text.to_lowercase(), &pattern.to_lowercase())
                } else {
                    like_match(text, pattern)
                }
            }
        })
    }

    fn plain(value: &Value) -> Result<String, FilterError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Err(FilterError::InvalidOperatorData(
                "null comparisons must use $is".to_string(),
            )),
            other => Err(FilterError::InvalidOperatorData(format!("unsupported filter value {}", other))),
        }
    }

    fn quote_list_item(value: &Value) -> String {
        match value {
            Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            other => other.to_string(),
        }
    }
}

/// Order two JSON scalars. Numbers compare numerically, strings lexically
/// (RFC 3339 timestamps sort chronologically). Null and mixed kinds are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => {
            // Timestamps compare by instant regardless of offset spelling
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// SQL LIKE with `%` (any run) and `_` (one char); `*` is accepted for `%`.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') | Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('_') => {
                t += 1;
                p += 1;
            }
            Some(c) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((bp, bt)) => {
                    p = bp + 1;
                    t = bt + 1;
                    backtrack = Some((bp, bt + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '%' || *c == '*')
}
