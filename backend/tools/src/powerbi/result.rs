use serde_json::{Map, Value};

use super::BiError;

/// Rows of the first table returned by `executeQueries`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Map<String, Value>>,
}

impl QueryResult {
    /// Extract rows from an `executeQueries` response body.
    ///
    /// Errors embedded in a 200 response (per-query `error` objects) are
    /// surfaced rather than treated as empty results.
    pub fn from_response(body: &Value) -> Result<Self, BiError> {
        if let Some(err) = body.get("error") {
            return Err(BiError::Rejected {
                status: 200,
                message: error_text(err),
            });
        }

        let result = body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .ok_or_else(|| BiError::Malformed("missing results".into()))?;

        if let Some(err) = result.get("error") {
            return Err(BiError::Rejected {
                status: 200,
                message: error_text(err),
            });
        }

        let rows = result
            .get("tables")
            .and_then(Value::as_array)
            .and_then(|t| t.first())
            .and_then(|t| t.get("rows"))
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { rows })
    }

    /// Render for the model: a scalar, a pipe table, or a no-rows note.
    pub fn to_text(&self) -> String {
        let Some(first) = self.rows.first() else {
            return "No rows returned.".to_string();
        };

        if self.rows.len() == 1 && first.len() == 1 {
            return first.values().next().map(render_cell).unwrap_or_default();
        }

        let columns: Vec<&String> = first.keys().collect();
        let mut out = String::new();
        out.push_str("| ");
        out.push_str(
            &columns
                .iter()
                .map(|c| column_label(c))
                .collect::<Vec<_>>()
                .join(" | "),
        );
        out.push_str(" |\n|");
        out.push_str(&" --- |".repeat(columns.len()));
        for row in &self.rows {
            out.push_str("\n| ");
            out.push_str(
                &columns
                    .iter()
                    .map(|c| row.get(*c).map(render_cell).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(" | "),
            );
            out.push_str(" |");
        }
        out
    }
}

/// `Tracker[Entity]` → `Entity`, `[Count]` → `Count`.
pub fn column_label(raw: &str) -> &str {
    match (raw.find('['), raw.ends_with(']')) {
        (Some(open), true) => &raw[open + 1..raw.len() - 1],
        _ => raw,
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Best-effort human text from a Power BI error object.
pub fn error_text(err: &Value) -> String {
    let detail = err
        .pointer("/pbi.error/details")
        .and_then(Value::as_array)
        .and_then(|d| d.first())
        .and_then(|d| d.pointer("/detail/value"))
        .and_then(Value::as_str);
    if let Some(detail) = detail {
        return detail.to_string();
    }
    for key in ["message", "code"] {
        if let Some(text) = err.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    err.to_string()
}
