use super::domain::{CategoryLabel, TidyRow};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

// Partial view of the dashboard response. Every level is optional so a
// missing or mistyped branch reads as "no rows".
#[derive(Debug, Deserialize)]
struct RegistryResponse {
    #[serde(default)]
    data: Option<ObjectOnly<ResponseData>>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default, rename = "tableData")]
    table_data: Option<ObjectOnly<TableData>>,
}

#[derive(Debug, Deserialize)]
struct TableData {
    #[serde(default, rename = "bodyContent")]
    body_content: Option<Vec<Value>>,
}

/// Accepts a JSON object only. Derived struct impls also take the sequence
/// form, which would read `[{..}]` as if it were `{"data": {..}}`.
#[derive(Debug)]
struct ObjectOnly<T>(T);

impl<'de, T: DeserializeOwned> Deserialize<'de> for ObjectOnly<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        T::deserialize(Value::Object(map))
            .map(ObjectOnly)
            .map_err(D::Error::custom)
    }
}

impl RegistryResponse {
    fn body_content(&self) -> Option<&[Value]> {
        self.data
            .as_ref()
            .and_then(|ObjectOnly(data)| data.table_data.as_ref())
            .and_then(|ObjectOnly(table)| table.body_content.as_deref())
    }
}

/// Flattens `data.tableData.bodyContent` into rows tagged with `category`.
pub fn normalize(raw: &Value, category: &CategoryLabel) -> Vec<TidyRow> {
    let response = match ObjectOnly::<RegistryResponse>::deserialize(raw) {
        Ok(ObjectOnly(response)) => response,
        Err(err) => {
            tracing::debug!(%category, error = %err, "response shape not recognised, treating as empty");
            return Vec::new();
        }
    };

    response
        .body_content()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
        .map(|record| tidy_row(record, category))
        .collect()
}

fn tidy_row(record: &Map<String, Value>, category: &CategoryLabel) -> TidyRow {
    TidyRow::new(
        field_text(record, "company"),
        field_text(record, "address"),
        field_text(record, "email"),
        category,
    )
}

fn field_text(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
