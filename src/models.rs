use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::error;

/// Error text carried by the record that replaces an unparseable body.
pub const INVALID_JSON: &str = "Invalid JSON from server";
pub const NO_DATA_LABEL: &str = "No data";
pub const MULTI_TYPE_FOOD: &str = "Salad";

/// Status and JSON body of a finished backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Parses a raw body. Anything that is not JSON becomes
    /// `{"error": INVALID_JSON, "rawStatus": status}`.
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                error!("failed to parse JSON (status {status}): {err}");
                Self::new(status, json!({ "error": INVALID_JSON, "rawStatus": status }))
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First truthy field among `keys`, else a status-derived message.
    pub fn failure_message(&self, keys: &[&str]) -> String {
        keys.iter()
            .find_map(|key| self.body.get(*key).and_then(truthy_text))
            .unwrap_or_else(|| format!("Server error {}", self.status))
    }
}

/// Registration form fields in submission order. A repeated name keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegistrationPayload(Map<String, Value>);

impl RegistrationPayload {
    pub fn from_fields(fields: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut map = Map::new();
        for (name, value) in fields {
            map.insert(name, Value::String(value));
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Multipart upload body, parts kept in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    pub parts: Vec<FormPart>,
}

impl UploadForm {
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                file_name,
                content_type,
                data,
            },
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReceipt {
    pub message: Option<String>,
    pub bmi: Option<String>,
    pub calorie_target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawReceipt {
    #[serde(default)]
    message: Value,
    #[serde(default)]
    bmi: Value,
    #[serde(default)]
    calorie_target: Value,
}

impl RegistrationReceipt {
    /// Fails when the body is not a JSON object, same as prediction bodies.
    pub fn decode(body: &Value) -> Result<Self, serde_json::Error> {
        let raw: RawReceipt = serde_json::from_value(body.clone())?;
        Ok(Self {
            message: truthy_text(&raw.message),
            bmi: truthy_text(&raw.bmi),
            calorie_target: truthy_text(&raw.calorie_target),
        })
    }
}

/// A backend quantity shown as sent: numbers as numbers, anything else
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    /// `None` only for null.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(number) => Some(
                number
                    .as_f64()
                    .map(Quantity::Number)
                    .unwrap_or_else(|| Quantity::Text(number.to_string())),
            ),
            other => Some(Quantity::Text(value_text(other))),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Quantity::Number(n) => Some(*n),
            Quantity::Text(_) => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{n}"),
            Quantity::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nutrition {
    pub calories: Option<Quantity>,
    pub protein: Option<Quantity>,
    pub fat: Option<Quantity>,
    pub carbs: Option<Quantity>,
    pub fiber: Option<Quantity>,
}

impl Nutrition {
    /// Missing or null fields stay `None`; a non-object yields all `None`.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Quantity::from_value);
        Self {
            calories: field("calories"),
            protein: field("protein"),
            fat: field("fat"),
            carbs: field("carbs"),
            fiber: field("fiber"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatus {
    pub total_calories_today: Quantity,
    pub target_exceeded: bool,
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleFoodResult {
    pub food: String,
    pub confidence: Option<Quantity>,
    pub nutrition: Nutrition,
    pub daily: DailyStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiTypeFoodResult {
    pub food: String,
    pub confidence: Option<Quantity>,
    /// Sub-type name and nutrition, in the order the backend listed them.
    pub types: Vec<(String, Nutrition)>,
    pub daily: DailyStatus,
}

/// A prediction body decoded into the shape the page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionReply {
    Rejected { error: String },
    Single(SingleFoodResult),
    MultiType(MultiTypeFoodResult),
}

#[derive(Debug, Default, Deserialize)]
struct RawPrediction {
    #[serde(default)]
    error: Value,
    #[serde(default)]
    predicted_food: Value,
    #[serde(default)]
    confidence: Value,
    #[serde(default)]
    nutrition: Value,
    #[serde(default)]
    total_calories_today: Value,
    #[serde(default)]
    target_exceeded: Value,
    #[serde(default)]
    suggestions: Value,
}

impl PredictionReply {
    /// Fails only when the body is not a JSON object.
    pub fn decode(body: &Value) -> Result<Self, serde_json::Error> {
        let raw: RawPrediction = serde_json::from_value(body.clone())?;

        if let Some(error) = truthy_text(&raw.error) {
            return Ok(Self::Rejected { error });
        }

        let daily = DailyStatus {
            total_calories_today: truthy_quantity(&raw.total_calories_today)
                .unwrap_or(Quantity::Number(0.0)),
            target_exceeded: is_truthy(&raw.target_exceeded),
            suggestions: suggestion_list(&raw.suggestions),
        };
        let confidence = Quantity::from_value(&raw.confidence);

        match (&raw.predicted_food, &raw.nutrition) {
            (Value::String(food), Value::Object(types))
                if food == MULTI_TYPE_FOOD && !types.contains_key("calories") =>
            {
                Ok(Self::MultiType(MultiTypeFoodResult {
                    food: food.clone(),
                    confidence,
                    types: types
                        .iter()
                        .map(|(name, values)| (name.clone(), Nutrition::from_value(values)))
                        .collect(),
                    daily,
                }))
            }
            _ => Ok(Self::Single(SingleFoodResult {
                food: truthy_text(&raw.predicted_food).unwrap_or_else(|| "Unknown".to_string()),
                confidence,
                nutrition: Nutrition::from_value(&raw.nutrition),
                daily,
            })),
        }
    }
}

/// Chart labels and values from a weekly-data body. Each side falls back
/// to a single placeholder entry on its own when absent or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl WeeklySeries {
    pub fn from_body(body: &Value) -> Self {
        let labels = match body.get("dates") {
            Some(Value::Array(dates)) if !dates.is_empty() => dates.iter().map(value_text).collect(),
            _ => vec![NO_DATA_LABEL.to_string()],
        };
        let values = match body.get("calories") {
            // a non-numeric entry draws the same empty bar as zero
            Some(Value::Array(calories)) if !calories.is_empty() => calories
                .iter()
                .map(|value| lenient_number(value).unwrap_or(0.0))
                .collect(),
            _ => vec![0.0],
        };
        Self { labels, values }
    }
}

fn truthy_quantity(value: &Value) -> Option<Quantity> {
    if is_truthy(value) {
        Quantity::from_value(value)
    } else {
        None
    }
}

fn suggestion_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().map(value_text).collect()),
        Value::String(text) if !text.is_empty() => Some(vec![text.clone()]),
        _ => None,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display text of a value, or `None` when it is null, empty, zero or false.
pub fn truthy_text(value: &Value) -> Option<String> {
    is_truthy(value).then(|| value_text(value))
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(uint) = number.as_u64() {
                uint.to_string()
            } else {
                number.as_f64().map(|float| float.to_string()).unwrap_or_default()
            }
        }
        other => other.to_string(),
    }
}

/// Numbers, and strings that parse as numbers.
pub fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_body_becomes_synthetic_error() {
        let reply = Reply::from_bytes(502, b"<html>Bad gateway</html>");
        assert_eq!(reply.body["error"], INVALID_JSON);
        assert_eq!(reply.body["rawStatus"], 502);
        assert!(!reply.is_ok());

        let empty = Reply::from_bytes(200, b"");
        assert!(empty.is_ok());
        assert_eq!(empty.body["rawStatus"], 200);
    }

    #[test]
    fn failure_message_prefers_keys_in_order() {
        let reply = Reply::new(400, json!({ "error": "bad age", "message": "rejected" }));
        assert_eq!(reply.failure_message(&["message", "error"]), "rejected");
        assert_eq!(reply.failure_message(&["error", "message"]), "bad age");

        let bare = Reply::new(503, json!({ "message": "" }));
        assert_eq!(bare.failure_message(&["message", "error"]), "Server error 503");
    }

    #[test]
    fn payload_keeps_first_position_and_last_value() {
        let payload = RegistrationPayload::from_fields(vec![
            ("name".to_string(), "Ana".to_string()),
            ("age".to_string(), "30".to_string()),
            ("name".to_string(), "Ana Lima".to_string()),
        ]);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.get("name"), Some("Ana Lima"));
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"name":"Ana Lima","age":"30"}"#
        );
    }

    #[test]
    fn receipt_treats_zero_and_null_as_absent() {
        let receipt = RegistrationReceipt::decode(&json!({
            "message": "Profile saved",
            "bmi": 0,
            "calorie_target": null
        }))
        .unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Profile saved"));
        assert_eq!(receipt.bmi, None);
        assert_eq!(receipt.calorie_target, None);

        let receipt =
            RegistrationReceipt::decode(&json!({ "bmi": 22.5, "calorie_target": 2100.0 })).unwrap();
        assert_eq!(receipt.bmi.as_deref(), Some("22.5"));
        assert_eq!(receipt.calorie_target.as_deref(), Some("2100"));
    }

    #[test]
    fn receipt_requires_an_object_body() {
        assert!(RegistrationReceipt::decode(&json!(null)).is_err());
        assert!(RegistrationReceipt::decode(&json!("saved")).is_err());
        assert!(RegistrationReceipt::decode(&json!({})).is_ok());
    }

    #[test]
    fn quantities_keep_backend_text() {
        let body = json!({
            "predicted_food": "Pizza",
            "confidence": "high",
            "nutrition": { "calories": "285 kcal", "protein": "12.50", "fat": 10, "carbs": null },
            "total_calories_today": "1,285"
        });
        let PredictionReply::Single(result) = PredictionReply::decode(&body).unwrap() else {
            panic!("expected single result");
        };
        assert_eq!(result.confidence, Some(Quantity::Text("high".to_string())));
        assert_eq!(result.nutrition.calories, Some(Quantity::Text("285 kcal".to_string())));
        assert_eq!(result.nutrition.protein.as_ref().map(ToString::to_string).as_deref(), Some("12.50"));
        assert_eq!(result.nutrition.fat.as_ref().and_then(Quantity::as_f64), Some(10.0));
        assert_eq!(result.nutrition.carbs, None);
        assert_eq!(result.daily.total_calories_today.to_string(), "1,285");
    }

    #[test]
    fn salad_with_sub_types_decodes_as_multi_type_in_order() {
        let body = json!({
            "predicted_food": "Salad",
            "confidence": 87.5,
            "nutrition": {
                "Greek": { "calories": 180, "protein": 6, "fat": 14, "carbs": 9, "fiber": 3 },
                "Caesar": { "calories": 320, "protein": 9, "fat": 26, "carbs": 12, "fiber": 2 }
            },
            "total_calories_today": 1450,
            "target_exceeded": false
        });

        let PredictionReply::MultiType(result) = PredictionReply::decode(&body).unwrap() else {
            panic!("expected multi-type result");
        };
        let names: Vec<&str> = result.types.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["Greek", "Caesar"]);
        assert_eq!(result.types[1].1.calories, Some(Quantity::Number(320.0)));
        assert_eq!(result.confidence, Some(Quantity::Number(87.5)));
        assert_eq!(result.daily.total_calories_today, Quantity::Number(1450.0));
        assert_eq!(result.daily.suggestions, None);
    }

    #[test]
    fn salad_with_flat_nutrition_is_single() {
        let body = json!({
            "predicted_food": "Salad",
            "nutrition": { "calories": 150, "protein": 4, "fat": 9, "carbs": 11, "fiber": 4 }
        });
        assert!(matches!(
            PredictionReply::decode(&body).unwrap(),
            PredictionReply::Single(ref result) if result.food == "Salad"
        ));
    }

    #[test]
    fn single_food_defaults_missing_fields() {
        let body = json!({
            "nutrition": { "calories": "250", "protein": 10 },
            "target_exceeded": 1,
            "suggestions": ["Drink water", "Walk 20 minutes"]
        });
        let PredictionReply::Single(result) = PredictionReply::decode(&body).unwrap() else {
            panic!("expected single result");
        };
        assert_eq!(result.food, "Unknown");
        assert_eq!(result.confidence, None);
        assert_eq!(result.nutrition.calories, Some(Quantity::Text("250".to_string())));
        assert_eq!(result.nutrition.fat, None);
        assert!(result.daily.target_exceeded);
        assert_eq!(result.daily.total_calories_today, Quantity::Number(0.0));
        assert_eq!(result.daily.suggestions.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn error_field_rejects_prediction() {
        let body = json!({ "error": "No image provided", "predicted_food": "Pizza" });
        assert_eq!(
            PredictionReply::decode(&body).unwrap(),
            PredictionReply::Rejected { error: "No image provided".to_string() }
        );
        assert!(PredictionReply::decode(&json!(null)).is_err());
    }

    #[test]
    fn weekly_series_substitutes_placeholders() {
        let empty = WeeklySeries::from_body(&json!({ "dates": [], "calories": [] }));
        assert_eq!(empty.labels, [NO_DATA_LABEL]);
        assert_eq!(empty.values, [0.0]);

        let missing = WeeklySeries::from_body(&json!({ "error": INVALID_JSON }));
        assert_eq!(missing.labels, [NO_DATA_LABEL]);

        let week = WeeklySeries::from_body(&json!({ "dates": ["Mon", "Tue"], "calories": [500, 700] }));
        assert_eq!(week.labels, ["Mon", "Tue"]);
        assert_eq!(week.values, [500.0, 700.0]);
    }
}
