//! Upstream document shapes: measure list, measure dataset, filter values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::error::DataFormatError;

/// Entry of `measures.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Sex code as written by the modelling pipeline: usually `0`/`1`, sometimes text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SexCode {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for SexCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl Serialize for SexCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(value) => serializer.serialize_i64(*value),
            Self::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for SexCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Int(value) => Ok(Self::Numeric(value)),
            // pandas writes integer columns with missing values as floats
            Scalar::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                Ok(Self::Numeric(value as i64))
            }
            Scalar::Float(value) => Ok(Self::Text(value.to_string())),
            Scalar::Text(value) => Ok(Self::Text(value)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_label(self) -> String {
        match self {
            Scalar::Int(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Text(value) => value,
        }
    }
}

fn de_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_label)
}

fn de_opt_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(deserializer).map(|value| value.map(Scalar::into_label))
}

fn de_labels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<Scalar>::deserialize(deserializer)
        .map(|values| values.into_iter().map(Scalar::into_label).collect())
}

/// `null` becomes NaN; consumers skip non-finite values.
fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Option::<f64>::deserialize(deserializer).map(|value| value.unwrap_or(f64::NAN))
}

fn de_opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<f64>::deserialize(deserializer)
}

/// One harmonized score row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureRecord {
    #[serde(rename = "Age", deserialize_with = "de_number")]
    pub age: f64,
    #[serde(rename = "Sex_harmonized")]
    pub sex: SexCode,
    #[serde(rename = "Site_harmonized", deserialize_with = "de_label")]
    pub site: String,
    #[serde(
        rename = "Site",
        default,
        deserialize_with = "de_opt_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_site: Option<String>,
    #[serde(
        rename = "Y",
        alias = "raw_score",
        default,
        deserialize_with = "de_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_score: Option<f64>,
    #[serde(rename = "Y_harmonized", deserialize_with = "de_number")]
    pub y_harmonized: f64,
    #[serde(rename = "Z", deserialize_with = "de_number")]
    pub z: f64,
    #[serde(deserialize_with = "de_number")]
    pub theoretical: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub offset: f64,
    #[serde(deserialize_with = "de_label")]
    pub subject_id: String,
}

impl MeasureRecord {
    /// Acquisition site used for grouping series; the harmonized site stands in when absent.
    pub fn site_key(&self) -> &str {
        self.raw_site.as_deref().unwrap_or(&self.site)
    }

    pub fn matches(&self, sex: &SexCode, site: &str) -> bool {
        &self.sex == sex && self.site == site
    }
}

/// One age step of the centile curves for a sex/site combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CentileRow {
    #[serde(rename = "Age", deserialize_with = "de_number")]
    pub age: f64,
    #[serde(rename = "Sex_harmonized")]
    pub sex: SexCode,
    #[serde(rename = "Site_harmonized", deserialize_with = "de_label")]
    pub site: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl CentileRow {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values
            .get(column)
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
    }

    pub fn matches(&self, sex: &SexCode, site: &str) -> bool {
        &self.sex == sex && self.site == site
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub centile_columns: Vec<String>,
}

/// Full document for one measure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureDataset {
    #[serde(default)]
    pub scale_name: String,
    #[serde(default)]
    pub display_name: String,
    pub available_sexes: Vec<SexCode>,
    #[serde(deserialize_with = "de_labels")]
    pub available_sites: Vec<String>,
    #[serde(default, deserialize_with = "de_labels")]
    pub available_raw_sites: Vec<String>,
    pub centiles: Vec<CentileRow>,
    pub harmonized: Vec<MeasureRecord>,
    #[serde(default)]
    pub metadata: DatasetMetadata,
}

const REQUIRED_ARRAYS: [&str; 4] = ["available_sexes", "available_sites", "centiles", "harmonized"];

impl MeasureDataset {
    /// Parse and validate a measure document. `document` names it in errors.
    pub fn from_json(document: &str, raw: &str) -> Result<Self, DataFormatError> {
        let value: Value = serde_json::from_str(raw).map_err(|source| DataFormatError::Json {
            document: document.to_string(),
            source,
        })?;

        for field in REQUIRED_ARRAYS {
            if !value.get(field).is_some_and(Value::is_array) {
                return Err(DataFormatError::MissingField {
                    document: document.to_string(),
                    field,
                });
            }
        }

        serde_json::from_value(value).map_err(|source| DataFormatError::Json {
            document: document.to_string(),
            source,
        })
    }

    /// Declared centile columns, or the numeric fields of the first centile row
    /// in ascending centile order ("5" before "25").
    pub fn centile_columns(&self) -> Vec<String> {
        if !self.metadata.centile_columns.is_empty() {
            return self.metadata.centile_columns.clone();
        }
        let mut columns: Vec<String> = self
            .centiles
            .first()
            .map(|row| {
                row.values
                    .iter()
                    .filter(|(_, value)| value.is_number())
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default();
        columns.sort_by(|a, b| {
            let rank = |column: &str| column.parse::<f64>().unwrap_or(f64::INFINITY);
            rank(a).total_cmp(&rank(b)).then_with(|| a.cmp(b))
        });
        columns
    }
}

/// The live sex/site selection. `None` means "first available".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub sex: Option<SexCode>,
    pub site: Option<String>,
}

/// A filter with both values pinned to what the dataset offers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedFilters {
    pub sex: SexCode,
    pub site: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SexOption {
    pub value: SexCode,
    pub label: String,
}

/// Values offered by the sex/site selectors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilterOptions {
    pub sexes: Vec<SexOption>,
    pub sites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "scale_name": "wm_total",
            "display_name": "Working Memory",
            "available_sexes": [0, 1],
            "available_sites": ["A", "B"],
            "centiles": [
                {"Age": 20, "Sex_harmonized": 1, "Site_harmonized": "A", "5": 1.0, "50": 2.0}
            ],
            "harmonized": [
                {"Age": 20, "Sex_harmonized": 1.0, "Site_harmonized": "A", "Site": "A-1",
                 "Y": 10.5, "Y_harmonized": 11.0, "Z": 0.2, "theoretical": 0.1,
                 "offset": 1, "subject_id": 1001}
            ]
        })
    }

    #[test]
    fn parses_mixed_scalar_encodings() {
        let dataset = MeasureDataset::from_json("wm.json", &document().to_string()).unwrap();
        let record = &dataset.harmonized[0];
        assert_eq!(record.sex, SexCode::Numeric(1));
        assert_eq!(record.subject_id, "1001");
        assert_eq!(record.site_key(), "A-1");
        assert_eq!(record.raw_score, Some(10.5));
        assert_eq!(dataset.centiles[0].value("50"), Some(2.0));
    }

    #[test]
    fn missing_arrays_are_reported_by_name() {
        let mut doc = document();
        doc.as_object_mut().unwrap().remove("available_sites");
        let err = MeasureDataset::from_json("wm.json", &doc.to_string()).unwrap_err();
        assert!(matches!(
            err,
            DataFormatError::MissingField {
                field: "available_sites",
                ..
            }
        ));
    }

    #[test]
    fn centile_columns_fall_back_to_row_fields() {
        let dataset = MeasureDataset::from_json("wm.json", &document().to_string()).unwrap();
        assert_eq!(dataset.centile_columns(), vec!["5".to_string(), "50".to_string()]);
    }

    #[test]
    fn fallback_centile_columns_are_in_centile_order() {
        let mut doc = document();
        doc["centiles"][0] = json!({
            "Age": 20, "Sex_harmonized": 1, "Site_harmonized": "A",
            "95": 4.0, "25": 1.5, "75": 3.0, "5": 1.0, "50": 2.0
        });
        let dataset = MeasureDataset::from_json("wm.json", &doc.to_string()).unwrap();
        assert_eq!(dataset.centile_columns(), vec!["5", "25", "50", "75", "95"]);
    }

    #[test]
    fn null_scores_become_nan() {
        let mut doc = document();
        doc["harmonized"][0]["Z"] = Value::Null;
        let dataset = MeasureDataset::from_json("wm.json", &doc.to_string()).unwrap();
        assert!(dataset.harmonized[0].z.is_nan());
    }
}
