//! Query parameters for select and tabulate queries
//!
//! No field is required; absent fields are omitted from the query string.
//! List fields serialize to one comma-joined parameter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parameters shared by select and tabulate queries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonQueryParameters {
    /// Return the total row count alongside the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    /// Output shape; the server defaults to `mtna_simple`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    /// Columns to group by when computing aggregated variables, e.g. `V1,V2`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<String>>,
    /// Inject codes into the returned records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Return metadata alongside the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Column and direction list, e.g. `V1 DESC,V2 ASC`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    /// Variables to use as weights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<String>>,
    /// SQL-like filter, e.g. `V1=1 AND V2=2`
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Parameters for a select (record level) query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectParameters {
    #[serde(flatten)]
    pub common: CommonQueryParameters,
    /// Limit on the number of columns returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collimit: Option<u64>,
    /// Column to start at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coloffset: Option<u64>,
    /// Column names, regular expressions, keywords, variable groups or
    /// concepts to select; prefix with `~` to exclude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cols: Option<String>,
}

/// Parameters for a tabulation (aggregate level) query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabulateParameters {
    #[serde(flatten)]
    pub common: CommonQueryParameters,
    /// Columns to use as dimensions, e.g. `V[0-9]+,V1a,$keyword`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dims: Option<String>,
    /// Columns to use as measures, e.g. `avg:AVG(V1)`; count by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    /// Return subtotals alongside the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<bool>,
}

/// Output shape selector for query results
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    MtnaSimple,
    Amcharts,
    Gcharts,
    /// One of the `plotly_*` formats; holds the suffix
    Plotly(String),
    /// Any other format name, passed through as-is
    Other(String),
}

impl Format {
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::MtnaSimple => "mtna_simple".into(),
            Self::Amcharts => "amcharts".into(),
            Self::Gcharts => "gcharts".into(),
            Self::Plotly(kind) => format!("plotly_{}", kind).into(),
            Self::Other(name) => name.as_str().into(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s {
            "mtna_simple" => Self::MtnaSimple,
            "amcharts" => Self::Amcharts,
            "gcharts" => Self::Gcharts,
            other => match other.strip_prefix("plotly_") {
                Some(kind) if !kind.is_empty() => Self::Plotly(kind.to_string()),
                _ => Self::Other(other.to_string()),
            },
        };
        Ok(format)
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_str(&name).unwrap_or_else(|never| match never {}))
    }
}
