//! Tool catalog advertised through `tools/list`, and the `tools/call` result
//! shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tickerpipe_core::{Interval, Period};

pub const DOWNLOAD_STOCK_DATA: &str = "download_stock_data";
pub const GET_SERVER_STATUS: &str = "get_server_status";

/// Tools this server can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    DownloadStockData,
    GetServerStatus,
}

impl Tool {
    pub const ALL: [Self; 2] = [Self::DownloadStockData, Self::GetServerStatus];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DownloadStockData => DOWNLOAD_STOCK_DATA,
            Self::GetServerStatus => GET_SERVER_STATUS,
        }
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            Self::DownloadStockData => ToolDefinition {
                name: DOWNLOAD_STOCK_DATA,
                description: "Download historical stock data from Yahoo Finance. Returns \
                              normalized JSON records with summary statistics, or a \
                              structured error.",
                input_schema: download_schema(),
            },
            Self::GetServerStatus => ToolDefinition {
                name: GET_SERVER_STATUS,
                description: "Get server status and upstream connectivity.",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    Tool::ALL.into_iter().map(Tool::definition).collect()
}

fn download_schema() -> Value {
    let periods = Period::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>();
    let intervals = Interval::ALL.iter().map(|i| i.as_str()).collect::<Vec<_>>();

    let mut properties = Map::new();
    properties.insert(
        String::from("tickers"),
        json!({
            "type": "string",
            "description": "Ticker symbol(s), e.g. 'AAPL' or 'AAPL MSFT'"
        }),
    );
    properties.insert(
        String::from("period"),
        json!({
            "type": "string",
            "enum": periods,
            "default": Period::default().as_str(),
            "description": "Lookback period; ignored when start or end is given"
        }),
    );
    properties.insert(
        String::from("interval"),
        json!({
            "type": "string",
            "enum": intervals,
            "default": Interval::default().as_str(),
            "description": "Data interval"
        }),
    );
    for (name, description) in [
        ("start", "Start date in YYYY-MM-DD format"),
        ("end", "End date in YYYY-MM-DD format (exclusive)"),
    ] {
        properties.insert(
            String::from(name),
            json!({ "type": "string", "description": description }),
        );
    }
    for (name, default, description) in [
        ("actions", false, "Include dividend and stock split data"),
        ("auto_adjust", true, "Automatically adjust OHLC data"),
        ("prepost", false, "Include pre and post market data"),
        ("repair", false, "Attempt to repair currency unit mixups"),
        ("keepna", false, "Keep rows with missing values"),
        ("rounding", false, "Round values to 2 decimal places"),
    ] {
        properties.insert(
            String::from(name),
            json!({ "type": "boolean", "default": default, "description": description }),
        );
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": ["tickers"]
    })
}

/// Arguments of `tools/call`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Result of `tools/call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                kind: String::from("text"),
                text: text.into(),
            }],
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(
            Tool::from_name("download_stock_data"),
            Some(Tool::DownloadStockData)
        );
        assert_eq!(Tool::from_name("get_stock_info"), None);
    }

    #[test]
    fn download_schema_requires_tickers_and_enumerates_choices() {
        let schema = Tool::DownloadStockData.definition().input_schema;

        assert_eq!(schema["required"], json!(["tickers"]));
        assert_eq!(
            schema["properties"]["period"]["enum"]
                .as_array()
                .map(Vec::len),
            Some(11)
        );
        assert_eq!(
            schema["properties"]["interval"]["enum"]
                .as_array()
                .map(Vec::len),
            Some(13)
        );
        assert_eq!(schema["properties"]["auto_adjust"]["default"], json!(true));
    }
}
