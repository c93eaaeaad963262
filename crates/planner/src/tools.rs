use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use domain::{
    prices::{lookup, PriceLookupTool},
    Error,
};

pub const MEDICINE_NAME_PARAM: &str = "medicine_name";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }
}

/// What the model sees of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolSpec {
    /// OpenAI-compatible `tools` array element; every parameter is a string.
    pub fn to_openai_tool_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<String> = Vec::new();

        for p in &self.params {
            properties.insert(
                p.name.clone(),
                serde_json::json!({
                    "type": "string",
                    "description": p.description,
                }),
            );
            if p.required {
                required.push(p.name.clone());
            }
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn run(&self, args: &HashMap<String, String>) -> Result<String>;
}

/// `get_medicine_prices` backed by the price lookup pipeline.
pub struct MedicinePriceTool {
    lookup: PriceLookupTool,
}

impl MedicinePriceTool {
    pub fn new(lookup: PriceLookupTool) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for MedicinePriceTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: lookup::TOOL_NAME.to_string(),
            description: lookup::TOOL_DESCRIPTION.to_string(),
            params: vec![ToolParam::required(
                MEDICINE_NAME_PARAM,
                "Medicine name to price, e.g. \"Dolo 650\" or \"Jan Aushadhi Pantoprazole 40mg\"",
            )],
        }
    }

    async fn run(&self, args: &HashMap<String, String>) -> Result<String> {
        let medicine_name = args
            .get(MEDICINE_NAME_PARAM)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Validation {
                message: format!("missing required param: {MEDICINE_NAME_PARAM}"),
            })?;

        Ok(self.lookup.lookup(medicine_name).await)
    }
}

/// Flattens a JSON arguments object into string values.
pub fn json_args_to_string_map(args: &serde_json::Value) -> HashMap<String, String> {
    args.as_object()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}
