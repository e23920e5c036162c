//! Scripture Context - USJ 文档模型
//!
//! USJ 是 USFM 的 JSON 树形表示。此处只做结构化反序列化，
//! 语义解析见 `node.rs`。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::ScriptureError;

/// 当前生成的 USJ 版本
pub const USJ_VERSION: &str = "3.0";

/// USJ 根文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsjDocument {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub content: Vec<UsjContent>,
}

fn default_version() -> String {
    USJ_VERSION.to_string()
}

impl UsjDocument {
    pub fn new(content: Vec<UsjContent>) -> Self {
        Self {
            kind: "USJ".to_string(),
            version: default_version(),
            content,
        }
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, ScriptureError> {
        serde_json::from_str(json).map_err(|e| ScriptureError::InvalidUsj(e.to_string()))
    }

    /// 从已解析的 JSON 值转换
    pub fn from_value(value: Value) -> Result<Self, ScriptureError> {
        serde_json::from_value(value).map_err(|e| ScriptureError::InvalidUsj(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, ScriptureError> {
        serde_json::to_value(self).map_err(|e| ScriptureError::InvalidUsj(e.to_string()))
    }

    /// 顶层元素迭代（跳过顶层的裸文本）
    pub fn elements(&self) -> impl Iterator<Item = &UsjElement> {
        self.content.iter().filter_map(|item| match item {
            UsjContent::Element(element) => Some(element),
            UsjContent::Text(_) => None,
        })
    }
}

/// USJ 内容项：裸文本或元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsjContent {
    Text(String),
    Element(UsjElement),
}

/// USJ 元素
///
/// 常见类型: book / chapter / para / verse / char / note。
/// 未识别的属性保留在 `extra` 中，保证存储后原样返回。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsjElement {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,

    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<UsjContent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsjElement {
    pub fn new(kind: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            marker: Some(marker.into()),
            number: None,
            code: None,
            sid: None,
            caller: None,
            content: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn marker(&self) -> &str {
        self.marker.as_deref().unwrap_or_default()
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(UsjContent::Text(text.into()));
    }

    pub fn push_element(&mut self, element: UsjElement) {
        self.content.push(UsjContent::Element(element));
    }
}

/// 部分工具链把 `number` 输出为整数
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}
