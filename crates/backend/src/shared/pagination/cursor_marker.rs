use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use contracts::shared::pagination::CursorToken;
use serde_json::Value;

use crate::shared::data::StoredDocument;
use crate::shared::error::AppError;

/// Позиция записи в упорядоченной коллекции: значение ключа сортировки и id
#[derive(Debug, Clone, PartialEq)]
pub struct CursorMarker {
    pub key: Value,
    pub id: String,
}

impl CursorMarker {
    pub fn new(key: Value, id: impl Into<String>) -> Self {
        Self { key, id: id.into() }
    }

    /// Маркер документа; `None`, если поле сортировки не заполнено
    pub fn of(document: &StoredDocument, sort_field: &str) -> Option<Self> {
        document
            .field(sort_field)
            .map(|key| Self::new(key.clone(), document.id.clone()))
    }

    /// Токен для клиента: base64url от JSON-пары `[key, id]`
    pub fn to_token(&self) -> CursorToken {
        let pair = Value::Array(vec![self.key.clone(), Value::String(self.id.clone())]);
        CursorToken(URL_SAFE_NO_PAD.encode(pair.to_string()))
    }

    pub fn from_token(token: &CursorToken) -> Result<Self, AppError> {
        let malformed = || AppError::Validation(format!("malformed cursor '{}'", token.as_str()));

        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|_| malformed())?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|_| malformed())?;

        match value {
            Value::Array(mut pair) if pair.len() == 2 => match pair.pop() {
                Some(Value::String(id)) => match pair.pop() {
                    // ключ сортировки всегда скаляр: строка, число или bool
                    Some(key @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                        Ok(Self::new(key, id))
                    }
                    _ => Err(malformed()),
                },
                _ => Err(malformed()),
            },
            _ => Err(malformed()),
        }
    }
}
