use serde::{Deserialize, Serialize};

/// Рабочая нога игрока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredFoot {
    Left,
    Right,
}

impl PreferredFoot {
    pub fn code(&self) -> &'static str {
        match self {
            PreferredFoot::Left => "left",
            PreferredFoot::Right => "right",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "left" => Some(PreferredFoot::Left),
            "right" => Some(PreferredFoot::Right),
            _ => None,
        }
    }
}
