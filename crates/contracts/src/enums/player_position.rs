use serde::{Deserialize, Serialize};

/// Игровое амплуа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPosition {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl PlayerPosition {
    pub fn code(&self) -> &'static str {
        match self {
            PlayerPosition::Goalkeeper => "Goalkeeper",
            PlayerPosition::Defender => "Defender",
            PlayerPosition::Midfielder => "Midfielder",
            PlayerPosition::Forward => "Forward",
        }
    }

    pub fn all() -> Vec<PlayerPosition> {
        vec![
            PlayerPosition::Goalkeeper,
            PlayerPosition::Defender,
            PlayerPosition::Midfielder,
            PlayerPosition::Forward,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::all()
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
    }
}
