

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GuardMode {
    /// Suppress the delete and report success.
    Silent,
    /// Suppress the delete and fail with `ProtectedRecord`.
    Raising,
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GuardPolicy {
    #[default]
    Deletable,
    Guarded,
    GuardedStrict,
}

impl GuardPolicy {
    pub fn mode(self) -> Option<GuardMode> {
        match self {
            Self::Deletable => None,
            Self::Guarded => Some(GuardMode::Silent),
            Self::GuardedStrict => Some(GuardMode::Raising),
        }
    }

    pub fn is_guarded(self) -> bool {
        self != Self::Deletable
    }
}

impl From<GuardMode> for GuardPolicy {
    fn from(mode: GuardMode) -> Self {
        match mode {
            GuardMode::Silent => Self::Guarded,
            GuardMode::Raising => Self::GuardedStrict,
        }
    }
}

impl From<Option<GuardMode>> for GuardPolicy {
    fn from(mode: Option<GuardMode>) -> Self {
        mode.map(Self::from).unwrap_or_default()
    }
}
