use serde::{Deserialize, Serialize};

/// Free-to-air channel from an open-channel directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenChannel {
    pub name: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub cover: String,
    pub stream: String,
}
