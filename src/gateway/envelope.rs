//! The backend wraps domain objects as JSON strings inside a JSON body, so
//! every element needs a second parse after the transport body is decoded.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// `{ "obj": "<json>" }`
#[derive(Debug, Deserialize)]
pub struct ObjEnvelope {
    pub obj: String,
}

/// `{ "objs": ["<json>", ...] }`
#[derive(Debug, Deserialize)]
pub struct ObjsEnvelope {
    pub objs: Vec<String>,
}

impl ObjEnvelope {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.obj)
    }
}

impl ObjsEnvelope {
    /// Decode every element; one bad element fails the whole list.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.objs.iter().map(|obj| serde_json::from_str(obj)).collect()
    }
}
