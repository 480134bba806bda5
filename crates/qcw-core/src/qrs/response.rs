//! Response bodies the warmer reads.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::QrsError;

/// Raw response: status plus body bytes.
#[derive(Debug, Clone)]
pub struct QrsResponse {
    pub path: String,
    pub status: u32,
    pub body: Vec<u8>,
}

impl QrsResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, QrsError> {
        serde_json::from_slice(&self.body).map_err(|source| QrsError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

/// `GET /qrs/about`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(default)]
    pub build_version: Option<String>,
    #[serde(default)]
    pub build_date: Option<String>,
}

/// Any `/count` endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Count {
    pub value: u64,
}

/// `POST /qrs/{type}/table`; only the row count is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> QrsResponse {
        QrsResponse {
            path: "/qrs/test".into(),
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn decodes_count() {
        let c: Count = response(r#"{"value": 42}"#).json().unwrap();
        assert_eq!(c.value, 42);
    }

    #[test]
    fn decodes_about_ignoring_unknown_fields() {
        let a: About = response(r#"{"buildVersion":"24.1.0","buildDate":"1/1/2024","schemaPath":"About"}"#)
            .json()
            .unwrap();
        assert_eq!(a.build_version.as_deref(), Some("24.1.0"));
    }

    #[test]
    fn decodes_table_rows() {
        let t: Table = response(r#"{"columnNames":["id"],"rows":[["a"],["b"]]}"#)
            .json()
            .unwrap();
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn bad_json_is_decode_error() {
        let err = response("<html>").json::<Count>().unwrap_err();
        assert!(matches!(err, QrsError::Decode { ref path, .. } if path == "/qrs/test"));
    }
}
