use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use supabase_client_core::ApiResponse;

use crate::error::PostgrestError;
use crate::parts::QueryParts;

/// Result of a successful PostgREST request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestResponse {
    pub status: u16,
    /// Total row count, when one was requested.
    pub count: Option<i64>,
    /// Response body; `Null` for empty (`return=minimal`) responses.
    pub data: JsonValue,
}

impl PostgrestResponse {
    pub(crate) fn from_api(resp: ApiResponse, parts: &QueryParts) -> Result<Self, PostgrestError> {
        if !resp.is_success() {
            return Err(PostgrestError::from_response(&resp));
        }
        let count = parse_count_from_headers(&resp.headers);
        let mut data = if resp.body.is_empty() {
            JsonValue::Null
        } else {
            resp.json::<JsonValue>()?
        };

        if parts.maybe_single {
            data = match data {
                JsonValue::Array(mut rows) => match rows.len() {
                    0 => JsonValue::Null,
                    1 => rows.remove(0),
                    n => return Err(PostgrestError::NotSingle(n)),
                },
                other => other,
            };
        }

        Ok(Self {
            status: resp.status,
            count,
            data,
        })
    }

    /// Deserialize the rows. A single object yields one row.
    pub fn rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, PostgrestError> {
        match &self.data {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(_) => Ok(serde_json::from_value(self.data.clone())?),
            other => Ok(vec![serde_json::from_value(other.clone())?]),
        }
    }

    /// Deserialize the whole body.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, PostgrestError> {
        Ok(serde_json::from_value(self.data)?)
    }
}

// PostgREST returns the count in Content-Range: "0-9/100" or "*/100".
fn parse_count_from_headers(headers: &HeaderMap) -> Option<i64> {
    let range = headers.get("content-range")?.to_str().ok()?;
    let (_, total) = range.rsplit_once('/')?;
    total.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::Operation;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn response(status: u16, body: &str, range: Option<&str>) -> ApiResponse {
        let mut headers = HeaderMap::new();
        if let Some(range) = range {
            headers.insert("content-range", HeaderValue::from_str(range).unwrap());
        }
        ApiResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct City {
        name: String,
    }

    #[test]
    fn parses_rows_and_count() {
        let parts = QueryParts::new("cities", Operation::Select);
        let resp = PostgrestResponse::from_api(
            response(200, r#"[{"name":"Paris"},{"name":"Lyon"}]"#, Some("0-1/42")),
            &parts,
        )
        .unwrap();
        assert_eq!(resp.count, Some(42));
        let cities: Vec<City> = resp.rows().unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].name, "Lyon");
    }

    #[test]
    fn unknown_total_is_none() {
        let parts = QueryParts::new("cities", Operation::Select);
        let resp =
            PostgrestResponse::from_api(response(200, "[]", Some("0-9/*")), &parts).unwrap();
        assert_eq!(resp.count, None);
    }

    #[test]
    fn empty_body_is_null() {
        let parts = QueryParts::new("cities", Operation::Delete);
        let resp = PostgrestResponse::from_api(response(204, "", None), &parts).unwrap();
        assert_eq!(resp.status, 204);
        assert!(resp.data.is_null());
        assert!(resp.rows::<City>().unwrap().is_empty());
    }

    #[test]
    fn maybe_single_unwraps_or_rejects() {
        let mut parts = QueryParts::new("cities", Operation::Select);
        parts.maybe_single = true;

        let one = PostgrestResponse::from_api(response(200, r#"[{"name":"Nice"}]"#, None), &parts)
            .unwrap();
        assert_eq!(one.into_data::<City>().unwrap().name, "Nice");

        let two = PostgrestResponse::from_api(response(200, "[1,2]", None), &parts);
        assert!(matches!(two, Err(PostgrestError::NotSingle(2))));
    }

    #[test]
    fn error_status_becomes_api_error() {
        let parts = QueryParts::new("cities", Operation::Select);
        let err = PostgrestResponse::from_api(
            response(401, r#"{"message":"JWT expired","code":"PGRST301"}"#, None),
            &parts,
        )
        .unwrap_err();
        assert!(matches!(err, PostgrestError::Api { status: 401, .. }));
    }
}
