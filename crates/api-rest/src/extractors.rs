//! Request extractors that reject with an `OperationOutcome` instead of plain text.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body decoded with a path to the first bad element.
///
/// Media type and size are enforced by the sanitisation middleware before the handler runs.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

        decode_json(&bytes).map(ApiJson)
    }
}

/// Decode `bytes` as `T`, naming the failing element on error.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::InvalidBody("request body is empty".into()));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        if path.is_empty() || path == "." {
            ApiError::InvalidBody(source.to_string())
        } else {
            ApiError::InvalidBody(format!("{path}: {source}"))
        }
    })
}

/// Query string extractor whose rejection is an `OperationOutcome`.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::PatientReq;

    #[test]
    fn decode_names_the_failing_path() {
        let body = br#"{ "given": ["Ada"], "family": "Lee", "birth_date": 20200101, "gender": "female" }"#;
        let err = decode_json::<PatientReq>(body).err().expect("should reject");
        match err {
            ApiError::InvalidBody(detail) => assert!(detail.starts_with("birth_date"), "{detail}"),
            other => panic!("expected InvalidBody, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_unknown_fields_and_empty_bodies() {
        let body = br#"{ "given": ["Ada"], "family": "Lee", "birth_date": "2020-01-01", "gender": "female", "ssn": "1" }"#;
        assert!(decode_json::<PatientReq>(body).is_err());
        assert!(matches!(
            decode_json::<PatientReq>(b""),
            Err(ApiError::InvalidBody(_))
        ));
    }
}
