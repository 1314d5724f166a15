//! Request schema for create and update.
//!
//! Both operations accept `{personalidade, qtdPernas, acolchoada?}`. The
//! required-field rule is truthiness, not presence: any JSON-falsy value
//! (`null`, `false`, `0`, `0.0`, `""`) counts as missing, whatever its
//! type. Existing clients depend on that, so it is kept as-is.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use cadeira_store::NewCadeira;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ApiError;

/// Body of `POST /cadeiras` and `PUT /cadeiras/:id`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CadeiraPayload {
    #[serde(default, deserialize_with = "truthy_string")]
    pub personalidade: Option<String>,
    #[serde(default, rename = "qtdPernas", deserialize_with = "truthy_i32")]
    pub qtd_pernas: Option<i32>,
    #[serde(default)]
    pub acolchoada: Option<bool>,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Falsy → `None`; a non-empty string → `Some`; anything else is a type error.
fn truthy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    match value {
        Value::String(s) => Ok(Some(s)),
        other => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

/// Falsy → `None`; a non-zero whole number in `i32` range → `Some`.
fn truthy_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
                .map(|f| f as i64)
        })
        .and_then(|n| i32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a 32-bit integer, got {value}")))
}

impl CadeiraPayload {
    fn required(&self) -> Result<(String, i32), ApiError> {
        let personalidade = self.personalidade.as_deref().filter(|p| !p.is_empty());
        let qtd_pernas = self.qtd_pernas.filter(|n| *n != 0);
        match (personalidade, qtd_pernas) {
            (Some(p), Some(n)) => Ok((p.to_string(), n)),
            _ => Err(ApiError::MissingFields),
        }
    }

    /// Columns for an insert. `acolchoada` is stored exactly as sent.
    pub fn for_create(&self) -> Result<NewCadeira, ApiError> {
        let (personalidade, qtd_pernas) = self.required()?;
        Ok(NewCadeira {
            personalidade,
            qtd_pernas,
            acolchoada: self.acolchoada,
        })
    }

    /// Columns for an update. A falsy `acolchoada` (absent, null or
    /// `false`) is written as NULL.
    pub fn for_update(&self) -> Result<NewCadeira, ApiError> {
        let (personalidade, qtd_pernas) = self.required()?;
        Ok(NewCadeira {
            personalidade,
            qtd_pernas,
            acolchoada: self.acolchoada.filter(|padded| *padded),
        })
    }
}

/// JSON extractor for [`CadeiraPayload`] with the API's error mapping.
///
/// A request without a JSON content type, or with an empty body, is read
/// as an empty object, so it fails field validation rather than parsing.
pub struct Payload(pub CadeiraPayload);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Ok(Payload(CadeiraPayload::default()));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
        if bytes.is_empty() {
            return Ok(Payload(CadeiraPayload::default()));
        }
        Json::<CadeiraPayload>::from_bytes(&bytes)
            .map(|Json(payload)| Payload(payload))
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
