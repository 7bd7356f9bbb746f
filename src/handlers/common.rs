use crate::{errors::ApiError, services::ProductPage, ApiResponse};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationErrors};

/// Standard success response
pub fn success_response<T: Serialize>(body: ApiResponse<T>) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(body: ApiResponse<T>) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// JSON body that has been deserialized and passed its `validator` rules.
///
/// Any failure, whether malformed JSON, a wrong type, or a broken rule,
/// becomes a 400 `Validation failed` response listing every problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(validation_messages(&errors)))?;

        Ok(Self(value))
    }
}

/// Query string counterpart of [`ValidatedJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(validation_messages(&errors)))?;

        Ok(Self(value))
    }
}

/// Flattens `validator` errors into `field: message` lines, sorted so the
/// output is stable. Field names are reported the way clients send them.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field = camel_case(field);
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: invalid value ({})", field, error.code),
            })
        })
        .collect();

    messages.sort();
    messages
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Pagination fields added at the top level of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Items on this page
    pub count: usize,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl From<&ProductPage> for PaginationMeta {
    fn from(page: &ProductPage) -> Self {
        Self {
            count: page.products.len(),
            total: page.total,
            page: page.page,
            pages: page.pages(),
        }
    }
}

/// Cart totals added at the top level of the cart listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Body of a successful removal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedEntry {
    pub product_id: String,
    pub user_id: String,
}
