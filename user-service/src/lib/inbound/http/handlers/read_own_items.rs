use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;

pub async fn read_own_items(
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
) -> Result<ApiSuccess<Vec<ItemResponseData>>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        vec![ItemResponseData {
            item_id: "Foo".to_string(),
            owner: identity.username,
        }],
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResponseData {
    pub item_id: String,
    pub owner: String,
}
