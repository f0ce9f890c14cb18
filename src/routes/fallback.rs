use crate::error::StudentsError;
use axum::extract::OriginalUri;

///anything no other route claimed, whatever the method
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> StudentsError {
    StudentsError::RouteNotFound {
        requested_url: uri.to_string(),
    }
}
