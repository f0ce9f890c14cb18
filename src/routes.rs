use crate::state::StudentsState;
use axum::{Router, routing::get};
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub mod fallback;
pub mod index;
pub mod students;

use fallback::route_not_found;
use index::get_index_route;
use students::{delete_student, get_student, get_students, post_student, put_student};

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    success: bool,
    data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    success: bool,
    count: usize,
    data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

pub fn router(state: StudentsState) -> Router {
    Router::new()
        .route("/", get(get_index_route).fallback(route_not_found))
        .route(
            "/api/students",
            get(get_students)
                .post(post_student)
                .fallback(route_not_found),
        )
        .route(
            "/api/students/{id}",
            get(get_student)
                .put(put_student)
                .delete(delete_student)
                .fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
