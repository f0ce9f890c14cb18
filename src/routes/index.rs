use axum::Json;
use serde::Serialize;

const ENDPOINTS: [(&str, &str); 5] = [
    ("GET /api/students", "List every student"),
    ("GET /api/students/:id", "Get one student"),
    ("POST /api/students", "Create a student from `name` and `email`"),
    ("PUT /api/students/:id", "Merge fields into a student"),
    ("DELETE /api/students/:id", "Delete a student"),
];

#[derive(Debug, Serialize)]
pub struct Banner {
    success: bool,
    message: &'static str,
    version: &'static str,
    endpoints: serde_json::Map<String, serde_json::Value>,
}

pub async fn get_index_route() -> Json<Banner> {
    Json(Banner {
        success: true,
        message: "Students API is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS
            .into_iter()
            .map(|(route, description)| (route.to_string(), description.into()))
            .collect(),
    })
}
