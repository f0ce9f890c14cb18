use crate::{
    data::{
        DataType, FieldMap,
        student::{NewStudent, Student, StudentPatch},
    },
    error::{InvalidBodySnafu, MissingStudentSnafu, StudentsResult},
    routes::{DataResponse, ListResponse},
    state::StudentsState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::{OptionExt, ResultExt};

///request bodies have to be JSON objects
fn field_map(body: Result<Json<FieldMap>, JsonRejection>) -> StudentsResult<FieldMap> {
    body.map(|Json(fields)| fields).context(InvalidBodySnafu)
}

pub async fn get_students(
    State(state): State<StudentsState>,
) -> StudentsResult<Json<ListResponse<Student>>> {
    let students = Student::get_all(&state).await?;
    Ok(Json(ListResponse::new(students)))
}

pub async fn get_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
) -> StudentsResult<Json<DataResponse<Student>>> {
    let student = Student::get_from_db_by_id(&id, &state)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Json(DataResponse::new(student)))
}

pub async fn post_student(
    State(state): State<StudentsState>,
    body: Result<Json<FieldMap>, JsonRejection>,
) -> StudentsResult<(StatusCode, Json<DataResponse<Student>>)> {
    //validation must happen before the datastore is touched
    let new_student = NewStudent::try_from(field_map(body)?)?;

    let student = Student::insert_into_database(new_student, &state).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(student))))
}

pub async fn put_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
    body: Result<Json<FieldMap>, JsonRejection>,
) -> StudentsResult<Json<DataResponse<Student>>> {
    let changes = StudentPatch::try_from(field_map(body)?)?;

    let student = Student::update_in_database(&id, changes, &state)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Json(DataResponse::new(student)))
}

pub async fn delete_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
) -> StudentsResult<Json<DataResponse<Student>>> {
    let student = Student::remove_from_database(&id, &state)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Json(DataResponse::new(student)))
}
