use crate::{
    data::{DataType, FieldMap},
    datastore::Database,
    error::{InvalidFieldSnafu, MissingFieldSnafu, StudentsResult},
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use snafu::OptionExt;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

///keys a caller can never set through a request body
const SERVER_OWNED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Identifier of a [`Student`].
///
/// New ids are always UUID strings, but a hand-edited datastore may hold numbers (or anything
/// else), so lookups go through [`StudentId::matches`] which compares string forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Text(String),
    Number(Number),
    Other(Value),
}

impl Default for StudentId {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl StudentId {
    pub fn generate() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }

    pub fn matches(&self, requested: &str) -> bool {
        match self {
            Self::Text(id) => id == requested,
            Self::Number(id) => id.to_string() == requested,
            Self::Other(Value::Bool(id)) => id.to_string() == requested,
            Self::Other(_) => false,
        }
    }

    fn is_missing(&self) -> bool {
        matches!(self, Self::Other(Value::Null))
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(id) => f.write_str(id),
            Self::Number(id) => write!(f, "{id}"),
            Self::Other(id) => write!(f, "{id}"),
        }
    }
}

/// One stored record.
///
/// Everything is optional on the way in so that a seeded or hand-edited record can't make the
/// whole datastore unreadable. Records created through the API always carry every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, skip_serializing_if = "StudentId::is_missing")]
    pub id: StudentId,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub name: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub email: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    ///anything else a caller sent along
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Student {
    ///shallow merge, `changes` wins on collisions
    pub fn apply(&mut self, changes: StudentPatch, now: Timestamp) {
        let StudentPatch { name, email, extra } = changes;

        if let Some(name) = name {
            self.name = Value::String(name);
        }
        if let Some(email) = email {
            self.email = Value::String(email);
        }
        self.extra.extend(extra);
        self.updated_at = Some(now);
    }
}

///a validated creation request
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub extra: FieldMap,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId, created_at: Timestamp) -> Student {
        Student {
            id,
            name: Value::String(self.name),
            email: Value::String(self.email),
            created_at: Some(created_at),
            updated_at: None,
            extra: self.extra,
        }
    }
}

impl TryFrom<FieldMap> for NewStudent {
    type Error = crate::error::StudentsError;

    fn try_from(mut payload: FieldMap) -> StudentsResult<Self> {
        let name = take_text(&mut payload, "name")?
            .filter(|name| !name.trim().is_empty())
            .context(MissingFieldSnafu { field: "name" })?;
        let email = take_text(&mut payload, "email")?
            .filter(|email| !email.trim().is_empty())
            .context(MissingFieldSnafu { field: "email" })?;

        Ok(Self {
            name,
            email,
            extra: strip_server_owned(payload),
        })
    }
}

///a validated set of changes to an existing [`Student`]
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub extra: FieldMap,
}

impl TryFrom<FieldMap> for StudentPatch {
    type Error = crate::error::StudentsError;

    fn try_from(mut payload: FieldMap) -> StudentsResult<Self> {
        let name = take_text(&mut payload, "name")?;
        let email = take_text(&mut payload, "email")?;

        if payload.contains_key("id") {
            debug!("Ignoring `id` in update payload");
        }

        Ok(Self {
            name,
            email,
            extra: strip_server_owned(payload),
        })
    }
}

///`None` if absent or null, an error if present but not a string
fn take_text(payload: &mut FieldMap, field: &'static str) -> StudentsResult<Option<String>> {
    match payload.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => InvalidFieldSnafu {
            field,
            expected: "a string",
        }
        .fail(),
    }
}

fn strip_server_owned(mut payload: FieldMap) -> FieldMap {
    for field in SERVER_OWNED_FIELDS {
        payload.remove(field);
    }
    payload
}

fn position_of(students: &[Student], id: &str) -> Option<usize> {
    students.iter().position(|student| student.id.matches(id))
}

impl DataType for Student {
    type Id = str;
    type FormForAdding = NewStudent;
    type FormForUpdating = StudentPatch;

    async fn get_from_db_by_id(id: &Self::Id, db: &Database) -> StudentsResult<Option<Self>> {
        let mut students = db.read().await?.students;
        Ok(position_of(&students, id).map(|index| students.swap_remove(index)))
    }

    async fn get_all(db: &Database) -> StudentsResult<Vec<Self>> {
        Ok(db.read().await?.students)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        db: &Database,
    ) -> StudentsResult<Self> {
        let student = to_be_added.into_student(StudentId::generate(), Timestamp::now());

        db.update(|doc| {
            doc.students.push(student.clone());
            Some(())
        })
        .await?;

        info!(id = %student.id, "Created student");
        Ok(student)
    }

    async fn update_in_database(
        id: &Self::Id,
        changes: Self::FormForUpdating,
        db: &Database,
    ) -> StudentsResult<Option<Self>> {
        let updated = db
            .update(|doc| {
                let index = position_of(&doc.students, id)?;
                let student = &mut doc.students[index];
                student.apply(changes, Timestamp::now());
                Some(student.clone())
            })
            .await?;

        if updated.is_some() {
            info!(%id, "Updated student");
        }
        Ok(updated)
    }

    async fn remove_from_database(id: &Self::Id, db: &Database) -> StudentsResult<Option<Self>> {
        let removed = db
            .update(|doc| {
                let index = position_of(&doc.students, id)?;
                Some(doc.students.remove(index))
            })
            .await?;

        if removed.is_some() {
            info!(%id, "Deleted student");
        }
        Ok(removed)
    }
}
