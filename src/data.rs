use crate::datastore::Database;
use crate::error::StudentsResult;
use serde_json::{Map, Value};

pub mod student;

///a JSON object straight from a request body
pub type FieldMap = Map<String, Value>;

pub trait DataType: Sized {
    type Id: ?Sized;
    type FormForAdding;
    type FormForUpdating;

    async fn get_from_db_by_id(id: &Self::Id, db: &Database) -> StudentsResult<Option<Self>>;
    async fn get_all(db: &Database) -> StudentsResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        db: &Database,
    ) -> StudentsResult<Self>;
    async fn update_in_database(
        id: &Self::Id,
        changes: Self::FormForUpdating,
        db: &Database,
    ) -> StudentsResult<Option<Self>>;
    async fn remove_from_database(id: &Self::Id, db: &Database) -> StudentsResult<Option<Self>>;
}
