use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::kv_store)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KvEntryDB {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}
