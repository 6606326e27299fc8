//! Diesel row models for tracker persistence.

use super::schema::{boards, tasks, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    /// Autoincrement key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Soft-delete flag.
    pub active: bool,
}

/// Column values written for user records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserValues<'a> {
    /// Display name.
    pub name: &'a str,
    /// Soft-delete flag.
    pub active: bool,
}

/// Query result row for board records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BoardRow {
    /// Autoincrement key.
    pub id: i64,
    /// Board title.
    pub title: String,
    /// Soft-delete flag.
    pub active: bool,
}

/// Column values written for board records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = boards)]
pub struct BoardValues<'a> {
    /// Board title.
    pub title: &'a str,
    /// Soft-delete flag.
    pub active: bool,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    /// Autoincrement key.
    pub id: i64,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Stage code.
    pub stage: String,
    /// Difficulty score.
    pub difficulty: Option<i64>,
    /// Assignee key.
    pub assigned_user: Option<i64>,
    /// Due date (UTC).
    pub due_date: Option<NaiveDateTime>,
    /// Soft-delete flag.
    pub active: bool,
    /// Owning board key.
    pub board_id: i64,
}

/// Column values written for task records.
///
/// `None` clears the column on update rather than leaving it untouched.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskValues<'a> {
    /// Task title.
    pub title: &'a str,
    /// Task description.
    pub description: &'a str,
    /// Stage code.
    pub stage: &'a str,
    /// Difficulty score.
    pub difficulty: Option<i64>,
    /// Assignee key.
    pub assigned_user: Option<i64>,
    /// Due date (UTC).
    pub due_date: Option<NaiveDateTime>,
    /// Soft-delete flag.
    pub active: bool,
    /// Owning board key.
    pub board_id: i64,
}
