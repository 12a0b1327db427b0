use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

type UserRow = (String, String, String, String, String);

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.role.as_str(),
            format_datetime(&user.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
            params![id.to_string()],
            user_row,
        )
        .optional()?;

    row.map(user_from_row).transpose()
}

pub fn list_users_by_role(conn: &Connection, role: UserRole) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM users
         WHERE role = ?1 ORDER BY name",
    )?;

    let rows = stmt.query_map(params![role.as_str()], user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    let (id, name, email, role, created_at) = row;
    Ok(User {
        id: parse_uuid(&id)?,
        name,
        email,
        role: UserRole::from_str(&role)?,
        created_at: parse_datetime(&created_at),
    })
}
