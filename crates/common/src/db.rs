//! Database error classification
//!
//! Postgres reports failures with a five character SQLSTATE code. The
//! helpers here look for a `sqlx::Error` anywhere in an error chain and
//! compare its code, so repositories can branch on constraint semantics
//! before turning the failure into an application [`Error`].

use std::error::Error as StdError;

use crate::error::{chain, Code, Error};

/// SQLSTATE codes the classifiers below check for
pub mod sqlstate {
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const EXCLUSION_VIOLATION: &str = "23P01";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
}

fn find_sqlx<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a sqlx::Error> {
    chain(err).find_map(|e| e.downcast_ref::<sqlx::Error>())
}

/// SQLSTATE of the first database error in the chain
pub fn sqlstate(err: &(dyn StdError + 'static)) -> Option<String> {
    match find_sqlx(err)? {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Whether `err` carries a database error with one of `codes`.
///
/// Always false for an empty code list.
pub fn is_pg_error(err: &(dyn StdError + 'static), codes: &[&str]) -> bool {
    if codes.is_empty() {
        return false;
    }

    sqlstate(err).is_some_and(|code| codes.contains(&code.as_str()))
}

/// UNIQUE constraint violation (23505)
pub fn is_unique_violation(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::UNIQUE_VIOLATION])
}

/// Foreign key violation (23503)
pub fn is_foreign_key_violation(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::FOREIGN_KEY_VIOLATION])
}

/// NOT NULL constraint violation (23502)
pub fn is_not_null_violation(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::NOT_NULL_VIOLATION])
}

/// CHECK constraint violation (23514)
pub fn is_check_violation(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::CHECK_VIOLATION])
}

/// Exclusion constraint violation (23P01)
pub fn is_exclusion_violation(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::EXCLUSION_VIOLATION])
}

/// Transaction serialization failure (40001)
pub fn is_serialization_failure(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::SERIALIZATION_FAILURE])
}

/// Deadlock detected (40P01)
pub fn is_deadlock_detected(err: &(dyn StdError + 'static)) -> bool {
    is_pg_error(err, &[sqlstate::DEADLOCK_DETECTED])
}

/// Query expected a row and got none
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    matches!(find_sqlx(err), Some(sqlx::Error::RowNotFound))
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        let code = if is_not_found(&err) {
            Code::NotFound
        } else if is_pg_error(
            &err,
            &[sqlstate::UNIQUE_VIOLATION, sqlstate::EXCLUSION_VIOLATION],
        ) {
            Code::Conflict
        } else if is_pg_error(
            &err,
            &[
                sqlstate::FOREIGN_KEY_VIOLATION,
                sqlstate::NOT_NULL_VIOLATION,
                sqlstate::CHECK_VIOLATION,
            ],
        ) {
            Code::Invalid
        } else {
            Code::Internal
        };

        Error::wrap(err).with_code(code)
    }
}
