//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The category for money moved into another account of the organisation.
pub const INTERNAL_CREDIT: &str = "Crédit interne";
/// The category for money moved out to another account of the organisation.
pub const INTERNAL_DEBIT: &str = "Débit interne";

/// Whether `category_name` marks a transfer between the organisation's own
/// accounts.
pub fn is_internal_transfer(category_name: &str) -> bool {
    category_name == INTERNAL_CREDIT || category_name == INTERNAL_DEBIT
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a category classifies money coming in or going out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Income, e.g. membership fees or donations.
    Credit,
    /// Expenses, e.g. rent or electricity.
    Debit,
}

impl CategoryKind {
    fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Credit => "credit",
            CategoryKind::Debit => "debit",
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "credit" => Ok(CategoryKind::Credit),
            "debit" => Ok(CategoryKind::Debit),
            other => Err(FromSqlError::Other(
                format!("unknown category kind {other:?}").into(),
            )),
        }
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A category for classifying movements (e.g., 'Cotisations', 'Loyer').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: CategoryName,
    /// Whether the category is for credits or debits.
    pub kind: CategoryKind,
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        category::{CategoryName, INTERNAL_CREDIT, INTERNAL_DEBIT, is_internal_transfer},
    };

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryName::new("\n\t \r"), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_name() {
        assert_eq!(CategoryName::new("  Loyer ").unwrap().as_ref(), "Loyer");
    }

    #[test]
    fn internal_transfer_names_are_recognised() {
        assert!(is_internal_transfer(INTERNAL_CREDIT));
        assert!(is_internal_transfer(INTERNAL_DEBIT));
        assert!(!is_internal_transfer("Sales"));
        assert!(!is_internal_transfer("crédit interne"));
    }
}
