//! Categories for classifying movements.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, get_all_categories, get_categories_by_kind,
    get_category, get_category_names_by_id,
};
pub use domain::{
    Category, CategoryId, CategoryKind, CategoryName, INTERNAL_CREDIT, INTERNAL_DEBIT,
    is_internal_transfer,
};
