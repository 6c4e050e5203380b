//! Movements on the organisation's bank accounts.
//!
//! This module contains everything related to movements:
//! - The `Movement` model and `MovementBuilder` for creating movements
//! - Database functions for storing, querying, categorising and splitting movements
//! - View handlers for the movement pages

mod add_page;
mod category_endpoint;
mod core;
mod form;
mod list_page;
mod split;
mod split_page;
mod view_page;

pub use add_page::{add_movement_endpoint, get_add_movement_page};
pub use category_endpoint::set_category_endpoint;
pub use core::{
    Movement, MovementBuilder, MovementId, create_movement, create_movement_table,
    get_all_movements, get_movement, get_movements_by_category, get_movements_by_counter_party,
    set_movement_category,
};
pub use list_page::{get_movements_by_category_page, get_movements_by_iban_page, get_movements_page};
pub use split::{SplitPart, split_movement};
pub use split_page::{get_split_movement_page, split_movement_endpoint};
pub use view_page::get_movement_page;
