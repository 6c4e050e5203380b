//! Bank accounts that movements are posted to.

mod core;

pub use core::{
    Account, AccountId, create_account, create_account_table, get_account, get_all_accounts,
};
