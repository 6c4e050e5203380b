//! Splitting a movement into two categorised parts.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    Error,
    category::CategoryId,
    movement::{Movement, MovementBuilder, MovementId, create_movement, get_movement},
};

/// One of the two movements that replace a split movement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SplitPart {
    /// The communication of the new movement.
    pub communication: String,
    /// Non-zero, with the same sign as the split movement.
    pub amount: Decimal,
    /// The category of the new movement, if any.
    pub category_id: Option<CategoryId>,
}

/// Replace the movement `id` with two movements whose amounts add up to the
/// original amount.
///
/// Both parts keep the account, entry date and counter party of the original
/// movement. The original movement, and any subscription attached to it, is
/// deleted. Returns the movement created for `part_one`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid movement,
/// - [Error::InvalidSplit] if a part is zero, has the opposite sign of the
///   original, or the parts do not add up to the original amount,
/// - [Error::InvalidCategory] if a part refers to a category that does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn split_movement(
    id: MovementId,
    part_one: SplitPart,
    part_two: SplitPart,
    connection: &Connection,
) -> Result<Movement, Error> {
    let transaction = connection.unchecked_transaction()?;

    let original = get_movement(id, &transaction)?;
    validate_split(original.amount, part_one.amount, part_two.amount)?;

    let part_one = create_movement(part_from(&original, part_one), &transaction)?;
    create_movement(part_from(&original, part_two), &transaction)?;

    transaction.execute("DELETE FROM movement WHERE id = ?1", [id])?;
    transaction.commit()?;

    Ok(part_one)
}

fn validate_split(original: Decimal, one: Decimal, two: Decimal) -> Result<(), Error> {
    if one.is_zero() || two.is_zero() {
        return Err(Error::InvalidSplit(
            "both parts must have a non-zero amount".to_owned(),
        ));
    }

    let same_sign = |amount: Decimal| (amount > Decimal::ZERO) == (original > Decimal::ZERO);
    if original.is_zero() || !same_sign(one) || !same_sign(two) {
        return Err(Error::InvalidSplit(format!(
            "both parts must have the same sign as {original}"
        )));
    }

    let sum = one.checked_add(two).ok_or_else(|| {
        Error::InvalidSplit(format!("{one} + {two} is too large to be an amount"))
    })?;

    if sum != original {
        return Err(Error::InvalidSplit(format!(
            "{one} + {two} does not add up to {original}"
        )));
    }

    Ok(())
}

fn part_from(original: &Movement, part: SplitPart) -> MovementBuilder {
    let mut builder = Movement::build(
        original.account_id,
        original.entry_date,
        part.amount,
        &part.communication,
    )
    .category_id(part.category_id);
    builder.counter_party_name = original.counter_party_name.clone();
    builder.counter_party_iban = original.counter_party_iban.clone();

    builder
}
