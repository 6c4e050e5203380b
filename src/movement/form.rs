//! Form markup shared by the movement pages.

use maud::{Markup, html};

use crate::{
    category::{Category, CategoryId},
    html::FORM_TEXT_INPUT_STYLE,
};

/// A select element for picking one of `categories`, with an empty option for
/// no category.
pub(crate) fn category_select(
    name: &str,
    categories: &[Category],
    selected: Option<CategoryId>,
) -> Markup {
    html! {
        select
            name=(name)
            aria-label="Category"
            class=(FORM_TEXT_INPUT_STYLE)
        {
            option value="" selected[selected.is_none()] { "Uncategorised" }

            @for category in categories {
                option
                    value=(category.id)
                    selected[selected == Some(category.id)]
                {
                    (category.name)
                }
            }
        }
    }
}
