//! The inputs of the new transaction form.

use maud::{Markup, html};
use time::Date;

use crate::{
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::{core::TransactionType, validation::MAX_AMOUNT},
};

/// The initial values of the form.
pub struct TransactionFormDefaults {
    pub transaction_type: TransactionType,
    pub date: Date,
}

fn type_radio(transaction_type: TransactionType, checked: bool) -> Markup {
    let id = format!("transaction-type-{}", transaction_type.as_str());

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type_"
                id=(id)
                type="radio"
                value=(transaction_type.as_str())
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE)
            {
                (transaction_type)
            }
        }
    }
}

/// The type, amount, category, date and description inputs.
///
/// Categories are grouped by the type they are suggested for. The amount
/// is entered as a positive number and gets its sign from the type.
pub fn transaction_form_fields(defaults: &TransactionFormDefaults) -> Markup {
    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for transaction_type in [TransactionType::Expense, TransactionType::Income] {
                    (type_radio(transaction_type, transaction_type == defaults.transaction_type))
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    max=(MAX_AMOUNT)
                    placeholder="0.00"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for transaction_type in [TransactionType::Expense, TransactionType::Income] {
                    optgroup label=(transaction_type)
                    {
                        @for category in transaction_type.categories() {
                            option value=(category) { (category) }
                        }
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
