//! Receipt
//!
//! Plain-text tables for orders, order totals and shipping quotes.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    orders::{Order, OrderTotals},
    shipping::{Eligibility, ShippingQuote, UnavailableReason},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

impl Order<'_> {
    /// Write the order header, its lines and its totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let customer = self.customer();
        let address = self.shipping_address();

        writeln!(out, "\n Order {} ({})", self.id(), self.context()).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Placed:   {}", self.placed_at()).map_err(|_err| ReceiptError::IO)?;
        writeln!(
            out,
            " Status:   {} / {}",
            self.status(),
            self.payment_status()
        )
        .map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Customer: {} <{}>", customer.name, customer.email)
            .map_err(|_err| ReceiptError::IO)?;
        writeln!(
            out,
            " Ship to:  {}, {} {} [{}]",
            address.line1, address.city, address.postcode, address.area
        )
        .map_err(|_err| ReceiptError::IO)?;

        if let Some(method) = self.shipping_method() {
            writeln!(out, " Shipping: {method}").map_err(|_err| ReceiptError::IO)?;
        }

        let mut builder = Builder::default();

        builder.push_record(["Item", "Option", "Model", "Unit Price", "Qty", "Total"]);

        for line in self.lines() {
            let option = line
                .variation
                .as_ref()
                .map(|variation| format!("{}: {}", variation.kind, variation.value))
                .unwrap_or_default();

            builder.push_record([
                line.product_name.clone(),
                option,
                line.model_number.clone().unwrap_or_default(),
                line.unit_price.to_string(),
                line.quantity.to_string(),
                line.total.to_string(),
            ]);
        }

        write_table(&mut out, builder, 3)?;

        self.totals().write_to(out)
    }
}

impl OrderTotals<'_> {
    /// Write subtotal, shipping, tax and total as an aligned summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let tax_label = format!("Tax ({:.2}%):", percent_points(self.tax_rate));

        let rows = [
            ("Subtotal:", self.subtotal.to_string()),
            ("Shipping:", self.shipping_cost.to_string()),
            (tax_label.as_str(), self.tax.to_string()),
            ("Total:", self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

impl ShippingQuote<'_> {
    /// Write every priced method, followed by methods that could not be priced.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(
            out,
            "\n Shipping to {} for {}kg",
            self.destination(),
            self.weight().normalize()
        )
        .map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["Method", "Match", "Rate", "Surcharge", "Cost", "Note"]);

        for option in self.options() {
            let matched = match option.eligibility {
                Eligibility::Area => "area",
                Eligibility::Global => "global",
            };

            let note = if option.tier_overflow {
                "above highest tier"
            } else {
                ""
            };

            builder.push_record([
                option.name.clone(),
                matched.to_string(),
                option.method_cost.to_string(),
                option.surcharge.to_string(),
                option.cost.to_string(),
                note.to_string(),
            ]);
        }

        write_table(&mut out, builder, 2)?;

        for unavailable in self.unavailable() {
            let reason = match unavailable.reason {
                UnavailableReason::NoWeightTiers => "no weight tiers configured".to_string(),
                UnavailableReason::WeightOutsideTiers(weight) => {
                    format!("{}kg is outside its weight tiers", weight.normalize())
                }
            };

            writeln!(out, " Unavailable: {} ({reason})", unavailable.name)
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Render a table with a bold header and right-aligned money columns from
/// `first_amount_column` up to the last three columns.
fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    first_amount_column: usize,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(
        Columns::new(first_amount_column..first_amount_column + 3),
        Alignment::right(),
    );

    writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)
}

/// Tax rates are stored as fractions; receipts show percent points.
fn percent_points(rate: Percentage) -> Decimal {
    ((rate * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
