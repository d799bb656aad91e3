//! Settings Fixtures

use serde::Deserialize;

use crate::{
    config::StoreConfig,
    fixtures::{
        FixtureError,
        products::{parse_currency, parse_money, parse_percentage},
    },
};

/// Store settings in YAML
#[derive(Debug, Deserialize)]
pub struct SettingsFixture {
    /// ISO currency code (e.g., "USD")
    pub currency: String,

    /// Storefront tax rate (e.g., "8%")
    pub storefront_tax_rate: String,

    /// Manual order tax rate (e.g., "0%")
    pub manual_tax_rate: String,

    /// Default manual shipping fee (e.g., "100.00 USD")
    pub manual_shipping_fee: String,
}

impl TryFrom<SettingsFixture> for StoreConfig {
    type Error = FixtureError;

    fn try_from(fixture: SettingsFixture) -> Result<Self, Self::Error> {
        let currency = parse_currency(&fixture.currency)?;
        let manual_shipping_fee = parse_money(&fixture.manual_shipping_fee)?;

        if manual_shipping_fee.currency() != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                manual_shipping_fee.currency().iso_alpha_code.to_string(),
            ));
        }

        Ok(StoreConfig {
            currency,
            storefront_tax_rate: parse_percentage(&fixture.storefront_tax_rate)?,
            manual_tax_rate: parse_percentage(&fixture.manual_tax_rate)?,
            manual_shipping_fee,
        })
    }
}
