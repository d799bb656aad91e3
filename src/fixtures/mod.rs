//! Fixtures
//!
//! YAML-backed catalog sets. A set named `showroom` is read from
//! `products/showroom.yml`, `shipping/showroom.yml` and
//! `settings/showroom.yml` under the base path.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{
        Cart, CartError,
        selection::{SelectionError, check_selection},
    },
    config::StoreConfig,
    fixtures::{products::ProductsFixture, settings::SettingsFixture, shipping::ShippingFixture},
    products::{Product, ProductError, ProductKey, VariationId},
    shipping::{ShippingArea, ShippingMethod, ShippingRate},
};

pub mod products;
pub mod settings;
pub mod shipping;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid weight
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Shipping area not found
    #[error("Shipping area not found: {0}")]
    AreaNotFound(String),

    /// Shipping method is malformed
    #[error("Invalid shipping method: {0}")]
    InvalidShippingMethod(String),

    /// Product data failed validation
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Currency mismatch between catalog records
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Cart item selection is incomplete
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Cart could not be built
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products by generated key
    product_meta: SlotMap<ProductKey, Product<'a>>,

    /// Product id -> `SlotMap` key
    product_keys: FxHashMap<String, ProductKey>,

    /// Shipping areas, in file order
    areas: Vec<ShippingArea>,

    /// Shipping methods, in file order
    methods: Vec<ShippingMethod<'a>>,

    /// Store settings, if loaded
    config: Option<StoreConfig>,

    /// Currency for the catalog set
    currency: Option<&'static Currency>,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty catalog with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_meta: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            areas: Vec::new(),
            methods: Vec::new(),
            config: None,
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product is
    /// invalid, or if currencies are mixed.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in fixture.into_entries()? {
            let product = product_fixture.try_into_product(&key)?;

            self.observe_currency(product.currency())?;

            let product_key = self.product_meta.insert(product);

            self.product_keys.insert(key, product_key);
        }

        debug!(set = name, products = self.product_keys.len(), "loaded products");

        Ok(self)
    }

    /// Load shipping areas and methods from a YAML fixture file
    ///
    /// Methods may only reference known areas, and products already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a method is
    /// malformed or references unknown records, or if currencies are mixed.
    pub fn load_shipping(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ShippingFixture = self.read("shipping", name)?;

        self.areas
            .extend(fixture.areas.into_iter().map(ShippingArea::from));

        for method_fixture in fixture.methods {
            let method = ShippingMethod::try_from(method_fixture)?;

            if let Some(area) = method
                .area_ids
                .iter()
                .find(|area| !self.areas.iter().any(|known| &known.id == *area))
            {
                return Err(FixtureError::AreaNotFound(area.to_string()));
            }

            if let Some(product) = method
                .product_ids
                .iter()
                .find(|product| !self.product_keys.contains_key(product.as_str()))
            {
                return Err(FixtureError::ProductNotFound(product.to_string()));
            }

            match &method.rate {
                ShippingRate::Flat(rate) => self.observe_currency(rate.currency())?,
                ShippingRate::Weight(tiers) => {
                    for tier in tiers {
                        self.observe_currency(tier.cost.currency())?;
                    }
                }
            }

            self.methods.push(method);
        }

        debug!(
            set = name,
            areas = self.areas.len(),
            methods = self.methods.len(),
            "loaded shipping"
        );

        Ok(self)
    }

    /// Load store settings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its
    /// currency differs from the catalog's.
    pub fn load_settings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: SettingsFixture = self.read("settings", name)?;
        let config = StoreConfig::try_from(fixture)?;

        self.observe_currency(config.currency)?;
        self.config = Some(config);

        Ok(self)
    }

    /// Load a complete catalog set (products, shipping and settings with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut catalog = Self::new();

        catalog
            .load_products(name)?
            .load_shipping(name)?
            .load_settings(name)?;

        Ok(catalog)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.product_meta
            .get(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product's `SlotMap` key by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// All loaded products
    pub fn products(&self) -> impl Iterator<Item = &Product<'a>> {
        self.product_meta.values()
    }

    /// Get a shipping area by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the area is not found.
    pub fn area(&self, id: &str) -> Result<&ShippingArea, FixtureError> {
        self.areas
            .iter()
            .find(|area| area.id.as_str() == id)
            .ok_or_else(|| FixtureError::AreaNotFound(id.to_string()))
    }

    /// All shipping areas
    pub fn areas(&self) -> &[ShippingArea] {
        &self.areas
    }

    /// All shipping methods, in the order they are offered
    pub fn methods(&self) -> &[ShippingMethod<'a>] {
        &self.methods
    }

    /// Store settings, falling back to defaults in the catalog currency
    ///
    /// # Errors
    ///
    /// Returns an error if neither settings nor products have been loaded.
    pub fn config(&self) -> Result<StoreConfig, FixtureError> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }

        let currency = self.currency()?;
        let defaults = StoreConfig::default();

        Ok(StoreConfig {
            currency,
            manual_shipping_fee: Money::from_minor(
                defaults.manual_shipping_fee.to_minor_units(),
                currency,
            ),
            ..defaults
        })
    }

    /// Build a cart from `product` or `product:variation` keys, one unit per key.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is unknown, a variation selection is
    /// missing or unknown, or the cart rejects a line.
    pub fn cart<S: AsRef<str>>(&self, keys: &[S]) -> Result<Cart<'a>, FixtureError> {
        let mut cart = Cart::new(self.currency()?);

        for key in keys {
            let (product_id, variation_id) = match key.as_ref().split_once(':') {
                Some((product_id, variation_id)) => {
                    (product_id, Some(VariationId::new(variation_id)))
                }
                None => (key.as_ref(), None),
            };

            let product = self.product(product_id)?;

            check_selection(product, variation_id.as_ref())?;

            cart.add_line(product, variation_id.as_ref())?;
        }

        Ok(cart)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing priced has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        category: &str,
        name: &str,
    ) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    fn observe_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::{GBP, USD};
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    const PRODUCTS: &str = "products:\n  \
        sofa:\n    name: Sofa\n    price: 900.00 USD\n    weight: 40\n  \
        chair:\n    name: Chair\n    price: 120.00 USD\n    weight: 6\n    \
          variations:\n      \
            - { id: oak, type: Finish, value: Oak }\n      \
            - { id: walnut, type: Finish, value: Walnut, price: 140.00 USD }\n";

    const SHIPPING: &str = "areas:\n  \
        - { id: metro, name: Metro }\n\
        methods:\n  \
        - { id: standard, name: Standard, areas: [metro], flat_rate: 30.00 USD }\n";

    #[test]
    fn catalog_from_showroom_set_loads_everything() -> TestResult {
        let catalog = Catalog::from_set("showroom")?;

        assert!(catalog.products().count() > 0);
        assert!(!catalog.areas().is_empty());
        assert!(!catalog.methods().is_empty());
        assert_eq!(catalog.currency()?, USD);
        assert_eq!(catalog.config()?.currency, USD);

        Ok(())
    }

    #[test]
    fn products_are_listed_in_file_order() -> TestResult {
        let catalog = Catalog::from_set("showroom")?;

        let ids: Vec<&str> = catalog
            .products()
            .map(|product| product.id.as_str())
            .collect();

        assert_eq!(
            ids,
            vec!["side-table", "armchair", "dining-chair", "sofa", "wardrobe"]
        );

        Ok(())
    }

    #[test]
    fn catalog_loads_products_and_shipping() -> TestResult {
        let dir = tempdir()?;
        write_fixture(dir.path(), "products", "small", PRODUCTS)?;
        write_fixture(dir.path(), "shipping", "small", SHIPPING)?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("small")?.load_shipping("small")?;

        assert_eq!(catalog.product("sofa")?.price.to_minor_units(), 90_000);
        assert_eq!(catalog.area("metro")?.name, "Metro");
        assert_eq!(catalog.methods().len(), 1);

        Ok(())
    }

    #[test]
    fn config_defaults_without_settings() -> TestResult {
        let dir = tempdir()?;
        write_fixture(dir.path(), "products", "small", PRODUCTS)?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("small")?;

        assert_eq!(catalog.config()?, StoreConfig::default());

        Ok(())
    }

    #[test]
    fn cart_from_keys_resolves_variations() -> TestResult {
        let dir = tempdir()?;
        write_fixture(dir.path(), "products", "small", PRODUCTS)?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("small")?;

        let cart = catalog.cart(&["sofa", "chair:walnut", "chair:walnut"])?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal()?.to_minor_units(), 90_000 + 2 * 14_000);

        Ok(())
    }

    #[test]
    fn cart_requires_variation_selection() -> TestResult {
        let dir = tempdir()?;
        write_fixture(dir.path(), "products", "small", PRODUCTS)?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("small")?;

        assert!(matches!(
            catalog.cart(&["chair"]),
            Err(FixtureError::Selection(SelectionError::MissingVariationSelection(_)))
        ));
        assert!(matches!(
            catalog.cart(&["chair:pine"]),
            Err(FixtureError::Selection(SelectionError::UnknownVariation(_, _)))
        ));

        Ok(())
    }

    #[test]
    fn shipping_rejects_unknown_area() -> TestResult {
        let dir = tempdir()?;
        write_fixture(
            dir.path(),
            "shipping",
            "broken",
            "methods:\n  - { id: standard, name: Standard, areas: [moon], flat_rate: 30.00 USD }\n",
        )?;

        let mut catalog = Catalog::with_base_path(dir.path());
        let result = catalog.load_shipping("broken");

        assert!(matches!(result, Err(FixtureError::AreaNotFound(area)) if area == "moon"));

        Ok(())
    }

    #[test]
    fn load_products_rejects_currency_mismatch() -> TestResult {
        let dir = tempdir()?;
        write_fixture(
            dir.path(),
            "products",
            "usd_set",
            "products:\n  lamp:\n    name: Lamp\n    price: 80.00 USD\n",
        )?;
        write_fixture(
            dir.path(),
            "products",
            "gbp_set",
            "products:\n  rug:\n    name: Rug\n    price: 80.00 GBP\n",
        )?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("usd_set")?;

        let result = catalog.load_products("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));
        assert_ne!(catalog.currency()?, GBP);

        Ok(())
    }

    #[test]
    fn product_not_found_returns_error() {
        let catalog = Catalog::new();

        assert!(matches!(
            catalog.product("nonexistent"),
            Err(FixtureError::ProductNotFound(_))
        ));
    }

    #[test]
    fn no_currency_returns_error() {
        let catalog = Catalog::new();

        assert!(matches!(catalog.currency(), Err(FixtureError::NoCurrency)));
    }
}
