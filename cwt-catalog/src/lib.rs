pub mod pricing;
pub mod tariff;

pub use pricing::{PriceEngine, PriceError, PricingRules, Quote};
pub use tariff::{AddOnCatalog, ShuttleTariff, TourTariff};
