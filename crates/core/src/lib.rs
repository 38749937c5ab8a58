mod aggregates;
mod context;
mod engine;
mod handlers;
mod params;
mod pricing;
mod reconciler;
mod resolver;
mod volume;

pub use aggregates::{DAY_SECONDS, HOUR_SECONDS};
pub use context::{Bundle, ProtocolTotals};
pub use engine::Engine;
pub use params::{PricingParams, SeedPair};
pub use resolver::{PairIndex, PairResolver};
pub use volume::WhitelistSide;
