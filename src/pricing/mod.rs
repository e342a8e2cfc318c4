//! Price deck adapter: forward curves and scenarios to month-indexed prices

mod deck;
mod policy;

pub use deck::{
    build_monthly_price_deck, parse_month_key, ForwardCurve, MonthKey, MonthlyPrice,
    MonthlyPriceDeck,
};
pub use policy::{PricePolicy, YEAR4_FIRST_MONTH, YEAR4_LAST_MONTH};
