//! Pure formatters for booking and voucher numbers.
//!
//! Both formats are bit-exact external contracts: they appear on printed
//! vouchers and in support conversations. Booking numbers are
//! `PREFIX-YYYY-N` with N rendered without leading zeros; vouchers append
//! `-{S|T}{ordinal}` with ordinals scoped per item type within a booking.
//! Being deterministic is what makes retries safe once a booking number is
//! known.

use crate::line_item::ItemKind;

pub fn booking_number(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{}", prefix, year, sequence)
}

pub fn voucher_number(booking_number: &str, kind: ItemKind, ordinal: u32) -> String {
    format!("{}-{}{}", booking_number, kind.type_tag(), ordinal)
}
