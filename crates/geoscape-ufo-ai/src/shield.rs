//! Shield regeneration.

use geoscape_core::constants::{SHIELD_RECHARGE_INFINITE, SHIELD_UNINITIALIZED};
use geoscape_core::dice::Dice;

/// Shield value after one 5-second tick.
///
/// An uninitialised shield fills to capacity. An infinite rate refills
/// instantly. Otherwise the rate is in hundredths of a point: the whole part is
/// added, and the remainder is the percent chance of one extra point.
pub fn recharge(shield: i32, capacity: i32, rate: i32, dice: &mut impl Dice) -> i32 {
    if shield == SHIELD_UNINITIALIZED || rate == SHIELD_RECHARGE_INFINITE {
        return capacity;
    }
    if shield >= capacity || rate <= 0 {
        return shield.min(capacity);
    }
    let mut gained = rate / 100;
    if dice.percent((rate % 100) as u32) {
        gained += 1;
    }
    (shield + gained).min(capacity)
}
