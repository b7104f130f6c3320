//! Unit-of-material calculators.
//!
//! Pure arithmetic for the storefront's "how much do I need" widgets.
//! All inputs are metres / square metres.

use rust_decimal::prelude::*;
use serde::Serialize;

use crate::{CatalogError, Result};

/// Round to `places` using banker's rounding.
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

fn require_non_negative(name: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(CatalogError::InvalidMeasurement(format!("{name} must not be negative")));
    }
    Ok(())
}

fn require_positive(name: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(CatalogError::InvalidMeasurement(format!("{name} must be greater than zero")));
    }
    Ok(())
}

fn out_of_range(name: &str) -> CatalogError {
    CatalogError::InvalidMeasurement(format!("{name} is out of range"))
}

fn ceil_to_u32(name: &str, value: Decimal) -> Result<u32> {
    value
        .ceil()
        .to_u32()
        .ok_or_else(|| out_of_range(name))
}

/// Units (boxes, panels, tins) needed to cover `area_m2`, including waste.
///
/// `ceil(area * (1 + waste / 100) / coverage_per_unit)`
pub fn coverage_units(area_m2: Decimal, coverage_per_unit_m2: Decimal, waste_percent: Decimal) -> Result<u32> {
    require_non_negative("area", area_m2)?;
    require_positive("coverage per unit", coverage_per_unit_m2)?;
    require_non_negative("waste", waste_percent)?;
    let waste_factor = Decimal::ONE
        .checked_add(waste_percent / Decimal::ONE_HUNDRED)
        .ok_or_else(|| out_of_range("waste"))?;
    let units = area_m2
        .checked_mul(waste_factor)
        .and_then(|gross| gross.checked_div(coverage_per_unit_m2))
        .ok_or_else(|| out_of_range("units"))?;
    ceil_to_u32("units", units)
}

/// Wall surface minus doors and windows, never below zero.
pub fn wall_area(perimeter_m: Decimal, height_m: Decimal, openings_m2: Decimal) -> Result<Decimal> {
    require_non_negative("perimeter", perimeter_m)?;
    require_non_negative("height", height_m)?;
    require_non_negative("openings", openings_m2)?;
    let gross = perimeter_m.checked_mul(height_m).ok_or_else(|| out_of_range("wall area"))?;
    Ok((gross - openings_m2).max(Decimal::ZERO))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WallpaperEstimate {
    pub strips_needed: u32,
    pub strips_per_roll: u32,
    pub rolls: u32,
}

/// Rolls of wallpaper for a room.
///
/// Each strip spans the wall height plus one pattern repeat; a roll yields
/// as many whole strips as fit in its length.
pub fn wallpaper_rolls(
    perimeter_m: Decimal,
    height_m: Decimal,
    roll_width_m: Decimal,
    roll_length_m: Decimal,
    pattern_repeat_m: Decimal,
) -> Result<WallpaperEstimate> {
    require_non_negative("perimeter", perimeter_m)?;
    require_positive("height", height_m)?;
    require_positive("roll width", roll_width_m)?;
    require_positive("roll length", roll_length_m)?;
    require_non_negative("pattern repeat", pattern_repeat_m)?;

    let strip_length = height_m.checked_add(pattern_repeat_m).ok_or_else(|| out_of_range("strip length"))?;
    let strips_per_roll = roll_length_m
        .checked_div(strip_length)
        .ok_or_else(|| out_of_range("strips per roll"))?
        .floor()
        .to_u32()
        .unwrap_or(u32::MAX);
    if strips_per_roll == 0 {
        return Err(CatalogError::InvalidMeasurement("roll is shorter than one strip".to_string()));
    }
    let strips = perimeter_m.checked_div(roll_width_m).ok_or_else(|| out_of_range("strips"))?;
    let strips_needed = ceil_to_u32("strips", strips)?;
    let rolls = strips_needed.div_ceil(strips_per_roll);

    Ok(WallpaperEstimate { strips_needed, strips_per_roll, rolls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_bankers() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
    }

    #[test]
    fn test_coverage_units() {
        // 20 m2 + 10% waste = 22 m2, 2.5 m2 per box => 8.8 => 9 boxes
        assert_eq!(coverage_units(dec!(20), dec!(2.5), dec!(10)).unwrap(), 9);
        assert_eq!(coverage_units(dec!(10), dec!(2.5), dec!(0)).unwrap(), 4);
        assert_eq!(coverage_units(dec!(0), dec!(2.5), dec!(10)).unwrap(), 0);
    }

    #[test]
    fn test_coverage_units_rejects_bad_input() {
        assert!(matches!(coverage_units(dec!(10), dec!(0), dec!(0)), Err(CatalogError::InvalidMeasurement(_))));
        assert!(matches!(coverage_units(dec!(-1), dec!(1), dec!(0)), Err(CatalogError::InvalidMeasurement(_))));
        assert!(matches!(coverage_units(dec!(1), dec!(1), dec!(-5)), Err(CatalogError::InvalidMeasurement(_))));
    }

    #[test]
    fn test_wall_area() {
        assert_eq!(wall_area(dec!(14), dec!(2.5), dec!(4)).unwrap(), dec!(31));
        assert_eq!(wall_area(dec!(1), dec!(1), dec!(5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_wallpaper_rolls() {
        // 10 m roll, 2.5 m wall + 0.5 m repeat => 3 strips per roll
        // 14 m perimeter / 0.53 m width => 26.4 => 27 strips => 9 rolls
        let estimate = wallpaper_rolls(dec!(14), dec!(2.5), dec!(0.53), dec!(10), dec!(0.5)).unwrap();
        assert_eq!(estimate, WallpaperEstimate { strips_needed: 27, strips_per_roll: 3, rolls: 9 });
    }

    #[test]
    fn test_wallpaper_roll_too_short() {
        assert!(matches!(
            wallpaper_rolls(dec!(10), dec!(3), dec!(0.5), dec!(2), dec!(0)),
            Err(CatalogError::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_overflowing_inputs_are_rejected() {
        assert!(matches!(coverage_units(dec!(1e19), dec!(1e-10), dec!(0)), Err(CatalogError::InvalidMeasurement(_))));
        assert!(matches!(coverage_units(Decimal::MAX, dec!(1), dec!(50)), Err(CatalogError::InvalidMeasurement(_))));
        assert!(matches!(wall_area(dec!(1e19), dec!(1e19), dec!(0)), Err(CatalogError::InvalidMeasurement(_))));
        assert!(matches!(
            wallpaper_rolls(Decimal::MAX, Decimal::MAX, dec!(1e-20), Decimal::MAX, Decimal::MAX),
            Err(CatalogError::InvalidMeasurement(_))
        ));
        assert!(matches!(
            wallpaper_rolls(dec!(1e20), dec!(2.5), dec!(1e-20), dec!(10), dec!(0)),
            Err(CatalogError::InvalidMeasurement(_))
        ));
    }
}
