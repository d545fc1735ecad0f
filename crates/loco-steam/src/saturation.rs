//! Saturated water/steam properties.
//!
//! Every property is a straight line through two calibration points, 0 bar
//! gauge (~100 °C) and 20 bar gauge (~212 °C). Inputs outside that range
//! extrapolate along the same line; callers clamp where it matters.

use loco_core::lerp;
use loco_core::units::{Density, Pressure, Temperature, celsius, kg_per_m3, to_bar};

/// Upper calibration pressure (bar gauge).
pub const CALIBRATION_PRESSURE_BAR: f64 = 20.0;

const BOILING_POINT_C: (f64, f64) = (99.632, 212.417);
const WATER_DENSITY_KG_M3: (f64, f64) = (958.64, 849.80);
const STEAM_DENSITY_KG_M3: (f64, f64) = (0.5903, 10.042);
const LATENT_HEAT_KJ_KG: (f64, f64) = (2257.6, 1890.0);
const WATER_SPECIFIC_HEAT_KJ_KG_K: (f64, f64) = (3.7697, 3.2713);
const STEAM_SPECIFIC_HEAT_KJ_KG_K: (f64, f64) = (1.5527, 2.1586);

/// Lowest temperature covered by the calibration (boiling point at 0 bar).
pub const MIN_CALIBRATED_TEMP_C: f64 = BOILING_POINT_C.0;
/// Highest temperature covered by the calibration (boiling point at 20 bar).
pub const MAX_CALIBRATED_TEMP_C: f64 = BOILING_POINT_C.1;

#[inline]
fn pressure_ratio(p_bar: f64) -> f64 {
    p_bar / CALIBRATION_PRESSURE_BAR
}

#[inline]
fn along(points: (f64, f64), p_bar: f64) -> f64 {
    lerp(points.0, points.1, pressure_ratio(p_bar))
}

/// Boiling point (°C) at gauge pressure `p_bar`.
pub fn boiling_point(p_bar: f64) -> f64 {
    along(BOILING_POINT_C, p_bar)
}

/// Saturated liquid density (kg/m³).
pub fn water_density(p_bar: f64) -> f64 {
    along(WATER_DENSITY_KG_M3, p_bar)
}

/// Liquid density (kg/m³) indexed by temperature instead of pressure.
pub fn water_density_at_temperature(t_c: f64) -> f64 {
    let t = (t_c - BOILING_POINT_C.0) / (BOILING_POINT_C.1 - BOILING_POINT_C.0);
    lerp(WATER_DENSITY_KG_M3.0, WATER_DENSITY_KG_M3.1, t)
}

/// Saturated vapour density (kg/m³).
pub fn steam_density(p_bar: f64) -> f64 {
    along(STEAM_DENSITY_KG_M3, p_bar)
}

/// Latent heat of vaporization (kJ/kg).
pub fn latent_heat(p_bar: f64) -> f64 {
    along(LATENT_HEAT_KJ_KG, p_bar)
}

/// Liquid specific heat (kJ/(kg·K)).
pub fn water_specific_heat(p_bar: f64) -> f64 {
    along(WATER_SPECIFIC_HEAT_KJ_KG_K, p_bar)
}

/// Vapour specific heat (kJ/(kg·K)).
pub fn steam_specific_heat(p_bar: f64) -> f64 {
    along(STEAM_SPECIFIC_HEAT_KJ_KG_K, p_bar)
}

/// Clamp a temperature into the calibrated range before a density lookup.
pub fn clamp_to_calibration(t_c: f64) -> f64 {
    t_c.clamp(MIN_CALIBRATED_TEMP_C, MAX_CALIBRATED_TEMP_C)
}

pub fn boiling_point_of(p: Pressure) -> Temperature {
    celsius(boiling_point(to_bar(p)))
}

pub fn water_density_of(p: Pressure) -> Density {
    kg_per_m3(water_density(to_bar(p)))
}

pub fn steam_density_of(p: Pressure) -> Density {
    kg_per_m3(steam_density(to_bar(p)))
}

/// All saturation properties at one pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaturationPoint {
    pub pressure_bar: f64,
    pub boiling_point_c: f64,
    pub water_density_kg_m3: f64,
    pub steam_density_kg_m3: f64,
    pub latent_heat_kj_kg: f64,
    pub water_specific_heat: f64,
    pub steam_specific_heat: f64,
}

impl SaturationPoint {
    pub fn at(p_bar: f64) -> Self {
        Self {
            pressure_bar: p_bar,
            boiling_point_c: boiling_point(p_bar),
            water_density_kg_m3: water_density(p_bar),
            steam_density_kg_m3: steam_density(p_bar),
            latent_heat_kj_kg: latent_heat(p_bar),
            water_specific_heat: water_specific_heat(p_bar),
            steam_specific_heat: steam_specific_heat(p_bar),
        }
    }

    /// Water density in kg/L, the unit the boiler level is kept in.
    pub fn water_density_kg_l(&self) -> f64 {
        self.water_density_kg_m3 / 1000.0
    }

    /// Steam density in kg/L.
    pub fn steam_density_kg_l(&self) -> f64 {
        self.steam_density_kg_m3 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loco_core::units::{bar, to_celsius};
    use proptest::prelude::*;

    #[test]
    fn calibration_endpoints() {
        assert!((boiling_point(0.0) - 99.632).abs() < 1e-9);
        assert!((boiling_point(20.0) - 212.417).abs() < 1e-9);
        assert!((water_density(20.0) - 849.80).abs() < 1e-9);
        assert!((steam_density(0.0) - 0.5903).abs() < 1e-9);
        assert!((latent_heat(20.0) - 1890.0).abs() < 1e-9);
    }

    #[test]
    fn midpoint_interpolates() {
        let sat = SaturationPoint::at(10.0);
        assert!((sat.boiling_point_c - (99.632 + 212.417) / 2.0).abs() < 1e-9);
        assert!((sat.latent_heat_kj_kg - (2257.6 + 1890.0) / 2.0).abs() < 1e-9);
        assert!((sat.water_density_kg_l() - (958.64 + 849.80) / 2000.0).abs() < 1e-12);
    }

    #[test]
    fn extrapolates_outside_calibration() {
        assert!(boiling_point(-1.0) < 99.632);
        assert!(boiling_point(25.0) > 212.417);
    }

    #[test]
    fn temperature_indexed_density_matches_pressure_indexed() {
        for p in [0.0, 3.0, 10.0, 17.5, 20.0] {
            let by_t = water_density_at_temperature(boiling_point(p));
            assert!((by_t - water_density(p)).abs() < 1e-9);
        }
    }

    #[test]
    fn clamp_to_calibration_bounds() {
        assert_eq!(clamp_to_calibration(15.0), MIN_CALIBRATED_TEMP_C);
        assert_eq!(clamp_to_calibration(500.0), MAX_CALIBRATED_TEMP_C);
        assert_eq!(clamp_to_calibration(150.0), 150.0);
    }

    #[test]
    fn typed_boiling_point() {
        let t = boiling_point_of(bar(20.0));
        assert!((to_celsius(t) - 212.417).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn monotonic_in_pressure(p1 in 0.0_f64..20.0, dp in 1e-3_f64..20.0) {
            let p2 = (p1 + dp).min(20.0);
            prop_assume!(p2 > p1);
            prop_assert!(boiling_point(p1) < boiling_point(p2));
            prop_assert!(water_density(p1) > water_density(p2));
            prop_assert!(steam_density(p1) < steam_density(p2));
            prop_assert!(latent_heat(p1) > latent_heat(p2));
        }
    }
}
