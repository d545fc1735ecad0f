//! Ideal-gas treatment of the steam space.
//!
//! Pressures here follow the boiler convention and are read as gauge bar.

use loco_core::units::constants::CELSIUS_TO_KELVIN;

const MOLAR_GAS_CONSTANT: f64 = 8.314_51; // J/(mol·K)
const STEAM_MOLAR_MASS: f64 = 0.018_015_257; // kg/mol
const PASCAL_PER_BAR: f64 = 1.0e5;

/// Specific gas constant of steam, J/(kg·K).
pub const STEAM_GAS_CONSTANT: f64 = MOLAR_GAS_CONSTANT / STEAM_MOLAR_MASS;

/// Steam mass (kg) held at `p_bar` and `t_c` in `volume_m3`.
///
/// Zero for a non-positive volume, pressure or absolute temperature.
pub fn steam_mass_kg(p_bar: f64, volume_m3: f64, t_c: f64) -> f64 {
    let t_k = t_c + CELSIUS_TO_KELVIN;
    if volume_m3 <= 0.0 || p_bar <= 0.0 || t_k <= 0.0 {
        return 0.0;
    }
    p_bar * PASCAL_PER_BAR * volume_m3 / (STEAM_GAS_CONSTANT * t_k)
}

/// Pressure (bar) of `mass_kg` steam at `t_c` in `volume_m3`.
///
/// Zero for a non-positive mass, volume or absolute temperature.
pub fn pressure_bar(mass_kg: f64, volume_m3: f64, t_c: f64) -> f64 {
    let t_k = t_c + CELSIUS_TO_KELVIN;
    if volume_m3 <= 0.0 || mass_kg <= 0.0 || t_k <= 0.0 {
        return 0.0;
    }
    mass_kg * STEAM_GAS_CONSTANT * t_k / volume_m3 / PASCAL_PER_BAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saturation;

    #[test]
    fn gas_constant_value() {
        assert!((STEAM_GAS_CONSTANT - 461.52).abs() < 0.01);
    }

    #[test]
    fn mass_and_pressure_are_inverse() {
        let m = steam_mass_kg(10.0, 1.3, 180.0);
        let p = pressure_bar(m, 1.3, 180.0);
        assert!((p - 10.0).abs() < 1e-9);
    }

    #[test]
    fn roughly_consistent_with_saturation_table() {
        // Ideal gas at the saturation temperature lands within ~10% of the
        // tabulated steam density at working pressures.
        for p in [6.0, 10.0, 14.0, 18.0] {
            let t = saturation::boiling_point(p);
            let rho_ideal = steam_mass_kg(p, 1.0, t);
            let rho_table = saturation::steam_density(p);
            assert!(
                (rho_ideal - rho_table).abs() / rho_table < 0.12,
                "p={p} ideal={rho_ideal} table={rho_table}"
            );
        }
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(steam_mass_kg(0.0, 1.0, 100.0), 0.0);
        assert_eq!(steam_mass_kg(5.0, 0.0, 100.0), 0.0);
        assert_eq!(pressure_bar(0.0, 1.0, 100.0), 0.0);
        assert_eq!(pressure_bar(1.0, -1.0, 100.0), 0.0);
        assert_eq!(pressure_bar(1.0, 1.0, -300.0), 0.0);
    }
}
