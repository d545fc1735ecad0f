// loco-core/src/units.rs
//
// The simulation works internally in bar (gauge), °C, kg, L, s and kW.
// These helpers convert those plain numbers to and from uom quantities at
// API boundaries.

use uom::si::f64::{
    Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type Mass = UomMass;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn liters(v: f64) -> Volume {
    use uom::si::volume::liter;
    Volume::new::<liter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    p.get::<uom::si::pressure::bar>()
}

#[inline]
pub fn to_celsius(t: Temperature) -> f64 {
    t.get::<uom::si::thermodynamic_temperature::degree_celsius>()
}

#[inline]
pub fn to_liters(v: Volume) -> f64 {
    v.get::<uom::si::volume::liter>()
}

#[inline]
pub fn to_kg(m: Mass) -> f64 {
    m.get::<uom::si::mass::kilogram>()
}

#[inline]
pub fn to_seconds(t: Time) -> f64 {
    t.get::<uom::si::time::second>()
}

pub mod constants {
    /// Offset between the Celsius and Kelvin scales.
    pub const CELSIUS_TO_KELVIN: f64 = 273.15;

    /// km/h in one m/s.
    pub const KMH_PER_MPS: f64 = 3.6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = bar(10.0);
        let _t = celsius(100.0);
        let _m = kg(1.0);
        let _mdot = kgps(1.2);
        let _rho = kg_per_m3(958.64);
        let _w = kw(1500.0);
        let _v = liters(5000.0);
        let _dt = s(0.1);
    }

    #[test]
    fn conversions_round_trip() {
        assert!((to_bar(bar(12.5)) - 12.5).abs() < 1e-9);
        assert!((to_celsius(celsius(180.0)) - 180.0).abs() < 1e-9);
        assert!((to_liters(liters(42.0)) - 42.0).abs() < 1e-9);
        assert!((to_kg(kg(7.0)) - 7.0).abs() < 1e-9);
        assert!((to_seconds(s(0.25)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn bar_is_one_hundred_kilopascal() {
        use uom::si::pressure::pascal;
        assert!((bar(1.0).get::<pascal>() - 100_000.0).abs() < 1e-6);
    }
}
