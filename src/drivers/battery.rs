//! Battery Sensor Boundary

/// One raw reading of the battery divider and the charger current sense
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct BatterySample {
    /// Raw voltage divider reading
    pub voltage: u16,
    /// Raw charge current reading
    pub current: u16,
}

/// Battery voltage and charge current sampling
pub trait BatterySensor {
    /// Take a fresh reading
    fn sample(&mut self) -> BatterySample;
}
