use serde::{self, Deserialize, Serialize};
use std::marker::PhantomData;
use uom::si::{
    f64::{Length, Mass, Velocity},
    length::{centimeter, foot, inch, meter, millimeter, yard},
    mass::{gram, kilogram, megagram, pound, ton_long, ton_short},
    velocity::{kilometer_per_hour, knot, meter_per_second, mile_per_hour},
};

/// A raw number tagged with the unit it was recorded in, as it arrives from
/// rig measurement sheets and stored configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WithUnit<T> {
    pub value: f64,
    pub unit: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

pub type LengthValue = WithUnit<Length>;
pub type MassValue = WithUnit<Mass>;
pub type VelocityValue = WithUnit<Velocity>;

impl<T> WithUnit<T> {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for WithUnit<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.unit == other.unit
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown length unit: {0}")]
    UnknownLengthUnit(String),

    #[error("Unknown mass unit: {0}")]
    UnknownMassUnit(String),

    #[error("Unknown velocity unit: {0}")]
    UnknownVelocityUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LengthUnit {
    Meter,
    Centimeter,
    Millimeter,
    Foot,
    Inch,
    Yard,
}

impl LengthUnit {
    fn parse(unit: &str) -> Result<Self, UnitError> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "metre" | "meters" | "metres" => Ok(Self::Meter),
            "cm" | "centimeter" | "centimetre" | "centimeters" | "centimetres" => {
                Ok(Self::Centimeter)
            }
            "mm" | "millimeter" | "millimetre" | "millimeters" | "millimetres" => {
                Ok(Self::Millimeter)
            }
            "ft" | "foot" | "feet" => Ok(Self::Foot),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            "yd" | "yard" | "yards" => Ok(Self::Yard),
            _ => Err(UnitError::UnknownLengthUnit(unit.to_string())),
        }
    }

    fn quantity(self, value: f64) -> Length {
        match self {
            Self::Meter => Length::new::<meter>(value),
            Self::Centimeter => Length::new::<centimeter>(value),
            Self::Millimeter => Length::new::<millimeter>(value),
            Self::Foot => Length::new::<foot>(value),
            Self::Inch => Length::new::<inch>(value),
            Self::Yard => Length::new::<yard>(value),
        }
    }

    fn magnitude(self, length: Length) -> f64 {
        match self {
            Self::Meter => length.get::<meter>(),
            Self::Centimeter => length.get::<centimeter>(),
            Self::Millimeter => length.get::<millimeter>(),
            Self::Foot => length.get::<foot>(),
            Self::Inch => length.get::<inch>(),
            Self::Yard => length.get::<yard>(),
        }
    }
}

impl WithUnit<Length> {
    pub fn to_length(&self) -> Result<Length, UnitError> {
        Ok(LengthUnit::parse(&self.unit)?.quantity(self.value))
    }

    pub fn from_length(length: Length, unit: &str) -> Result<Self, UnitError> {
        let value = LengthUnit::parse(unit)?.magnitude(length);
        Ok(Self::new(value, unit))
    }
}

impl WithUnit<Mass> {
    pub fn to_mass(&self) -> Result<Mass, UnitError> {
        let value = self.value;
        match self.unit.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(Mass::new::<kilogram>(value)),
            "g" | "gram" | "grams" => Ok(Mass::new::<gram>(value)),
            "lb" | "lbs" | "pound" | "pounds" => Ok(Mass::new::<pound>(value)),
            "t" | "tonne" | "tonnes" | "metric ton" | "metric tons" => {
                Ok(Mass::new::<megagram>(value))
            }
            "short ton" | "short tons" => Ok(Mass::new::<ton_short>(value)),
            "long ton" | "long tons" => Ok(Mass::new::<ton_long>(value)),
            _ => Err(UnitError::UnknownMassUnit(self.unit.clone())),
        }
    }
}

impl WithUnit<Velocity> {
    pub fn to_velocity(&self) -> Result<Velocity, UnitError> {
        let value = self.value;
        match self.unit.trim().to_ascii_lowercase().as_str() {
            "kn" | "kt" | "kts" | "knot" | "knots" => Ok(Velocity::new::<knot>(value)),
            "m/s" | "mps" | "meters per second" | "metres per second" => {
                Ok(Velocity::new::<meter_per_second>(value))
            }
            "km/h" | "kph" | "kmh" => Ok(Velocity::new::<kilometer_per_hour>(value)),
            "mph" | "mi/h" => Ok(Velocity::new::<mile_per_hour>(value)),
            _ => Err(UnitError::UnknownVelocityUnit(self.unit.clone())),
        }
    }
}
