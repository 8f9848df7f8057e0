use serde::{Deserialize, Serialize};

fn exp_is_zero(e: &i32) -> bool {
    *e == 0
}

/// Exponents over the seven SI base dimensions. Absent axes are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionVector {
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub length: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub mass: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub time: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub electric_current: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub thermodynamic_temperature: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub amount_of_substance: i32,
    #[serde(skip_serializing_if = "exp_is_zero")]
    pub luminous_intensity: i32,
}

impl DimensionVector {
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::default()
    }

    /// All seven axes, in conventional SI order.
    pub fn exponents(&self) -> [(&'static str, i32); 7] {
        [
            ("length", self.length),
            ("mass", self.mass),
            ("time", self.time),
            ("electric_current", self.electric_current),
            ("thermodynamic_temperature", self.thermodynamic_temperature),
            ("amount_of_substance", self.amount_of_substance),
            ("luminous_intensity", self.luminous_intensity),
        ]
    }
}

impl std::fmt::Display for DimensionVector {
    /// Compact `length^1 time^-2` style rendering of the non-zero axes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, exp) in self.exponents() {
            if exp == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{name}^{exp}")?;
            first = false;
        }
        if first {
            write!(f, "dimensionless")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_dimensionless() {
        assert!(DimensionVector::default().is_dimensionless());
        let v = DimensionVector { length: 1, ..Default::default() };
        assert!(!v.is_dimensionless());
    }

    #[test]
    fn display_nonzero_axes() {
        let v = DimensionVector { length: 1, time: -2, ..Default::default() };
        assert_eq!(v.to_string(), "length^1 time^-2");
        assert_eq!(DimensionVector::default().to_string(), "dimensionless");
    }

    #[test]
    fn equality_is_exact_per_axis() {
        let a = DimensionVector { length: 1, ..Default::default() };
        let b = DimensionVector { length: 2, ..Default::default() };
        assert_ne!(a, b);
    }
}
