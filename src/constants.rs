use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimtabError;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Planck constant, J s (CODATA 2018, exact).
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Boltzmann constant, J/K (CODATA 2018, exact).
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Avogadro constant, 1/mol (CODATA 2018, exact).
pub const AVOGADRO: f64 = 6.022_140_76e23;
/// Speed of light in cm/s, for wavenumber → Hz.
pub const SPEED_OF_LIGHT_CM: f64 = 2.997_924_58e10;

/// kJ per kcal (thermochemical calorie).
pub const KCAL_IN_KJ: f64 = 4.184;
/// kJ/mol per eV.
pub const EV_IN_KJ_MOL: f64 = 96.485_332_12;
/// kJ/mol per Hartree.
pub const HARTREE_IN_KJ_MOL: f64 = 2_625.499_639_48;
/// cm³ per Å³.
pub const ANGSTROM3_IN_CM3: f64 = 1.0e-24;

/// The constant table every derived quantity reads from. Individual values
/// can be overridden from configuration; unset fields keep the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    pub planck: f64,
    pub boltzmann: f64,
    pub avogadro: f64,
    pub speed_of_light_cm: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            planck: PLANCK,
            boltzmann: BOLTZMANN,
            avogadro: AVOGADRO,
            speed_of_light_cm: SPEED_OF_LIGHT_CM,
        }
    }
}

impl PhysicalConstants {
    /// Every constant must be finite and positive.
    pub fn validate(&self) -> Result<(), SimtabError> {
        let named = [
            ("planck", self.planck),
            ("boltzmann", self.boltzmann),
            ("avogadro", self.avogadro),
            ("speed_of_light_cm", self.speed_of_light_cm),
        ];
        match named.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            Some((name, v)) => Err(SimtabError::Config(format!(
                "constant {name} must be finite and positive, got {v}"
            ))),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Frequency units
// ---------------------------------------------------------------------------

/// Unit of vibrational frequency columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    #[default]
    Hz,
    Thz,
    /// Wavenumbers, cm⁻¹.
    Cm1,
}

impl FrequencyUnit {
    /// Multiplier taking a value in this unit to Hz.
    pub fn to_hz(self, constants: &PhysicalConstants) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::Thz => 1.0e12,
            FrequencyUnit::Cm1 => constants.speed_of_light_cm,
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = SimtabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hz" => Ok(FrequencyUnit::Hz),
            "thz" => Ok(FrequencyUnit::Thz),
            "cm1" | "cm-1" | "wavenumber" => Ok(FrequencyUnit::Cm1),
            other => Err(SimtabError::Config(format!("unknown frequency unit '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit conversions for scaled sums / means
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
    KcalToKj,
    KjToKcal,
    EvToKjMol,
    HartreeToKjMol,
    /// Å³ per molecule → cm³/mol (molar volume from a cell volume).
    Angstrom3ToCm3Mol,
}

impl Conversion {
    pub const ALL: [Conversion; 5] = [
        Conversion::KcalToKj,
        Conversion::KjToKcal,
        Conversion::EvToKjMol,
        Conversion::HartreeToKjMol,
        Conversion::Angstrom3ToCm3Mol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Conversion::KcalToKj => "kcal-to-kj",
            Conversion::KjToKcal => "kj-to-kcal",
            Conversion::EvToKjMol => "ev-to-kjmol",
            Conversion::HartreeToKjMol => "hartree-to-kjmol",
            Conversion::Angstrom3ToCm3Mol => "a3-to-cm3mol",
        }
    }

    pub fn factor(self, constants: &PhysicalConstants) -> f64 {
        match self {
            Conversion::KcalToKj => KCAL_IN_KJ,
            Conversion::KjToKcal => 1.0 / KCAL_IN_KJ,
            Conversion::EvToKjMol => EV_IN_KJ_MOL,
            Conversion::HartreeToKjMol => HARTREE_IN_KJ_MOL,
            Conversion::Angstrom3ToCm3Mol => ANGSTROM3_IN_CM3 * constants.avogadro,
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Conversion {
    type Err = SimtabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Conversion::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimtabError::Config(format!("unknown unit conversion '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let c: PhysicalConstants = serde_json::from_str(r#"{"planck": 6.626e-34}"#).unwrap();
        assert_eq!(c.planck, 6.626e-34);
        assert_eq!(c.avogadro, AVOGADRO);
        assert_eq!(c.boltzmann, BOLTZMANN);
    }

    #[test]
    fn conversion_names_round_trip() {
        for c in Conversion::ALL {
            assert_eq!(c.name().parse::<Conversion>().unwrap(), c);
        }
        assert!("furlongs".parse::<Conversion>().is_err());
    }

    #[test]
    fn molar_volume_factor() {
        let c = PhysicalConstants::default();
        let f = Conversion::Angstrom3ToCm3Mol.factor(&c);
        assert!((f - 0.602_214_076).abs() < 1e-12);
    }
}
