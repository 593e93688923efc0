//! Species profiles: the acceptable environmental bands per species.
//!
//! Profiles are process-wide static configuration. The [`SpeciesCatalog`] is
//! built once at startup, validated, and handed to request handlers as a
//! read-only lookup; nothing mutates it afterwards. Lookup by species name is
//! the single source of truth for range data.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Period;

/// One acceptable band for one metric in one period.
///
/// Invariant: `min <= ideal <= max`, enforced when a catalog is built.
/// A zero-width band (`min == max`) is allowed and means zero tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionRange {
    pub min: f64,
    pub max: f64,
    pub ideal: f64,
}

impl ConditionRange {
    pub const fn new(min: f64, max: f64, ideal: f64) -> Self {
        Self { min, max, ideal }
    }

    /// Width of the band. Zero for degenerate single-point bands.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Temperature bands for a species: day, night, and an optional basking spot.
///
/// The basking band, when present, applies to surface temperature only,
/// never to ambient air.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureRanges {
    pub day: ConditionRange,
    pub night: ConditionRange,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basking: Option<ConditionRange>,
}

impl TemperatureRanges {
    /// The ambient band applicable in the given period.
    pub fn for_period(&self, period: Period) -> &ConditionRange {
        match period {
            Period::Day => &self.day,
            Period::Night => &self.night,
        }
    }
}

/// Humidity bands for a species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumidityRanges {
    pub day: ConditionRange,
    pub night: ConditionRange,
}

impl HumidityRanges {
    pub fn for_period(&self, period: Period) -> &ConditionRange {
        match period {
            Period::Day => &self.day,
            Period::Night => &self.night,
        }
    }
}

/// The full set of acceptable conditions for one species.
///
/// Every profile defines day and night bands for both temperature and
/// humidity; basking is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// Unique key the catalog indexes by.
    pub species: String,

    pub temperature: TemperatureRanges,
    pub humidity: HumidityRanges,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A misconfigured profile. These are programming/configuration errors in the
/// surrounding system and fail catalog construction outright.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(
        "{species}: {band} range has min {min} above max {max}"
    )]
    InvertedRange {
        species: String,
        band: &'static str,
        min: f64,
        max: f64,
    },

    #[error(
        "{species}: {band} ideal {ideal} falls outside [{min}, {max}]"
    )]
    IdealOutOfBand {
        species: String,
        band: &'static str,
        ideal: f64,
        min: f64,
        max: f64,
    },
}

/// Read-only lookup of species profiles.
///
/// Cheap to clone; the underlying table is shared.
#[derive(Debug, Clone)]
pub struct SpeciesCatalog {
    profiles: Arc<HashMap<String, SpeciesProfile>>,
}

impl SpeciesCatalog {
    /// Build a catalog from a list of profiles, validating every band.
    pub fn from_profiles(profiles: Vec<SpeciesProfile>) -> Result<Self, ProfileError> {
        let mut table = HashMap::with_capacity(profiles.len());

        for profile in profiles {
            validate_profile(&profile)?;
            table.insert(profile.species.clone(), profile);
        }

        Ok(Self {
            profiles: Arc::new(table),
        })
    }

    /// The builtin gecko species table.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_profiles(builtin_profiles())
    }

    /// Look up a profile by species name. Absence is not an error.
    pub fn lookup(&self, species: &str) -> Option<&SpeciesProfile> {
        self.profiles.get(species)
    }

    /// All profiles, sorted by species name for stable listings.
    pub fn all(&self) -> Vec<&SpeciesProfile> {
        let mut all: Vec<_> = self.profiles.values().collect();
        all.sort_by(|a, b| a.species.cmp(&b.species));
        all
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate_profile(profile: &SpeciesProfile) -> Result<(), ProfileError> {
    let bands = [
        ("temperature.day", &profile.temperature.day),
        ("temperature.night", &profile.temperature.night),
        ("humidity.day", &profile.humidity.day),
        ("humidity.night", &profile.humidity.night),
    ];

    for (band, range) in bands {
        validate_range(&profile.species, band, range)?;
    }

    if let Some(basking) = &profile.temperature.basking {
        validate_range(&profile.species, "temperature.basking", basking)?;
    }

    Ok(())
}

fn validate_range(
    species: &str,
    band: &'static str,
    range: &ConditionRange,
) -> Result<(), ProfileError> {
    if range.min > range.max {
        return Err(ProfileError::InvertedRange {
            species: species.to_string(),
            band,
            min: range.min,
            max: range.max,
        });
    }

    if range.ideal < range.min || range.ideal > range.max {
        return Err(ProfileError::IdealOutOfBand {
            species: species.to_string(),
            band,
            ideal: range.ideal,
            min: range.min,
            max: range.max,
        });
    }

    Ok(())
}

/// The species shipped with the service.
///
/// Values are degrees Celsius for temperature bands and percent relative
/// humidity for humidity bands.
pub fn builtin_profiles() -> Vec<SpeciesProfile> {
    vec![
        SpeciesProfile {
            species: "Leopard Gecko".to_string(),
            temperature: TemperatureRanges {
                day: ConditionRange::new(24.0, 29.0, 27.0),
                night: ConditionRange::new(18.0, 23.0, 21.0),
                basking: Some(ConditionRange::new(30.0, 35.0, 32.0)),
            },
            humidity: HumidityRanges {
                day: ConditionRange::new(30.0, 40.0, 35.0),
                night: ConditionRange::new(40.0, 50.0, 45.0),
            },
            description: Some(
                "Desert species that requires low humidity and a warm basking spot.".to_string(),
            ),
        },
        SpeciesProfile {
            species: "Crested Gecko".to_string(),
            temperature: TemperatureRanges {
                day: ConditionRange::new(22.0, 26.0, 24.0),
                night: ConditionRange::new(18.0, 22.0, 20.0),
                basking: None,
            },
            humidity: HumidityRanges {
                day: ConditionRange::new(50.0, 70.0, 60.0),
                night: ConditionRange::new(60.0, 80.0, 70.0),
            },
            description: Some(
                "Tropical species that prefers moderate temperatures and higher humidity."
                    .to_string(),
            ),
        },
        SpeciesProfile {
            species: "Day Gecko".to_string(),
            temperature: TemperatureRanges {
                day: ConditionRange::new(25.0, 30.0, 28.0),
                night: ConditionRange::new(20.0, 24.0, 22.0),
                basking: Some(ConditionRange::new(32.0, 38.0, 35.0)),
            },
            humidity: HumidityRanges {
                day: ConditionRange::new(50.0, 70.0, 60.0),
                night: ConditionRange::new(60.0, 80.0, 70.0),
            },
            description: Some(
                "Active diurnal species that needs UVB lighting, warm temperatures, and \
                 moderate to high humidity."
                    .to_string(),
            ),
        },
        SpeciesProfile {
            species: "Gargoyle Gecko".to_string(),
            temperature: TemperatureRanges {
                day: ConditionRange::new(22.0, 26.0, 24.0),
                night: ConditionRange::new(18.0, 22.0, 20.0),
                basking: None,
            },
            humidity: HumidityRanges {
                day: ConditionRange::new(50.0, 70.0, 60.0),
                night: ConditionRange::new(60.0, 80.0, 70.0),
            },
            description: Some(
                "Similar to Crested Geckos, they prefer moderate temperatures and higher \
                 humidity."
                    .to_string(),
            ),
        },
        SpeciesProfile {
            species: "African Fat-Tailed Gecko".to_string(),
            temperature: TemperatureRanges {
                day: ConditionRange::new(25.0, 29.0, 27.0),
                night: ConditionRange::new(21.0, 24.0, 22.0),
                basking: Some(ConditionRange::new(30.0, 33.0, 31.0)),
            },
            humidity: HumidityRanges {
                day: ConditionRange::new(40.0, 60.0, 50.0),
                night: ConditionRange::new(50.0, 70.0, 60.0),
            },
            description: Some(
                "Similar to Leopard Geckos but prefer slightly higher humidity levels."
                    .to_string(),
            ),
        },
    ]
}
