//! Mapping direction selector.
//!
//! The direction is chosen once per run and decides which rules the router registers, which
//! translation tables are needed, and whether output targets the Beacon catalog.

use crate::constants::{BBMRI_ID_DOMAIN, MII_ID_DOMAIN};
use crate::error::TransformError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Bbmri2Mii,
    Mii2Bbmri,
    Bbmri2Beacon,
    Copy,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Bbmri2Mii,
        Direction::Mii2Bbmri,
        Direction::Bbmri2Beacon,
        Direction::Copy,
    ];

    /// Canonical name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bbmri2Mii => "bbmri2mii",
            Direction::Mii2Bbmri => "mii2bbmri",
            Direction::Bbmri2Beacon => "bbmri2beacon",
            Direction::Copy => "copy",
        }
    }

    /// True for directions whose specimen rules translate sample types.
    pub fn needs_sample_type_table(&self) -> bool {
        matches!(self, Direction::Bbmri2Mii | Direction::Mii2Bbmri)
    }

    /// `(source, target)` id domains for directions that pseudonymize patient ids.
    pub fn id_domains(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Direction::Bbmri2Mii => Some((BBMRI_ID_DOMAIN, MII_ID_DOMAIN)),
            Direction::Mii2Bbmri => Some((MII_ID_DOMAIN, BBMRI_ID_DOMAIN)),
            Direction::Bbmri2Beacon | Direction::Copy => None,
        }
    }

    /// True when output goes to the Beacon catalog rather than a FHIR store.
    pub fn target_is_catalog(&self) -> bool {
        matches!(self, Direction::Bbmri2Beacon)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bbmri2mii" => Ok(Direction::Bbmri2Mii),
            "mii2bbmri" => Ok(Direction::Mii2Bbmri),
            "bbmri2beacon" => Ok(Direction::Bbmri2Beacon),
            "copy" | "fhircopy" => Ok(Direction::Copy),
            other => Err(TransformError::InvalidConfig(format!(
                "unknown direction '{other}', expected one of: bbmri2mii, mii2bbmri, \
                 bbmri2beacon, copy"
            ))),
        }
    }
}
