// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integer block coordinate in the world; the identity key of a teleport point.
///
/// Ordering is lexicographic `(x, y, z)`, which is also the enumeration order of the registry
/// and therefore the order points appear in an encoded save.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid block position '{input}' (expected `x,y,z`)")]
pub struct ParseBlockPosError {
    input: String,
}

impl FromStr for BlockPos {
    type Err = ParseBlockPosError;

    /// Parses `x,y,z` (surrounding parentheses and spaces are tolerated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBlockPosError { input: s.to_owned() };
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let mut parts = trimmed.split(',').map(str::trim);
        let mut next = || -> Result<i32, ParseBlockPosError> {
            parts.next().ok_or_else(err)?.parse().map_err(|_| err())
        };
        let pos = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::BlockPos;

    #[rstest]
    #[case("10,64,10", BlockPos::new(10, 64, 10))]
    #[case("(10, 64, 10)", BlockPos::new(10, 64, 10))]
    #[case(" -3,0,-7 ", BlockPos::new(-3, 0, -7))]
    fn parses_coordinates(#[case] input: &str, #[case] expected: BlockPos) {
        assert_eq!(input.parse::<BlockPos>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1,2")]
    #[case("1,2,3,4")]
    #[case("a,b,c")]
    fn rejects_malformed_coordinates(#[case] input: &str) {
        assert!(input.parse::<BlockPos>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let pos = BlockPos::new(-1, 70, 512);
        assert_eq!(pos.to_string(), "(-1, 70, 512)");
        assert_eq!(pos.to_string().parse::<BlockPos>().unwrap(), pos);
    }
}
