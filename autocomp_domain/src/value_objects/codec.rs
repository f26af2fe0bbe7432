// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Codec Identity
//!
//! `Codec` is a tagged variant standing in for the source's abstract
//! compressor base class: each variant that carries a level owns that level
//! inline, so there is nothing to validate separately from constructing the
//! value. `COPY` and `SNAPPY` have no level; the wire and the decision tree
//! file both spell that absence as `-1`.

use crate::error::AutoCompError;

/// A compression algorithm together with its level, where the algorithm has
/// one. Ordinals match the wire enum in the spec exactly and must not be
/// renumbered without a protocol version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Zlib(i32),
    Snappy,
    Lzo(i32),
    Bzip2(i32),
    Lzma(i32),
    Fpc(i32),
    Copy,
}

impl Codec {
    pub const ZLIB_RANGE: (i32, i32) = (0, 9);
    pub const ZLIB_DEFAULT: i32 = 6;
    pub const LZO_RANGE: (i32, i32) = (1, 9);
    pub const LZO_DEFAULT: i32 = 3;
    pub const BZIP2_RANGE: (i32, i32) = (1, 9);
    pub const BZIP2_DEFAULT: i32 = 9;
    pub const LZMA_RANGE: (i32, i32) = (0, 9);
    pub const LZMA_DEFAULT: i32 = 6;
    pub const FPC_RANGE: (i32, i32) = (1, 28);
    pub const FPC_DEFAULT: i32 = 20;

    /// Wire ordinal, per §3: `ZLIB=0, SNAPPY=1, LZO=2, BZIP2=3, LZMA=4, FPC=5, COPY=6`.
    pub fn ordinal(&self) -> i32 {
        match self {
            Codec::Zlib(_) => 0,
            Codec::Snappy => 1,
            Codec::Lzo(_) => 2,
            Codec::Bzip2(_) => 3,
            Codec::Lzma(_) => 4,
            Codec::Fpc(_) => 5,
            Codec::Copy => 6,
        }
    }

    /// `-1` for levelless codecs, matching the wire and decision-tree file
    /// conventions.
    pub fn level(&self) -> i32 {
        match self {
            Codec::Zlib(l) | Codec::Lzo(l) | Codec::Bzip2(l) | Codec::Lzma(l) | Codec::Fpc(l) => *l,
            Codec::Snappy | Codec::Copy => -1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Zlib(_) => "ZLIB",
            Codec::Snappy => "SNAPPY",
            Codec::Lzo(_) => "LZO",
            Codec::Bzip2(_) => "BZIP2",
            Codec::Lzma(_) => "LZMA",
            Codec::Fpc(_) => "FPC",
            Codec::Copy => "COPY",
        }
    }

    /// Constructs a codec by ordinal and level, validating the level range.
    /// Used both by wire deserialization and by the decision tree loader.
    pub fn from_ordinal(ordinal: i32, level: i32) -> Result<Self, AutoCompError> {
        let codec = match ordinal {
            0 => Codec::Zlib(level),
            1 => Codec::Snappy,
            2 => Codec::Lzo(level),
            3 => Codec::Bzip2(level),
            4 => Codec::Lzma(level),
            5 => Codec::Fpc(level),
            6 => Codec::Copy,
            other => return Err(AutoCompError::InvalidCompressor(other)),
        };
        codec.validate_level()?;
        Ok(codec)
    }

    /// Constructs a codec from its uppercase name and a level, used by the
    /// decision tree's label parser (§3: "codec name is uppercased and
    /// matched to the enum") and by CLI codec-name parsing.
    pub fn from_name(name: &str, level: i32) -> Result<Self, AutoCompError> {
        let codec = match name.to_ascii_uppercase().as_str() {
            "ZLIB" => Codec::Zlib(level),
            "SNAPPY" => Codec::Snappy,
            "LZO" => Codec::Lzo(level),
            "BZIP2" => Codec::Bzip2(level),
            "LZMA" => Codec::Lzma(level),
            "FPC" => Codec::Fpc(level),
            "COPY" => Codec::Copy,
            other => {
                return Err(AutoCompError::InvalidRequestParameter(format!(
                    "unknown codec name {other:?}"
                )))
            }
        };
        codec.validate_level()?;
        Ok(codec)
    }

    /// Same codec family with its default level, used when a request names a
    /// codec but no level (§6 client CLI: `-c codec` without `-l level`).
    pub fn with_default_level(name: &str) -> Result<Self, AutoCompError> {
        let level = match name.to_ascii_uppercase().as_str() {
            "ZLIB" => Self::ZLIB_DEFAULT,
            "LZO" => Self::LZO_DEFAULT,
            "BZIP2" => Self::BZIP2_DEFAULT,
            "LZMA" => Self::LZMA_DEFAULT,
            "FPC" => Self::FPC_DEFAULT,
            _ => -1,
        };
        Self::from_name(name, level)
    }

    fn range(&self) -> Option<(i32, i32)> {
        match self {
            Codec::Zlib(_) => Some(Self::ZLIB_RANGE),
            Codec::Lzo(_) => Some(Self::LZO_RANGE),
            Codec::Bzip2(_) => Some(Self::BZIP2_RANGE),
            Codec::Lzma(_) => Some(Self::LZMA_RANGE),
            Codec::Fpc(_) => Some(Self::FPC_RANGE),
            Codec::Snappy | Codec::Copy => None,
        }
    }

    /// Fails with `InvalidCompressionLevel` if this codec's level is outside
    /// its valid range. `COPY` and `SNAPPY` always pass (no level to check).
    pub fn validate_level(&self) -> Result<(), AutoCompError> {
        if let Some((min, max)) = self.range() {
            let level = self.level();
            if level < min || level > max {
                return Err(AutoCompError::InvalidCompressionLevel {
                    codec: *self,
                    level,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_spec() {
        assert_eq!(Codec::Zlib(6).ordinal(), 0);
        assert_eq!(Codec::Snappy.ordinal(), 1);
        assert_eq!(Codec::Lzo(3).ordinal(), 2);
        assert_eq!(Codec::Bzip2(9).ordinal(), 3);
        assert_eq!(Codec::Lzma(6).ordinal(), 4);
        assert_eq!(Codec::Fpc(20).ordinal(), 5);
        assert_eq!(Codec::Copy.ordinal(), 6);
    }

    #[test]
    fn levelless_codecs_report_negative_one() {
        assert_eq!(Codec::Snappy.level(), -1);
        assert_eq!(Codec::Copy.level(), -1);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        assert!(Codec::Zlib(10).validate_level().is_err());
        assert!(Codec::Zlib(-1).validate_level().is_err());
        assert!(Codec::Lzo(0).validate_level().is_err());
        assert!(Codec::Fpc(29).validate_level().is_err());
    }

    #[test]
    fn in_range_levels_are_accepted() {
        for l in 0..=9 {
            assert!(Codec::Zlib(l).validate_level().is_ok());
        }
        for l in 1..=28 {
            assert!(Codec::Fpc(l).validate_level().is_ok());
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        // from_name takes an already-split name; the decision tree loader
        // does the "_" splitting itself before calling this.
        assert_eq!(Codec::from_name("zlib", 6).unwrap(), Codec::Zlib(6));
        assert_eq!(Codec::from_name("COPY", -1).unwrap(), Codec::Copy);
        assert!(Codec::from_name("not_a_codec", 0).is_err());
    }
}
