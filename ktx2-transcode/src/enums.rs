// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use bitflags::bitflags;
use std::convert::TryFrom;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum CreateStorage {
    NoStorage = 0,
    AllocStorage = 1,
}

/// Error codes, numbered as libKTX's `ktx_error_code_e`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[repr(u32)]
pub enum KtxError {
    #[error("File data error")]
    FileDataError = 1,
    #[error("File read error")]
    FileReadError = 5,
    #[error("Unexpected EOF")]
    FileUnexpectedEof = 7,
    #[error("Operation invalid")]
    InvalidOperation = 10,
    #[error("Invalid parameter value")]
    InvalidValue = 11,
    #[error("Out of memory")]
    OutOfMemory = 13,
    #[error("Transcode failed")]
    TranscodeFailed = 14,
    #[error("Feature not included in in-use library or not yet implemented.")]
    UnsupportedFeature = 17,
}

impl TryFrom<u32> for KtxError {
    type Error = &'static str;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::FileDataError,
            5 => Self::FileReadError,
            7 => Self::FileUnexpectedEof,
            10 => Self::InvalidOperation,
            11 => Self::InvalidValue,
            13 => Self::OutOfMemory,
            14 => Self::TranscodeFailed,
            17 => Self::UnsupportedFeature,
            _ => return Err("Not a KTX_ error variant"),
        })
    }
}

/// Target formats for [`crate::Texture::transcode_basis`], numbered as libKTX's `ktx_transcode_fmt_e`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum TranscodeFormat {
    Etc1Rgb = 0,
    Etc2Rgba = 1,
    Bc1Rgb = 2,
    Bc3Rgba = 3,
    Bc4R = 4,
    Bc5Rg = 5,
    Bc7Rgba = 6,
    Pvrtc1_4Rgb = 8,
    Pvrtc1_4Rgba = 9,
    Astc4x4Rgba = 10,
    /// No Vulkan equivalent; always rejected.
    AtcRgb = 11,
    /// No Vulkan equivalent; always rejected.
    AtcRgba = 12,
    Rgba32 = 13,
    Rgb565 = 14,
    Bgr565 = 15,
    Rgba4444 = 16,
    /// No Vulkan equivalent; always rejected.
    Fxt1Rgb = 17,
    Pvrtc2_4Rgb = 18,
    Pvrtc2_4Rgba = 19,
    Etc2EacR11 = 20,
    Etc2EacRg11 = 21,
    /// [`TranscodeFormat::Etc1Rgb`] or [`TranscodeFormat::Etc2Rgba`], depending on alpha.
    Etc = 22,
    /// [`TranscodeFormat::Bc1Rgb`] or [`TranscodeFormat::Bc3Rgba`], depending on alpha.
    Bc1Or3 = 23,
    NoSelection = 0x7fff_ffff,
}

impl TranscodeFormat {
    pub const ALL: [TranscodeFormat; 24] = [
        Self::Etc1Rgb,
        Self::Etc2Rgba,
        Self::Bc1Rgb,
        Self::Bc3Rgba,
        Self::Bc4R,
        Self::Bc5Rg,
        Self::Bc7Rgba,
        Self::Pvrtc1_4Rgb,
        Self::Pvrtc1_4Rgba,
        Self::Astc4x4Rgba,
        Self::AtcRgb,
        Self::AtcRgba,
        Self::Rgba32,
        Self::Rgb565,
        Self::Bgr565,
        Self::Rgba4444,
        Self::Fxt1Rgb,
        Self::Pvrtc2_4Rgb,
        Self::Pvrtc2_4Rgba,
        Self::Etc2EacR11,
        Self::Etc2EacRg11,
        Self::Etc,
        Self::Bc1Or3,
        Self::NoSelection,
    ];

    /// Is this one of the two PVRTC1 formats (which need power-of-two dimensions)?
    pub fn is_pvrtc1(self) -> bool {
        matches!(self, Self::Pvrtc1_4Rgb | Self::Pvrtc1_4Rgba)
    }
}

impl TryFrom<u32> for TranscodeFormat {
    type Error = KtxError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| *format as u32 == value)
            .ok_or(KtxError::InvalidValue)
    }
}

bitflags! {
    /// Flags modifying a transcode operation (libKTX's `ktx_transcode_flag_bits_e`).
    pub struct TranscodeFlags: u32 {
        /// Decode PVRTC to the next power of two. Currently unsupported.
        const PVRTC_DECODE_TO_NEXT_POW2 = 2;
        /// Transcode the alpha slices of textures with alpha to opaque formats.
        const TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS = 4;
    }
}

/// The supercompression scheme of a KTX2 texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum SupercompressionScheme {
    None = 0,
    BasisLz = 1,
    Zstd = 2,
    Zlib = 3,
}

impl TryFrom<u32> for SupercompressionScheme {
    type Error = KtxError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::None,
            1 => Self::BasisLz,
            2 => Self::Zstd,
            3 => Self::Zlib,
            _ => return Err(KtxError::InvalidValue),
        })
    }
}
