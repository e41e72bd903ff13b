// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Texel block sizes of the formats a [`crate::Texture`] can hold.

use crate::{
    dfd::{ColorModel, DfdView},
    vk_format::*,
};
use bitflags::bitflags;

bitflags! {
    pub struct FormatSizeFlags: u32 {
        const PACKED = 0x1;
        const COMPRESSED = 0x2;
    }
}

/// Size and shape of one texel block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FormatSize {
    pub flags: FormatSizeFlags,
    pub block_size_in_bits: u32,
    pub block_width: u32,
    pub block_height: u32,
    pub block_depth: u32,
    /// Smallest number of blocks an image row may have (2 for PVRTC1).
    pub min_blocks_x: u32,
    pub min_blocks_y: u32,
}

impl FormatSize {
    const fn block(bits: u32) -> Self {
        FormatSize {
            flags: FormatSizeFlags::COMPRESSED,
            block_size_in_bits: bits,
            block_width: 4,
            block_height: 4,
            block_depth: 1,
            min_blocks_x: 1,
            min_blocks_y: 1,
        }
    }

    const fn texel(bits: u32, flags: FormatSizeFlags) -> Self {
        FormatSize {
            flags,
            block_size_in_bits: bits,
            block_width: 1,
            block_height: 1,
            block_depth: 1,
            min_blocks_x: 1,
            min_blocks_y: 1,
        }
    }

    /// The block size of `vk_format`, or `None` if it is not one this crate knows about.
    pub fn for_vk_format(vk_format: u32) -> Option<Self> {
        Some(match vk_format {
            VK_FORMAT_R4G4B4A4_UNORM_PACK16
            | VK_FORMAT_R5G6B5_UNORM_PACK16
            | VK_FORMAT_B5G6R5_UNORM_PACK16 => Self::texel(16, FormatSizeFlags::PACKED),
            VK_FORMAT_R8G8B8A8_UNORM | VK_FORMAT_R8G8B8A8_SRGB => {
                Self::texel(32, FormatSizeFlags::empty())
            }
            VK_FORMAT_BC1_RGB_UNORM_BLOCK
            | VK_FORMAT_BC1_RGB_SRGB_BLOCK
            | VK_FORMAT_BC4_UNORM_BLOCK
            | VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK
            | VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK
            | VK_FORMAT_EAC_R11_UNORM_BLOCK
            | VK_FORMAT_PVRTC2_4BPP_UNORM_BLOCK_IMG
            | VK_FORMAT_PVRTC2_4BPP_SRGB_BLOCK_IMG => Self::block(64),
            VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG | VK_FORMAT_PVRTC1_4BPP_SRGB_BLOCK_IMG => {
                FormatSize {
                    min_blocks_x: 2,
                    min_blocks_y: 2,
                    ..Self::block(64)
                }
            }
            VK_FORMAT_BC3_UNORM_BLOCK
            | VK_FORMAT_BC3_SRGB_BLOCK
            | VK_FORMAT_BC5_UNORM_BLOCK
            | VK_FORMAT_BC7_UNORM_BLOCK
            | VK_FORMAT_BC7_SRGB_BLOCK
            | VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK
            | VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK
            | VK_FORMAT_EAC_R11G11_UNORM_BLOCK
            | VK_FORMAT_ASTC_4X4_UNORM_BLOCK
            | VK_FORMAT_ASTC_4X4_SRGB_BLOCK => Self::block(128),
            _ => return None,
        })
    }

    /// The block size of a texture whose format is only described by its DFD
    /// (i.e. `VK_FORMAT_UNDEFINED` textures in ETC1S or UASTC).
    pub fn for_dfd(dfd: &DfdView<'_>) -> Option<Self> {
        match dfd.color_model() {
            ColorModel::ETC1S => Some(Self::block(64)),
            ColorModel::UASTC => Some(Self::block(128)),
            _ => None,
        }
    }

    pub fn block_size_in_bytes(&self) -> u32 {
        self.block_size_in_bits / 8
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(FormatSizeFlags::COMPRESSED)
    }
}
