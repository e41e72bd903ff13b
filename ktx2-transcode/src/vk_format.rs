// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! The subset of `VkFormat` values that transcoding can produce.

pub const VK_FORMAT_UNDEFINED: u32 = 0;
pub const VK_FORMAT_R4G4B4A4_UNORM_PACK16: u32 = 2;
pub const VK_FORMAT_R5G6B5_UNORM_PACK16: u32 = 4;
pub const VK_FORMAT_B5G6R5_UNORM_PACK16: u32 = 5;
pub const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;
pub const VK_FORMAT_R8G8B8A8_SRGB: u32 = 43;
pub const VK_FORMAT_BC1_RGB_UNORM_BLOCK: u32 = 131;
pub const VK_FORMAT_BC1_RGB_SRGB_BLOCK: u32 = 132;
pub const VK_FORMAT_BC3_UNORM_BLOCK: u32 = 137;
pub const VK_FORMAT_BC3_SRGB_BLOCK: u32 = 138;
pub const VK_FORMAT_BC4_UNORM_BLOCK: u32 = 139;
pub const VK_FORMAT_BC5_UNORM_BLOCK: u32 = 141;
pub const VK_FORMAT_BC7_UNORM_BLOCK: u32 = 145;
pub const VK_FORMAT_BC7_SRGB_BLOCK: u32 = 146;
pub const VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK: u32 = 147;
pub const VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK: u32 = 148;
pub const VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK: u32 = 151;
pub const VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK: u32 = 152;
pub const VK_FORMAT_EAC_R11_UNORM_BLOCK: u32 = 153;
pub const VK_FORMAT_EAC_R11G11_UNORM_BLOCK: u32 = 155;
pub const VK_FORMAT_ASTC_4X4_UNORM_BLOCK: u32 = 157;
pub const VK_FORMAT_ASTC_4X4_SRGB_BLOCK: u32 = 158;
pub const VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG: u32 = 1_000_054_001;
pub const VK_FORMAT_PVRTC2_4BPP_UNORM_BLOCK_IMG: u32 = 1_000_054_003;
pub const VK_FORMAT_PVRTC1_4BPP_SRGB_BLOCK_IMG: u32 = 1_000_054_005;
pub const VK_FORMAT_PVRTC2_4BPP_SRGB_BLOCK_IMG: u32 = 1_000_054_007;

/// Does `vk_format` use the sRGB transfer function?
pub fn is_srgb(vk_format: u32) -> bool {
    matches!(
        vk_format,
        VK_FORMAT_R8G8B8A8_SRGB
            | VK_FORMAT_BC1_RGB_SRGB_BLOCK
            | VK_FORMAT_BC3_SRGB_BLOCK
            | VK_FORMAT_BC7_SRGB_BLOCK
            | VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK
            | VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK
            | VK_FORMAT_ASTC_4X4_SRGB_BLOCK
            | VK_FORMAT_PVRTC1_4BPP_SRGB_BLOCK_IMG
            | VK_FORMAT_PVRTC2_4BPP_SRGB_BLOCK_IMG
    )
}
