// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use crate::{geometry::is_pow2, vk_format::*, KtxError, TranscodeFormat};

/// A transcode target resolved to a concrete format and its `VkFormat`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedFormat {
    pub format: TranscodeFormat,
    pub vk_format: u32,
}

/// Resolves `requested` for a texture of `width`×`height` that has (or lacks) alpha
/// and does (or doesn't) use the sRGB transfer function.
///
/// The auto-selecting formats pick their alpha or opaque variant; PVRTC1 and PVRTC2
/// with alpha fall back to their opaque variants when there is no alpha, since the
/// codec never writes opaque alpha blocks.
pub fn resolve_format(
    requested: TranscodeFormat,
    has_alpha: bool,
    srgb: bool,
    width: u32,
    height: u32,
) -> Result<ResolvedFormat, KtxError> {
    use crate::TranscodeFormat::*;

    if requested.is_pvrtc1() && !(is_pow2(width) && is_pow2(height)) {
        log::debug!(
            "resolve_format: PVRTC1 only supports power of 2 dimensions (got {}x{})",
            width,
            height
        );
        return Err(KtxError::InvalidOperation);
    }

    let format = match requested {
        Bc1Or3 if has_alpha => Bc3Rgba,
        Bc1Or3 => Bc1Rgb,
        Etc if has_alpha => Etc2Rgba,
        Etc => Etc1Rgb,
        Pvrtc1_4Rgba if !has_alpha => Pvrtc1_4Rgb,
        Pvrtc2_4Rgba if !has_alpha => Pvrtc2_4Rgb,
        other => other,
    };

    let pick = |srgb_format, unorm_format| if srgb { srgb_format } else { unorm_format };
    let vk_format = match format {
        Etc1Rgb => pick(
            VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK,
            VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK,
        ),
        Etc2Rgba => pick(
            VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK,
            VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK,
        ),
        Etc2EacR11 => VK_FORMAT_EAC_R11_UNORM_BLOCK,
        Etc2EacRg11 => VK_FORMAT_EAC_R11G11_UNORM_BLOCK,
        // BC1 alpha is never transcoded to.
        Bc1Rgb => pick(VK_FORMAT_BC1_RGB_SRGB_BLOCK, VK_FORMAT_BC1_RGB_UNORM_BLOCK),
        Bc3Rgba => pick(VK_FORMAT_BC3_SRGB_BLOCK, VK_FORMAT_BC3_UNORM_BLOCK),
        Bc4R => VK_FORMAT_BC4_UNORM_BLOCK,
        Bc5Rg => VK_FORMAT_BC5_UNORM_BLOCK,
        Pvrtc1_4Rgb | Pvrtc1_4Rgba => pick(
            VK_FORMAT_PVRTC1_4BPP_SRGB_BLOCK_IMG,
            VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG,
        ),
        Pvrtc2_4Rgb | Pvrtc2_4Rgba => pick(
            VK_FORMAT_PVRTC2_4BPP_SRGB_BLOCK_IMG,
            VK_FORMAT_PVRTC2_4BPP_UNORM_BLOCK_IMG,
        ),
        Bc7Rgba => pick(VK_FORMAT_BC7_SRGB_BLOCK, VK_FORMAT_BC7_UNORM_BLOCK),
        Astc4x4Rgba => pick(
            VK_FORMAT_ASTC_4X4_SRGB_BLOCK,
            VK_FORMAT_ASTC_4X4_UNORM_BLOCK,
        ),
        Rgb565 => VK_FORMAT_R5G6B5_UNORM_PACK16,
        Bgr565 => VK_FORMAT_B5G6R5_UNORM_PACK16,
        Rgba4444 => VK_FORMAT_R4G4B4A4_UNORM_PACK16,
        Rgba32 => pick(VK_FORMAT_R8G8B8A8_SRGB, VK_FORMAT_R8G8B8A8_UNORM),
        AtcRgb | AtcRgba | Fxt1Rgb | NoSelection | Etc | Bc1Or3 => {
            log::debug!("resolve_format: {:?} has no KTX2 equivalent", format);
            return Err(KtxError::InvalidValue);
        }
    };

    Ok(ResolvedFormat { format, vk_format })
}
