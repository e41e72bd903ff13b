// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Transcoding of Basis Universal textures (BasisLZ/ETC1S or UASTC) to GPU block formats.

mod format;
mod global_data;
mod walker;

pub use format::{resolve_format, ResolvedFormat};
pub use global_data::{BasisGlobalData, BasisGlobalHeader, ImageDesc, ETC1S_P_FRAME, HAS_ALPHA_SLICES};

use crate::{
    codec::{TranscoderBackend, TranscoderContext},
    dfd::{ColorModel, DfdView, Transfer},
    enums::{CreateStorage, SupercompressionScheme},
    sources::Ktx2CreateInfo,
    texture::{Texture, TextureRepr},
    KtxError, TranscodeFlags, TranscodeFormat,
};
use walker::{transcode_etc1s_levels, transcode_uastc_levels};

impl<'a> Texture<'a> {
    /// Transcodes a BasisLZ/ETC1S or UASTC texture to `output_format`.
    ///
    /// Auto-selecting formats ([`TranscodeFormat::Etc`], [`TranscodeFormat::Bc1Or3`]) pick their
    /// alpha or opaque variant according to the texture's alpha. Pending image data is loaded first.
    ///
    /// On success, the texture's format, DFD, level index and data are replaced by the
    /// transcoded ones and its supercompression scheme becomes [`SupercompressionScheme::None`].
    /// On failure the texture is left as it was (apart from any pending image data having been loaded).
    pub fn transcode_basis<B: TranscoderBackend>(
        &mut self,
        context: &TranscoderContext<B>,
        output_format: TranscodeFormat,
        flags: TranscodeFlags,
    ) -> Result<(), KtxError> {
        let repr = self.transcode_to_repr(context, output_format, flags)?;
        log::debug!(
            "Texture::transcode_basis: committing {} bytes of VkFormat {}",
            repr.data.as_ref().map_or(0, Vec::len),
            repr.vk_format
        );
        self.repr = repr;
        Ok(())
    }

    /// Everything [`Texture::transcode_basis`] does short of replacing `self.repr`.
    fn transcode_to_repr<B: TranscoderBackend>(
        &mut self,
        context: &TranscoderContext<B>,
        output_format: TranscodeFormat,
        flags: TranscodeFlags,
    ) -> Result<TextureRepr, KtxError> {
        let scheme = self.repr.supercompression_scheme;
        let (srgb, has_alpha) = {
            let dfd = DfdView::new(&self.repr.dfd).ok_or(KtxError::InvalidOperation)?;
            let color_model = dfd.color_model();
            if color_model != ColorModel::UASTC && scheme != SupercompressionScheme::BasisLz {
                log::debug!(
                    "Texture::transcode_basis: color model {:?} with {:?} supercompression is not transcodable",
                    color_model,
                    scheme
                );
                return Err(KtxError::InvalidOperation);
            }
            if matches!(scheme, SupercompressionScheme::Zstd | SupercompressionScheme::Zlib) {
                log::debug!(
                    "Texture::transcode_basis: {:?} supercompressed data must be inflated first",
                    scheme
                );
                return Err(KtxError::InvalidOperation);
            }
            if scheme == SupercompressionScheme::BasisLz
                && self.supercompression_global_data().map_or(true, <[u8]>::is_empty)
            {
                log::debug!("Texture::transcode_basis: BasisLZ texture without global data");
                return Err(KtxError::InvalidOperation);
            }

            let has_alpha = if scheme == SupercompressionScheme::BasisLz {
                matches!(dfd.component_count(), 2 | 4)
            } else {
                dfd.uastc_has_alpha()
            };
            (dfd.transfer() == Transfer::SRGB, has_alpha)
        };

        if flags.contains(TranscodeFlags::PVRTC_DECODE_TO_NEXT_POW2) {
            log::debug!("Texture::transcode_basis: PVRTC_DECODE_TO_NEXT_POW2 is currently unsupported");
            return Err(KtxError::UnsupportedFeature);
        }

        let resolved = resolve_format(
            output_format,
            has_alpha,
            srgb,
            self.geometry.base_width,
            self.geometry.base_height,
        )?;

        let mut prototype = Texture::new(Ktx2CreateInfo {
            vk_format: resolved.vk_format,
            dfd: None,
            create_storage: CreateStorage::AllocStorage,
            geometry: self.geometry.clone(),
        })
        .map_err(|err| {
            // Geometry was validated when `self` was created.
            debug_assert_eq!(err, KtxError::OutOfMemory);
            err
        })?;

        if self.repr.data.is_none() {
            if !self.is_active_stream() {
                log::debug!("Texture::transcode_basis: no image data to transcode");
                return Err(KtxError::InvalidOperation);
            }
            self.load_image_data()?;
        }

        context.initialize();
        let source: &Texture<'a> = self;
        if scheme == SupercompressionScheme::BasisLz {
            // Presence was checked above; only image data has been loaded since.
            let sgd = source.supercompression_global_data().unwrap_or_default();
            let global_data = BasisGlobalData::parse(sgd, source.geometry.total_image_count())?;
            if global_data.has_alpha_slices() != has_alpha {
                log::warn!(
                    "Texture::transcode_basis: global data alpha flag ({}) disagrees with the DFD ({})",
                    global_data.has_alpha_slices(),
                    has_alpha
                );
            }

            let mut transcoder = context.etc1s_transcoder();
            transcoder.decode_palettes(
                global_data.header.endpoint_count as u32,
                global_data.endpoints,
                global_data.header.selector_count as u32,
                global_data.selectors,
            )?;
            transcoder.decode_tables(global_data.tables)?;
            transcode_etc1s_levels(
                source,
                &global_data,
                has_alpha,
                &mut prototype,
                resolved.format,
                flags,
                &mut *transcoder,
            )?;
        } else {
            let mut transcoder = context.uastc_transcoder();
            transcode_uastc_levels(
                source,
                has_alpha,
                &mut prototype,
                resolved.format,
                flags,
                &mut *transcoder,
            )?;
        }

        Ok(prototype.repr)
    }
}
