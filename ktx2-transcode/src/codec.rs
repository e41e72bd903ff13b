// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! The interface to the block codec that does the actual per-image transcoding.
//!
//! This crate only drives the codec: it decides which bytes go in and where the
//! results go. Implement [`TranscoderBackend`] over a Basis Universal transcoder to plug one in.

use crate::{transcode::ImageDesc, KtxError, TranscodeFlags, TranscodeFormat};
use std::sync::OnceLock;

/// Parameters of one image to transcode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageParams {
    /// The concrete target format (never an auto-selecting one).
    pub format: TranscodeFormat,
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub num_blocks_x: u32,
    pub num_blocks_y: u32,
}

/// Transcodes the images of a BasisLZ/ETC1S texture.
pub trait Etc1sImageTranscoder {
    /// Decodes the endpoint and selector palettes shared by every image.
    fn decode_palettes(
        &mut self,
        endpoint_count: u32,
        endpoints: &[u8],
        selector_count: u32,
        selectors: &[u8],
    ) -> Result<(), KtxError>;

    /// Decodes the Huffman tables shared by every image.
    fn decode_tables(&mut self, tables: &[u8]) -> Result<(), KtxError>;

    /// Transcodes the image described by `desc` into `dst`.
    ///
    /// `level_data` holds the whole level; `desc`'s slice offsets are relative to it.
    fn transcode_image(
        &mut self,
        desc: &ImageDesc,
        params: &ImageParams,
        dst: &mut [u8],
        level_data: &[u8],
        is_video: bool,
        transcode_alpha_to_opaque_formats: bool,
    ) -> Result<(), KtxError>;
}

/// Transcodes the images of a UASTC texture.
pub trait UastcImageTranscoder {
    /// Transcodes one image, `src`, into `dst`.
    fn transcode_image(
        &mut self,
        params: &ImageParams,
        dst: &mut [u8],
        src: &[u8],
        has_alpha: bool,
        flags: TranscodeFlags,
    ) -> Result<(), KtxError>;
}

/// A block codec.
pub trait TranscoderBackend: Send + Sync {
    /// Read-only tables shared by every ETC1S transcode (the global selector codebook).
    type Codebook: Send + Sync;

    /// Builds the shared tables. Expensive; called at most once per [`TranscoderContext`].
    fn build_codebook(&self) -> Self::Codebook;

    fn etc1s_transcoder<'a>(
        &'a self,
        codebook: &'a Self::Codebook,
    ) -> Box<dyn Etc1sImageTranscoder + 'a>;

    fn uastc_transcoder(&self) -> Box<dyn UastcImageTranscoder + '_>;
}

/// Process-wide transcoder state.
///
/// Create one per backend and share it (by reference or in an `Arc`) between
/// every texture and thread that transcodes. The codebook is built on first
/// use, exactly once, even if that first use happens on several threads at once.
pub struct TranscoderContext<B: TranscoderBackend> {
    backend: B,
    codebook: OnceLock<B::Codebook>,
}

impl<B: TranscoderBackend> TranscoderContext<B> {
    pub fn new(backend: B) -> Self {
        TranscoderContext {
            backend,
            codebook: OnceLock::new(),
        }
    }

    /// Builds the codebook now rather than on the first transcode.
    pub fn initialize(&self) {
        self.codebook();
    }

    pub fn is_initialized(&self) -> bool {
        self.codebook.get().is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn codebook(&self) -> &B::Codebook {
        self.codebook.get_or_init(|| {
            log::debug!("TranscoderContext: building the global codebook");
            self.backend.build_codebook()
        })
    }

    pub(crate) fn etc1s_transcoder(&self) -> Box<dyn Etc1sImageTranscoder + '_> {
        self.backend.etc1s_transcoder(self.codebook())
    }

    pub(crate) fn uastc_transcoder(&self) -> Box<dyn UastcImageTranscoder + '_> {
        self.backend.uastc_transcoder()
    }
}
