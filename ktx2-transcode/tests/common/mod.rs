// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! A recording codec backend and builders for BasisLZ/UASTC test textures.

#![allow(dead_code)]

use ktx2_transcode::{
    codec::{Etc1sImageTranscoder, UastcImageTranscoder},
    dfd,
    sources::{ImageData, Ktx2CreateInfo, PreparsedSource},
    transcode::{BasisGlobalHeader, ImageDesc, HAS_ALPHA_SLICES},
    vk_format::VK_FORMAT_UNDEFINED,
    ImageParams, KtxError, LevelIndexEntry, SupercompressionScheme, Texture, TextureGeometry,
    TranscodeFlags, TranscodeFormat, TranscoderBackend,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

/// Bytes of every (RGB or alpha) slice the ETC1S builders emit.
pub const SLICE_LENGTH: u32 = 8;

/// What the codec was asked to transcode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageCall {
    pub params: ImageParams,
    pub src_len: usize,
    pub dst_len: usize,
    pub has_alpha: bool,
    pub alpha_to_opaque: bool,
}

pub struct MockCodebook;

/// A codec that fills each image with `level + 1` and records every call.
#[derive(Default)]
pub struct MockBackend {
    /// Fail the n-th image (1-based) with [`KtxError::TranscodeFailed`].
    pub fail_on_image: Option<usize>,
    /// Fail decoding the ETC1S palettes with this error.
    pub fail_palettes: Option<KtxError>,
    codebook_builds: AtomicUsize,
    images: Mutex<Vec<ImageCall>>,
    palettes: Mutex<Vec<(u32, usize, u32, usize)>>,
}

impl MockBackend {
    pub fn failing_on_image(image: usize) -> Self {
        MockBackend {
            fail_on_image: Some(image),
            ..MockBackend::default()
        }
    }

    pub fn failing_palettes(err: KtxError) -> Self {
        MockBackend {
            fail_palettes: Some(err),
            ..MockBackend::default()
        }
    }

    pub fn codebook_builds(&self) -> usize {
        self.codebook_builds.load(Ordering::SeqCst)
    }

    pub fn images(&self) -> Vec<ImageCall> {
        self.images.lock().expect("poisoned image log").clone()
    }

    pub fn palettes(&self) -> Vec<(u32, usize, u32, usize)> {
        self.palettes.lock().expect("poisoned palette log").clone()
    }

    fn transcode(&self, call: ImageCall, dst: &mut [u8]) -> Result<(), KtxError> {
        let count = {
            let mut images = self.images.lock().expect("poisoned image log");
            images.push(call);
            images.len()
        };
        if self.fail_on_image == Some(count) {
            return Err(KtxError::TranscodeFailed);
        }
        let size = output_size(&call.params);
        let out = dst.get_mut(..size).ok_or(KtxError::TranscodeFailed)?;
        for byte in out.iter_mut() {
            *byte = call.params.level as u8 + 1;
        }
        Ok(())
    }
}

/// Bytes a real codec writes for one image.
pub fn output_size(params: &ImageParams) -> usize {
    use TranscodeFormat::*;

    let texels = params.width as usize * params.height as usize;
    let (blocks_x, blocks_y) = (params.num_blocks_x as usize, params.num_blocks_y as usize);
    match params.format {
        Rgba32 => texels * 4,
        Rgb565 | Bgr565 | Rgba4444 => texels * 2,
        Pvrtc1_4Rgb | Pvrtc1_4Rgba => blocks_x.max(2) * blocks_y.max(2) * 8,
        Etc1Rgb | Bc1Rgb | Bc4R | Etc2EacR11 | Pvrtc2_4Rgb | Pvrtc2_4Rgba => {
            blocks_x * blocks_y * 8
        }
        _ => blocks_x * blocks_y * 16,
    }
}

struct MockEtc1s<'a> {
    backend: &'a MockBackend,
    palettes_decoded: bool,
    tables_decoded: bool,
}

impl<'a> Etc1sImageTranscoder for MockEtc1s<'a> {
    fn decode_palettes(
        &mut self,
        endpoint_count: u32,
        endpoints: &[u8],
        selector_count: u32,
        selectors: &[u8],
    ) -> Result<(), KtxError> {
        if let Some(err) = self.backend.fail_palettes {
            return Err(err);
        }
        self.backend
            .palettes
            .lock()
            .expect("poisoned palette log")
            .push((endpoint_count, endpoints.len(), selector_count, selectors.len()));
        self.palettes_decoded = true;
        Ok(())
    }

    fn decode_tables(&mut self, tables: &[u8]) -> Result<(), KtxError> {
        self.tables_decoded = !tables.is_empty();
        Ok(())
    }

    fn transcode_image(
        &mut self,
        desc: &ImageDesc,
        params: &ImageParams,
        dst: &mut [u8],
        level_data: &[u8],
        _is_video: bool,
        transcode_alpha_to_opaque_formats: bool,
    ) -> Result<(), KtxError> {
        if !(self.palettes_decoded && self.tables_decoded) || level_data.is_empty() {
            return Err(KtxError::TranscodeFailed);
        }
        let call = ImageCall {
            params: *params,
            src_len: (desc.rgb_slice_byte_length + desc.alpha_slice_byte_length) as usize,
            dst_len: dst.len(),
            has_alpha: desc.has_alpha_slice(),
            alpha_to_opaque: transcode_alpha_to_opaque_formats,
        };
        self.backend.transcode(call, dst)
    }
}

struct MockUastc<'a> {
    backend: &'a MockBackend,
}

impl<'a> UastcImageTranscoder for MockUastc<'a> {
    fn transcode_image(
        &mut self,
        params: &ImageParams,
        dst: &mut [u8],
        src: &[u8],
        has_alpha: bool,
        flags: TranscodeFlags,
    ) -> Result<(), KtxError> {
        let call = ImageCall {
            params: *params,
            src_len: src.len(),
            dst_len: dst.len(),
            has_alpha,
            alpha_to_opaque: flags.contains(TranscodeFlags::TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS),
        };
        self.backend.transcode(call, dst)
    }
}

impl TranscoderBackend for MockBackend {
    type Codebook = MockCodebook;

    fn build_codebook(&self) -> MockCodebook {
        self.codebook_builds.fetch_add(1, Ordering::SeqCst);
        MockCodebook
    }

    fn etc1s_transcoder<'a>(
        &'a self,
        _codebook: &'a MockCodebook,
    ) -> Box<dyn Etc1sImageTranscoder + 'a> {
        Box::new(MockEtc1s {
            backend: self,
            palettes_decoded: false,
            tables_decoded: false,
        })
    }

    fn uastc_transcoder(&self) -> Box<dyn UastcImageTranscoder + '_> {
        Box::new(MockUastc { backend: self })
    }
}

pub fn geometry_2d(width: u32, height: u32, levels: u32) -> TextureGeometry {
    TextureGeometry {
        base_width: width,
        base_height: height,
        num_dimensions: 2,
        num_levels: levels,
        ..TextureGeometry::default()
    }
}

pub fn etc1s_header(has_alpha: bool) -> BasisGlobalHeader {
    BasisGlobalHeader {
        global_flags: if has_alpha { HAS_ALPHA_SLICES } else { 0 },
        endpoint_count: 12,
        selector_count: 6,
        endpoints_byte_length: 24,
        selectors_byte_length: 12,
        tables_byte_length: 8,
        extended_byte_length: 0,
    }
}

/// One descriptor per image, largest level first. Slices are laid out back to back within each level.
pub fn etc1s_image_descs(geometry: &TextureGeometry, has_alpha: bool) -> Vec<ImageDesc> {
    let stride = if has_alpha { 2 * SLICE_LENGTH } else { SLICE_LENGTH };
    (0..geometry.num_levels)
        .flat_map(|level| 0..geometry.level_image_count(level))
        .map(|image| ImageDesc {
            image_flags: 0,
            rgb_slice_byte_offset: image * stride,
            rgb_slice_byte_length: SLICE_LENGTH,
            alpha_slice_byte_offset: if has_alpha { image * stride + SLICE_LENGTH } else { 0 },
            alpha_slice_byte_length: if has_alpha { SLICE_LENGTH } else { 0 },
        })
        .collect()
}

pub fn global_data(header: BasisGlobalHeader, image_descs: &[ImageDesc]) -> Vec<u8> {
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).expect("writing the header");
    for desc in image_descs {
        desc.write_to(&mut bytes).expect("writing an image descriptor");
    }
    let payload = header.endpoints_byte_length
        + header.selectors_byte_length
        + header.tables_byte_length
        + header.extended_byte_length;
    bytes.extend((0..payload).map(|i| i as u8));
    bytes
}

/// Level index and data of an ETC1S texture, smallest level first with no padding.
pub fn etc1s_level_data(geometry: &TextureGeometry, has_alpha: bool) -> (Vec<LevelIndexEntry>, Vec<u8>) {
    let stride = u64::from(if has_alpha { 2 * SLICE_LENGTH } else { SLICE_LENGTH });
    let mut level_index = vec![LevelIndexEntry::default(); geometry.num_levels as usize];
    let mut offset = 0;
    for level in (0..geometry.num_levels).rev() {
        let length = geometry.level_image_count(level) as u64 * stride;
        level_index[level as usize] = LevelIndexEntry {
            byte_offset: offset,
            byte_length: length,
            uncompressed_byte_length: 0,
        };
        offset += length;
    }
    let data = (0..offset).map(|i| (i % 251) as u8).collect();
    (level_index, data)
}

/// A loaded BasisLZ/ETC1S texture.
pub fn etc1s_source(geometry: TextureGeometry, has_alpha: bool, srgb: bool) -> PreparsedSource<'static> {
    let (level_index, data) = etc1s_level_data(&geometry, has_alpha);
    let sgd = global_data(etc1s_header(has_alpha), &etc1s_image_descs(&geometry, has_alpha));
    PreparsedSource {
        vk_format: VK_FORMAT_UNDEFINED,
        dfd: dfd::basis_lz(has_alpha, srgb),
        geometry,
        supercompression_scheme: SupercompressionScheme::BasisLz,
        supercompression_global_data: Some(sgd),
        level_index,
        image_data: ImageData::Loaded(data),
    }
}

pub fn etc1s_texture(geometry: TextureGeometry, has_alpha: bool, srgb: bool) -> Texture<'static> {
    Texture::new(etc1s_source(geometry, has_alpha, srgb)).expect("an ETC1S texture")
}

/// A UASTC texture (not supercompressed) whose single sample has channel id `channel_id`.
pub fn uastc_texture(geometry: TextureGeometry, channel_id: u8, srgb: bool) -> Texture<'static> {
    let mut texture = Texture::new(Ktx2CreateInfo {
        vk_format: VK_FORMAT_UNDEFINED,
        dfd: Some(dfd::uastc(channel_id, srgb)),
        geometry,
        ..Ktx2CreateInfo::default()
    })
    .expect("a UASTC texture");
    if let Some(data) = texture.data_mut() {
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
    }
    texture
}
