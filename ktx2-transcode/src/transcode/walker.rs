// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Walks the mip pyramid, smallest level first, transcoding each image into the prototype.

use super::global_data::BasisGlobalData;
use crate::{
    codec::{Etc1sImageTranscoder, ImageParams, UastcImageTranscoder},
    geometry::{block_count, level_extent, pad_to},
    texture::{LevelIndexEntry, Texture, TextureGeometry},
    KtxError, TranscodeFlags, TranscodeFormat,
};
use std::ops::Range;

/// Both ETC1S and UASTC use 4×4 blocks.
const SOURCE_BLOCK_SIZE: u32 = 4;

/// Sequential, bounds-checked writer over the prototype's image data.
pub(crate) struct LevelWriter<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> LevelWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        LevelWriter { buf, offset: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Everything from the write offset to the end of the buffer.
    pub(crate) fn remaining_mut(&mut self) -> &mut [u8] {
        match self.buf.get_mut(self.offset..) {
            Some(remaining) => remaining,
            None => &mut [],
        }
    }

    pub(crate) fn advance(&mut self, count: usize) -> Result<(), KtxError> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|end| *end <= self.buf.len())
            .ok_or(KtxError::TranscodeFailed)?;
        self.offset = end;
        Ok(())
    }

    /// Moves the write offset to the next multiple of `alignment`.
    /// The result may lie past the end of the buffer once the last level is written.
    pub(crate) fn align_to(&mut self, alignment: u32) {
        self.offset = pad_to(alignment as u64, self.offset as u64) as usize;
    }
}

/// Runs `transcode_image` on every image of every level, smallest level first,
/// writing the results back to back into `prototype` and filling in its level index.
///
/// `transcode_image` receives the image's parameters, its index within the level and
/// the destination (from the image's start to the end of the prototype's data).
/// The first error aborts the walk.
pub(crate) fn walk_levels<F>(
    geometry: &TextureGeometry,
    prototype: &mut Texture<'_>,
    format: TranscodeFormat,
    mut transcode_image: F,
) -> Result<(), KtxError>
where
    F: FnMut(&ImageParams, u32, &mut [u8]) -> Result<(), KtxError>,
{
    let image_sizes: Vec<usize> = (0..geometry.num_levels)
        .map(|level| prototype.image_size(level))
        .collect();
    let alignment = prototype.repr.required_level_alignment;
    let repr = &mut prototype.repr;
    let data = repr.data.as_deref_mut().ok_or(KtxError::InvalidOperation)?;
    let level_index = &mut repr.level_index;

    let mut writer = LevelWriter::new(data);
    for level in (0..geometry.num_levels).rev() {
        let width = level_extent(geometry.base_width, level);
        let height = level_extent(geometry.base_height, level);
        let params = ImageParams {
            format,
            level,
            width,
            height,
            num_blocks_x: block_count(width, SOURCE_BLOCK_SIZE),
            num_blocks_y: block_count(height, SOURCE_BLOCK_SIZE),
        };
        let image_size = image_sizes[level as usize];
        let image_count = geometry.level_image_count(level);
        log::trace!(
            "walk_levels: level {} ({}x{}, {} images of {} bytes) at offset {}",
            level,
            width,
            height,
            image_count,
            image_size,
            writer.offset()
        );

        let level_start = writer.offset();
        for image in 0..image_count {
            transcode_image(&params, image, writer.remaining_mut())?;
            writer.advance(image_size)?;
        }
        let level_length = (writer.offset() - level_start) as u64;
        level_index[level as usize] = LevelIndexEntry {
            byte_offset: level_start as u64,
            byte_length: level_length,
            uncompressed_byte_length: level_length,
        };
        // Uncompressed targets may need coarser alignment than the source had.
        writer.align_to(alignment);
    }
    Ok(())
}

/// The bytes of `level` within `source`'s data.
fn level_data<'t>(source: &'t Texture<'_>, level: u32) -> Result<&'t [u8], KtxError> {
    let data = source.data().ok_or(KtxError::InvalidOperation)?;
    let entry = source
        .level_index()
        .get(level as usize)
        .ok_or(KtxError::FileDataError)?;
    let start = entry.byte_offset as usize;
    let end = start
        .checked_add(entry.byte_length as usize)
        .ok_or(KtxError::FileDataError)?;
    data.get(start..end).ok_or(KtxError::FileDataError)
}

fn within(range: &Range<usize>, len: usize) -> bool {
    range.start <= range.end && range.end <= len
}

/// Transcodes every image of a BasisLZ/ETC1S `source` whose global data has been
/// parsed and whose palettes and tables `transcoder` has already decoded.
pub(crate) fn transcode_etc1s_levels(
    source: &Texture<'_>,
    global_data: &BasisGlobalData<'_>,
    has_alpha: bool,
    prototype: &mut Texture<'_>,
    format: TranscodeFormat,
    flags: TranscodeFlags,
    transcoder: &mut dyn Etc1sImageTranscoder,
) -> Result<(), KtxError> {
    let geometry = source.geometry();

    // Index of the first image of each level within the image descriptors.
    let first_images: Vec<u32> = (0..geometry.num_levels)
        .scan(0, |next, level| {
            let first = *next;
            *next += geometry.level_image_count(level);
            Some(first)
        })
        .collect();

    let transcode_alpha_to_opaque_formats =
        has_alpha && flags.contains(TranscodeFlags::TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS);
    let is_video = geometry.is_video;

    walk_levels(geometry, prototype, format, |params, image, dst| {
        let level_bytes = level_data(source, params.level)?;
        let desc = global_data
            .image_descs
            .get((first_images[params.level as usize] + image) as usize)
            .ok_or(KtxError::FileDataError)?;

        if has_alpha && !desc.has_alpha_slice() {
            log::debug!(
                "transcode_etc1s_levels: image {} of level {} has no alpha slice",
                image,
                params.level
            );
            return Err(KtxError::FileDataError);
        }
        if !within(&desc.rgb_slice(), level_bytes.len())
            || (has_alpha && !within(&desc.alpha_slice(), level_bytes.len()))
        {
            return Err(KtxError::FileDataError);
        }

        transcoder.transcode_image(
            desc,
            params,
            dst,
            level_bytes,
            is_video,
            transcode_alpha_to_opaque_formats,
        )
    })
}

/// Transcodes every image of a UASTC `source`. Its data must already be inflated.
pub(crate) fn transcode_uastc_levels(
    source: &Texture<'_>,
    has_alpha: bool,
    prototype: &mut Texture<'_>,
    format: TranscodeFormat,
    flags: TranscodeFlags,
    transcoder: &mut dyn UastcImageTranscoder,
) -> Result<(), KtxError> {
    let geometry = source.geometry();

    walk_levels(geometry, prototype, format, |params, image, dst| {
        let level_bytes = level_data(source, params.level)?;
        let image_size_in = source.image_size(params.level);
        let start = image as usize * image_size_in;
        let src = level_bytes
            .get(start..start + image_size_in)
            .ok_or(KtxError::FileDataError)?;
        transcoder.transcode_image(params, dst, src, has_alpha, flags)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_advances_within_bounds() {
        let mut buf = [0u8; 10];
        let mut writer = LevelWriter::new(&mut buf);
        writer.advance(6).unwrap();
        assert_eq!(writer.remaining_mut().len(), 4);
        assert_eq!(writer.advance(5), Err(KtxError::TranscodeFailed));
        assert_eq!(writer.offset(), 6);
    }

    #[test]
    fn writer_alignment_can_run_past_the_end() {
        let mut buf = [0u8; 10];
        let mut writer = LevelWriter::new(&mut buf);
        writer.advance(10).unwrap();
        writer.align_to(4);
        assert_eq!(writer.offset(), 12);
        assert!(writer.remaining_mut().is_empty());
    }
}
