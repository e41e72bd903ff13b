// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use crate::{
    dfd::{ColorModel, DfdView},
    enums::SupercompressionScheme,
    format_size::FormatSize,
    geometry::{block_count, lcm4, level_extent, pad_to},
    KtxError,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    convert::TryFrom,
    fmt,
    io::{self, Read, Write},
};

pub trait TextureSource<'a> {
    fn create_texture(self) -> Result<Texture<'a>, KtxError>;
}

/// One entry of a KTX2 level index.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LevelIndexEntry {
    pub byte_offset: u64,
    pub byte_length: u64,
    pub uncompressed_byte_length: u64,
}

impl LevelIndexEntry {
    /// Size of an entry in a KTX2 file.
    pub const SIZE: usize = 24;

    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(LevelIndexEntry {
            byte_offset: reader.read_u64::<LittleEndian>()?,
            byte_length: reader.read_u64::<LittleEndian>()?,
            uncompressed_byte_length: reader.read_u64::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u64::<LittleEndian>(self.byte_offset)?;
        writer.write_u64::<LittleEndian>(self.byte_length)?;
        writer.write_u64::<LittleEndian>(self.uncompressed_byte_length)
    }
}

/// Dimensions and image counts of a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureGeometry {
    pub base_width: u32,
    pub base_height: u32,
    pub base_depth: u32,
    pub num_dimensions: u32,
    pub num_levels: u32,
    pub num_layers: u32,
    pub num_faces: u32,
    pub is_array: bool,
    pub is_video: bool,
    pub generate_mipmaps: bool,
}

impl Default for TextureGeometry {
    fn default() -> Self {
        TextureGeometry {
            base_width: 1,
            base_height: 1,
            base_depth: 1,
            num_dimensions: 1,
            num_levels: 1,
            num_layers: 1,
            num_faces: 1,
            is_array: false,
            is_video: false,
            generate_mipmaps: false,
        }
    }
}

impl TextureGeometry {
    pub(crate) fn validate(&self) -> Result<(), KtxError> {
        if !(1..=3).contains(&self.num_dimensions) {
            return Err(KtxError::InvalidValue);
        }
        if self.base_width == 0
            || self.base_height == 0
            || self.base_depth == 0
            || self.num_levels == 0
            || self.num_layers == 0
        {
            return Err(KtxError::InvalidValue);
        }
        match self.num_dimensions {
            1 if self.base_height > 1 || self.base_depth > 1 => {
                return Err(KtxError::InvalidOperation)
            }
            2 if self.base_depth > 1 => return Err(KtxError::InvalidOperation),
            _ => {}
        }
        match self.num_faces {
            1 => {}
            // There are no 3D cubemaps.
            6 if self.num_dimensions == 2 && self.base_width == self.base_height => {}
            6 => return Err(KtxError::InvalidOperation),
            _ => return Err(KtxError::InvalidValue),
        }

        let max_dim = self.base_width.max(self.base_height).max(self.base_depth);
        let max_levels = 32 - max_dim.leading_zeros();
        if self.num_levels > max_levels {
            return Err(KtxError::InvalidOperation);
        }
        if self.generate_mipmaps && self.num_levels > 1 {
            return Err(KtxError::InvalidOperation);
        }
        Ok(())
    }

    /// Number of images (layers × faces × depth slices) in mip `level`.
    pub fn level_image_count(&self, level: u32) -> u32 {
        self.num_layers * self.num_faces * level_extent(self.base_depth, level)
    }

    /// Number of images across all levels.
    pub fn total_image_count(&self) -> u32 {
        (0..self.num_levels)
            .map(|level| self.level_image_count(level))
            .sum()
    }
}

/// Everything a transcode replaces: format, DFD, level index and image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRepr {
    pub(crate) vk_format: u32,
    pub(crate) format_size: FormatSize,
    pub(crate) is_compressed: bool,
    pub(crate) supercompression_scheme: SupercompressionScheme,
    pub(crate) supercompression_global_data: Option<Vec<u8>>,
    pub(crate) required_level_alignment: u32,
    pub(crate) level_index: Vec<LevelIndexEntry>,
    pub(crate) dfd: Vec<u32>,
    pub(crate) data: Option<Vec<u8>>,
}

/// An in-memory KTX2 texture.
pub struct Texture<'a> {
    pub(crate) geometry: TextureGeometry,
    pub(crate) repr: TextureRepr,
    pub(crate) pending_data: Option<Box<dyn Read + 'a>>,
}

impl<'a> Texture<'a> {
    pub fn new<S>(source: S) -> Result<Self, KtxError>
    where
        S: TextureSource<'a>,
    {
        source.create_texture()
    }

    pub fn geometry(&self) -> &TextureGeometry {
        &self.geometry
    }

    pub fn repr(&self) -> &TextureRepr {
        &self.repr
    }

    pub fn vk_format(&self) -> u32 {
        self.repr.vk_format
    }

    pub fn format_size(&self) -> &FormatSize {
        &self.repr.format_size
    }

    pub fn is_compressed(&self) -> bool {
        self.repr.is_compressed
    }

    pub fn supercompression_scheme(&self) -> SupercompressionScheme {
        self.repr.supercompression_scheme
    }

    pub fn supercompression_global_data(&self) -> Option<&[u8]> {
        self.repr.supercompression_global_data.as_deref()
    }

    pub fn required_level_alignment(&self) -> u32 {
        self.repr.required_level_alignment
    }

    pub fn level_index(&self) -> &[LevelIndexEntry] {
        &self.repr.level_index
    }

    pub fn dfd(&self) -> &[u32] {
        &self.repr.dfd
    }

    /// The image data, if it has been loaded (or allocated).
    pub fn data(&self) -> Option<&[u8]> {
        self.repr.data.as_deref()
    }

    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.repr.data.as_deref_mut()
    }

    pub fn data_size(&self) -> usize {
        self.repr.data.as_ref().map_or(0, Vec::len)
    }

    /// Is image data still waiting to be read from a stream?
    pub fn is_active_stream(&self) -> bool {
        self.pending_data.is_some()
    }

    /// Does this texture hold ETC1S or UASTC data that must be transcoded before use?
    pub fn needs_transcoding(&self) -> bool {
        DfdView::new(&self.repr.dfd).map_or(false, |dfd| {
            matches!(dfd.color_model(), ColorModel::ETC1S | ColorModel::UASTC)
        })
    }

    /// Number of color components of the texture's format.
    pub fn num_components(&self) -> u32 {
        DfdView::new(&self.repr.dfd).map_or(0, |dfd| dfd.component_count())
    }

    /// Size in bytes of a texel block.
    pub fn element_size(&self) -> usize {
        self.repr.format_size.block_size_in_bytes() as usize
    }

    /// Size in bytes of a row of blocks of mip `level`.
    pub fn row_pitch(&self, level: u32) -> usize {
        let format_size = &self.repr.format_size;
        let blocks_x = block_count(
            level_extent(self.geometry.base_width, level),
            format_size.block_width,
        )
        .max(format_size.min_blocks_x);
        blocks_x as usize * self.element_size()
    }

    /// Size in bytes of one image (one layer, face or depth slice) of mip `level`.
    pub fn image_size(&self, level: u32) -> usize {
        calc_image_size(&self.geometry, &self.repr.format_size, level) as usize
    }

    /// Size in bytes of every image of mip `level`.
    pub fn level_size(&self, level: u32) -> usize {
        calc_level_size(&self.geometry, &self.repr.format_size, level) as usize
    }

    /// Offset of mip `level` within [`Texture::data`].
    pub fn level_data_offset(&self, level: u32) -> Option<u64> {
        self.repr
            .level_index
            .get(level as usize)
            .map(|entry| entry.byte_offset)
    }

    /// Offset within [`Texture::data`] of the image at `level`, `layer` and `face_slice`
    /// (a cubemap face, or a depth slice for 3D textures).
    pub fn image_offset(&self, level: u32, layer: u32, face_slice: u32) -> Result<usize, KtxError> {
        if self.repr.supercompression_scheme != SupercompressionScheme::None {
            return Err(KtxError::InvalidOperation);
        }
        let geometry = &self.geometry;
        let face_slices = geometry.num_faces * level_extent(geometry.base_depth, level);
        if level >= geometry.num_levels || layer >= geometry.num_layers || face_slice >= face_slices
        {
            return Err(KtxError::InvalidValue);
        }
        let level_offset = self
            .level_data_offset(level)
            .ok_or(KtxError::InvalidValue)? as usize;
        let image = (layer * face_slices + face_slice) as usize;
        Ok(level_offset + image * self.image_size(level))
    }

    /// Reads the image data of a texture created with pending image data.
    ///
    /// Does nothing if the image data has already been loaded.
    pub fn load_image_data(&mut self) -> Result<(), KtxError> {
        if self.repr.data.is_some() {
            return Ok(());
        }
        let mut reader = self.pending_data.take().ok_or(KtxError::InvalidOperation)?;
        let size = self
            .repr
            .level_index
            .iter()
            .map(|entry| entry.byte_offset + entry.byte_length)
            .max()
            .unwrap_or(0);
        let mut data = alloc_zeroed(size)?;
        reader.read_exact(&mut data).map_err(|err| {
            log::debug!("Texture::load_image_data: {}", err);
            match err.kind() {
                io::ErrorKind::UnexpectedEof => KtxError::FileUnexpectedEof,
                _ => KtxError::FileReadError,
            }
        })?;
        self.repr.data = Some(data);
        Ok(())
    }
}

impl<'a> fmt::Debug for Texture<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("geometry", &self.geometry)
            .field("vk_format", &self.repr.vk_format)
            .field("supercompression_scheme", &self.repr.supercompression_scheme)
            .field("level_index", &self.repr.level_index)
            .field("data_size", &self.data_size())
            .field("pending_data", &self.pending_data.is_some())
            .finish()
    }
}

pub(crate) fn calc_image_size(geometry: &TextureGeometry, format_size: &FormatSize, level: u32) -> u64 {
    let blocks_x = block_count(
        level_extent(geometry.base_width, level),
        format_size.block_width,
    )
    .max(format_size.min_blocks_x);
    let blocks_y = block_count(
        level_extent(geometry.base_height, level),
        format_size.block_height,
    )
    .max(format_size.min_blocks_y);
    blocks_x as u64 * blocks_y as u64 * format_size.block_size_in_bytes() as u64
}

pub(crate) fn calc_level_size(geometry: &TextureGeometry, format_size: &FormatSize, level: u32) -> u64 {
    calc_image_size(geometry, format_size, level) * geometry.level_image_count(level) as u64
}

/// Level alignment KTX2 requires for `format_size` (1 when supercompressed).
pub(crate) fn required_level_alignment(
    scheme: SupercompressionScheme,
    format_size: &FormatSize,
) -> u32 {
    if scheme != SupercompressionScheme::None {
        1
    } else {
        lcm4(format_size.block_size_in_bytes())
    }
}

/// Lays out all levels, smallest first, each starting at a multiple of `alignment`.
/// Returns the level index and the total data size.
pub(crate) fn layout_levels(
    geometry: &TextureGeometry,
    format_size: &FormatSize,
    alignment: u32,
) -> (Vec<LevelIndexEntry>, u64) {
    let mut level_index = vec![LevelIndexEntry::default(); geometry.num_levels as usize];
    let mut offset = 0u64;
    for level in (0..geometry.num_levels).rev() {
        offset = pad_to(alignment as u64, offset);
        let length = calc_level_size(geometry, format_size, level);
        level_index[level as usize] = LevelIndexEntry {
            byte_offset: offset,
            byte_length: length,
            uncompressed_byte_length: length,
        };
        offset += length;
    }
    (level_index, offset)
}

pub(crate) fn alloc_zeroed(size: u64) -> Result<Vec<u8>, KtxError> {
    let size = usize::try_from(size).map_err(|_| KtxError::OutOfMemory)?;
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| KtxError::OutOfMemory)?;
    data.resize(size, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vk_format::*;
    use rstest::rstest;

    fn geometry(width: u32, height: u32, levels: u32) -> TextureGeometry {
        TextureGeometry {
            base_width: width,
            base_height: height,
            num_dimensions: 2,
            num_levels: levels,
            ..TextureGeometry::default()
        }
    }

    #[rstest]
    #[case(TextureGeometry { num_dimensions: 0, ..TextureGeometry::default() }, KtxError::InvalidValue)]
    #[case(TextureGeometry { base_width: 0, ..TextureGeometry::default() }, KtxError::InvalidValue)]
    #[case(TextureGeometry { num_levels: 0, ..TextureGeometry::default() }, KtxError::InvalidValue)]
    #[case(TextureGeometry { base_height: 2, ..TextureGeometry::default() }, KtxError::InvalidOperation)]
    #[case(TextureGeometry { num_faces: 3, ..TextureGeometry::default() }, KtxError::InvalidValue)]
    #[case(TextureGeometry { num_faces: 6, base_depth: 4, num_dimensions: 3, ..TextureGeometry::default() }, KtxError::InvalidOperation)]
    #[case(TextureGeometry { base_width: 4, num_levels: 4, ..TextureGeometry::default() }, KtxError::InvalidOperation)]
    fn invalid_geometry(#[case] geometry: TextureGeometry, #[case] error: KtxError) {
        assert_eq!(geometry.validate(), Err(error));
    }

    #[test]
    fn image_counts_follow_depth() {
        let geometry = TextureGeometry {
            base_width: 8,
            base_height: 8,
            base_depth: 4,
            num_dimensions: 3,
            num_levels: 4,
            num_layers: 2,
            ..TextureGeometry::default()
        };
        assert_eq!(geometry.level_image_count(0), 8);
        assert_eq!(geometry.level_image_count(1), 4);
        assert_eq!(geometry.level_image_count(3), 2);
        assert_eq!(geometry.total_image_count(), 8 + 4 + 2 + 2);
    }

    #[test]
    fn levels_are_laid_out_smallest_first_and_aligned() {
        // RGB565 texels are 2 bytes, but levels still start on 4-byte boundaries.
        let format_size = FormatSize::for_vk_format(VK_FORMAT_R5G6B5_UNORM_PACK16).unwrap();
        let geometry = geometry(3, 1, 2);
        let alignment = required_level_alignment(SupercompressionScheme::None, &format_size);
        assert_eq!(alignment, 4);

        let (index, size) = layout_levels(&geometry, &format_size, alignment);
        assert_eq!(index[1].byte_offset, 0);
        assert_eq!(index[1].byte_length, 2);
        assert_eq!(index[0].byte_offset, 4);
        assert_eq!(index[0].byte_length, 6);
        assert_eq!(size, 10);
    }

    #[test]
    fn pvrtc1_images_are_at_least_two_blocks_wide() {
        let format_size =
            FormatSize::for_vk_format(VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG).unwrap();
        let geometry = geometry(4, 4, 3);
        assert_eq!(calc_image_size(&geometry, &format_size, 0), 2 * 2 * 8);
        assert_eq!(calc_image_size(&geometry, &format_size, 2), 2 * 2 * 8);
    }

    #[test]
    fn level_index_entry_on_disk_layout() {
        let entry = LevelIndexEntry {
            byte_offset: 0x10,
            byte_length: 0x0102,
            uncompressed_byte_length: 0x0102,
        };
        let mut bytes = Vec::new();
        entry.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), LevelIndexEntry::SIZE);
        assert_eq!(&bytes[..9], &[0x10, 0, 0, 0, 0, 0, 0, 0, 0x02]);
        assert_eq!(LevelIndexEntry::read_from(&bytes[..]).unwrap(), entry);
    }

    #[test]
    fn oversized_allocation_is_out_of_memory() {
        assert_eq!(alloc_zeroed(u64::MAX).unwrap_err(), KtxError::OutOfMemory);
    }
}
