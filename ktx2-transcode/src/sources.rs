// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! [`crate::texture::TextureSource`] implementations for reading (or creating) [`Texture`]s from.

use crate::{
    dfd::{self, DfdView},
    enums::{CreateStorage, SupercompressionScheme},
    format_size::FormatSize,
    texture::{
        alloc_zeroed, layout_levels, required_level_alignment, LevelIndexEntry, Texture,
        TextureGeometry, TextureRepr, TextureSource,
    },
    vk_format::VK_FORMAT_UNDEFINED,
    KtxError,
};
use std::io::Read;

/// [`Texture`] creation info for KTX2 textures.
/// This is also a [`TextureSource`], which creates a new texture according to `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ktx2CreateInfo {
    pub vk_format: u32,
    /// Built from `vk_format` if `None`.
    pub dfd: Option<Vec<u32>>,
    pub create_storage: CreateStorage,
    pub geometry: TextureGeometry,
}

impl Default for Ktx2CreateInfo {
    fn default() -> Self {
        Ktx2CreateInfo {
            vk_format: 37, // VK_R8G8B8A8_UNORM
            dfd: None,
            create_storage: CreateStorage::AllocStorage,
            geometry: Default::default(),
        }
    }
}

impl Ktx2CreateInfo {
    /// Validates `self`, returning the format size and DFD to use.
    fn resolve_format(&self) -> Result<(FormatSize, Vec<u32>), KtxError> {
        self.geometry.validate()?;
        let dfd = match &self.dfd {
            Some(dfd) => dfd.clone(),
            None => dfd::for_vk_format(self.vk_format).ok_or(KtxError::InvalidValue)?,
        };
        let format_size = if self.vk_format == VK_FORMAT_UNDEFINED {
            let view = DfdView::new(&dfd).ok_or(KtxError::InvalidValue)?;
            FormatSize::for_dfd(&view)
        } else {
            FormatSize::for_vk_format(self.vk_format)
        }
        .ok_or(KtxError::InvalidValue)?;
        Ok((format_size, dfd))
    }
}

impl<'a> TextureSource<'a> for Ktx2CreateInfo {
    fn create_texture(self) -> Result<Texture<'a>, KtxError> {
        let (format_size, dfd) = self.resolve_format()?;
        let scheme = SupercompressionScheme::None;
        let alignment = required_level_alignment(scheme, &format_size);
        let (level_index, data_size) = layout_levels(&self.geometry, &format_size, alignment);
        let data = match self.create_storage {
            CreateStorage::AllocStorage => Some(alloc_zeroed(data_size)?),
            CreateStorage::NoStorage => None,
        };

        Ok(Texture {
            geometry: self.geometry,
            repr: TextureRepr {
                vk_format: self.vk_format,
                format_size,
                is_compressed: format_size.is_compressed(),
                supercompression_scheme: scheme,
                supercompression_global_data: None,
                required_level_alignment: alignment,
                level_index,
                dfd,
                data,
            },
            pending_data: None,
        })
    }
}

/// Where the image data of a [`PreparsedSource`] comes from.
pub enum ImageData<'a> {
    /// No image data.
    None,
    /// Image data already in memory.
    Loaded(Vec<u8>),
    /// Image data to be read on [`Texture::load_image_data`]; the reader must be
    /// positioned at the start of the smallest level's data.
    Pending(Box<dyn Read + 'a>),
}

impl<'a> std::fmt::Debug for ImageData<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageData::None => write!(f, "None"),
            ImageData::Loaded(data) => write!(f, "Loaded({} bytes)", data.len()),
            ImageData::Pending(_) => write!(f, "Pending"),
        }
    }
}

/// [`TextureSource`] for a KTX2 whose header, indices and global data have already been parsed.
///
/// Level index offsets are relative to the start of the image data.
#[derive(Debug)]
pub struct PreparsedSource<'a> {
    pub vk_format: u32,
    pub dfd: Vec<u32>,
    pub geometry: TextureGeometry,
    pub supercompression_scheme: SupercompressionScheme,
    pub supercompression_global_data: Option<Vec<u8>>,
    pub level_index: Vec<LevelIndexEntry>,
    pub image_data: ImageData<'a>,
}

impl<'a> TextureSource<'a> for PreparsedSource<'a> {
    fn create_texture(self) -> Result<Texture<'a>, KtxError> {
        let info = Ktx2CreateInfo {
            vk_format: self.vk_format,
            dfd: Some(self.dfd),
            create_storage: CreateStorage::NoStorage,
            geometry: self.geometry,
        };
        let (format_size, dfd) = info.resolve_format()?;

        if self.level_index.len() != info.geometry.num_levels as usize {
            return Err(KtxError::InvalidValue);
        }

        let (data, pending_data) = match self.image_data {
            ImageData::None => (None, None),
            ImageData::Pending(reader) => (None, Some(reader)),
            ImageData::Loaded(data) => {
                let fits = self.level_index.iter().all(|entry| {
                    entry
                        .byte_offset
                        .checked_add(entry.byte_length)
                        .map_or(false, |end| end <= data.len() as u64)
                });
                if !fits {
                    return Err(KtxError::FileDataError);
                }
                (Some(data), None)
            }
        };

        let scheme = self.supercompression_scheme;
        Ok(Texture {
            geometry: info.geometry,
            repr: TextureRepr {
                vk_format: self.vk_format,
                format_size,
                is_compressed: format_size.is_compressed(),
                supercompression_scheme: scheme,
                supercompression_global_data: self.supercompression_global_data,
                required_level_alignment: required_level_alignment(scheme, &format_size),
                level_index: self.level_index,
                dfd,
                data,
            },
            pending_data,
        })
    }
}
