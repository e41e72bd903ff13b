// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! BasisLZ supercompression global data.
//!
//! Layout: a [`BasisGlobalHeader`], one [`ImageDesc`] per image (all levels,
//! largest level first), then the endpoint palette, the selector palette,
//! the Huffman tables and any extended data.

use crate::KtxError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    convert::TryFrom,
    io::{self, Read, Write},
    ops::Range,
};

/// Set in [`BasisGlobalHeader::global_flags`] when every image has an alpha slice.
pub const HAS_ALPHA_SLICES: u32 = 0x4;
/// Set in [`ImageDesc::image_flags`] for video P-frames.
pub const ETC1S_P_FRAME: u32 = 0x2;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BasisGlobalHeader {
    pub global_flags: u32,
    pub endpoint_count: u16,
    pub selector_count: u16,
    pub endpoints_byte_length: u32,
    pub selectors_byte_length: u32,
    pub tables_byte_length: u32,
    pub extended_byte_length: u32,
}

impl BasisGlobalHeader {
    pub const SIZE: usize = 24;

    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(BasisGlobalHeader {
            global_flags: reader.read_u32::<LittleEndian>()?,
            endpoint_count: reader.read_u16::<LittleEndian>()?,
            selector_count: reader.read_u16::<LittleEndian>()?,
            endpoints_byte_length: reader.read_u32::<LittleEndian>()?,
            selectors_byte_length: reader.read_u32::<LittleEndian>()?,
            tables_byte_length: reader.read_u32::<LittleEndian>()?,
            extended_byte_length: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.global_flags)?;
        writer.write_u16::<LittleEndian>(self.endpoint_count)?;
        writer.write_u16::<LittleEndian>(self.selector_count)?;
        writer.write_u32::<LittleEndian>(self.endpoints_byte_length)?;
        writer.write_u32::<LittleEndian>(self.selectors_byte_length)?;
        writer.write_u32::<LittleEndian>(self.tables_byte_length)?;
        writer.write_u32::<LittleEndian>(self.extended_byte_length)
    }
}

/// Where one image's slices live within its level's data.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ImageDesc {
    pub image_flags: u32,
    pub rgb_slice_byte_offset: u32,
    pub rgb_slice_byte_length: u32,
    pub alpha_slice_byte_offset: u32,
    pub alpha_slice_byte_length: u32,
}

impl ImageDesc {
    pub const SIZE: usize = 20;

    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(ImageDesc {
            image_flags: reader.read_u32::<LittleEndian>()?,
            rgb_slice_byte_offset: reader.read_u32::<LittleEndian>()?,
            rgb_slice_byte_length: reader.read_u32::<LittleEndian>()?,
            alpha_slice_byte_offset: reader.read_u32::<LittleEndian>()?,
            alpha_slice_byte_length: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.image_flags)?;
        writer.write_u32::<LittleEndian>(self.rgb_slice_byte_offset)?;
        writer.write_u32::<LittleEndian>(self.rgb_slice_byte_length)?;
        writer.write_u32::<LittleEndian>(self.alpha_slice_byte_offset)?;
        writer.write_u32::<LittleEndian>(self.alpha_slice_byte_length)
    }

    pub fn rgb_slice(&self) -> Range<usize> {
        let start = self.rgb_slice_byte_offset as usize;
        start..start + self.rgb_slice_byte_length as usize
    }

    pub fn alpha_slice(&self) -> Range<usize> {
        let start = self.alpha_slice_byte_offset as usize;
        start..start + self.alpha_slice_byte_length as usize
    }

    /// An alpha slice needs both a non-zero offset and length.
    pub fn has_alpha_slice(&self) -> bool {
        self.alpha_slice_byte_offset != 0 && self.alpha_slice_byte_length != 0
    }

    pub fn is_p_frame(&self) -> bool {
        self.image_flags & ETC1S_P_FRAME != 0
    }
}

/// Parsed and validated BasisLZ global data, borrowing the palettes and tables.
#[derive(Debug)]
pub struct BasisGlobalData<'a> {
    pub header: BasisGlobalHeader,
    pub image_descs: Vec<ImageDesc>,
    pub endpoints: &'a [u8],
    pub selectors: &'a [u8],
    pub tables: &'a [u8],
}

impl<'a> BasisGlobalData<'a> {
    /// Parses `sgd`, which must describe exactly `image_count` images.
    pub fn parse(sgd: &'a [u8], image_count: u32) -> Result<Self, KtxError> {
        let mut reader = sgd;
        let header = BasisGlobalHeader::read_from(&mut reader).map_err(|_| KtxError::FileDataError)?;
        if header.endpoints_byte_length == 0
            || header.selectors_byte_length == 0
            || header.tables_byte_length == 0
        {
            log::debug!("BasisGlobalData::parse: missing endpoints, selectors or tables");
            return Err(KtxError::FileDataError);
        }

        let endpoints_start =
            BasisGlobalHeader::SIZE as u64 + ImageDesc::SIZE as u64 * image_count as u64;
        let selectors_start = endpoints_start + header.endpoints_byte_length as u64;
        let tables_start = selectors_start + header.selectors_byte_length as u64;
        let tables_end = tables_start + header.tables_byte_length as u64;
        if tables_end > sgd.len() as u64 {
            log::debug!(
                "BasisGlobalData::parse: tables end at {} but the global data is {} bytes",
                tables_end,
                sgd.len()
            );
            return Err(KtxError::FileDataError);
        }
        // Everything fits in `sgd`, so it also fits in a usize.
        let to_usize = |value: u64| usize::try_from(value).map_err(|_| KtxError::FileDataError);
        let (endpoints_start, selectors_start, tables_start, tables_end) = (
            to_usize(endpoints_start)?,
            to_usize(selectors_start)?,
            to_usize(tables_start)?,
            to_usize(tables_end)?,
        );

        let image_descs = (0..image_count)
            .map(|_| ImageDesc::read_from(&mut reader))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|_| KtxError::FileDataError)?;

        Ok(BasisGlobalData {
            header,
            image_descs,
            endpoints: &sgd[endpoints_start..selectors_start],
            selectors: &sgd[selectors_start..tables_start],
            tables: &sgd[tables_start..tables_end],
        })
    }

    pub fn has_alpha_slices(&self) -> bool {
        self.header.global_flags & HAS_ALPHA_SLICES != 0
    }
}
