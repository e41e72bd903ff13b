// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Khronos Data Format descriptors (DFDs).
//!
//! A DFD is stored as a list of `u32` words: the total byte size of the
//! descriptor, followed by a single basic descriptor block (BDB).

use crate::vk_format::*;

const KHR_DF_VERSIONNUMBER_1_3: u32 = 2;
const BDB_HEADER_WORDS: usize = 6;
const SAMPLE_WORDS: usize = 4;

const KHR_DF_SAMPLE_DATATYPE_LINEAR: u32 = 0x10;

/// A `khr_df_model_e` value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorModel(pub u8);

impl ColorModel {
    pub const RGBSDA: Self = Self(1);
    pub const BC1A: Self = Self(128);
    pub const BC3: Self = Self(130);
    pub const BC4: Self = Self(131);
    pub const BC5: Self = Self(132);
    pub const BC7: Self = Self(134);
    pub const ETC2: Self = Self(161);
    pub const ASTC: Self = Self(162);
    pub const ETC1S: Self = Self(163);
    pub const PVRTC: Self = Self(164);
    pub const PVRTC2: Self = Self(165);
    pub const UASTC: Self = Self(166);
}

/// A `khr_df_transfer_e` value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transfer(pub u8);

impl Transfer {
    pub const LINEAR: Self = Self(1);
    pub const SRGB: Self = Self(2);
}

pub mod channel {
    pub const RGBSDA_RED: u8 = 0;
    pub const RGBSDA_GREEN: u8 = 1;
    pub const RGBSDA_BLUE: u8 = 2;
    pub const RGBSDA_ALPHA: u8 = 15;

    pub const BC_COLOR: u8 = 0;
    pub const BC_ALPHA: u8 = 15;
    pub const BC5_RED: u8 = 0;
    pub const BC5_GREEN: u8 = 1;

    pub const ETC2_RED: u8 = 0;
    pub const ETC2_GREEN: u8 = 1;
    pub const ETC2_COLOR: u8 = 2;
    pub const ETC2_ALPHA: u8 = 15;

    pub const ETC1S_RGB: u8 = 0;
    pub const ETC1S_RRR: u8 = 3;
    pub const ETC1S_GGG: u8 = 4;
    pub const ETC1S_AAA: u8 = 15;

    pub const UASTC_RGB: u8 = 0;
    pub const UASTC_RGBA: u8 = 3;
    pub const UASTC_RRR: u8 = 4;
    pub const UASTC_RRRG: u8 = 5;
    pub const UASTC_RG: u8 = 6;

    pub const DATA: u8 = 0;
}

/// Read-only view over a DFD's basic descriptor block.
#[derive(Debug, Copy, Clone)]
pub struct DfdView<'a> {
    bdb: &'a [u32],
}

impl<'a> DfdView<'a> {
    /// Returns `None` if `dfd` is too short to hold a basic descriptor block.
    pub fn new(dfd: &'a [u32]) -> Option<Self> {
        let bdb = dfd.get(1..)?;
        if bdb.len() < BDB_HEADER_WORDS {
            return None;
        }
        let view = DfdView { bdb };
        if bdb.len() < BDB_HEADER_WORDS + view.sample_count() * SAMPLE_WORDS {
            return None;
        }
        Some(view)
    }

    pub fn color_model(&self) -> ColorModel {
        ColorModel((self.bdb[2] & 0xff) as u8)
    }

    pub fn transfer(&self) -> Transfer {
        Transfer(((self.bdb[2] >> 16) & 0xff) as u8)
    }

    pub fn bytes_plane0(&self) -> u32 {
        self.bdb[4] & 0xff
    }

    pub fn sample_count(&self) -> usize {
        let block_size = (self.bdb[1] >> 16) as usize;
        block_size.saturating_sub(BDB_HEADER_WORDS * 4) / (SAMPLE_WORDS * 4)
    }

    /// Channel id of sample `index` (`None` if out of range).
    pub fn channel_id(&self, index: usize) -> Option<u8> {
        if index >= self.sample_count() {
            return None;
        }
        let word = self.bdb[BDB_HEADER_WORDS + index * SAMPLE_WORDS];
        Some(((word >> 24) & 0xf) as u8)
    }

    /// Number of color components, as `ktxTexture2_GetNumComponents` counts them.
    pub fn component_count(&self) -> u32 {
        let samples = self.sample_count() as u32;
        let first = self.channel_id(0);
        match self.color_model() {
            ColorModel::ETC1S => match (samples, first) {
                (1, Some(channel::ETC1S_RRR)) => 1,
                (1, _) => 3,
                (_, Some(channel::ETC1S_RRR)) => 2,
                _ => 4,
            },
            ColorModel::UASTC => match first {
                Some(channel::UASTC_RGBA) => 4,
                Some(channel::UASTC_RRR) => 1,
                Some(channel::UASTC_RRRG) | Some(channel::UASTC_RG) => 2,
                _ => 3,
            },
            _ => samples,
        }
    }

    /// Does a UASTC descriptor declare an alpha channel?
    pub fn uastc_has_alpha(&self) -> bool {
        matches!(
            self.channel_id(0),
            Some(channel::UASTC_RGBA) | Some(channel::UASTC_RRRG)
        )
    }
}

#[derive(Debug, Copy, Clone)]
struct Sample {
    bit_offset: u32,
    bit_length: u32,
    channel: u8,
    linear: bool,
    upper: u32,
}

impl Sample {
    fn block(bit_offset: u32, bit_length: u32, channel: u8) -> Self {
        Sample {
            bit_offset,
            bit_length,
            channel,
            linear: false,
            upper: u32::MAX,
        }
    }

    fn texel(bit_offset: u32, bit_length: u32, channel: u8) -> Self {
        Sample {
            bit_offset,
            bit_length,
            channel,
            linear: false,
            upper: if bit_length >= 32 {
                u32::MAX
            } else {
                (1 << bit_length) - 1
            },
        }
    }

    fn words(&self) -> [u32; SAMPLE_WORDS] {
        let qualifiers = if self.linear {
            KHR_DF_SAMPLE_DATATYPE_LINEAR
        } else {
            0
        };
        [
            (self.bit_offset & 0xffff)
                | (((self.bit_length - 1) & 0xff) << 16)
                | ((self.channel as u32 | qualifiers) << 24),
            0,
            0,
            self.upper,
        ]
    }
}

struct BlockDesc {
    model: ColorModel,
    transfer: Transfer,
    block_dims: [u32; 4],
    bytes_plane0: u32,
    samples: Vec<Sample>,
}

impl BlockDesc {
    fn encode(&self) -> Vec<u32> {
        let block_size = (BDB_HEADER_WORDS + self.samples.len() * SAMPLE_WORDS) as u32 * 4;
        let dims = self
            .block_dims
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, dim)| {
                acc | (dim.saturating_sub(1) & 0xff) << (8 * i)
            });

        let mut words = Vec::with_capacity(1 + block_size as usize / 4);
        words.push(block_size + 4);
        words.push(0); // vendor Khronos, descriptor type basic
        words.push(KHR_DF_VERSIONNUMBER_1_3 | (block_size << 16));
        words.push(
            self.model.0 as u32
                | (1 << 8) // BT.709 primaries
                | ((self.transfer.0 as u32) << 16),
        );
        words.push(dims);
        words.push(self.bytes_plane0 & 0xff);
        words.push(0);
        for sample in &self.samples {
            words.extend_from_slice(&sample.words());
        }
        words
    }
}

fn transfer_of(srgb: bool) -> Transfer {
    if srgb {
        Transfer::SRGB
    } else {
        Transfer::LINEAR
    }
}

/// A basic DFD for `vk_format`, or `None` for formats transcoding cannot produce.
pub fn for_vk_format(vk_format: u32) -> Option<Vec<u32>> {
    use channel::*;

    let srgb = is_srgb(vk_format);
    let transfer = transfer_of(srgb);
    let compressed = |model, bytes: u32, samples: Vec<Sample>| BlockDesc {
        model,
        transfer,
        block_dims: [4, 4, 1, 1],
        bytes_plane0: bytes,
        samples,
    };
    let texel = |bytes: u32, mut samples: Vec<Sample>| {
        for sample in samples.iter_mut() {
            // Alpha is never sRGB-encoded.
            sample.linear = srgb && sample.channel == RGBSDA_ALPHA;
        }
        BlockDesc {
            model: ColorModel::RGBSDA,
            transfer,
            block_dims: [1, 1, 1, 1],
            bytes_plane0: bytes,
            samples,
        }
    };

    let desc = match vk_format {
        VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK | VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK => {
            compressed(ColorModel::ETC2, 8, vec![Sample::block(0, 64, ETC2_COLOR)])
        }
        VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK | VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK => compressed(
            ColorModel::ETC2,
            16,
            vec![
                Sample::block(0, 64, ETC2_ALPHA),
                Sample::block(64, 64, ETC2_COLOR),
            ],
        ),
        VK_FORMAT_EAC_R11_UNORM_BLOCK => {
            compressed(ColorModel::ETC2, 8, vec![Sample::block(0, 64, ETC2_RED)])
        }
        VK_FORMAT_EAC_R11G11_UNORM_BLOCK => compressed(
            ColorModel::ETC2,
            16,
            vec![
                Sample::block(0, 64, ETC2_RED),
                Sample::block(64, 64, ETC2_GREEN),
            ],
        ),
        VK_FORMAT_BC1_RGB_UNORM_BLOCK | VK_FORMAT_BC1_RGB_SRGB_BLOCK => {
            compressed(ColorModel::BC1A, 8, vec![Sample::block(0, 64, BC_COLOR)])
        }
        VK_FORMAT_BC3_UNORM_BLOCK | VK_FORMAT_BC3_SRGB_BLOCK => compressed(
            ColorModel::BC3,
            16,
            vec![
                Sample::block(0, 64, BC_ALPHA),
                Sample::block(64, 64, BC_COLOR),
            ],
        ),
        VK_FORMAT_BC4_UNORM_BLOCK => {
            compressed(ColorModel::BC4, 8, vec![Sample::block(0, 64, DATA)])
        }
        VK_FORMAT_BC5_UNORM_BLOCK => compressed(
            ColorModel::BC5,
            16,
            vec![
                Sample::block(0, 64, BC5_RED),
                Sample::block(64, 64, BC5_GREEN),
            ],
        ),
        VK_FORMAT_BC7_UNORM_BLOCK | VK_FORMAT_BC7_SRGB_BLOCK => {
            compressed(ColorModel::BC7, 16, vec![Sample::block(0, 128, DATA)])
        }
        VK_FORMAT_ASTC_4X4_UNORM_BLOCK | VK_FORMAT_ASTC_4X4_SRGB_BLOCK => {
            compressed(ColorModel::ASTC, 16, vec![Sample::block(0, 128, DATA)])
        }
        VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG | VK_FORMAT_PVRTC1_4BPP_SRGB_BLOCK_IMG => {
            compressed(ColorModel::PVRTC, 8, vec![Sample::block(0, 64, DATA)])
        }
        VK_FORMAT_PVRTC2_4BPP_UNORM_BLOCK_IMG | VK_FORMAT_PVRTC2_4BPP_SRGB_BLOCK_IMG => {
            compressed(ColorModel::PVRTC2, 8, vec![Sample::block(0, 64, DATA)])
        }
        VK_FORMAT_R8G8B8A8_UNORM | VK_FORMAT_R8G8B8A8_SRGB => texel(
            4,
            vec![
                Sample::texel(0, 8, RGBSDA_RED),
                Sample::texel(8, 8, RGBSDA_GREEN),
                Sample::texel(16, 8, RGBSDA_BLUE),
                Sample::texel(24, 8, RGBSDA_ALPHA),
            ],
        ),
        VK_FORMAT_R5G6B5_UNORM_PACK16 => texel(
            2,
            vec![
                Sample::texel(0, 5, RGBSDA_BLUE),
                Sample::texel(5, 6, RGBSDA_GREEN),
                Sample::texel(11, 5, RGBSDA_RED),
            ],
        ),
        VK_FORMAT_B5G6R5_UNORM_PACK16 => texel(
            2,
            vec![
                Sample::texel(0, 5, RGBSDA_RED),
                Sample::texel(5, 6, RGBSDA_GREEN),
                Sample::texel(11, 5, RGBSDA_BLUE),
            ],
        ),
        VK_FORMAT_R4G4B4A4_UNORM_PACK16 => texel(
            2,
            vec![
                Sample::texel(0, 4, RGBSDA_ALPHA),
                Sample::texel(4, 4, RGBSDA_BLUE),
                Sample::texel(8, 4, RGBSDA_GREEN),
                Sample::texel(12, 4, RGBSDA_RED),
            ],
        ),
        _ => return None,
    };
    Some(desc.encode())
}

/// DFD of a BasisLZ/ETC1S texture, with an optional alpha slice.
pub fn basis_lz(has_alpha: bool, srgb: bool) -> Vec<u32> {
    let mut samples = vec![Sample::block(0, 64, channel::ETC1S_RGB)];
    if has_alpha {
        samples.push(Sample::block(64, 64, channel::ETC1S_AAA));
    }
    BlockDesc {
        model: ColorModel::ETC1S,
        transfer: transfer_of(srgb),
        block_dims: [4, 4, 1, 1],
        // Supercompressed: no fixed plane size.
        bytes_plane0: 0,
        samples,
    }
    .encode()
}

/// DFD of a UASTC texture whose single sample has channel id `channel_id`
/// (one of the `channel::UASTC_*` values).
pub fn uastc(channel_id: u8, srgb: bool) -> Vec<u32> {
    BlockDesc {
        model: ColorModel::UASTC,
        transfer: transfer_of(srgb),
        block_dims: [4, 4, 1, 1],
        bytes_plane0: 16,
        samples: vec![Sample::block(0, 128, channel_id)],
    }
    .encode()
}
