// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use ktx2_transcode::{
    dfd::{self, channel},
    sources::{ImageData, Ktx2CreateInfo, PreparsedSource},
    vk_format::*,
    CreateStorage, KtxError, LevelIndexEntry, SupercompressionScheme, Texture, TextureGeometry,
};

#[test]
fn create_default_ktx2() {
    let texture = Texture::new(Ktx2CreateInfo::default()).expect("a default KTX2 texture");

    // 1x1 RGBA8 texel
    assert_eq!(texture.element_size(), 4);
    assert_eq!(texture.row_pitch(0), 4);
    assert_eq!(texture.data_size(), 4);
    assert_eq!(texture.num_components(), 4);
    assert!(!texture.needs_transcoding());
}

#[test]
fn create_uastc_with_mipmaps() {
    let texture = Texture::new(Ktx2CreateInfo {
        vk_format: VK_FORMAT_UNDEFINED,
        dfd: Some(dfd::uastc(channel::UASTC_RGBA, true)),
        create_storage: CreateStorage::AllocStorage,
        geometry: TextureGeometry {
            base_width: 16,
            base_height: 16,
            num_dimensions: 2,
            num_levels: 5,
            ..TextureGeometry::default()
        },
    })
    .expect("a UASTC texture");

    assert!(texture.needs_transcoding());
    assert_eq!(texture.num_components(), 4);
    assert_eq!(texture.element_size(), 16);
    assert_eq!(texture.row_pitch(0), 4 * 16);
    assert_eq!(texture.image_size(0), 16 * 16);
    // Levels 4, 3 and 2 are one block each.
    assert_eq!(texture.level_size(4), 16);
    assert_eq!(texture.level_data_offset(4), Some(0));
    assert_eq!(texture.level_data_offset(0), Some(16 * 3 + 4 * 16));
    assert_eq!(texture.data_size(), 16 * 3 + 4 * 16 + 16 * 16);
}

#[test]
fn create_cubemap_array() {
    let texture = Texture::new(Ktx2CreateInfo {
        vk_format: VK_FORMAT_BC1_RGB_UNORM_BLOCK,
        geometry: TextureGeometry {
            base_width: 8,
            base_height: 8,
            num_dimensions: 2,
            num_layers: 2,
            num_faces: 6,
            is_array: true,
            ..TextureGeometry::default()
        },
        ..Ktx2CreateInfo::default()
    })
    .expect("a cubemap array");

    assert_eq!(texture.geometry().level_image_count(0), 12);
    assert_eq!(texture.image_offset(0, 1, 2), Ok((6 + 2) * 32));
    assert_eq!(texture.image_offset(0, 2, 0), Err(KtxError::InvalidValue));
}

#[test]
fn supercompressed_images_have_no_offset() {
    let texture = Texture::new(PreparsedSource {
        vk_format: VK_FORMAT_UNDEFINED,
        dfd: dfd::basis_lz(true, false),
        geometry: TextureGeometry {
            base_width: 4,
            base_height: 4,
            num_dimensions: 2,
            ..TextureGeometry::default()
        },
        supercompression_scheme: SupercompressionScheme::BasisLz,
        supercompression_global_data: None,
        level_index: vec![LevelIndexEntry {
            byte_offset: 0,
            byte_length: 16,
            uncompressed_byte_length: 0,
        }],
        image_data: ImageData::Loaded(vec![0; 16]),
    })
    .expect("an ETC1S texture");

    assert_eq!(texture.num_components(), 4);
    assert_eq!(texture.image_offset(0, 0, 0), Err(KtxError::InvalidOperation));
}
