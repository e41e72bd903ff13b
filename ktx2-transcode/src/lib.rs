// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Transcoding of [Khronos Textures (KTX2)](https://www.khronos.org/ktx/) supercompressed with
//! Basis Universal (BasisLZ/ETC1S or UASTC) to GPU block and packed formats.
//!
//! This crate drives the transcode: it resolves the target format, lays out the transcoded
//! texture and walks its levels and images. The per-image block codec is plugged in through
//! [`codec::TranscoderBackend`].

pub mod enums;
pub use enums::*;

pub mod codec;
pub use codec::{ImageParams, TranscoderBackend, TranscoderContext};

pub mod dfd;
pub mod format_size;
pub mod geometry;
pub mod vk_format;

pub mod texture;
pub use texture::{LevelIndexEntry, Texture, TextureGeometry, TextureRepr, TextureSource};

pub mod sources;
pub use sources::{ImageData, Ktx2CreateInfo, PreparsedSource};

pub mod transcode;
