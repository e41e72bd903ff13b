// Copyright (C) 2021 Paolo Jovon <paolo.jovon@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Extent and alignment arithmetic shared by texture layout and transcoding.

/// Number of `block`-sized blocks needed to cover `extent` texels.
#[inline]
pub fn block_count(extent: u32, block: u32) -> u32 {
    (extent + (block - 1)) / block
}

/// Extent of mip `level` for a base extent of `base`.
#[inline]
pub fn level_extent(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

#[inline]
pub fn is_pow2(x: u32) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

/// Rounds `offset` up to the next multiple of `alignment`.
#[inline]
pub fn pad_to(alignment: u64, offset: u64) -> u64 {
    if alignment <= 1 {
        return offset;
    }
    (offset + alignment - 1) / alignment * alignment
}

/// Least common multiple of 4 and `x`.
pub fn lcm4(x: u32) -> u32 {
    if x % 4 == 0 {
        x
    } else if x % 2 == 0 {
        x * 2
    } else {
        x * 4
    }
}
