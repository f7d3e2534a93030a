//! Small pixel conversions used by clears and readback copies.
//!
//! All row converters take tightly packed RGBA8 input (red in the first
//! byte) and write little-endian output. Packed 16-bit formats place red in
//! the most significant bits, as the format names read.

/// Unpacks a packed RGBA8 color (red in the low byte) into normalized floats.
pub fn unpack_rgba8(color: u32) -> [f32; 4] {
    let [r, g, b, a] = color.to_le_bytes();
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

/// Swaps the red and blue channels of one RGBA8 row into `dst`.
pub fn swizzle_rgba8_to_bgra8(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    for (src_px, dst_px) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        dst_px[0] = src_px[2];
        dst_px[1] = src_px[1];
        dst_px[2] = src_px[0];
        dst_px[3] = src_px[3];
    }
}

/// Packs one RGBA8 row to R5G6B5, dropping alpha.
pub fn pack_rgba8_to_r5g6b5(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len() / 4, dst.len() / 2);
    for (src_px, dst_px) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)) {
        let r = (src_px[0] >> 3) as u16;
        let g = (src_px[1] >> 2) as u16;
        let b = (src_px[2] >> 3) as u16;
        let packed = (r << 11) | (g << 5) | b;
        dst_px.copy_from_slice(&packed.to_le_bytes());
    }
}

/// Packs one RGBA8 row to R5G5B5A1; alpha becomes a 1-bit threshold at 128.
pub fn pack_rgba8_to_r5g5b5a1(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len() / 4, dst.len() / 2);
    for (src_px, dst_px) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)) {
        let r = (src_px[0] >> 3) as u16;
        let g = (src_px[1] >> 3) as u16;
        let b = (src_px[2] >> 3) as u16;
        let a = (src_px[3] >= 128) as u16;
        let packed = (r << 11) | (g << 6) | (b << 1) | a;
        dst_px.copy_from_slice(&packed.to_le_bytes());
    }
}

/// Packs one RGBA8 row to R4G4B4A4.
pub fn pack_rgba8_to_r4g4b4a4(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len() / 4, dst.len() / 2);
    for (src_px, dst_px) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)) {
        let r = (src_px[0] >> 4) as u16;
        let g = (src_px[1] >> 4) as u16;
        let b = (src_px[2] >> 4) as u16;
        let a = (src_px[3] >> 4) as u16;
        let packed = (r << 12) | (g << 8) | (b << 4) | a;
        dst_px.copy_from_slice(&packed.to_le_bytes());
    }
}
