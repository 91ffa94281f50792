//! Premultiplied-alpha pixel blending.
//!
//! All buffers here are premultiplied RGBA8. Arithmetic stays in integer
//! space with rounding `mul_div255`, so blending the same inputs always
//! produces bit-identical output.

use crate::{
    error::{KinemaError, KinemaResult},
    paint::BlendMode,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over, with a scalar opacity applied to the source pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Multiply in premultiplied space, with the uncovered regions passing the
/// other layer through:
/// `co = sc*dc/255 + sc*(255-da)/255 + dc*(255-sa)/255`.
pub fn multiply(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let src = scale_premul(src, opacity);
    if src[3] == 0 {
        return dst;
    }

    let sa = u16::from(src[3]);
    let da = u16::from(dst[3]);
    let inv_sa = 255u16 - sa;
    let inv_da = 255u16 - da;

    let mut out = [0u8; 4];
    out[3] = (sa + u16::from(mul_div255(da, inv_sa))).min(255) as u8;

    for i in 0..3 {
        let sc = u16::from(src[i]);
        let dc = u16::from(dst[i]);
        let v = u16::from(mul_div255(sc, dc))
            + u16::from(mul_div255(sc, inv_da))
            + u16::from(mul_div255(dc, inv_sa));
        out[i] = v.min(255) as u8;
    }
    out
}

/// Screen in premultiplied space: `co = sc + dc - sc*dc/255`.
pub fn screen(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let src = scale_premul(src, opacity);
    if src[3] == 0 {
        return dst;
    }

    let sa = u16::from(src[3]);
    let da = u16::from(dst[3]);

    let mut out = [0u8; 4];
    out[3] = (sa + da - u16::from(mul_div255(sa, da))).min(255) as u8;

    for i in 0..3 {
        let sc = u16::from(src[i]);
        let dc = u16::from(dst[i]);
        out[i] = (sc + dc - u16::from(mul_div255(sc, dc))).min(255) as u8;
    }
    out
}

/// Blend one pixel per `mode`.
pub fn blend(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode, opacity: f64) -> PremulRgba8 {
    match mode {
        BlendMode::Normal => over(dst, src, opacity),
        BlendMode::Multiply => multiply(dst, src, opacity),
        BlendMode::Screen => screen(dst, src, opacity),
    }
}

/// Blend `src` into `dst` pixel by pixel.
pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    mode: BlendMode,
    opacity: f64,
) -> KinemaResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(KinemaError::evaluation(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], mode, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn scale_premul(px: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        return px;
    }
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    [
        mul_div255(u16::from(px[0]), op),
        mul_div255(u16::from(px[1]), op),
        mul_div255(u16::from(px[2]), op),
        mul_div255(u16::from(px[3]), op),
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
