//! Hex color helpers.
//!
//! Scene colors are authored as sRGB hex (`0xffaa33`) and rendered to an sRGB
//! surface, so shaders work in linear space.

/// Split an sRGB hex color into linear RGB components.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_extremes() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let white = srgb_hex_to_linear(0xffffff);
        for c in white {
            assert!((c - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn channels_are_ordered_rgb() {
        let [r, g, b] = srgb_hex_to_linear(0xff0000);
        assert!(r > 0.99 && g == 0.0 && b == 0.0);
        let [r, g, b] = srgb_hex_to_linear(0x0000ff);
        assert!(r == 0.0 && g == 0.0 && b > 0.99);
    }

    #[test]
    fn mid_grey_is_darker_in_linear() {
        let [r, _, _] = srgb_hex_to_linear(0x808080);
        assert!((r - 0.2159).abs() < 1e-3);
    }
}
