/// Convert HSL (each component in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = hue.rem_euclid(1.0) * 6.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn pure_red() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn dark_red_scales_red_channel() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.3), [0.6, 0.0, 0.0]));
    }

    #[test]
    fn light_red_fills_other_channels() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.8), [1.0, 0.6, 0.6]));
    }

    #[test]
    fn grey_when_unsaturated() {
        assert!(close(hsl_to_rgb(0.42, 0.0, 0.25), [0.25, 0.25, 0.25]));
    }

    #[test]
    fn green_and_blue_hues() {
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }
}
