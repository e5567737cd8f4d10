//! Quantization of raw simulation values into the single-byte samples the
//! frame files store.

use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error("degenerate value range [{min}, {max}], cannot normalize")]
    DegenerateRange { min: f32, max: f32 },
}

/// Maps soot density (kg/m3, scaled by the preprocessor to mg/m3 units per
/// millimeter of cell depth) to a transmission byte via Beer-Lambert:
/// `t = exp(-0.001 * k * d)`, rounded half-up into `0..=255`.
///
/// Zero density gives full transmission (255); the byte decreases
/// monotonically as density grows.
pub fn density_to_transmission(data: &[f32], extinction_coefficient: f32) -> Vec<u8> {
    let step = -0.001 * extinction_coefficient;
    data.par_iter()
        .map(|&d| ((step * d).exp() * 255. + 0.5) as u8)
        .collect()
}

/// Linearly maps `[min, max]` onto `0..=255`, truncating. Values outside the
/// range clamp at the cast.
pub fn normalize_to_range(data: &[f32], min: f32, max: f32) -> Result<Vec<u8>, ConvertError> {
    let range = max - min;
    if !(range > 0.) || !range.is_finite() {
        return Err(ConvertError::DegenerateRange { min, max });
    }
    let scale = 255. / range;
    Ok(data.par_iter().map(|&v| ((v - min) * scale) as u8).collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_density_is_fully_transparent() {
        assert_eq!(density_to_transmission(&[0.], 8700.), vec![255]);
    }

    #[test]
    fn transmission_decreases_with_density() {
        let out = density_to_transmission(&[0., 0.01, 0.05, 0.2, 10.], 8700.);
        for pair in out.windows(2) {
            assert!(pair[0] >= pair[1], "{out:?} not monotonic");
        }
        assert_eq!(*out.last().unwrap(), 0);
    }

    #[test]
    fn transmission_rounds_to_nearest() {
        // Coefficients chosen so exp(-0.001 * k) * 255 is 200.7 and 100.2;
        // plain truncation would give 200 and 100 for both.
        assert_eq!(density_to_transmission(&[1.], 239.44), vec![201]);
        assert_eq!(density_to_transmission(&[1.], 934.11), vec![100]);
    }

    #[test]
    fn normalize_maps_bounds() {
        let out = normalize_to_range(&[20., 210., 400.], 20., 400.).unwrap();
        assert_eq!(out[0], 0);
        assert_eq!(out[2], 255);
        assert!(out[1] > 0 && out[1] < 255);
    }

    #[test]
    fn normalize_is_monotonic() {
        let input: Vec<f32> = (0..=100).map(|i| 20. + i as f32 * 3.8).collect();
        let out = normalize_to_range(&input, 20., 400.).unwrap();
        for pair in out.windows(2) {
            assert!(pair[0] <= pair[1], "{out:?} not monotonic");
        }
    }

    #[test]
    fn out_of_range_values_clamp() {
        let out = normalize_to_range(&[-5., 500.], 0., 100.).unwrap();
        assert_eq!(out, vec![0, 255]);
    }

    #[test]
    fn degenerate_range_is_rejected() {
        assert_eq!(
            normalize_to_range(&[1.], 3., 3.),
            Err(ConvertError::DegenerateRange { min: 3., max: 3. })
        );
        assert!(normalize_to_range(&[1.], 5., 2.).is_err());
    }
}
