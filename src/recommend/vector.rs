use crate::emotion::EMOTION_DIMENSIONS;
use crate::error::ServiceError;

/// Emotion vector aligned to label order. Carries no keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionVector([f32; EMOTION_DIMENSIONS]);

impl EmotionVector {
    pub fn new(components: [f32; EMOTION_DIMENSIONS]) -> Self {
        Self(components)
    }

    /// Builds a vector from an arbitrary slice, rejecting any other
    /// dimensionality than the label set's.
    pub fn from_slice(components: &[f32]) -> Result<Self, ServiceError> {
        let array: [f32; EMOTION_DIMENSIONS] =
            components
                .try_into()
                .map_err(|_| ServiceError::InvalidVectorShape {
                    expected: EMOTION_DIMENSIONS,
                    actual: components.len(),
                })?;
        Ok(Self(array))
    }

    pub fn components(&self) -> &[f32; EMOTION_DIMENSIONS] {
        &self.0
    }

    pub fn norm(&self) -> f32 {
        l2_norm(&self.0)
    }

    /// Unit-length copy of this vector; the zero vector stays zero.
    pub fn normalized(&self) -> Self {
        let mut components = self.0;
        l2_normalize(&mut components);
        Self(components)
    }
}

pub fn l2_norm(components: &[f32]) -> f32 {
    l2_norm_f64(components) as f32
}

// Accumulated in f64 so tiny components don't underflow and large ones don't
// overflow to infinity.
fn l2_norm_f64(components: &[f32]) -> f64 {
    components
        .iter()
        .map(|c| f64::from(*c) * f64::from(*c))
        .sum::<f64>()
        .sqrt()
}

/// Scales `components` in place to unit L2 norm. The zero vector is left
/// untouched.
pub fn l2_normalize(components: &mut [f32]) {
    let norm = l2_norm_f64(components);
    if norm > 0.0 {
        for component in components.iter_mut() {
            *component = (f64::from(*component) / norm) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_unit_length() {
        let vector = EmotionVector::new([3.0, 4.0, 0.0, 0.0, 0.0]).normalized();
        assert_eq!(vector.components(), &[0.6, 0.8, 0.0, 0.0, 0.0]);
        assert!((vector.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let vector = EmotionVector::default().normalized();
        assert_eq!(vector.components(), &[0.0; 5]);
        assert!(vector.components().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn normalizes_tiny_vectors() {
        let vector = EmotionVector::new([1e-8, 0.0, 0.0, 0.0, 0.0]).normalized();
        assert_eq!(vector.components(), &[1.0, 0.0, 0.0, 0.0, 0.0]);

        let mut subnormal = [1e-40_f32, 1e-40, 0.0, 0.0, 0.0];
        l2_normalize(&mut subnormal);
        assert!((subnormal[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((subnormal[1] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn normalizes_huge_vectors() {
        let vector = EmotionVector::new([1.5e38, 2e38, 0.0, 0.0, 0.0]).normalized();
        assert!((vector.components()[0] - 0.6).abs() < 1e-6);
        assert!((vector.components()[1] - 0.8).abs() < 1e-6);
        assert!((vector.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_dimensionality() {
        let err = EmotionVector::from_slice(&[0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidVectorShape {
                expected: 5,
                actual: 3
            }
        ));
        assert!(EmotionVector::from_slice(&[0.0; 5]).is_ok());
    }
}
