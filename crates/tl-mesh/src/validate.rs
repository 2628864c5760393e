//! Structural validation for block mesh parameters.

use crate::error::{MeshError, MeshResult};

pub(crate) fn validate_block(dims: &[f64; 3], shape: &[usize; 3], centre: &[f64; 3]) -> MeshResult<()> {
    for axis in 0..3 {
        if shape[axis] < 2 {
            return Err(MeshError::InvalidShape {
                axis,
                count: shape[axis],
            });
        }
        if !dims[axis].is_finite() || dims[axis] <= 0.0 {
            return Err(MeshError::InvalidDimension {
                axis,
                value: dims[axis],
            });
        }
        if !centre[axis].is_finite() {
            return Err(MeshError::InvalidCentre {
                axis,
                value: centre[axis],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_default_block() {
        assert!(validate_block(&[1.0; 3], &[4; 3], &[0.5; 3]).is_ok());
    }

    #[test]
    fn rejects_single_node_axis() {
        let err = validate_block(&[1.0; 3], &[4, 1, 4], &[0.5; 3]).unwrap_err();
        assert_eq!(err, MeshError::InvalidShape { axis: 1, count: 1 });
    }

    #[test]
    fn rejects_bad_dimension() {
        let err = validate_block(&[1.0, 1.0, -2.0], &[2; 3], &[0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidDimension {
                axis: 2,
                value: -2.0
            }
        );
        assert!(validate_block(&[f64::NAN, 1.0, 1.0], &[2; 3], &[0.0; 3]).is_err());
    }

    #[test]
    fn rejects_non_finite_centre() {
        assert!(validate_block(&[1.0; 3], &[2; 3], &[0.0, f64::INFINITY, 0.0]).is_err());
    }
}
