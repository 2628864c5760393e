//! Layout of the coupled displacement/pressure unknown vector.

use crate::field::LagrangeField;

/// Global unknown vector `x = [u; p]`.
///
/// The `n_u` displacement DOFs come first, the `n_p` pressure DOFs after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DofLayout {
    pub n_u: usize,
    pub n_p: usize,
}

impl DofLayout {
    pub fn new(u: &LagrangeField, p: &LagrangeField) -> Self {
        Self {
            n_u: u.n_dofs(),
            n_p: p.n_dofs(),
        }
    }

    pub fn n_total(&self) -> usize {
        self.n_u + self.n_p
    }

    #[inline]
    pub fn u_dof(&self, field_dof: usize) -> usize {
        field_dof
    }

    #[inline]
    pub fn p_dof(&self, field_dof: usize) -> usize {
        self.n_u + field_dof
    }

    /// Displacement part of a global vector.
    pub fn u_part<'a>(&self, x: &'a [f64]) -> &'a [f64] {
        &x[..self.n_u]
    }

    /// Pressure part of a global vector.
    pub fn p_part<'a>(&self, x: &'a [f64]) -> &'a [f64] {
        &x[self.n_u..self.n_total()]
    }

    /// Concatenates displacement and pressure parts.
    pub fn compose(&self, u: &[f64], p: &[f64]) -> Vec<f64> {
        debug_assert_eq!(u.len(), self.n_u);
        debug_assert_eq!(p.len(), self.n_p);
        let mut x = Vec::with_capacity(self.n_total());
        x.extend_from_slice(u);
        x.extend_from_slice(p);
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockMeshBuilder;

    #[test]
    fn q1_p0_layout() {
        let mesh = BlockMeshBuilder::new().build().unwrap();
        let u = LagrangeField::new("u", &mesh, 1, 3).unwrap();
        let p = LagrangeField::new("p", &mesh, 0, 1).unwrap();
        let layout = DofLayout::new(&u, &p);
        assert_eq!(layout.n_u, 192);
        assert_eq!(layout.n_p, 27);
        assert_eq!(layout.n_total(), 219);
        assert_eq!(layout.p_dof(0), 192);
    }

    #[test]
    fn split_and_compose() {
        let layout = DofLayout { n_u: 3, n_p: 2 };
        let x = layout.compose(&[1.0, 2.0, 3.0], &[4.0, 5.0]);
        assert_eq!(layout.u_part(&x), &[1.0, 2.0, 3.0]);
        assert_eq!(layout.p_part(&x), &[4.0, 5.0]);
    }
}
