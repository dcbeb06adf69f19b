/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Conversions from the raw matrix layouts the runtime hands out into
//! `euclid` transforms.
//!
//! The runtime reports device poses as 3×4 row-major matrices
//! (`m[row][column]`, translation in the last column) and projections as
//! 4×4 row-major matrices. `euclid` stores transforms in the row-vector
//! convention, so a classic column of the source matrix becomes a stored
//! row here; the layouts below preserve the linear map exactly.

use euclid::Transform3D;

/// Homogenise a 3×4 device-to-absolute matrix. The implicit bottom row
/// is [0, 0, 0, 1]; the rotation/scale block passes through unchanged.
pub fn transform_from_3x4<Src, Dst>(m: &[[f32; 4]; 3]) -> Transform3D<f32, Src, Dst> {
    Transform3D::new(
        m[0][0], m[1][0], m[2][0], 0.0, //
        m[0][1], m[1][1], m[2][1], 0.0, //
        m[0][2], m[1][2], m[2][2], 0.0, //
        m[0][3], m[1][3], m[2][3], 1.0,
    )
}

/// Reinterpret a full 4×4 row-major matrix (projection queries).
pub fn transform_from_4x4<Src, Dst>(m: &[[f32; 4]; 4]) -> Transform3D<f32, Src, Dst> {
    Transform3D::new(
        m[0][0], m[1][0], m[2][0], m[3][0], //
        m[0][1], m[1][1], m[2][1], m[3][1], //
        m[0][2], m[1][2], m[2][2], m[3][2], //
        m[0][3], m[1][3], m[2][3], m[3][3],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::default::Transform3D as UntypedTransform3D;

    // A rotation about Y composed with a translation, in the runtime's
    // 3x4 row-major layout.
    fn sample_pose() -> [[f32; 4]; 3] {
        let (s, c) = (0.6_f32, 0.8_f32);
        [
            [c, 0.0, s, 1.5],
            [0.0, 1.0, 0.0, -0.25],
            [-s, 0.0, c, 3.0],
        ]
    }

    #[test]
    fn homogenised_bottom_row_is_exact() {
        let t: UntypedTransform3D<f32> = transform_from_3x4(&sample_pose());
        let a = t.to_array();
        // Stored row-vector layout: the math-convention bottom row lives
        // in the fourth component of each stored row.
        assert_eq!(a[3], 0.0);
        assert_eq!(a[7], 0.0);
        assert_eq!(a[11], 0.0);
        assert_eq!(a[15], 1.0);
    }

    #[test]
    fn rotation_block_passes_through_unchanged() {
        let m = sample_pose();
        let t: UntypedTransform3D<f32> = transform_from_3x4(&m);
        let a = t.to_array();
        for row in 0..3 {
            for col in 0..3 {
                // Math element (row, col) of the stored transform.
                assert_eq!(a[col * 4 + row], m[row][col]);
            }
        }
        // Translation column.
        assert_eq!(a[12], m[0][3]);
        assert_eq!(a[13], m[1][3]);
        assert_eq!(a[14], m[2][3]);
    }

    #[test]
    fn inverse_round_trips() {
        let t: UntypedTransform3D<f32> = transform_from_3x4(&sample_pose());
        let back = t.inverse().unwrap().inverse().unwrap();
        assert!(t.approx_eq(&back));
    }

    #[test]
    fn four_by_four_preserves_every_element() {
        let m = [
            [0.75, 0.0, 0.1, 0.0],
            [0.0, 0.68, -0.04, 0.0],
            [0.0, 0.0, -1.0002, -0.20002],
            [0.0, 0.0, -1.0, 0.0],
        ];
        let t: UntypedTransform3D<f32> = transform_from_4x4(&m);
        let a = t.to_array();
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(a[col * 4 + row], m[row][col]);
            }
        }
    }
}
