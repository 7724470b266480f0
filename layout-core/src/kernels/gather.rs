/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use layout_wide::{Architecture, SIMDVector};

use crate::dataset::{Field, Particle};

/// One field of an array of structures, viewed as a strided column.
///
/// ```text
///             |<------- record stride (80 bytes) ------->|
///             +----+----+----+----+--------+-------------+
/// record 0 -> | x0 | y0 | z0 | w0 | inert  |   padding   |
/// record 1 -> | x1 | y1 | z1 | w1 | inert  |   padding   |
/// record 2 -> | x2 | y2 | z2 | w2 | inert  |   padding   |
///             +----+----+----+----+--------+-------------+
///                     ^
///                     |
///               StridedField (field = y)
/// ```
///
/// The values of a column are not adjacent in memory, so a vector cannot be loaded with a
/// single contiguous read. [`StridedField::gather`] reads each lane individually instead.
#[derive(Debug, Clone, Copy)]
pub struct StridedField<'a> {
    records: &'a [Particle],
    field: Field,
}

impl<'a> StridedField<'a> {
    pub fn new(records: &'a [Particle], field: Field) -> Self {
        Self { records, field }
    }

    /// The number of records in the column.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// The field value of record `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline(always)]
    pub fn value(&self, i: usize) -> f32 {
        self.records[i].get(self.field)
    }

    /// Pack the field values of records `[start, start + 8)` into one vector, one lane per
    /// record.
    ///
    /// # Panics
    ///
    /// Panics if `start + 8 > self.len()`.
    #[inline(always)]
    pub fn gather<A>(&self, arch: A, start: usize) -> A::f32x8
    where
        A: Architecture,
    {
        let chunk = &self.records[start..start + 8];
        let field = self.field;
        A::f32x8::from_array(arch, std::array::from_fn(|lane| chunk[lane].get(field)))
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use layout_wide::arch::Scalar;

    use super::*;

    fn records(n: usize) -> Vec<Particle> {
        (0..n).map(Particle::at).collect()
    }

    #[test]
    fn gather_reads_one_field_per_record() {
        let records = records(12);
        for field in Field::ALL {
            let view = StridedField::new(&records, field);
            let v = view.gather(Scalar, 3).to_array();
            let expected: [f32; 8] = std::array::from_fn(|lane| field.initial_value(3 + lane));
            assert_eq!(v, expected);
        }
    }

    #[test]
    fn gather_ignores_other_fields() {
        let mut records = records(8);
        for r in records.iter_mut() {
            r.y = f32::NAN;
            r.inert = [f32::NAN; 4];
            r.padding = [0xff; 48];
        }
        let view = StridedField::new(&records, Field::X);
        assert_eq!(
            view.gather(Scalar, 0).to_array(),
            [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    #[should_panic]
    fn gather_out_of_bounds() {
        let records = records(10);
        StridedField::new(&records, Field::X).gather(Scalar, 3);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn gather_v3_matches_scalar() {
        let Some(arch) = layout_wide::arch::x86_64::V3::new_checked() else {
            return;
        };

        let records = records(40);
        let view = StridedField::new(&records, Field::W);
        for start in 0..=32 {
            assert_eq!(
                view.gather(arch, start).to_array(),
                view.gather(Scalar, start).to_array()
            );
        }
    }
}
