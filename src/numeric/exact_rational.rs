// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::cmp::Ordering;
use std::ops::{Add, Mul, Sub};

use rug::Rational;

/// Arbitrary-precision rational backed by GMP, used to settle predicate signs
/// that `f64` cannot resolve.
#[derive(Clone, Debug, Default)]
pub struct ExactRational(pub Rational);

impl ExactRational {
    /// Exact conversion of a finite `f64`. Non-finite values map to zero;
    /// callers validate their input before reaching the exact path.
    pub fn from_f64(v: f64) -> Self {
        ExactRational(Rational::from_f64(v).unwrap_or_default())
    }

    pub fn sign(&self) -> Ordering {
        self.0.cmp0()
    }

    /// Sign of the exact value carried back into `f64`. The magnitude is
    /// approximate but never rounds a nonzero value to zero.
    pub fn to_signed_f64(&self) -> f64 {
        match self.sign() {
            Ordering::Equal => 0.0,
            s => {
                let v = self.0.to_f64();
                if v != 0.0 {
                    v
                } else if s == Ordering::Greater {
                    f64::MIN_POSITIVE
                } else {
                    -f64::MIN_POSITIVE
                }
            }
        }
    }
}

impl<'a, 'b> Add<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn add(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result += &rhs.0;
        ExactRational(result)
    }
}

impl<'a, 'b> Sub<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn sub(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result -= &rhs.0;
        ExactRational(result)
    }
}

impl<'a, 'b> Mul<&'b ExactRational> for &'a ExactRational {
    type Output = ExactRational;

    fn mul(self, rhs: &'b ExactRational) -> ExactRational {
        let mut result = self.0.clone();
        result *= &rhs.0;
        ExactRational(result)
    }
}

impl PartialEq for ExactRational {
    fn eq(&self, other: &ExactRational) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for ExactRational {
    fn partial_cmp(&self, other: &ExactRational) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_sum_does_not_round() {
        let a = ExactRational::from_f64(1e16);
        let b = ExactRational::from_f64(1.0);
        let c = &(&a + &b) - &a;
        assert_eq!(c.sign(), Ordering::Greater);
        assert_eq!(c.to_signed_f64(), 1.0);
    }

    #[test]
    fn zero_maps_to_zero() {
        let a = ExactRational::from_f64(0.5);
        let z = &a - &a;
        assert_eq!(z.to_signed_f64(), 0.0);
    }
}
