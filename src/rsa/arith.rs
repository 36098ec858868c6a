use num::Integer;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use crate::rsa::error::RsaError;

/// Square-and-multiply. Exponent is consumed by halving, base reduced on entry and after every squaring.
pub fn fast_modular_exponent(a: &BigInt, q: &BigInt, n: &BigInt) -> BigInt {
    if n.is_one() { return BigInt::zero(); }
    let mut a = a.mod_floor(n);
    let mut q = q.clone();
    let mut r: BigInt = One::one();
    while !q.is_zero() {
        if q.bit(0) { r = (r * &a) % n; }
        q >>= 1;
        a = (&a * &a) % n;
    }
    r
}

pub fn euler(p: &BigInt, q: &BigInt) -> BigInt { (p - 1u32) * (q - 1u32) }

/// Returns `(g, x, y)` with `a * x + b * y == g == gcd(a, b)`.
pub fn extended_euclid(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    // (r, s, t) rows: r_i == a * s_i + b * t_i throughout
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());
    while !r.is_zero() {
        let quotient = old_r.div_floor(&r);
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }
    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Inverse of `a` modulo `m`, normalised into `[0, m)`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Result<BigInt, RsaError> {
    let (g, x, _) = extended_euclid(a, m);
    if g.is_one() {
        Ok(x.mod_floor(m))
    } else {
        Err(RsaError::NoInverse)
    }
}
