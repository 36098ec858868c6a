use chrono::Local;
use num::Integer;
use num_bigint::{BigInt, BigUint, RandBigInt, ToBigInt, ToBigUint};
use num_traits::{One, Zero};
use rand::Rng;
use crate::rsa::arith::fast_modular_exponent;
use crate::verbose;

/// Miller-Rabin. A composite survives all `rounds` trials with probability at most 4^-rounds.
///
/// Witnesses come from `rng`; nothing here makes that source suitable for real key material.
pub fn miller_rabin<R: Rng + ?Sized>(n: &BigInt, rounds: u32, rng: &mut R) -> bool {
    let two = BigInt::from(2u32);
    let three = BigInt::from(3u32);
    if *n <= BigInt::one() { return false; }
    if *n == two || *n == three { return true; }
    if n.is_even() { return false; }
    let n_minus_one: BigInt = n - 1u32;
    let mut d = n_minus_one.clone();
    let mut s = 0u64;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }
    // witnesses in [2, n - 2]
    let low = BigUint::from(2u32);
    let high = match (n - 1u32).to_biguint() {
        Some(h) => h,
        None => return false,
    };
    'trial: for _ in 0..rounds {
        let a = match rng.gen_biguint_range(&low, &high).to_bigint() {
            Some(a) => a,
            None => return false,
        };
        let mut x = fast_modular_exponent(&a, &d, n);
        if x.is_one() || x == n_minus_one { continue; }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one { continue 'trial; }
        }
        return false;
    }
    true
}

/// Uniform odd integer of exactly `bits` bits: top and bottom bit forced on.
pub fn random_odd<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    if bits == 0 { return BigUint::zero(); }
    let top = BigUint::one() << (bits - 1);
    rng.gen_biguint(bits) | top | BigUint::one()
}

/// Resamples until a candidate passes; there is no cap on the number of tries.
pub fn generate_prime<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> BigInt {
    let start = Local::now().timestamp_millis();
    let mut try_times = 0u64;
    loop {
        try_times += 1;
        let test = BigInt::from(random_odd(bits, rng));
        if miller_rabin(&test, rounds, rng) {
            let time = Local::now().timestamp_millis() - start;
            verbose!("Done {}-bit prime generation in {} tries after {} ms", bits, try_times, time);
            return test;
        }
    }
}
