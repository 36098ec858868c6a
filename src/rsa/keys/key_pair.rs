use num::Integer;
use num_bigint::BigInt;
use num_traits::One;
use rand::Rng;
use crate::rsa::arith::{euler, mod_inverse};
use crate::rsa::error::RsaError;
use crate::rsa::keys::Key;
use crate::rsa::prime_gen::{generate_prime, random_odd};
use crate::verbose;

pub const PUBLIC_EXPONENT: u32 = 65537;
pub const MIN_KEY_BITS: u64 = 32;

/// Public and private halves derived from the same (p, q). The primes are dropped once d is known.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    pub public: Key,
    pub private: Key,
}

impl KeyPair {
    /// `bits` is the modulus size; each prime gets half. p == q is not excluded, which only
    /// matters at toy sizes.
    pub fn generate<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> Result<KeyPair, RsaError> {
        if bits < MIN_KEY_BITS {
            return Err(RsaError::KeySize(bits));
        }
        let p = generate_prime(bits / 2, rounds, rng);
        let q = generate_prime(bits / 2, rounds, rng);
        let n = &p * &q;
        let f = euler(&p, &q);
        let mut e = BigInt::from(PUBLIC_EXPONENT);
        while !f.gcd(&e).is_one() {
            e = BigInt::from(random_odd(16, rng));
            verbose!("gcd(e, f) != 1, retry with e = {}", e);
        }
        let d = mod_inverse(&e, &f)?;
        check_key_set(&d, &e, &f)?;
        Ok(KeyPair { public: Key { m: n.clone(), base: e }, private: Key { m: n, base: d } })
    }
}

pub fn check_key_set(d: &BigInt, e: &BigInt, f: &BigInt) -> Result<(), RsaError> {
    let res = (d * e) % f;
    verbose!("(d * e) % f = {} % {} = {}", d * e, f, res);
    if res.is_one() { Ok(()) } else { Err(RsaError::NoInverse) }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::{BigInt, RandBigInt};
    use num_traits::Zero;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::rsa::arith::fast_modular_exponent;
    use super::*;

    #[test]
    fn generated_keys_invert_each_other() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(1024);
        for bits in [64u64, 128, 256] {
            let keys = KeyPair::generate(bits, 5, &mut rng)?;
            println!("get keys: {:?}", keys);
            assert_eq!(keys.public.m, keys.private.m);
            assert!(keys.public.base > BigInt::one() && keys.public.base < keys.public.m);
            for _ in 0..20 {
                let m = rng.gen_bigint_range(&BigInt::zero(), &keys.public.m);
                let c = fast_modular_exponent(&m, &keys.public.base, &keys.public.m);
                let m2 = fast_modular_exponent(&c, &keys.private.base, &keys.private.m);
                assert_eq!(m, m2);
            }
        }
        Ok(())
    }

    #[test]
    fn modulus_has_requested_size() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(3);
        let keys = KeyPair::generate(128, 5, &mut rng)?;
        let bits = keys.public.m.bits();
        assert!(bits == 127 || bits == 128, "modulus has {} bits", bits);
        Ok(())
    }

    #[test]
    fn tiny_key_sizes_are_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(KeyPair::generate(24, 5, &mut rng), Err(RsaError::KeySize(24))));
    }

    #[test]
    fn test_simple_data() -> Result<(), Box<dyn Error>> {
        let (p, q) = (BigInt::from(17), BigInt::from(11));
        let f = euler(&p, &q);
        let e = BigInt::from(7);
        let d = mod_inverse(&e, &f)?;
        check_key_set(&d, &e, &f)?;
        let n = &p * &q;
        let m = BigInt::from(88);
        let c = fast_modular_exponent(&m, &e, &n);
        assert_eq!(c, BigInt::from(11));
        assert_eq!(fast_modular_exponent(&c, &d, &n), m);
        Ok(())
    }
}
