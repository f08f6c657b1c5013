//! AMM Calculator
//!
//! Hop and path amount math using the constant product formula (x * y = k).
//!
//! Forward quotes round down (the pool keeps the remainder), backward quotes
//! round up (the caller never under-supplies the pool). Every product is
//! checked; overflow is reported, never wrapped.

use swaptrace_core::{Amount, FeeConfig};

use crate::host::PairBackend;
use crate::pair::PairLocator;
use crate::state::{AmountVector, Path, RouterError};

fn mul(a: Amount, b: Amount) -> Result<Amount, RouterError> {
    a.checked_mul(b).ok_or(RouterError::Overflow)
}

fn add(a: Amount, b: Amount) -> Result<Amount, RouterError> {
    a.checked_add(b).ok_or(RouterError::Overflow)
}

/// Output of a single hop for an exact input.
///
/// Formula: output = floor(input * fee_num * reserve_out / (reserve_in * fee_denom + input * fee_num))
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeConfig,
) -> Result<Amount, RouterError> {
    if amount_in == 0 {
        return Err(RouterError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(RouterError::InsufficientLiquidity);
    }

    let amount_in_with_fee = mul(amount_in, fee.numerator)?;
    let numerator = mul(amount_in_with_fee, reserve_out)?;
    let denominator = add(mul(reserve_in, fee.denominator)?, amount_in_with_fee)?;

    let amount_out = numerator / denominator;
    if amount_out == 0 {
        return Err(RouterError::InsufficientOutputAmount { got: 0, min: 1 });
    }
    Ok(amount_out)
}

/// Input a single hop requires to release an exact output.
///
/// Formula: input = ceil(reserve_in * fee_denom * output / ((reserve_out - output) * fee_num))
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeConfig,
) -> Result<Amount, RouterError> {
    if amount_out == 0 {
        return Err(RouterError::InsufficientOutputAmount { got: 0, min: 1 });
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(RouterError::InsufficientLiquidity);
    }

    let numerator = mul(mul(reserve_in, fee.denominator)?, amount_out)?;
    let denominator = mul(reserve_out - amount_out, fee.numerator)?;

    Ok(numerator.div_ceil(denominator))
}

/// Chain [`get_amount_out`] left to right through `path`.
pub fn get_amounts_out<B: PairBackend + ?Sized>(
    locator: &PairLocator,
    backend: &B,
    fee: FeeConfig,
    amount_in: Amount,
    path: &Path,
) -> Result<AmountVector, RouterError> {
    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);

    let mut current = amount_in;
    for (token_in, token_out) in path.hops() {
        let (reserve_in, reserve_out) = locator.get_reserves(backend, token_in, token_out)?;
        current = get_amount_out(current, reserve_in, reserve_out, fee)?;
        amounts.push(current);
    }

    Ok(AmountVector::from_vec(amounts))
}

/// Chain [`get_amount_in`] right to left through `path`.
pub fn get_amounts_in<B: PairBackend + ?Sized>(
    locator: &PairLocator,
    backend: &B,
    fee: FeeConfig,
    amount_out: Amount,
    path: &Path,
) -> Result<AmountVector, RouterError> {
    let mut amounts = vec![0; path.len()];
    let last = amounts.len() - 1;
    amounts[last] = amount_out;

    for i in (1..path.len()).rev() {
        let tokens = path.tokens();
        let (reserve_in, reserve_out) = locator.get_reserves(backend, &tokens[i - 1], &tokens[i])?;
        amounts[i - 1] = get_amount_in(amounts[i], reserve_in, reserve_out, fee)?;
    }

    Ok(AmountVector::from_vec(amounts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::test_support::{fee, ledger_with_pairs, locator, token};

    #[test]
    fn test_get_amount_out() {
        // floor(1000 * 997 * 2_000_000 / (1_000_000 * 1000 + 1000 * 997))
        let out = get_amount_out(1000, 1_000_000, 2_000_000, fee()).unwrap();
        assert_eq!(out, 1992);
    }

    #[test]
    fn test_get_amount_out_rounds_down() {
        // 997 * 10 / (10 * 1000 + 997) = 0.906...
        assert_eq!(
            get_amount_out(1, 10, 10, fee()),
            Err(RouterError::InsufficientOutputAmount { got: 0, min: 1 })
        );
        // 100 * 997 * 1000 / (1000 * 1000 + 99_700) = 90.66...
        assert_eq!(get_amount_out(100, 1000, 1000, fee()).unwrap(), 90);
    }

    #[test]
    fn test_get_amount_out_rejects_empty_pool() {
        assert_eq!(
            get_amount_out(1000, 0, 2_000_000, fee()),
            Err(RouterError::InsufficientLiquidity)
        );
        assert_eq!(
            get_amount_out(1000, 2_000_000, 0, fee()),
            Err(RouterError::InsufficientLiquidity)
        );
        assert_eq!(
            get_amount_out(0, 1000, 1000, fee()),
            Err(RouterError::InsufficientInputAmount)
        );
    }

    #[test]
    fn test_get_amount_in_rounds_up() {
        // 1_000_000 * 1000 * 1992 / (1_998_008 * 997) = 999.99...
        assert_eq!(get_amount_in(1992, 1_000_000, 2_000_000, fee()).unwrap(), 1000);
        // 1000 * 1000 * 90 / (910 * 997) = 99.19...
        assert_eq!(get_amount_in(90, 1000, 1000, fee()).unwrap(), 100);
    }

    #[test]
    fn test_get_amount_in_exact_division_not_bumped() {
        // reserve_in * 1000 * out = 997 * 1000 * 3 and (reserve_out - out) * 997 = 997 * 3
        // divide evenly: ceil keeps the exact quotient.
        assert_eq!(get_amount_in(3, 997, 6, fee()).unwrap(), 1000);
    }

    #[test]
    fn test_get_amount_in_cannot_drain_pool() {
        assert_eq!(
            get_amount_in(2_000_000, 1_000_000, 2_000_000, fee()),
            Err(RouterError::InsufficientLiquidity)
        );
        assert_eq!(
            get_amount_in(2_000_001, 1_000_000, 2_000_000, fee()),
            Err(RouterError::InsufficientLiquidity)
        );
        assert!(get_amount_in(1_999_999, 1_000_000, 2_000_000, fee()).is_ok());
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(
            get_amount_out(u128::MAX / 2, 1_000_000, 2_000_000, fee()),
            Err(RouterError::Overflow)
        );
        assert_eq!(
            get_amount_in(1_000, u128::MAX / 10, 2_000_000, fee()),
            Err(RouterError::Overflow)
        );
    }

    #[test]
    fn test_two_hop_amounts_out() {
        let ledger = ledger_with_pairs(&[
            (token(1), token(2), 1_000_000, 2_000_000),
            (token(2), token(3), 2_000_000, 500_000),
        ]);
        let path = Path::new(vec![token(1), token(2), token(3)]).unwrap();

        let amounts = get_amounts_out(&locator(), &ledger, fee(), 1000, &path).unwrap();

        let hop1 = 1000 * 997 * 2_000_000 / (1_000_000 * 1000 + 1000 * 997);
        let hop2 = hop1 * 997 * 500_000 / (2_000_000 * 1000 + hop1 * 997);
        assert_eq!(amounts.as_slice(), &[1000, hop1, hop2]);
        assert_eq!(amounts.as_slice(), &[1000, 1992, 496]);
    }

    #[test]
    fn test_two_hop_amounts_in() {
        let ledger = ledger_with_pairs(&[
            (token(1), token(2), 1_000_000, 2_000_000),
            (token(2), token(3), 2_000_000, 500_000),
        ]);
        let path = Path::new(vec![token(1), token(2), token(3)]).unwrap();

        let amounts = get_amounts_in(&locator(), &ledger, fee(), 496, &path).unwrap();
        assert_eq!(amounts.as_slice(), &[1000, 1992, 496]);
    }

    #[test]
    fn test_amounts_respect_reversed_pair_orientation() {
        // token(5) > token(4): the pair stores token(4) as token0
        let ledger = ledger_with_pairs(&[(token(5), token(4), 1_000_000, 2_000_000)]);
        let path = Path::new(vec![token(5), token(4)]).unwrap();
        let amounts = get_amounts_out(&locator(), &ledger, fee(), 1000, &path).unwrap();
        assert_eq!(amounts.last(), 1992);
    }

    #[test]
    fn test_missing_pair_fails() {
        let ledger = MemoryLedger::new(locator(), token(0xee), fee());
        let path = Path::new(vec![token(1), token(2)]).unwrap();
        let err = get_amounts_out(&locator(), &ledger, fee(), 1000, &path).unwrap_err();
        assert!(matches!(err, RouterError::PairNotFound(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn reserves() -> impl Strategy<Value = (Amount, Amount)> {
            (1_000u128..1_000_000_000_000, 1_000u128..1_000_000_000_000)
        }

        proptest! {
            #[test]
            fn output_never_drains_pool(
                (reserve_in, reserve_out) in reserves(),
                amount_in in 1u128..1_000_000_000_000_000,
            ) {
                if let Ok(out) = get_amount_out(amount_in, reserve_in, reserve_out, fee()) {
                    prop_assert!(out < reserve_out);
                }
            }

            #[test]
            fn output_monotonic_in_input(
                (reserve_in, reserve_out) in reserves(),
                a in 1u128..1_000_000_000_000,
                b in 1u128..1_000_000_000_000,
            ) {
                let (small, large) = if a <= b { (a, b) } else { (b, a) };
                let out_small = get_amount_out(small, reserve_in, reserve_out, fee()).unwrap_or(0);
                let out_large = get_amount_out(large, reserve_in, reserve_out, fee()).unwrap_or(0);
                prop_assert!(out_small <= out_large);
            }

            #[test]
            fn path_output_monotonic_in_input(
                r1 in reserves(),
                r2 in reserves(),
                a in 1u128..1_000_000_000,
                b in 1u128..1_000_000_000,
            ) {
                let ledger = ledger_with_pairs(&[
                    (token(1), token(2), r1.0, r1.1),
                    (token(2), token(3), r2.0, r2.1),
                ]);
                let path = Path::new(vec![token(1), token(2), token(3)]).unwrap();
                let (small, large) = if a <= b { (a, b) } else { (b, a) };
                let quote = |amount| {
                    get_amounts_out(&locator(), &ledger, fee(), amount, &path)
                        .map(|amounts| amounts.last())
                        .unwrap_or(0)
                };
                prop_assert!(quote(small) <= quote(large));
            }

            #[test]
            fn backward_quote_never_under_supplies(
                (reserve_in, reserve_out) in reserves(),
                fraction in 1u128..1000,
            ) {
                let amount_out = (reserve_out * fraction / 1000).max(1);
                let amount_in = get_amount_in(amount_out, reserve_in, reserve_out, fee()).unwrap();
                let delivered = get_amount_out(amount_in, reserve_in, reserve_out, fee()).unwrap();
                prop_assert!(delivered >= amount_out);
            }

            #[test]
            fn round_trip_through_path(
                r1 in reserves(),
                r2 in reserves(),
                amount_in in 1u128..1_000_000_000,
            ) {
                let ledger = ledger_with_pairs(&[
                    (token(1), token(2), r1.0, r1.1),
                    (token(2), token(3), r2.0, r2.1),
                ]);
                let path = Path::new(vec![token(1), token(2), token(3)]).unwrap();
                let Ok(forward) = get_amounts_out(&locator(), &ledger, fee(), amount_in, &path) else {
                    return Ok(());
                };
                let backward =
                    get_amounts_in(&locator(), &ledger, fee(), forward.last(), &path).unwrap();

                // Never asks for more than the input that produced this output,
                // and that input still delivers the output.
                prop_assert!(backward.first() <= amount_in);
                let replay =
                    get_amounts_out(&locator(), &ledger, fee(), backward.first(), &path).unwrap();
                prop_assert!(replay.last() >= forward.last());
            }
        }
    }
}
