use proptest::prelude::*;

use grantfund_types::math::{mul_div_floor, mul_div_wide, U256, WAD};
use grantfund_types::{ProposalId, QuadraticCost, Wad};

proptest! {
    /// isqrt returns the largest r with r² <= x.
    #[test]
    fn isqrt_is_floor(a in any::<u128>(), b in any::<u128>(), c in any::<u128>()) {
        let x = U256::widening_mul(a, b).checked_add(U256::from_u128(c));
        prop_assume!(x.is_some());
        let x = x.unwrap();
        let r = x.isqrt();
        prop_assert!(U256::widening_mul(r, r) <= x);
        prop_assert!(r == u128::MAX || U256::widening_mul(r + 1, r + 1) > x);
    }

    /// Squaring is exact over the whole `u128` range: the root gives back
    /// the amount from both sides.
    #[test]
    fn quadratic_cost_round_trips(raw in any::<u128>()) {
        let cost = QuadraticCost::of(Wad::new(raw));
        prop_assert_eq!(cost.sqrt_floor(), Wad::new(raw));
        prop_assert_eq!(cost.sqrt_ceil(), Wad::new(raw));
    }

    /// The floor root of a remaining budget never overstates it and is tight.
    #[test]
    fn sqrt_never_overstates(a in any::<u64>(), b in any::<u128>()) {
        let budget = QuadraticCost::of(Wad::new(a as u128))
            .checked_add(QuadraticCost::of(Wad::new(b)))
            .unwrap();
        let votes = budget.sqrt_floor();
        prop_assert!(QuadraticCost::of(votes) <= budget);
        if votes.raw() < u128::MAX {
            prop_assert!(QuadraticCost::of(Wad::new(votes.raw() + 1)) > budget);
        }
    }

    /// mul_div_floor agrees with native arithmetic when the product fits.
    #[test]
    fn mul_div_matches_native(a in any::<u64>(), b in any::<u64>(), d in 1u128..u128::MAX) {
        let native = (a as u128) * (b as u128) / d;
        prop_assert_eq!(mul_div_floor(a as u128, b as u128, d).unwrap(), native);
    }

    /// mul_div_floor(a, b, b) == a for any non-zero b.
    #[test]
    fn mul_div_cancels(a in any::<u128>(), b in 1u128..u128::MAX) {
        prop_assert_eq!(mul_div_floor(a, b, b).unwrap(), a);
    }

    /// A share of 256-bit costs never exceeds the whole.
    #[test]
    fn mul_div_wide_share_is_bounded(funds in any::<u128>(), x in any::<u128>(), y in any::<u128>()) {
        let part = QuadraticCost::of(Wad::new(x.min(y))).raw();
        let whole = QuadraticCost::of(Wad::new(x.max(y))).raw();
        prop_assume!(!whole.is_zero());
        prop_assert!(mul_div_wide(funds, part, whole).unwrap() <= funds);
        prop_assert_eq!(mul_div_wide(funds, whole, whole).unwrap(), funds);
    }

    /// Basis points never increase an amount.
    #[test]
    fn apply_bps_is_bounded(raw in any::<u128>(), bps in 0u32..=10_000) {
        prop_assert!(Wad::new(raw).apply_bps(bps).unwrap() <= Wad::new(raw));
    }

    /// ProposalId bincode serialization is lossless.
    #[test]
    fn proposal_id_bincode(bytes in prop::array::uniform32(0u8..)) {
        let id = ProposalId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: ProposalId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }
}

#[test]
fn wad_constant() {
    assert_eq!(Wad::ONE.raw(), WAD);
}

#[test]
fn squares_past_u128_range_stay_exact() {
    // (2^93)² / WAD no longer fits in a u128; at 256 bits it is exact.
    let votes = Wad::new(1u128 << 93);
    let cost = QuadraticCost::of(votes);
    assert_eq!(cost.raw(), U256::widening_mul(1u128 << 93, 1u128 << 93));
    assert_eq!(cost.sqrt_floor(), votes);
    assert!(cost > QuadraticCost::of(Wad::new((1u128 << 93) - 1)));
}
