use proptest::prelude::*;

use grantfund_funding::{
    FundingError, FundingVoteParams, GrantFund, ProposalPayload, ScreeningVoteParams,
};
use grantfund_nullables::{NullExecutor, NullVotingPower};
use grantfund_types::{Account, FundingParams, ProposalId, QuadraticCost, SignedWad, Tick, Wad};

type Fund = GrantFund<NullVotingPower, NullExecutor>;

const SCREENING: Tick = Tick::new(1);
const FUNDING: Tick = Tick::new(85);
const CHALLENGE: Tick = Tick::new(101);
const CLOSED: Tick = Tick::new(111);

fn voter(i: usize) -> Account {
    Account::new(format!("voter-{i}"))
}

/// A fund with one open period, `voters` accounts of `power` tokens each and
/// `proposals` proposals requesting 500, 1000, 1500... tokens.
fn setup(voters: usize, power: u64, proposals: usize) -> (Fund, Vec<ProposalId>) {
    setup_with_power(voters, Wad::tokens(power), proposals)
}

fn setup_with_power(voters: usize, power: Wad, proposals: usize) -> (Fund, Vec<ProposalId>) {
    let params = FundingParams {
        period_length: 100,
        funding_length: 20,
        challenge_length: 10,
        ..FundingParams::default()
    };
    let oracle = NullVotingPower::with_powers((0..voters).map(|i| (voter(i), power)));
    let mut fund = GrantFund::new(params, oracle, NullExecutor::new()).unwrap();
    fund.fund_treasury(Wad::tokens(100_000)).unwrap();
    fund.start_new_distribution_period(Tick::GENESIS).unwrap();
    let ids = (0..proposals)
        .map(|i| {
            let payload = ProposalPayload::transfer(
                Account::new("grantee"),
                Wad::tokens(500 * (i as u64 % 5 + 1)),
                format!("proposal {i}"),
            );
            fund.propose(SCREENING, payload).unwrap()
        })
        .collect();
    (fund, ids)
}

fn screen_all(fund: &mut Fund, ids: &[ProposalId], voters: usize) {
    for i in 0..voters {
        let votes: Vec<_> = ids
            .iter()
            .map(|id| ScreeningVoteParams {
                proposal_id: *id,
                amount: Wad::tokens(1),
            })
            .collect();
        fund.screening_vote(SCREENING, &voter(i), &votes).unwrap();
    }
}

fn funding(id: ProposalId, votes: i64) -> [FundingVoteParams; 1] {
    [FundingVoteParams {
        proposal_id: id,
        votes_used: SignedWad::tokens(votes),
    }]
}

fn raw_vote(id: ProposalId, raw: u128) -> FundingVoteParams {
    FundingVoteParams {
        proposal_id: id,
        votes_used: SignedWad::new(raw as i128),
    }
}

proptest! {
    /// Screening totals never exceed power, rejected calls change nothing, and
    /// the top ten always equals a brute-force sort (tally desc, first-submitted wins).
    #[test]
    fn screening_budget_and_exact_top_ten(
        proposals in 1usize..16,
        calls in prop::collection::vec((0usize..3, 0usize..16, 1u64..60), 1..80),
    ) {
        const POWER: u64 = 300;
        let (mut fund, ids) = setup(3, POWER, proposals);
        let mut tallies = vec![0u64; proposals];
        let mut totals = [0u64; 3];

        for (v, p, amount) in calls {
            let p = p % proposals;
            let params = [ScreeningVoteParams { proposal_id: ids[p], amount: Wad::tokens(amount) }];
            let result = fund.screening_vote(SCREENING, &voter(v), &params);
            if totals[v] + amount > POWER {
                let is_budget_error = matches!(result, Err(FundingError::InsufficientVotingPower { .. }));
                prop_assert!(is_budget_error);
            } else {
                prop_assert_eq!(result.unwrap(), Wad::tokens(totals[v] + amount));
                totals[v] += amount;
                tallies[p] += amount;
            }
            prop_assert_eq!(fund.screening_votes_cast(1, &voter(v)), Wad::tokens(totals[v]));
        }

        let mut expected: Vec<usize> = (0..proposals).filter(|i| tallies[*i] > 0).collect();
        expected.sort_by(|a, b| tallies[*b].cmp(&tallies[*a]).then(a.cmp(b)));
        expected.truncate(10);
        let expected: Vec<ProposalId> = expected.into_iter().map(|i| ids[i]).collect();
        prop_assert_eq!(fund.top_ten(1), expected.as_slice());
    }

    /// Σ votes² never exceeds power², and accumulated votes never change sign.
    #[test]
    fn quadratic_budget_and_direction_lock(
        calls in prop::collection::vec((0usize..3, -30i64..30), 1..60),
    ) {
        const POWER: i64 = 40;
        let (mut fund, ids) = setup(1, POWER as u64, 3);
        screen_all(&mut fund, &ids, 1);
        let who = voter(0);
        let mut acc = [0i64; 3];

        for (p, v) in calls {
            if v == 0 {
                continue;
            }
            let result = fund.funding_vote(FUNDING, &who, &funding(ids[p], v));
            let updated = acc[p] + v;
            if acc[p] != 0 && updated.signum() != acc[p].signum() {
                prop_assert_eq!(result.unwrap_err(), FundingError::FundingVoteWrongDirection(ids[p]));
                continue;
            }
            let mut next = acc;
            next[p] = updated;
            let cost: i64 = next.iter().map(|n| n * n).sum();
            if cost > POWER * POWER {
                let is_budget_error = matches!(result, Err(FundingError::InsufficientVotingPower { .. }));
                prop_assert!(is_budget_error);
            } else {
                prop_assert_eq!(result.unwrap(), QuadraticCost::tokens((POWER * POWER - cost) as u64));
                acc = next;
            }

            let record = fund.funding_voter(1, &who);
            let spent: i64 = acc.iter().map(|n| n * n).sum();
            prop_assert_eq!(
                record.map(|r| r.spent).unwrap_or(QuadraticCost::ZERO),
                QuadraticCost::tokens(spent as u64)
            );
            prop_assert!(spent <= POWER * POWER);
            for (i, id) in ids.iter().enumerate() {
                prop_assert_eq!(
                    fund.proposal(id).unwrap().net_funding_votes_received,
                    SignedWad::tokens(acc[i])
                );
            }
        }
    }

    /// Fractional votes spend a large budget exactly: filling it to the last
    /// unit succeeds and one more unit is refused.
    #[test]
    fn quadratic_budget_is_exact_for_large_fractional_votes(
        power in 10_000_000_000_000_000_000u128..(1u128 << 100),
        split in 1u128..10_000,
    ) {
        let (mut fund, ids) = setup_with_power(1, Wad::new(power), 2);
        screen_all(&mut fund, &ids, 1);
        let who = voter(0);
        let budget = QuadraticCost::of(Wad::new(power));
        let first = power / 10_000 * split;
        let rest = budget.checked_sub(QuadraticCost::of(Wad::new(first))).unwrap();
        let second = rest.sqrt_floor().raw();

        let remaining = fund
            .funding_vote(FUNDING, &who, &[raw_vote(ids[0], first), raw_vote(ids[1], second)])
            .unwrap();
        prop_assert_eq!(remaining, rest.checked_sub(QuadraticCost::of(Wad::new(second))).unwrap());
        let one_more = fund.funding_vote(FUNDING, &who, &[raw_vote(ids[1], 1)]);
        let is_budget_error = matches!(one_more, Err(FundingError::InsufficientVotingPower { .. }));
        prop_assert!(is_budget_error);
        prop_assert_eq!(
            fund.period(1).unwrap().funding_votes_cast,
            budget.checked_sub(remaining).unwrap()
        );
    }

    /// The winning slate's total only ever increases, and only a strictly
    /// better candidate replaces it.
    #[test]
    fn slate_total_is_monotonic(
        votes in prop::collection::vec((0usize..6, -20i64..40), 6..30),
        candidates in prop::collection::vec(0u8..64, 1..40),
    ) {
        let (mut fund, ids) = setup(6, 100, 6);
        screen_all(&mut fund, &ids, 6);
        for (i, (p, v)) in votes.into_iter().enumerate() {
            if v != 0 {
                let _ = fund.funding_vote(FUNDING, &voter(i % 6), &funding(ids[p], v));
            }
        }

        let mut best: Option<Wad> = None;
        for mask in candidates {
            let slate: Vec<ProposalId> = (0..6).filter(|i| mask & (1 << i) != 0).map(|i| ids[i]).collect();
            let before = fund.winning_slate(1).cloned();
            match fund.update_slate(CHALLENGE, 1, &slate) {
                Ok(true) => {
                    let total = fund.winning_slate(1).unwrap().total_votes;
                    prop_assert!(best.map_or(true, |b| total > b));
                    best = Some(total);
                    prop_assert!(!fund.update_slate(CHALLENGE, 1, &slate).unwrap());
                }
                Ok(false) | Err(_) => {
                    prop_assert_eq!(fund.winning_slate(1).cloned(), before);
                }
            }
            if let Some(slate) = fund.winning_slate(1) {
                prop_assert!(slate.tokens_requested <= Wad::tokens(2_700));
                prop_assert_eq!(Some(slate.hash), fund.period(1).unwrap().winning_slate_hash);
            }
        }
    }

    /// Rewards of a period never sum past a tenth of its GBC.
    #[test]
    fn rewards_never_exceed_pool(
        votes in prop::collection::vec((0usize..6, 0usize..4, -25i64..25), 1..40),
    ) {
        let (mut fund, ids) = setup(6, 50, 4);
        screen_all(&mut fund, &ids, 6);
        for (v, p, n) in votes {
            if n != 0 {
                let _ = fund.funding_vote(FUNDING, &voter(v), &funding(ids[p], n));
            }
        }

        let pool = fund.period(1).unwrap().funds_available.apply_bps(1_000).unwrap();
        let mut paid = Wad::ZERO;
        for v in 0..6 {
            paid = paid + fund.claim_delegate_reward(CLOSED, &voter(v), 1).unwrap();
        }
        prop_assert!(paid <= pool, "paid {} > pool {}", paid, pool);
        prop_assert_eq!(fund.rewards_paid(1), paid);
    }
}

#[test]
fn rewards_for_voters_past_u64_token_power() {
    // Four voters of 1e10 tokens each spend (1e10)² apiece.
    let power = 10_000_000_000;
    let (mut fund, ids) = setup(4, power, 1);
    screen_all(&mut fund, &ids, 4);
    for v in 0..4 {
        fund.funding_vote(FUNDING, &voter(v), &funding(ids[0], power as i64))
            .unwrap();
    }
    assert_eq!(
        fund.period(1).unwrap().funding_votes_cast,
        QuadraticCost::of(Wad::tokens(2 * power))
    );
    // GBC 3_000, pool 300, a quarter each.
    for v in 0..4 {
        assert_eq!(fund.delegate_reward(1, &voter(v)).unwrap(), Wad::tokens(75));
        assert_eq!(
            fund.claim_delegate_reward(CLOSED, &voter(v), 1).unwrap(),
            Wad::tokens(75)
        );
    }
    assert_eq!(fund.rewards_paid(1), Wad::tokens(300));
}
