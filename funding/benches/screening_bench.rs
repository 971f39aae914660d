use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use grantfund_funding::{FundingVoteParams, GrantFund, ProposalPayload, ScreeningVoteParams};
use grantfund_nullables::{NullExecutor, NullVotingPower};
use grantfund_types::{Account, FundingParams, ProposalId, SignedWad, Tick, Wad};

type Fund = GrantFund<NullVotingPower, NullExecutor>;

const VOTERS: usize = 64;

fn voter(i: usize) -> Account {
    Account::new(format!("voter-{i}"))
}

fn fund_with_proposals(count: usize) -> (Fund, Vec<ProposalId>) {
    let oracle =
        NullVotingPower::with_powers((0..VOTERS).map(|i| (voter(i), Wad::tokens(1_000_000))));
    let mut fund = GrantFund::new(FundingParams::default(), oracle, NullExecutor::new()).unwrap();
    fund.fund_treasury(Wad::tokens(500_000_000)).unwrap();
    fund.start_new_distribution_period(Tick::GENESIS).unwrap();
    let ids = (0..count)
        .map(|i| {
            let payload = ProposalPayload::transfer(
                Account::new("grantee"),
                Wad::tokens(1_000),
                format!("proposal {i}"),
            );
            fund.propose(Tick::new(1), payload).unwrap()
        })
        .collect();
    (fund, ids)
}

/// Each voter spreads votes over every proposal with rising weights, so the
/// top ten keeps churning.
fn bench_screening_votes(c: &mut Criterion) {
    let mut group = c.benchmark_group("screening_vote");
    for count in [16usize, 128, 1024] {
        group.bench_with_input(BenchmarkId::new("proposals", count), &count, |b, &count| {
            b.iter_batched(
                || fund_with_proposals(count),
                |(mut fund, ids)| {
                    for v in 0..VOTERS {
                        let votes: Vec<_> = ids
                            .iter()
                            .enumerate()
                            .map(|(i, id)| ScreeningVoteParams {
                                proposal_id: *id,
                                amount: Wad::tokens(((i + v) % count + 1) as u64),
                            })
                            .collect();
                        fund.screening_vote(Tick::new(2), &voter(v), &votes).unwrap();
                    }
                    black_box(fund.top_ten(1).len())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_funding_votes(c: &mut Criterion) {
    let funding_tick = Tick::new(FundingParams::default().period_length - 1);
    c.bench_function("funding_vote_top_ten", |b| {
        b.iter_batched(
            || {
                let (mut fund, ids) = fund_with_proposals(32);
                let screening: Vec<_> = ids
                    .iter()
                    .map(|id| ScreeningVoteParams {
                        proposal_id: *id,
                        amount: Wad::tokens(1),
                    })
                    .collect();
                fund.screening_vote(Tick::new(2), &voter(0), &screening)
                    .unwrap();
                let votes: Vec<_> = fund
                    .top_ten(1)
                    .iter()
                    .enumerate()
                    .map(|(i, id)| FundingVoteParams {
                        proposal_id: *id,
                        votes_used: SignedWad::tokens(if i % 3 == 0 { -100 } else { 100 }),
                    })
                    .collect();
                (fund, votes)
            },
            |(mut fund, votes)| black_box(fund.funding_vote(funding_tick, &voter(0), &votes).unwrap()),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_screening_votes, bench_funding_votes);
criterion_main!(benches);
