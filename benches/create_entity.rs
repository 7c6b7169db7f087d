use criterion::*;
use tessera::test_util::{self, CompN};
use tessera::Archetype;

fn create_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("create entity");

    macro_rules! create_entity_batch {
        ($num_comps:literal; $($comps:expr),* $(,)?) => {
            for log_entities in (0..=8).step_by(4) {
                let entities = 1 << log_entities;
                let archetype = Archetype::new("bench")$(.with($comps))*;
                group.throughput(Throughput::Elements(entities));
                group.bench_with_input(
                    BenchmarkId::new(
                        format!("{} components", $num_comps),
                        format!("{entities} entities"),
                    ),
                    &entities,
                    |b, &entities| {
                        b.iter_batched(
                            test_util::comp_n_world,
                            |mut world| {
                                for _ in 0..entities {
                                    world.create(&archetype).expect("limit is not reached");
                                }
                                world
                            },
                            BatchSize::SmallInput,
                        );
                    },
                );
            }
        };
    }

    create_entity_batch!(0; );
    create_entity_batch!(1; CompN::<0>(1));
    create_entity_batch!(2; CompN::<0>(1), CompN::<1>(2));
    create_entity_batch!(4; CompN::<0>(1), CompN::<1>(2), CompN::<2>(3), CompN::<3>(4));
    create_entity_batch!(
        8;
        CompN::<0>(1),
        CompN::<1>(2),
        CompN::<2>(3),
        CompN::<3>(4),
        CompN::<4>(5),
        CompN::<5>(6),
        CompN::<6>(7),
        CompN::<7>(8),
    );

    group.finish();
}

fn create_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("create pool");

    for log_entities in (0..=12).step_by(4) {
        let entities = 1usize << log_entities;
        let archetype = Archetype::new("bench").with(CompN::<0>(1)).with(CompN::<7>(8));
        group.throughput(Throughput::Elements(entities as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    test_util::comp_n_world,
                    |mut world| {
                        world.create_many(entities, &archetype).expect("limit is not reached");
                        world
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, create_entity, create_pool);
criterion_main!(benches);
