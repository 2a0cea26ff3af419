use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linebus::Bus;
use tokio::runtime::Runtime;

const SUBSCRIBER_COUNTS: &[usize] = &[1, 4, 16];
const BATCH: usize = 256;

async fn fan_out(subscribers: usize) {
    let bus = Bus::new();
    bus.listen();
    let handle = bus.handle();

    let mut drains = Vec::new();
    for _ in 0..subscribers {
        let mut subscription = handle.subscribe().await.expect("subscribe");
        drains.push(tokio::spawn(async move {
            let mut seen = 0usize;
            while subscription.recv().await.is_some() {
                seen += 1;
                if seen == BATCH {
                    break;
                }
            }
        }));
    }

    for i in 0..BATCH {
        handle.publish(format!("message-{i}")).expect("publish");
    }
    for drain in drains {
        let _ = drain.await;
    }
    bus.shutdown().await;
}

fn fanout_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("bus_fanout");

    for &subscribers in SUBSCRIBER_COUNTS {
        group.throughput(Throughput::Elements((BATCH * subscribers) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &subscribers| {
                b.to_async(&runtime).iter(|| fan_out(subscribers));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, fanout_throughput);
criterion_main!(benches);
