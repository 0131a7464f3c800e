use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hermes_ring::{Config, Ring};
use std::sync::Arc;
use std::thread;

const MSG_COUNT: u64 = 10_000_000; // 10M messages
const BATCH_SIZE: usize = 4096;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    group.bench_function("single_producer_consumer", |b| {
        b.iter(|| {
            let ring = Arc::new(Ring::<u32>::new(Config::default()));

            let producer_ring = Arc::clone(&ring);
            let producer_handle = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < MSG_COUNT {
                    let want = BATCH_SIZE.min((MSG_COUNT - sent) as usize);
                    if let Some(mut r) = producer_ring.reserve(want) {
                        let len = {
                            let slice = r.as_mut_slice();
                            for (i, item) in slice.iter_mut().enumerate() {
                                item.write((sent + i as u64) as u32);
                            }
                            slice.len()
                        };
                        r.commit();
                        sent += len as u64;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut count = 0u64;
            while count < MSG_COUNT {
                count += ring.consume_up_to(BATCH_SIZE, |item| {
                    black_box(item);
                }) as u64;
                if count < MSG_COUNT {
                    std::hint::spin_loop();
                }
            }

            producer_handle.join().unwrap();
        });
    });

    group.finish();
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_sizes");
    group.throughput(Throughput::Elements(MSG_COUNT));

    for batch_size in [256, 1024, 4096, 16384].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("batch_{batch_size}")),
            batch_size,
            |b, &batch| {
                b.iter(|| {
                    let ring = Arc::new(Ring::<u32>::new(Config::default()));

                    let producer_ring = Arc::clone(&ring);
                    let producer_handle = thread::spawn(move || {
                        let mut sent = 0u64;
                        while sent < MSG_COUNT {
                            let want = batch.min((MSG_COUNT - sent) as usize);
                            if let Some(mut r) = producer_ring.reserve(want) {
                                let len = {
                                    let slice = r.as_mut_slice();
                                    for (i, item) in slice.iter_mut().enumerate() {
                                        item.write((sent + i as u64) as u32);
                                    }
                                    slice.len()
                                };
                                r.commit();
                                sent += len as u64;
                            } else {
                                std::hint::spin_loop();
                            }
                        }
                    });

                    let mut count = 0u64;
                    while count < MSG_COUNT {
                        count += ring.consume_up_to(batch, |item| {
                            black_box(item);
                        }) as u64;
                        if count < MSG_COUNT {
                            std::hint::spin_loop();
                        }
                    }

                    producer_handle.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_batch_sizes);
criterion_main!(benches);
