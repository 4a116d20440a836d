use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use slirc_engine::sender::NullSender;
use slirc_engine::wire::decode;
use slirc_engine::{Engine, EngineConfig};

// Decoding alone, then the full path through processors and dispatch.

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let raw = "@time=2023-01-01T12:00:00.000Z;msgid=abc :sender!user@host PRIVMSG #channel :Hello world\r\n";
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("decode_privmsg", |b| b.iter(|| decode(raw).unwrap()));

    group.finish();
}

fn handle_line_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(1));

    let mut engine = Engine::new(EngineConfig::default(), NullSender).unwrap();
    engine.handle_line(":irc.test 001 me :Welcome").unwrap();
    engine.handle_line(":me!m@h JOIN #channel").unwrap();
    engine.dispatcher().register_fn(slirc_engine::EventKind::Message, |_, _| Ok(()));

    group.bench_function("privmsg", |b| {
        b.iter(|| engine.handle_line(":sender!user@host PRIVMSG #channel :Hello world").unwrap())
    });

    group.bench_function("join_part", |b| {
        b.iter(|| {
            engine.handle_line(":bob!b@host JOIN #channel").unwrap();
            engine.handle_line(":bob!b@host PART #channel :bye").unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, decode_benchmark, handle_line_benchmark);
criterion_main!(benches);
