use bytes::BytesMut;
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kasa_proto::protocol::codec::{FrameCodec, encode_datagram, encode_stream};
use kasa_proto::{Command, Envelope, Request};
use std::hint::black_box;
use std::time::Duration;
use tokio_util::codec::Decoder;

const SYSINFO_REPLY: &str = r#"{"system":{"get_sysinfo":{"sw_ver":"1.5.6 Build 191125 Rel.083657","hw_ver":"2.0","model":"HS110(US)","deviceId":"8006D1F4A3","oemId":"FFF22CFF774A0B89","hwId":"60FF6B258734EA6880E186F8C96DDC61","rssi":-58,"latitude_i":0,"longitude_i":0,"alias":"Kitchen","status":"new","mic_type":"IOT.SMARTPLUGSWITCH","feature":"TIM:ENE","mac":"50:C7:BF:00:00:01","updating":0,"led_off":0,"relay_state":1,"on_time":3605,"active_mode":"none","icon_hash":"","dev_name":"Smart Wi-Fi Plug With Energy Monitoring","next_action":{"type":-1},"err_code":0}}}"#;

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    let commands = [
        ("sysinfo", Request::new(Command::GetSysinfo)),
        (
            "child_relay",
            Request::new(Command::SetRelayState(true)).child("8006D1F4A300"),
        ),
    ];

    for (name, request) in commands {
        let json = request.to_json().unwrap();
        group.throughput(Throughput::Bytes(json.len() as u64));

        group.bench_with_input(BenchmarkId::new("stream", name), &json, |b, json| {
            b.iter(|| black_box(encode_stream(black_box(json.as_bytes())).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("datagram", name), &json, |b, json| {
            b.iter(|| black_box(encode_datagram(black_box(json.as_bytes()))));
        });

        group.bench_with_input(BenchmarkId::new("to_json", name), &request, |b, request| {
            b.iter(|| black_box(request.to_json().unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    let frame = encode_stream(SYSINFO_REPLY.as_bytes()).unwrap();
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("codec", |b| {
        b.iter_batched(
            || BytesMut::from(&frame[..]),
            |mut buf| {
                let body = FrameCodec::default().decode(black_box(&mut buf)).unwrap();
                black_box(body);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("codec_and_parse", |b| {
        b.iter_batched(
            || BytesMut::from(&frame[..]),
            |mut buf| {
                if let Some(body) = FrameCodec::default().decode(&mut buf).unwrap() {
                    black_box(Envelope::parse(black_box(&body)).unwrap());
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(150)
        .warm_up_time(Duration::from_secs(3));
    targets = bench_frame_encode, bench_frame_decode
}

criterion_main!(benches);
