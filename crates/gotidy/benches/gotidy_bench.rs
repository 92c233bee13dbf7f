// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gotidy::pipeline::{Message, line_channel, produce, run_pipeline};
use gotidy::render::Renderer;
use gotidy_diagnostics::Styles;
use tokio::sync::mpsc;

/// A failing package: every third root test fails with a testify report
fn failing_stream(tests: usize) -> Vec<String> {
    let pkg = "example.com/bench/cart";
    let mut lines = Vec::new();

    for t in 0..tests {
        let root = format!("TestCart{t}");
        let action = if t % 3 == 0 { "fail" } else { "pass" };
        if action == "fail" {
            for output in [
                r"    cart_test.go:12: \n",
                r"        \tError Trace:\t/src/cart/cart_test.go:12\n",
                r"        \tError:      \tNot equal: \n",
                r"        \t            \texpected: 80\n",
                r"        \t            \tactual  : 90\n",
                r"        \tTest:       \tTestCart\n",
            ] {
                lines.push(format!(
                    r#"{{"Action":"output","Package":"{pkg}","Test":"{root}","Output":"{output}"}}"#
                ));
            }
        }
        lines.push(format!(
            r#"{{"Action":"{action}","Package":"{pkg}","Test":"{root}","Elapsed":0.01}}"#
        ));
    }

    lines.push(format!(
        r#"{{"Action":"output","Package":"{pkg}","Output":"FAIL\t{pkg}\t1.00s\n"}}"#
    ));
    lines.push(format!(r#"{{"Action":"fail","Package":"{pkg}","Elapsed":1.0}}"#));
    lines
}

async fn render_report(stream: &[String]) -> usize {
    let (tx, rx) = line_channel();
    let stream = stream.to_vec();
    tokio::spawn(async move {
        for line in stream {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut renderer = Renderer::new(Vec::new(), Styles::colorized());
    let _ = run_pipeline(rx, &mut renderer).await;
    renderer.into_inner().len()
}

async fn produce_only(stream: &[String]) -> usize {
    let (lines_tx, lines_rx) = mpsc::channel(stream.len().max(1));
    for line in stream {
        let _ = lines_tx.send(line.clone()).await;
    }
    drop(lines_tx);

    let (tx, mut rx) = mpsc::channel(stream.len().max(1));
    produce(lines_rx, tx).await;

    let mut count = 0;
    while let Some(message) = rx.recv().await {
        if matches!(message, Message::Entry(_)) {
            count += 1;
        }
    }
    count
}

fn report_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let stream = failing_stream(300);

    let mut group = c.benchmark_group("report");
    group.throughput(Throughput::Elements(stream.len() as u64));

    group.bench_function("produce", |b| {
        b.iter(|| runtime.block_on(produce_only(&stream)))
    });

    group.bench_function("pipeline_render", |b| {
        b.iter(|| runtime.block_on(render_report(&stream)))
    });

    group.finish();
}

criterion_group!(benches, report_benchmark);
criterion_main!(benches);
