//! sizes：ハンドルと payload のサイズ・配置を表示する

use serde::Serialize;
use signaler_core::storage::fits_inline;
use signaler_core::{ConnectionId, Function, Placement, SMALL_OBJECT_THRESHOLD, Signal};
use std::mem::size_of;
use std::rc::Rc;

#[derive(Debug, Serialize)]
struct SizeReport {
    threshold: usize,
    function_bytes: usize,
    signal_bytes: usize,
    connection_id_bytes: usize,
    payloads: Vec<PayloadReport>,
}

#[derive(Debug, Serialize)]
struct PayloadReport {
    name: &'static str,
    bytes: usize,
    fits_inline: bool,
    placement: Placement,
}

struct Probe;

impl Probe {
    fn touch(&self, _: i32) {}
}

fn noop(_: i32) {}

fn payload<F>(name: &'static str, _: &F, function: &Function<(i32,)>) -> PayloadReport {
    PayloadReport {
        name,
        bytes: size_of::<F>(),
        fits_inline: fits_inline::<F>(),
        placement: function.placement(),
    }
}

fn collect() -> SizeReport {
    let small = 7i32;
    let small_closure = move |value: i32| {
        let _ = value + small;
    };
    let large = [0u8; 64];
    let large_closure = move |value: i32| {
        let _ = usize::try_from(value).map(|index| large.get(index));
    };
    let probe = Rc::new(Probe);
    let bound = (Rc::clone(&probe), Probe::touch);
    let signal: Signal<(i32,)> = Signal::new();
    let delegate = signal.as_function();

    let payloads = vec![
        payload("free function", &noop, &Function::from_fn(noop)),
        payload(
            "bound method",
            &bound,
            &Function::bind(Rc::clone(&probe), Probe::touch),
        ),
        payload(
            "small closure",
            &small_closure,
            &Function::new(small_closure),
        ),
        payload(
            "large closure",
            &large_closure,
            &Function::new(large_closure),
        ),
        PayloadReport {
            name: "signal delegate",
            bytes: size_of::<std::rc::Weak<()>>(),
            fits_inline: true,
            placement: delegate.placement(),
        },
    ];

    SizeReport {
        threshold: SMALL_OBJECT_THRESHOLD,
        function_bytes: size_of::<Function<(i32,)>>(),
        signal_bytes: size_of::<Signal<(i32,)>>(),
        connection_id_bytes: size_of::<ConnectionId>(),
        payloads,
    }
}

pub fn run(json: bool) -> anyhow::Result<()> {
    let report = collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("small-object threshold: {} bytes", report.threshold);
    println!("Function<(i32,)>: {} bytes", report.function_bytes);
    println!("Signal<(i32,)>: {} bytes", report.signal_bytes);
    println!("ConnectionId: {} bytes", report.connection_id_bytes);
    for p in &report.payloads {
        println!(
            "{:<16} {:>3} bytes  fits_inline={:<5}  placement={:?}",
            p.name, p.bytes, p.fits_inline, p.placement
        );
    }
    Ok(())
}
