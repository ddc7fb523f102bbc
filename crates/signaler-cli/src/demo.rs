//! demo：関数・メソッド・クロージャ・Signal を一通りつなぐ

use signaler_core::{Empty, Function, Signal};
use std::cell::RefCell;
use std::rc::Rc;

struct Widget {
    name: &'static str,
}

impl Widget {
    fn report(&self, value: i32) {
        println!("{} method got: {value}", self.name);
    }

    fn report_next(&self, value: i32) {
        println!("{} method got const: {value}", self.name);
        self.report(value + 1);
    }
}

#[derive(Default)]
struct Tally {
    total: i64,
}

impl Tally {
    fn add(&mut self, value: i32) {
        self.total += i64::from(value);
    }
}

fn print_value(value: i32) {
    println!("function got: {value}");
}

pub fn run() {
    let widget = Rc::new(Widget { name: "widget" });

    // (A) 4 通りの束縛
    let by_fn: Function<(i32,)> = Function::from_fn(print_value);
    let by_method: Function<(i32,)> = Function::bind(Rc::clone(&widget), Widget::report);
    let by_pointer: Function<(i32,)> = Function::from_fn(print_value as fn(i32));
    let by_closure: Function<(i32,)> = Function::new(|value: i32| println!("closure got: {value}"));
    by_fn.call(1);
    by_method.call(2);
    by_pointer.call(3);
    by_closure.call(4);

    // (B) 再代入・コピー・空にする
    let captured = 2;
    let mut dx: Function<()> = Function::new(move || println!("hello world: {captured}"));
    dx.call();
    println!("dx placement: {:?}", dx.placement());

    dx.set(|| {});
    let target = Rc::clone(&widget);
    let padding = [0u8; 32];
    dx.set(move || {
        target.report(777 + i32::from(padding[0]));
    });
    println!("dx placement: {:?}", dx.placement());
    dx.call();

    let mut dx_copy = dx.clone();
    println!("dx_copy shares with {} other(s)", dx_copy.share_count());
    dx_copy.call();
    dx_copy = Empty.into();
    if dx_copy == Empty {
        println!("dx_copy is empty");
    }

    // (C) 複数引数の Signal
    let answer: Signal<(String, i32)> = Signal::new();
    answer.connect(|text: String, n: i32| println!("{text} {n}"));
    answer.call("The answer:".to_string(), 42);

    // (D) メソッドを slot にする
    let by_method_signal: Signal<(i32,)> = Signal::new();
    by_method_signal.connect_method(Rc::clone(&widget), Widget::report);
    by_method_signal.call(333);

    let forwarding: Signal<(i32,)> = Signal::new();
    forwarding.connect_method(Rc::clone(&widget), Widget::report_next);
    forwarding.call(333);

    let tally = Rc::new(RefCell::new(Tally::default()));
    let counting: Signal<(i32,)> = Signal::new();
    counting.connect_method_mut(Rc::clone(&tally), Tally::add);
    counting.connect_fn(print_value);
    counting.call(333);
    counting.call(334);
    println!("tally: {}", tally.borrow().total);

    // (E) Signal の連鎖
    let to_signal: Signal<(i32,)> = Signal::new();
    let to_signal1: Signal<(i32,)> = Signal::new();
    let to_signal2: Signal<(i32,)> = Signal::new();
    let links = [
        to_signal.connect_signal(&forwarding),
        to_signal1.connect_signal(&to_signal),
        to_signal2.connect_signal(&to_signal1),
    ];
    to_signal2.call(1111111);

    if let Some(Ok(last)) = links.last() {
        to_signal2.disconnect(*last);
    }
    to_signal2.call(2222222);
    println!("chain cut, to_signal2 has {} slot(s)", to_signal2.len());
}
