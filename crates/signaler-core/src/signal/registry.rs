//! Signal - 複数の slot をまとめて呼び出す dispatch registry
//!
//! # 学習ポイント
//! - `Rc<SignalCore>` + `RefCell` による内部可変性（slot の中から connect/disconnect できる）
//! - dispatch 中は借用を保持しない（slot は呼ぶ前に clone する）
//! - 別の Signal を slot として接続する（委譲、`Weak` で保持）
//!
//! # Dispatch の規則
//! - 接続順に呼ぶ
//! - dispatch 開始時点の slot 一覧を対象にする（途中で connect された slot は次回から）
//! - 途中で disconnect された slot は、それ以降呼ばれない
//! - slot の中から同じ Signal を直接 emit するのは可（再帰 dispatch）
//! - 連鎖（`connect_signal`）を通じて dispatch 中の Signal に戻ってきた emit は skip する
//! - 合流する連鎖（C→A→D, C→B→D）では D は経路の数だけ呼ばれる（重複排除はしない）

use super::delegate::SignalSlot;
use super::ids::ConnectionId;
use super::scoped::ScopedConnection;
use crate::error::SignalError;
use crate::function::{Callable, Function, Method, MethodMut};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, SystemTime};
use ulid::Generator;

struct Slot<Args> {
    id: ConnectionId,
    function: Function<Args>,
}

pub(crate) struct SignalCore<Args> {
    // ids are strictly increasing in slot order
    slots: RefCell<Vec<Slot<Args>>>,
    ids: RefCell<Generator>,
    dispatch_depth: Cell<usize>,
}

impl<Args> SignalCore<Args> {
    fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            ids: RefCell::new(Generator::new()),
            dispatch_depth: Cell::new(0),
        }
    }

    /// 単調増加の id を発行する
    ///
    /// 同一ミリ秒内で乱数部が溢れたら、時刻を 1ms 進めて発行し直す。
    fn next_id(&self) -> ConnectionId {
        let mut ids = self.ids.borrow_mut();
        let mut at = SystemTime::now();
        loop {
            match ids.generate_from_datetime(at) {
                Ok(ulid) => return ConnectionId::from_ulid(ulid),
                Err(_) => at += Duration::from_millis(1),
            }
        }
    }

    fn connect(&self, function: Function<Args>) -> ConnectionId {
        let id = self.next_id();
        let mut slots = self.slots.borrow_mut();
        slots.push(Slot { id, function });
        tracing::debug!(connection = %id, slots = slots.len(), "slot connected");
        id
    }

    fn position(slots: &[Slot<Args>], id: ConnectionId) -> Option<usize> {
        slots.binary_search_by_key(&id, |slot| slot.id).ok()
    }

    pub(crate) fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = {
            let mut slots = self.slots.borrow_mut();
            Self::position(&slots, id).map(|index| slots.remove(index))
        };
        // the slot is dropped outside the borrow: its captures may touch this signal
        match removed {
            Some(slot) => {
                tracing::debug!(connection = %id, slots = self.len(), "slot disconnected");
                drop(slot);
                true
            }
            None => {
                tracing::trace!(connection = %id, "disconnect of unknown connection ignored");
                false
            }
        }
    }

    fn disconnect_all(&self) {
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        tracing::debug!(slots = slots.len(), "all slots disconnected");
        drop(slots);
    }

    fn is_connected(&self, id: ConnectionId) -> bool {
        Self::position(&self.slots.borrow(), id).is_some()
    }

    fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether an emission of this signal is currently on the stack.
    pub(crate) fn is_dispatching(&self) -> bool {
        self.dispatch_depth.get() > 0
    }

    /// `start` 以降で最初の slot（id 順）を clone して返す
    fn next_slot(&self, start: usize, id: ConnectionId) -> Option<(usize, Function<Args>)> {
        let slots = self.slots.borrow();
        // fast path: nothing was removed before `id` since the last step
        let index = match slots.get(start) {
            Some(slot) if slot.id == id => start,
            _ => Self::position(&slots, id)?,
        };
        Some((index, slots[index].function.clone()))
    }
}

impl<Args: Clone + 'static> SignalCore<Args> {
    pub(crate) fn emit(&self, args: Args) {
        let _depth = DispatchDepth::enter(&self.dispatch_depth);

        let ids: Vec<ConnectionId> = self.slots.borrow().iter().map(|slot| slot.id).collect();
        tracing::trace!(slots = ids.len(), depth = self.dispatch_depth.get(), "dispatching");

        let mut cursor = 0;
        for id in ids {
            let Some((index, function)) = self.next_slot(cursor, id) else {
                continue;
            };
            cursor = index + 1;
            if !function.is_empty() {
                function.invoke(args.clone());
            }
        }
    }
}

/// Nesting counter for emissions; restored even if a slot panics.
struct DispatchDepth<'a>(&'a Cell<usize>);

impl<'a> DispatchDepth<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DispatchDepth<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Signal は slot（`Function<Args>`）の順序付きリスト
///
/// # 使用例
/// ```ignore
/// let signal: Signal<(String, i32)> = Signal::new();
/// let id = signal.connect(|text: String, n: i32| println!("{text} {n}"));
/// signal.call("The answer:".to_string(), 42);
/// signal.disconnect(id);
/// ```
///
/// # コピー不可
/// `Signal` は `Clone` を実装しません。2 つの Signal が同じ slot 列を
/// 共有することはありません。共有したい場合は `connect_signal` で委譲します。
pub struct Signal<Args> {
    core: Rc<SignalCore<Args>>,
}

impl<Args: Clone + 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            core: Rc::new(SignalCore::new()),
        }
    }

    /// クロージャを slot として接続する
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Callable<Args, ()> + Clone + 'static,
    {
        self.connect_function(Function::new(slot))
    }

    pub fn connect_fn<F>(&self, function: F) -> ConnectionId
    where
        F: Callable<Args, ()> + Copy + 'static,
    {
        self.connect_function(Function::from_fn(function))
    }

    pub fn connect_method<O, M>(&self, target: Rc<O>, method: M) -> ConnectionId
    where
        O: ?Sized + 'static,
        M: Method<O, Args, ()> + Copy + 'static,
    {
        self.connect_function(Function::bind(target, method))
    }

    pub fn connect_method_mut<O, M>(&self, target: Rc<RefCell<O>>, method: M) -> ConnectionId
    where
        O: ?Sized + 'static,
        M: MethodMut<O, Args, ()> + Copy + 'static,
    {
        self.connect_function(Function::bind_mut(target, method))
    }

    /// Connect an already-built `Function`. Empty functions are kept but skipped on dispatch.
    pub fn connect_function(&self, function: Function<Args>) -> ConnectionId {
        self.core.connect(function)
    }

    /// 別の Signal を slot として接続する（委譲）
    ///
    /// `other` の slot はコピーされません。emit のたびに `other` の現在の
    /// slot 列が呼ばれます。`other` が drop された後、この slot は何もしません。
    pub fn connect_signal(&self, other: &Signal<Args>) -> Result<ConnectionId, SignalError> {
        if Rc::ptr_eq(&self.core, &other.core) {
            return Err(SignalError::SelfConnection);
        }
        Ok(self.connect_function(other.as_function()))
    }

    /// Connect a closure whose connection ends when the returned guard is dropped.
    pub fn connect_scoped<F>(&self, slot: F) -> ScopedConnection<Args>
    where
        F: Callable<Args, ()> + Clone + 'static,
    {
        let id = self.connect(slot);
        ScopedConnection::new(Rc::downgrade(&self.core), id)
    }

    /// Returns `true` if a slot was removed. Unknown or already removed ids are ignored.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.core.disconnect(id)
    }

    pub fn disconnect_all(&self) {
        self.core.disconnect_all();
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.core.is_connected(id)
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 接続順にすべての slot を呼ぶ
    pub fn emit(&self, args: Args) {
        self.core.emit(args);
    }

    /// A `Function` that emits this signal, holding it weakly.
    pub fn as_function(&self) -> Function<Args> {
        Function::from_payload(SignalSlot::new(Rc::downgrade(&self.core)))
    }
}

macro_rules! impl_emit_call {
    ($($ty:ident $arg:ident),*) => {
        impl<$($ty: Clone + 'static,)*> Signal<($($ty,)*)> {
            /// Emit with positional arguments.
            pub fn call(&self, $($arg: $ty),*) {
                self.emit(($($arg,)*));
            }
        }
    };
}

impl_emit_call!();
impl_emit_call!(A1 a1);
impl_emit_call!(A1 a1, A2 a2);
impl_emit_call!(A1 a1, A2 a2, A3 a3);
impl_emit_call!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_emit_call!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_emit_call!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

impl<Args: Clone + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.core.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use static_assertions::assert_not_impl_any;
    use std::rc::Weak;

    assert_not_impl_any!(Signal<(i32,)>: Clone);

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn(i32) + Clone + 'static {
        let log = Rc::clone(log);
        move |value: i32| log.borrow_mut().push(format!("{name}:{value}"))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    struct Probe {
        last: Cell<i32>,
    }

    impl Probe {
        fn observe(&self, value: i32) {
            self.last.set(value);
        }
    }

    #[derive(Default)]
    struct History {
        values: Vec<i32>,
    }

    impl History {
        fn push(&mut self, value: i32) {
            self.values.push(value);
        }
    }

    #[test]
    fn new_signal_is_empty() {
        let signal: Signal<(i32,)> = Signal::new();
        assert!(signal.is_empty());
        signal.call(1);
    }

    #[test]
    fn slots_fire_in_connection_order() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        signal.connect(recorder(&log, "s1"));
        signal.connect(recorder(&log, "s2"));
        signal.connect(recorder(&log, "s3"));

        signal.call(5);
        assert_eq!(entries(&log), ["s1:5", "s2:5", "s3:5"]);
    }

    #[test]
    fn disconnect_token_stays_valid() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        let s1 = signal.connect(recorder(&log, "s1"));
        signal.connect(recorder(&log, "s2"));

        assert!(signal.disconnect(s1));
        signal.call(1);
        assert_eq!(entries(&log), ["s2:1"]);

        assert!(!signal.disconnect(s1));
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn tokens_from_another_signal_are_ignored() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        let other: Signal<(i32,)> = Signal::new();
        signal.connect(recorder(&log, "s1"));
        let foreign = other.connect(recorder(&log, "o1"));

        assert!(!signal.disconnect(foreign));
        assert!(other.is_connected(foreign));
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn tokens_are_unique_and_ordered() {
        let signal: Signal<(i32,)> = Signal::new();
        let ids: Vec<_> = (0..16).map(|_| signal.connect(|_: i32| {})).collect();

        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn methods_can_be_connected() {
        let probe = Rc::new(Probe { last: Cell::new(0) });
        let history = Rc::new(RefCell::new(History::default()));
        let signal: Signal<(i32,)> = Signal::new();
        signal.connect_method(Rc::clone(&probe), Probe::observe);
        signal.connect_method_mut(Rc::clone(&history), History::push);

        signal.call(333);
        signal.call(334);
        assert_eq!(probe.last.get(), 334);
        assert_eq!(history.borrow().values, vec![333, 334]);
    }

    #[test]
    fn multiple_arguments_are_forwarded() {
        let seen = Rc::new(RefCell::new(None));
        let signal: Signal<(String, i32)> = Signal::new();
        let sink = Rc::clone(&seen);
        signal.connect(move |text: String, n: i32| *sink.borrow_mut() = Some(format!("{text} {n}")));

        signal.call("The answer:".to_string(), 42);
        assert_eq!(seen.borrow().as_deref(), Some("The answer: 42"));
    }

    #[test]
    fn empty_function_slots_are_skipped() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        signal.connect_function(Function::empty());
        signal.connect(recorder(&log, "s1"));

        signal.call(2);
        assert_eq!(entries(&log), ["s1:2"]);
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn slot_disconnected_mid_dispatch_is_not_called() {
        let log = Log::default();
        let signal = Rc::new(Signal::<(i32,)>::new());
        let victim = Rc::new(Cell::new(None));

        let weak: Weak<Signal<(i32,)>> = Rc::downgrade(&signal);
        let target = Rc::clone(&victim);
        signal.connect(move |_: i32| {
            if let (Some(signal), Some(id)) = (weak.upgrade(), target.get()) {
                signal.disconnect(id);
            }
        });
        victim.set(Some(signal.connect(recorder(&log, "victim"))));
        signal.connect(recorder(&log, "after"));

        signal.call(1);
        assert_eq!(entries(&log), ["after:1"]);
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn slot_can_disconnect_itself() {
        let log = Log::default();
        let signal = Rc::new(Signal::<(i32,)>::new());
        let own_id = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&signal);
        let id_cell = Rc::clone(&own_id);
        let once = recorder(&log, "once");
        own_id.set(Some(signal.connect(move |value: i32| {
            once(value);
            if let (Some(signal), Some(id)) = (weak.upgrade(), id_cell.get()) {
                signal.disconnect(id);
            }
        })));

        signal.call(1);
        signal.call(2);
        assert_eq!(entries(&log), ["once:1"]);
        assert!(signal.is_empty());
    }

    #[test]
    fn slot_connected_mid_dispatch_waits_for_the_next_emit() {
        let log = Log::default();
        let signal = Rc::new(Signal::<(i32,)>::new());

        let weak = Rc::downgrade(&signal);
        let late = recorder(&log, "late");
        let armed = Rc::new(Cell::new(true));
        signal.connect(move |_: i32| {
            if armed.replace(false) {
                if let Some(signal) = weak.upgrade() {
                    signal.connect(late.clone());
                }
            }
        });

        signal.call(1);
        assert!(entries(&log).is_empty());
        signal.call(2);
        assert_eq!(entries(&log), ["late:2"]);
    }

    #[test]
    fn slot_may_emit_its_own_signal_recursively() {
        let signal = Rc::new(Signal::<(i32,)>::new());
        let calls = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&signal);
        let counter = Rc::clone(&calls);
        signal.connect(move |n: i32| {
            counter.set(counter.get() + 1);
            if n > 0 {
                if let Some(signal) = weak.upgrade() {
                    signal.call(n - 1);
                }
            }
        });

        signal.call(3);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn lookups_survive_removals_ahead_of_the_cursor() {
        let log = Log::default();
        let signal = Rc::new(Signal::<(i32,)>::new());
        let first = signal.connect(recorder(&log, "first"));
        let second = signal.connect(recorder(&log, "second"));

        let weak = Rc::downgrade(&signal);
        signal.connect(move |_: i32| {
            if let Some(signal) = weak.upgrade() {
                signal.disconnect(first);
            }
        });
        signal.connect(recorder(&log, "last"));

        signal.call(1);
        assert_eq!(entries(&log), ["first:1", "second:1", "last:1"]);
        assert!(!signal.is_connected(first));
        assert!(signal.is_connected(second));
        signal.call(2);
        assert_eq!(entries(&log), ["second:2", "last:2"]);
    }

    #[test]
    fn self_connection_is_rejected() {
        let signal: Signal<(i32,)> = Signal::new();
        assert_eq!(signal.connect_signal(&signal), Err(SignalError::SelfConnection));
        assert!(signal.is_empty());
    }

    #[test]
    fn as_function_emits_the_signal() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        signal.connect(recorder(&log, "s1"));

        let emit = signal.as_function();
        emit.call(9);
        assert_eq!(entries(&log), ["s1:9"]);
    }

    #[rstest]
    #[case::keep_guard(false, vec!["scoped:1", "scoped:2"])]
    #[case::drop_guard(true, vec!["scoped:1"])]
    fn scoped_connection_lives_as_long_as_its_guard(
        #[case] drop_guard: bool,
        #[case] expected: Vec<&str>,
    ) {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        let guard = signal.connect_scoped(recorder(&log, "scoped"));

        signal.call(1);
        if drop_guard {
            drop(guard);
        } else {
            let _id = guard.release();
        }
        signal.call(2);
        assert_eq!(entries(&log), expected);
    }

    #[test]
    fn disconnect_all_empties_the_signal() {
        let log = Log::default();
        let signal: Signal<(i32,)> = Signal::new();
        let id = signal.connect(recorder(&log, "s1"));
        signal.connect(recorder(&log, "s2"));

        signal.disconnect_all();
        signal.call(1);
        assert!(signal.is_empty());
        assert!(!signal.is_connected(id));
        assert!(entries(&log).is_empty());
    }
}
