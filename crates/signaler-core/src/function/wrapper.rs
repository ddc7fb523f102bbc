//! Function wrapper - 関数・メソッド・クロージャを 1 つの型で扱う
//!
//! # 学習ポイント
//! - `Storage<dyn Payload<Args, R>>` による type erasure
//! - 空の `Function` を呼んだ時の扱い（fail-fast: `invoke` は panic、`try_invoke` は `Err`）
//! - arity ごとの `call(a, b, ..)` をマクロで生成

use super::adapters::{BoundMethod, BoundMethodMut, Closure, FreeFn};
use super::callable::{Callable, Method, MethodMut};
use super::payload::Payload;
use crate::error::CallError;
use crate::storage::{Placement, Storage};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Empty は「何も束縛されていない」ことを表すマーカー
///
/// ```ignore
/// let mut f: Function<(i32,)> = Function::new(|x: i32| println!("{x}"));
/// assert!(f != Empty);
/// f = Empty.into();
/// assert!(f == Empty);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Empty;

/// Type-erased callable taking the argument tuple `Args` and returning `R`.
///
/// Copies are cheap: inline payloads are copied by value, heap payloads are
/// shared through a reference count.
pub struct Function<Args, R = ()> {
    storage: Storage<dyn Payload<Args, R>>,
}

impl<Args, R> Function<Args, R> {
    pub const fn empty() -> Self {
        Self {
            storage: Storage::new(),
        }
    }

    /// Store a custom payload.
    pub fn from_payload<P>(payload: P) -> Self
    where
        P: Payload<Args, R> + 'static,
    {
        Self {
            storage: Storage::from_value(payload),
        }
    }

    /// クロージャを格納する（サイズ次第で inline / heap）
    pub fn new<F>(closure: F) -> Self
    where
        F: Callable<Args, R> + Clone + 'static,
    {
        Self::from_payload(Closure::new(closure))
    }

    /// 関数を格納する（常に inline）
    pub fn from_fn<F>(function: F) -> Self
    where
        F: Callable<Args, R> + Copy + 'static,
    {
        Self::from_payload(FreeFn::new(function))
    }

    /// Bind `method` to a shared object, e.g. `Function::bind(widget, Widget::report)`.
    pub fn bind<O, M>(target: Rc<O>, method: M) -> Self
    where
        O: ?Sized + 'static,
        M: Method<O, Args, R> + Copy + 'static,
    {
        Self::from_payload(BoundMethod::new(target, method))
    }

    /// Bind a `&mut self` method; the object is borrowed mutably for each call.
    pub fn bind_mut<O, M>(target: Rc<RefCell<O>>, method: M) -> Self
    where
        O: ?Sized + 'static,
        M: MethodMut<O, Args, R> + Copy + 'static,
    {
        Self::from_payload(BoundMethodMut::new(target, method))
    }

    /// 別のクロージャを再代入する
    pub fn set<F>(&mut self, closure: F) -> Placement
    where
        F: Callable<Args, R> + Clone + 'static,
    {
        self.storage.init(Closure::new(closure))
    }

    pub fn reset(&mut self) {
        self.storage.reset();
    }

    /// 中身を取り出す。`self` は空になる
    pub fn take(&mut self) -> Self {
        Self {
            storage: self.storage.take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn placement(&self) -> Placement {
        self.storage.placement()
    }

    /// Number of other `Function`s sharing this heap payload.
    pub fn share_count(&self) -> usize {
        self.storage.share_count()
    }

    /// Whether both wrappers alias the same heap payload.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Call the stored payload.
    ///
    /// # Panics
    /// Panics if the function is empty. Use [`try_invoke`](Self::try_invoke)
    /// when emptiness is expected.
    #[track_caller]
    pub fn invoke(&self, args: Args) -> R {
        match self.storage.get() {
            Some(payload) => payload.invoke(args),
            None => panic!("{}", CallError::Empty),
        }
    }

    pub fn try_invoke(&self, args: Args) -> Result<R, CallError> {
        let payload = self.storage.get().ok_or(CallError::Empty)?;
        Ok(payload.invoke(args))
    }
}

macro_rules! impl_call {
    ($($ty:ident $arg:ident),*) => {
        impl<R, $($ty,)*> Function<($($ty,)*), R> {
            /// Call with positional arguments; panics if empty.
            #[track_caller]
            pub fn call(&self, $($arg: $ty),*) -> R {
                self.invoke(($($arg,)*))
            }
        }
    };
}

impl_call!();
impl_call!(A1 a1);
impl_call!(A1 a1, A2 a2);
impl_call!(A1 a1, A2 a2, A3 a3);
impl_call!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_call!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_call!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

impl<Args, R> Clone for Function<Args, R> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<Args, R> Default for Function<Args, R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Args, R> From<Empty> for Function<Args, R> {
    fn from(_: Empty) -> Self {
        Self::empty()
    }
}

impl<Args, R> PartialEq<Empty> for Function<Args, R> {
    fn eq(&self, _: &Empty) -> bool {
        self.is_empty()
    }
}

impl<Args, R> PartialEq<Function<Args, R>> for Empty {
    fn eq(&self, function: &Function<Args, R>) -> bool {
        function.is_empty()
    }
}

impl<Args, R> fmt::Debug for Function<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("placement", &self.placement())
            .field("share_count", &self.share_count())
            .finish()
    }
}
