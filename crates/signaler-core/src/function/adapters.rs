//! Adapters - `Payload` の具体的な実装
//!
//! | adapter          | 保持するもの                     | サイズの目安      |
//! |------------------|----------------------------------|-------------------|
//! | `FreeFn`         | fn item / fn pointer             | 0〜1 ワード       |
//! | `BoundMethod`    | `Rc<O>` + メソッド               | 1〜2 ワード       |
//! | `BoundMethodMut` | `Rc<RefCell<O>>` + メソッド      | 1〜2 ワード       |
//! | `Closure`        | クロージャ本体                   | キャプチャ次第    |
//!
//! クロージャ以外は常に inline に収まります。

use super::callable::{Callable, Method, MethodMut};
use super::payload::{Payload, inline_copy};
use crate::storage::InlineSpace;
use smallbox::SmallBox;
use std::cell::RefCell;
use std::rc::Rc;

/// Stateless forwarder to a free function.
#[derive(Clone, Copy)]
pub struct FreeFn<F>(F);

impl<F> FreeFn<F> {
    pub fn new(function: F) -> Self {
        Self(function)
    }
}

impl<Args, R, F> Payload<Args, R> for FreeFn<F>
where
    F: Callable<Args, R> + Copy + 'static,
{
    fn invoke(&self, args: Args) -> R {
        self.0.call(args)
    }

    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, R>, InlineSpace> {
        inline_copy(self)
    }
}

/// BoundMethod はオブジェクトとメソッドの組
///
/// `target` は `Rc` で共有するので、Function が生きている間オブジェクトも生きています。
pub struct BoundMethod<O: ?Sized, M> {
    target: Rc<O>,
    method: M,
}

impl<O: ?Sized, M> BoundMethod<O, M> {
    pub fn new(target: Rc<O>, method: M) -> Self {
        Self { target, method }
    }
}

impl<O: ?Sized, M: Copy> Clone for BoundMethod<O, M> {
    fn clone(&self) -> Self {
        Self {
            target: Rc::clone(&self.target),
            method: self.method,
        }
    }
}

impl<Args, R, O, M> Payload<Args, R> for BoundMethod<O, M>
where
    O: ?Sized + 'static,
    M: Method<O, Args, R> + Copy + 'static,
{
    fn invoke(&self, args: Args) -> R {
        self.method.call_method(&self.target, args)
    }

    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, R>, InlineSpace> {
        inline_copy(self)
    }
}

/// BoundMethodMut は `&mut self` を取るメソッド用
///
/// 呼び出し中は `RefCell` を可変借用します。メソッドの中から（Signal の連鎖を
/// 経由した場合も含めて）同じオブジェクトの `&mut self` メソッドに再入すると panic します。
/// 再入が必要なら `&self` メソッド + `Cell`/`RefCell` フィールドで `bind` してください。
pub struct BoundMethodMut<O: ?Sized, M> {
    target: Rc<RefCell<O>>,
    method: M,
}

impl<O: ?Sized, M> BoundMethodMut<O, M> {
    pub fn new(target: Rc<RefCell<O>>, method: M) -> Self {
        Self { target, method }
    }
}

impl<O: ?Sized, M: Copy> Clone for BoundMethodMut<O, M> {
    fn clone(&self) -> Self {
        Self {
            target: Rc::clone(&self.target),
            method: self.method,
        }
    }
}

impl<Args, R, O, M> Payload<Args, R> for BoundMethodMut<O, M>
where
    O: ?Sized + 'static,
    M: MethodMut<O, Args, R> + Copy + 'static,
{
    fn invoke(&self, args: Args) -> R {
        let Ok(mut target) = self.target.try_borrow_mut() else {
            panic!("re-entrant call into a `&mut self` method of an already borrowed object");
        };
        self.method.call_method_mut(&mut target, args)
    }

    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, R>, InlineSpace> {
        inline_copy(self)
    }
}

/// Closure of any capture size.
#[derive(Clone)]
pub struct Closure<F>(F);

impl<F> Closure<F> {
    pub fn new(closure: F) -> Self {
        Self(closure)
    }
}

impl<Args, R, F> Payload<Args, R> for Closure<F>
where
    F: Callable<Args, R> + Clone + 'static,
{
    fn invoke(&self, args: Args) -> R {
        self.0.call(args)
    }

    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, R>, InlineSpace> {
        inline_copy(self)
    }
}
