//! Payload - `Function` の中身となる object-safe な呼び出し trait
//!
//! `Storage<dyn Payload<Args, R>>` に格納できるよう、ジェネリックなメソッドを持ちません。

use crate::storage::{Duplicate, Erase, InlineSpace};
use smallbox::{SmallBox, smallbox};
use std::rc::Rc;

/// Payload は `Function<Args, R>` に格納される値
///
/// 組み込みの adapter（`FreeFn`, `BoundMethod`, `Closure` など）はすべてこれを実装します。
/// 独自の adapter を `Function::from_payload` で格納することもできます。
///
/// # 使用例
/// ```ignore
/// #[derive(Clone)]
/// struct Doubler;
///
/// impl Payload<(i32,), i32> for Doubler {
///     fn invoke(&self, (value,): (i32,)) -> i32 { value * 2 }
///     fn clone_inline(&self) -> SmallBox<dyn Payload<(i32,), i32>, InlineSpace> {
///         inline_copy(self)
///     }
/// }
/// ```
pub trait Payload<Args, R> {
    fn invoke(&self, args: Args) -> R;

    /// inline に置かれている時のコピー
    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, R>, InlineSpace>;
}

/// `clone_inline` の標準実装
pub fn inline_copy<Args, R, P>(payload: &P) -> SmallBox<dyn Payload<Args, R>, InlineSpace>
where
    P: Payload<Args, R> + Clone + 'static,
{
    smallbox!(payload.clone())
}

impl<Args, R, P> Erase<P> for dyn Payload<Args, R>
where
    P: Payload<Args, R> + 'static,
{
    fn inline(value: P) -> SmallBox<Self, InlineSpace> {
        smallbox!(value)
    }

    fn shared(value: P) -> Rc<Self> {
        Rc::new(value)
    }
}

impl<Args, R> Duplicate for dyn Payload<Args, R> {
    fn duplicate(&self) -> SmallBox<Self, InlineSpace> {
        self.clone_inline()
    }
}
