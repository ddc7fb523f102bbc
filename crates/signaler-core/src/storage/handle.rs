//! Storage handle - Empty / Inline / Shared の 3 状態を持つ格納ハンドル
//!
//! # 状態
//! - `Empty`: payload なし
//! - `Inline`: `SMALL_OBJECT_THRESHOLD` 以下の値をハンドル内に保持
//! - `Shared`: それより大きい値を `Rc` で heap に保持
//!
//! # コピーとムーブ
//! - `Clone`: Inline は値ごとコピー、Shared は `Rc` を共有（O(1)）
//! - `take()`: 中身を取り出し、元のハンドルは `Empty` になる

use super::placement::{Duplicate, Erase, InlineSpace, Placement, fits_inline};
use smallbox::SmallBox;
use std::fmt;
use std::rc::Rc;

/// Type-erased value holder with small-buffer optimisation.
///
/// `T` is normally a trait object (`dyn Payload<..>`); the concrete value is
/// converted through [`Erase`] at the point where its type is still known.
pub enum Storage<T: ?Sized> {
    Empty,
    Inline(SmallBox<T, InlineSpace>),
    Shared(Rc<T>),
}

impl<T: ?Sized> Storage<T> {
    pub const fn new() -> Self {
        Storage::Empty
    }

    /// サイズに応じて inline / shared を選んで格納する
    pub fn from_value<V>(value: V) -> Self
    where
        T: Erase<V>,
    {
        if fits_inline::<V>() {
            Storage::Inline(T::inline(value))
        } else {
            Storage::Shared(T::shared(value))
        }
    }

    /// Replace the payload with `value`.
    ///
    /// The previous payload is released before the new one is placed.
    pub fn init<V>(&mut self, value: V) -> Placement
    where
        T: Erase<V>,
    {
        self.reset();
        *self = Self::from_value(value);
        self.placement()
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Storage::Empty => None,
            Storage::Inline(payload) => Some(&**payload),
            Storage::Shared(payload) => Some(&**payload),
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Storage::Empty => Placement::Empty,
            Storage::Inline(_) => Placement::Inline,
            Storage::Shared(_) => Placement::Shared,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Storage::Empty)
    }

    /// 共有している「他の」所有者の数
    ///
    /// 0 は唯一の所有者であることを表す。Inline / Empty は常に 0。
    pub fn share_count(&self) -> usize {
        match self {
            Storage::Shared(payload) => Rc::strong_count(payload) - 1,
            Storage::Empty | Storage::Inline(_) => 0,
        }
    }

    /// Whether both handles alias the same heap payload.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Storage::Shared(a), Storage::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// payload を手放して `Empty` に戻す
    ///
    /// Shared の場合は参照カウントを 1 減らすだけで、最後の所有者の時だけ解放される。
    pub fn reset(&mut self) {
        *self = Storage::Empty;
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<T: ?Sized> Default for Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Duplicate> Clone for Storage<T> {
    fn clone(&self) -> Self {
        match self {
            Storage::Empty => Storage::Empty,
            Storage::Inline(payload) => Storage::Inline((**payload).duplicate()),
            Storage::Shared(payload) => Storage::Shared(Rc::clone(payload)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("placement", &self.placement())
            .field("share_count", &self.share_count())
            .finish()
    }
}
