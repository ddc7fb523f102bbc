//! Placement - inline / heap の配置判定
//!
//! # 学習ポイント
//! - `const fn` によるコンパイル時のサイズ判定
//! - unsizing coercion を trait 経由で行う（`Erase<V>`）
//! - `?Sized` な trait object を inline のままコピーする（`Duplicate`）

use serde::Serialize;
use smallbox::SmallBox;
use smallbox::space::S2;
use std::mem::{align_of, size_of};
use std::rc::Rc;

/// Inline バッファの形（2 ワード）
pub type InlineSpace = S2;

/// Inline に置ける payload の最大サイズ（バイト）
pub const SMALL_OBJECT_THRESHOLD: usize = size_of::<InlineSpace>();

/// `V` を inline に置けるかどうか
///
/// `SmallBox` はバッファより強いアラインメントを要求する値を黙って heap に
/// 逃がすので、ここでも同じ条件で判定する。
pub const fn fits_inline<V>() -> bool {
    size_of::<V>() <= SMALL_OBJECT_THRESHOLD && align_of::<V>() <= align_of::<InlineSpace>()
}

/// Where a [`Storage`](super::Storage) keeps its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Empty,
    Inline,
    Shared,
}

/// Erase は具体型 `V` を trait object `Self` に変換する
///
/// `Storage<dyn Trait>` からは具体型が見えないため、coercion は
/// 具体型が見えている実装側で行います。
///
/// # 使用例
/// ```ignore
/// impl<V: Blob + 'static> Erase<V> for dyn Blob {
///     fn inline(value: V) -> SmallBox<Self, InlineSpace> { smallbox!(value) }
///     fn shared(value: V) -> Rc<Self> { Rc::new(value) }
/// }
/// ```
pub trait Erase<V> {
    fn inline(value: V) -> SmallBox<Self, InlineSpace>;
    fn shared(value: V) -> Rc<Self>;
}

/// Duplicate は inline payload を値としてコピーする
///
/// heap 側のコピーは `Rc::clone` で済むので、この trait は inline の時だけ呼ばれます。
pub trait Duplicate {
    fn duplicate(&self) -> SmallBox<Self, InlineSpace>;
}
