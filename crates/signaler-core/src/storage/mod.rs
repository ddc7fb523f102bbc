//! Storage - small-buffer 最適化つきの格納エンジン
//!
//! 値をサイズに応じて inline（ハンドル内の 2 ワードのバッファ）か
//! heap（`Rc` による共有所有）に置きます。
//!
//! # 二層構造
//! - **placement**: 閾値と配置判定、型消去のための `Erase` / `Duplicate` trait
//! - **handle**: `Storage<T>` 本体（Empty / Inline / Shared の sum type）

pub mod placement;
pub mod handle;

// 主要な trait/型 を再エクスポート
pub use self::handle::Storage;
pub use self::placement::{
    Duplicate, Erase, InlineSpace, Placement, SMALL_OBJECT_THRESHOLD, fits_inline,
};
