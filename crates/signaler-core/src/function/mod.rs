//! Function - 型消去された呼び出し可能オブジェクト
//!
//! `Function<Args, R>` は「`Args` を受け取り `R` を返す何か」を 1 つ保持します。
//! 中身は [`Storage`](crate::storage::Storage) に inline か heap で置かれます。
//!
//! # 二層構造
//! - **表層（Typed）**: `Callable` / `Method` / `MethodMut` - 関数・メソッド・クロージャの呼び出し形
//! - **内部（Dyn）**: `Payload` trait - object-safe, type erasure
//!
//! # Adapters
//! - `FreeFn`: 関数（fn item / fn pointer）
//! - `BoundMethod` / `BoundMethodMut`: オブジェクト + メソッド
//! - `Closure`: 任意のクロージャ

pub mod callable;
pub mod payload;
pub mod adapters;
pub mod wrapper;

// 主要な trait/型 を再エクスポート
pub use self::adapters::{BoundMethod, BoundMethodMut, Closure, FreeFn};
pub use self::callable::{Callable, Method, MethodMut};
pub use self::payload::{Payload, inline_copy};
pub use self::wrapper::{Empty, Function};
