//! signaler-core
//!
//! Type-erased callables with small-buffer optimisation, and signal/slot
//! dispatch built on top of them.
//!
//! # モジュール構成
//! - **storage**: 格納エンジン（inline / `Rc` による共有 heap）
//! - **function**: `Function<Args, R>`（関数・メソッド・クロージャの型消去）
//! - **signal**: `Signal<Args>`（slot の順序付きリスト、Signal 同士の連鎖）
//! - **error**: エラー型
//!
//! すべて単一スレッド前提です（`Rc` / `RefCell` を使うので `Send` ではありません）。

pub mod storage;
pub mod function;
pub mod signal;
pub mod error;

pub use crate::error::{CallError, SignalError};
pub use crate::function::{Empty, Function};
pub use crate::signal::{ConnectionId, ScopedConnection, Signal};
pub use crate::storage::{Placement, SMALL_OBJECT_THRESHOLD};
