//! Signal - signal/slot 方式の multicast dispatch
//!
//! # 構成
//! - **registry**: `Signal<Args>` 本体（connect / disconnect / emit）
//! - **ids**: `ConnectionId`（disconnect 用の token）
//! - **scoped**: `ScopedConnection`（drop で disconnect する guard）
//! - **delegate**: Signal を別の Signal の slot にするための payload

pub mod ids;
pub mod registry;
pub mod scoped;
mod delegate;

// 主要な型を再エクスポート
pub use self::ids::{Connection, ConnectionId, Id, IdMarker};
pub use self::registry::Signal;
pub use self::scoped::ScopedConnection;
