//! SignalSlot - 別の Signal に emit を委譲する payload

use super::registry::SignalCore;
use crate::function::{Payload, inline_copy};
use crate::storage::InlineSpace;
use smallbox::SmallBox;
use std::rc::Weak;

/// 委譲先の Signal は `Weak` で持つ。委譲先が drop されたら何もしない
///
/// 委譲先がすでに dispatch 中なら emit しない。連鎖が循環していても各 Signal は
/// 1 回ずつしか呼ばれない。
pub(crate) struct SignalSlot<Args> {
    target: Weak<SignalCore<Args>>,
}

impl<Args> SignalSlot<Args> {
    pub(crate) fn new(target: Weak<SignalCore<Args>>) -> Self {
        Self { target }
    }
}

impl<Args> Clone for SignalSlot<Args> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<Args: Clone + 'static> Payload<Args, ()> for SignalSlot<Args> {
    fn invoke(&self, args: Args) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        if target.is_dispatching() {
            tracing::warn!("chained emission into a dispatching signal skipped");
            return;
        }
        target.emit(args);
    }

    fn clone_inline(&self) -> SmallBox<dyn Payload<Args, ()>, InlineSpace> {
        inline_copy(self)
    }
}
