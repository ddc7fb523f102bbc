//! Call shapes - 引数タプルで表した呼び出しの形
//!
//! Rust には可変長ジェネリクスがないので、引数列はタプル `(A1, A2, ..)` で表します。
//! 0〜6 引数の `Fn` に対してマクロで実装しています。
//!
//! # 学習ポイント
//! - 引数タプルを trait パラメータにすることで arity ごとの impl が重ならない
//! - `Fn(&O, A1)` は `for<'a> Fn(&'a O, A1)` なので `Type::method` をそのまま渡せる

/// Anything invocable with the argument tuple `Args`, returning `R`.
pub trait Callable<Args, R> {
    fn call(&self, args: Args) -> R;
}

/// A method taking `&O`, e.g. `Widget::report` for `fn report(&self, v: i32)`.
pub trait Method<O: ?Sized, Args, R> {
    fn call_method(&self, target: &O, args: Args) -> R;
}

/// A method taking `&mut O`.
pub trait MethodMut<O: ?Sized, Args, R> {
    fn call_method_mut(&self, target: &mut O, args: Args) -> R;
}

macro_rules! impl_call_shapes {
    ($($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> Callable<($($ty,)*), R> for F
        where
            F: Fn($($ty),*) -> R,
        {
            #[inline]
            fn call(&self, ($($arg,)*): ($($ty,)*)) -> R {
                (self)($($arg),*)
            }
        }

        impl<F, O: ?Sized, R, $($ty,)*> Method<O, ($($ty,)*), R> for F
        where
            F: Fn(&O, $($ty),*) -> R,
        {
            #[inline]
            fn call_method(&self, target: &O, ($($arg,)*): ($($ty,)*)) -> R {
                (self)(target, $($arg),*)
            }
        }

        impl<F, O: ?Sized, R, $($ty,)*> MethodMut<O, ($($ty,)*), R> for F
        where
            F: Fn(&mut O, $($ty),*) -> R,
        {
            #[inline]
            fn call_method_mut(&self, target: &mut O, ($($arg,)*): ($($ty,)*)) -> R {
                (self)(target, $($arg),*)
            }
        }
    };
}

impl_call_shapes!();
impl_call_shapes!(A1 a1);
impl_call_shapes!(A1 a1, A2 a2);
impl_call_shapes!(A1 a1, A2 a2, A3 a3);
impl_call_shapes!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_call_shapes!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_call_shapes!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

#[cfg(test)]
mod tests {
    use super::*;

    struct Meter {
        scale: i32,
    }

    impl Meter {
        fn scaled(&self, value: i32) -> i32 {
            value * self.scale
        }

        fn rescale(&mut self, scale: i32) {
            self.scale = scale;
        }
    }

    fn sum3(a: i32, b: i32, c: i32) -> i32 {
        a + b + c
    }

    #[test]
    fn free_functions_take_argument_tuples() {
        assert_eq!(Callable::call(&sum3, (1, 2, 3)), 6);
        assert_eq!(Callable::<(), &str>::call(&|| "unit", ()), "unit");
    }

    #[test]
    fn methods_receive_their_target() {
        let mut meter = Meter { scale: 3 };
        assert_eq!(Meter::scaled.call_method(&meter, (2,)), 6);

        Meter::rescale.call_method_mut(&mut meter, (10,));
        assert_eq!(meter.scale, 10);
    }
}
