/// Invokes `$macro` once per tuple arity, from `0` up to the given list.
///
/// Each invocation receives the arity and the `index: Ident` pairs of the
/// tuple, so an implementation can name both the field and its type.
///
/// # Example
///
/// ```ignore
/// tuple_invoke!(impl_for_tuple, [0: P0, 1: P1, 2: P2]);
/// // eq to ↓
/// impl_for_tuple!(0: []);
/// impl_for_tuple!(1: [0: P0]);
/// impl_for_tuple!(2: [0: P0, 1: P1]);
/// impl_for_tuple!(3: [0: P0, 1: P1, 2: P2]);
/// ```
#[macro_export]
macro_rules! tuple_invoke {
    ($macro:ident, [$($idx:tt : $ty:ident),*]) => {
        $crate::tuple_invoke!(@step $macro, [], [$($idx : $ty),*]);
    };
    (@step $macro:ident, [$($done_idx:tt : $done_ty:ident),*], []) => {
        $macro!({ 0 $(+ { let _ = $done_idx; 1 })* }: [$($done_idx : $done_ty),*]);
    };
    (
        @step $macro:ident,
        [$($done_idx:tt : $done_ty:ident),*],
        [$next_idx:tt : $next_ty:ident $(, $rest_idx:tt : $rest_ty:ident)*]
    ) => {
        $macro!({ 0 $(+ { let _ = $done_idx; 1 })* }: [$($done_idx : $done_ty),*]);
        $crate::tuple_invoke!(
            @step $macro,
            [$($done_idx : $done_ty,)* $next_idx : $next_ty],
            [$($rest_idx : $rest_ty),*]
        );
    };
}

#[cfg(test)]
mod tests {
    macro_rules! arity {
        ($len:tt: [$($idx:tt : $ty:ident),*]) => {
            impl Arity for ($($ty,)*) {
                const LEN: usize = $len;
            }
        };
    }

    trait Arity {
        const LEN: usize;
    }

    crate::tuple_invoke!(arity, [0: u8, 1: u16, 2: u32]);

    #[test]
    fn arity_matches_tuple_length() {
        assert_eq!(<() as Arity>::LEN, 0);
        assert_eq!(<(u8,) as Arity>::LEN, 1);
        assert_eq!(<(u8, u16) as Arity>::LEN, 2);
        assert_eq!(<(u8, u16, u32) as Arity>::LEN, 3);
    }
}
