/// Invokes a macro once for every prefix of an indexed parameter list.
///
/// Each `index: Ident` pair names one tuple slot. The target macro receives
/// the growing prefix, starting from the empty one, which makes this handy
/// for implementing a trait on every tuple arity at once.
///
/// # Examples
///
/// ```ignore
/// range_invoke!(my_macro, [0: P0, 1: P1, 2: P2]);
/// // expands to ↓
/// my_macro!([]);
/// my_macro!([0: P0]);
/// my_macro!([0: P0, 1: P1]);
/// my_macro!([0: P0, 1: P1, 2: P2]);
/// ```
///
/// ```
/// macro_rules! arity {
///     ([$($index:tt: $name:ident),*]) => {
///         impl<$($name),*> Arity for ($($name,)*) {
///             const ARITY: usize = {
///                 let slots: &[usize] = &[$($index),*];
///                 slots.len()
///             };
///         }
///     };
/// }
///
/// trait Arity {
///     const ARITY: usize;
/// }
///
/// vc_utils::range_invoke!(arity, [0: P0, 1: P1, 2: P2]);
///
/// assert_eq!(<()>::ARITY, 0);
/// assert_eq!(<(u8, u16, u32)>::ARITY, 3);
/// ```
#[macro_export]
macro_rules! range_invoke {
    ($macro:ident, [$($index:tt: $name:ident),* $(,)?]) => {
        $crate::range_invoke!(@step $macro, [], [$($index: $name),*]);
    };
    (@step $macro:ident, [$($done:tt: $done_name:ident),*], []) => {
        $macro!([$($done: $done_name),*]);
    };
    (@step $macro:ident, [$($done:tt: $done_name:ident),*], [$next:tt: $next_name:ident $(, $rest:tt: $rest_name:ident)*]) => {
        $macro!([$($done: $done_name),*]);
        $crate::range_invoke!(@step $macro, [$($done: $done_name,)* $next: $next_name], [$($rest: $rest_name),*]);
    };
}
