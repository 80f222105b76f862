use core::time::Duration;

use crate::class::{ClassBuilder, ClassCodec, Construction, FieldOptions};

/// `{"secs": u64, "nanos": u32}`, with `nanos` below one second.
impl ClassCodec for Duration {
    fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
        let secs = class.param_with(Duration::as_secs, FieldOptions::new().with_label("secs"));
        let nanos = class.param_with(Duration::subsec_nanos, FieldOptions::new().with_label("nanos"));
        class.construct_validated(
            (secs, nanos),
            |(secs, nanos)| Duration::new(secs, nanos),
            |&(_, nanos)| nanos < 1_000_000_000,
        )
    }
}

crate::impl_class_codec!(Duration);
