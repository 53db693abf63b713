//! Hook executor - runs resolved hooks in order.

use tracing::debug;

use crate::catalog::HookContext;
use crate::table::ResolvedHook;

/// Invoke each hook in registration order with the same context.
pub fn run(hooks: &[ResolvedHook], ctx: &HookContext<'_>) {
    let _enter = ctx.span.enter();
    for resolved in hooks {
        debug!(
            phase = %ctx.phase,
            hook = %resolved.hook,
            block = ctx.block.and_then(|b| b.name()).unwrap_or("-"),
            "Running hook"
        );
        (resolved.f)(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HookCatalog;
    use crate::hook::{HookPhase, HookRef};
    use crate::table::HookTable;
    use indexmap::IndexMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut catalog = HookCatalog::new();
        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            catalog.register("blocks.blog", name, move |_| {
                log.lock().unwrap().push(name);
            });
        }

        let mut table = HookTable::default();
        table.attach(
            HookPhase::Start,
            &[
                HookRef::new("blocks.blog", "second"),
                HookRef::new("blocks.blog", "first"),
                HookRef::new("blocks.blog", "third"),
            ],
        );

        let blocks = IndexMap::new();
        let span = tracing::Span::none();
        let ctx = HookContext {
            phase: HookPhase::Start,
            block: None,
            blocks: &blocks,
            span: &span,
        };
        run(&table.resolve(HookPhase::Start, &catalog), &ctx);
        assert_eq!(*log.lock().unwrap(), vec!["second", "first", "third"]);
    }
}
