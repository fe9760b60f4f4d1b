//! Draft primitive
//!
//! The store never mutates the committed state. Each dispatch asks a
//! [`Producer`] for a mutable draft derived from the current state, lets the
//! action mutate it, and hands it back to the producer, which returns either
//! the base state itself (nothing changed) or a new state.

use std::sync::Arc;

/// Creates drafts from a base state and turns finished drafts into states
pub trait Producer<S>: Send + Sync {
    /// A mutable working copy of `base`
    fn create_draft(&self, base: &Arc<S>) -> S;

    /// The state described by `draft`.
    ///
    /// Must return `base` itself (same `Arc`) when the draft is unchanged.
    fn finish_draft(&self, base: &Arc<S>, draft: S) -> Arc<S>;

    /// Runs `recipe` against a draft of `base`. A failing recipe leaves
    /// `base` untouched and the draft is discarded.
    fn produce(
        &self,
        base: &Arc<S>,
        recipe: &mut dyn FnMut(&mut S) -> anyhow::Result<()>,
    ) -> anyhow::Result<Arc<S>> {
        let mut draft = self.create_draft(base);
        recipe(&mut draft)?;
        Ok(self.finish_draft(base, draft))
    }
}

/// Clone-based producer
///
/// Drafts are clones of the base state, so fields held behind `Arc` are
/// shared with the new state unless the action replaces them. An unchanged
/// draft is detected with `PartialEq`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloneProducer;

impl<S> Producer<S> for CloneProducer
where
    S: Clone + PartialEq + Send + Sync,
{
    fn create_draft(&self, base: &Arc<S>) -> S {
        S::clone(base)
    }

    fn finish_draft(&self, base: &Arc<S>, draft: S) -> Arc<S> {
        if draft == **base {
            Arc::clone(base)
        } else {
            Arc::new(draft)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        title: String,
        tags: Arc<Vec<String>>,
    }

    fn doc() -> Arc<Doc> {
        Arc::new(Doc {
            title: "draft".to_string(),
            tags: Arc::new(vec!["a".to_string(), "b".to_string()]),
        })
    }

    #[test]
    fn test_unchanged_draft_returns_base() {
        let base = doc();
        let next = CloneProducer.produce(&base, &mut |_draft| Ok(())).unwrap();
        assert!(Arc::ptr_eq(&base, &next));
    }

    #[test]
    fn test_write_of_equal_value_returns_base() {
        let base = doc();
        let next = CloneProducer
            .produce(&base, &mut |draft: &mut Doc| {
                draft.title = "draft".to_string();
                Ok(())
            })
            .unwrap();
        assert!(Arc::ptr_eq(&base, &next));
    }

    #[test]
    fn test_changed_draft_shares_untouched_fields() {
        let base = doc();
        let next = CloneProducer
            .produce(&base, &mut |draft: &mut Doc| {
                draft.title = "final".to_string();
                Ok(())
            })
            .unwrap();

        assert!(!Arc::ptr_eq(&base, &next));
        assert_eq!(base.title, "draft");
        assert_eq!(next.title, "final");
        assert!(Arc::ptr_eq(&base.tags, &next.tags));
    }

    #[test]
    fn test_failed_recipe_leaves_base_untouched() {
        let base = doc();
        let result = CloneProducer.produce(&base, &mut |draft: &mut Doc| {
            draft.title = "half-done".to_string();
            anyhow::bail!("recipe failed")
        });

        assert!(result.is_err());
        assert_eq!(base.title, "draft");
    }

    #[test]
    fn test_async_style_draft_round_trip() {
        let base = doc();
        let mut draft = CloneProducer.create_draft(&base);
        Arc::make_mut(&mut draft.tags).push("c".to_string());
        let next = CloneProducer.finish_draft(&base, draft);

        assert_eq!(base.tags.len(), 2);
        assert_eq!(next.tags.len(), 3);
        assert_eq!(base.title, next.title);
    }
}
