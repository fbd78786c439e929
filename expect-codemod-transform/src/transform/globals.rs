//! Retarget mock factories from the removed binding to the `jest` global

use super::RewriteContext;
use crate::errors::Result;
use crate::tree::{EditSet, MatchRule, SourceTree};

const JEST_GLOBAL: &str = "jest";

/// Factories with the same name on the `jest` global
const JEST_FACTORIES: &[&str] = &["fn", "spyOn"];

/// `binding.fn` → `jest.fn`, `binding.spyOn` → `jest.spyOn`
pub(crate) fn retarget_mock_factories(
    tree: &mut SourceTree,
    context: &RewriteContext<'_>,
) -> Result<()> {
    let rule = MatchRule::member_accesses(
        tree.language(),
        &[context.binding],
        Some(JEST_FACTORIES),
    )?;
    let edits = {
        let mut edits = EditSet::new();
        for access in tree.find_all(&rule) {
            if let Some(object) = access.field("object") {
                edits.replace(object.range(), JEST_GLOBAL);
            }
        }
        edits
    };
    if tree.apply(&edits) {
        log::trace!("Retargeted mock factories to '{JEST_GLOBAL}' in {}", tree.path().display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;

    #[test]
    fn test_factories_use_jest_global() {
        let output = run(
            "import expectLib from 'expect';\nconst a = expectLib.fn();\nexpectLib.spyOn(o, 'm');\nexpectLib.extend({});\n",
        );
        assert_eq!(
            output.source,
            "const a = jest.fn();\njest.spyOn(o, 'm');\nexpectLib.extend({});\n"
        );
    }
}
