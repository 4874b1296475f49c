use crate::rules::table::{RewriteRule, RuleTable, TableKind};
use std::borrow::Cow;

impl RewriteRule {
	/// Replace every non-overlapping match in `input`.
	pub fn apply<'t>(&self, input: &'t str) -> Cow<'t, str> {
		self.pattern
			.replace_all(input, self.replacement.as_str())
	}
}

impl RuleTable {
	/// Apply each rule in turn to the output of the previous one.
	///
	/// Returns the input unchanged (borrowed) when no rule matched.
	pub fn apply<'t>(&self, input: &'t str) -> Cow<'t, str> {
		let mut text = Cow::Borrowed(input);

		for rule in self.rules() {
			let replaced = match rule.apply(&text) {
				Cow::Owned(s) => Some(s),
				Cow::Borrowed(_) => None,
			};
			if let Some(s) = replaced {
				text = Cow::Owned(s);
			}
		}

		text
	}
}

/// Expand `~name(args)` shorthand into `@include name(args);`.
pub fn preprocess(input: &str) -> String {
	RuleTable::builtin(TableKind::Preprocess)
		.apply(input)
		.into_owned()
}

/// Turn `@include name(args);` back into `~name(args);`.
pub fn postprocess(input: &str) -> String {
	RuleTable::builtin(TableKind::Postprocess)
		.apply(input)
		.into_owned()
}
