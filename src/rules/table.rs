use crate::error::{Result, TildeError};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Callee of a shorthand call or include directive, e.g. `button-style` or
/// `breakpoint($md)`. Case folding stays ASCII so `K` (Kelvin) and `ſ` do
/// not count as letters.
macro_rules! callee {
	() => {
		r#"((?-u:[$a-zA-Z0-9._ \-(),"'])+)"#
	};
}

/// Built-in preprocess rules, in precedence order.
pub const PREPROCESS_RULES: &[RuleSpec] = &[
	// `~name(args)` at the end of a line; keeps the line terminator.
	RuleSpec::new(
		concat!("~", callee!(), r"\(([^\r\n]*)\)[ ]*(\r*\n)"),
		"@include ${1}(${2}); ${3}",
	),
	// `~name(args)` as the last statement of a block.
	RuleSpec::new(
		concat!("~", callee!(), r"\(([^}{]*)\)\s+\}"),
		"@include ${1}(${2}); }",
	),
	// `~name(args);`
	RuleSpec::new(
		concat!("~", callee!(), r"\(([^;{]*)\);"),
		"@include ${1}(${2});",
	),
];

/// Built-in postprocess rules.
pub const POSTPROCESS_RULES: &[RuleSpec] = &[RuleSpec::new(
	concat!("(?-u:@include )", callee!(), r"\(([^;{]*)\);"),
	"~${1}(${2});",
)];

static PREPROCESS: LazyLock<RuleTable> = LazyLock::new(|| {
	RuleTable::compile(TableKind::Preprocess, PREPROCESS_RULES)
		.expect("built-in preprocess rules are valid regexes")
});

static POSTPROCESS: LazyLock<RuleTable> = LazyLock::new(|| {
	RuleTable::compile(TableKind::Postprocess, POSTPROCESS_RULES)
		.expect("built-in postprocess rules are valid regexes")
});

/// Which side of the compile step a table runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
	Preprocess,
	Postprocess,
}

impl TableKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			TableKind::Preprocess => "preprocess",
			TableKind::Postprocess => "postprocess",
		}
	}
}

/// An uncompiled pattern/replacement pair, as declared in code or in a
/// `[[preprocess]]` / `[[postprocess]]` entry of `Tildefile.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSpec {
	/// Regular expression, always matched case-insensitively.
	pub pattern: Cow<'static, str>,

	/// Replacement template; `$1` / `${1}` refer to capture groups.
	pub replacement: Cow<'static, str>,
}

impl RuleSpec {
	pub const fn new(pattern: &'static str, replacement: &'static str) -> Self {
		RuleSpec {
			pattern: Cow::Borrowed(pattern),
			replacement: Cow::Borrowed(replacement),
		}
	}
}

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
	pub pattern: Regex,
	pub replacement: String,
}

impl RewriteRule {
	/// Compile a rule spec. Matching is case-insensitive.
	pub fn compile(spec: &RuleSpec) -> Result<Self> {
		let pattern = RegexBuilder::new(&spec.pattern)
			.case_insensitive(true)
			.build()
			.map_err(|source| TildeError::InvalidRegex {
				pattern: spec.pattern.to_string(),
				source,
			})?;

		Ok(RewriteRule {
			pattern,
			replacement: spec.replacement.to_string(),
		})
	}
}

/// An ordered list of rewrite rules applied as a single pass.
#[derive(Debug, Clone)]
pub struct RuleTable {
	kind: TableKind,
	rules: Vec<RewriteRule>,
}

impl RuleTable {
	/// Compile every spec in order.
	pub fn compile(kind: TableKind, specs: &[RuleSpec]) -> Result<Self> {
		let rules = specs
			.iter()
			.map(RewriteRule::compile)
			.collect::<Result<Vec<_>>>()?;
		Ok(RuleTable { kind, rules })
	}

	/// The built-in table for `kind`.
	pub fn builtin(kind: TableKind) -> &'static RuleTable {
		match kind {
			TableKind::Preprocess => &*PREPROCESS,
			TableKind::Postprocess => &*POSTPROCESS,
		}
	}

	pub fn kind(&self) -> TableKind {
		self.kind
	}

	pub fn rules(&self) -> &[RewriteRule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

/// Compile `specs` when given, otherwise fall back to the built-in table.
pub fn table_or_builtin(
	kind: TableKind,
	specs: Option<&[RuleSpec]>,
) -> Result<Cow<'static, RuleTable>> {
	match specs {
		Some(specs) => Ok(Cow::Owned(RuleTable::compile(kind, specs)?)),
		None => Ok(Cow::Borrowed(RuleTable::builtin(kind))),
	}
}
