use std::collections::BTreeSet;

/// Which book languages a query may see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LangFilter {
	All,
	Only(BTreeSet<String>),
}
impl LangFilter {
	/// Resolves caller-supplied languages.
	///
	/// Values may be repeated or comma separated. Nothing requested means `defaults`; any value
	/// equal to `all_sentinel` lifts the restriction entirely.
	pub fn resolve<S>(requested: &[S], defaults: &[String], all_sentinel: &str) -> Self
	where
		S: AsRef<str>,
	{
		let mut langs = BTreeSet::new();

		for raw in requested {
			for part in raw.as_ref().split(',') {
				let lang = part.trim().to_lowercase();

				if lang.is_empty() {
					continue;
				}
				if lang == all_sentinel {
					return Self::All;
				}

				langs.insert(lang);
			}
		}

		if langs.is_empty() {
			langs = defaults.iter().map(|lang| lang.trim().to_lowercase()).collect();
		}

		Self::Only(langs)
	}

	pub fn only<I, S>(langs: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Only(langs.into_iter().map(Into::into).collect())
	}

	/// Value bound to `lang = ANY($n)` style SQL, where `NULL` disables the check.
	pub fn as_sql(&self) -> Option<Vec<String>> {
		match self {
			Self::All => None,
			Self::Only(langs) => Some(langs.iter().cloned().collect()),
		}
	}

	/// Filter expression understood by the external search index.
	pub fn index_filter(&self, key: &str) -> Option<String> {
		match self {
			Self::All => None,
			Self::Only(langs) => {
				let joined = langs.iter().map(String::as_str).collect::<Vec<_>>().join(", ");

				Some(format!("{key} IN [{joined}]"))
			},
		}
	}
}
