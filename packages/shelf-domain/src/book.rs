use std::collections::BTreeSet;

const FB2_CONVERSIONS: [&str; 4] = ["fb2", "epub", "mobi", "fb2zip"];

/// Download formats offered for a stored file type. FB2 sources can be converted on demand.
pub fn available_types(file_type: &str) -> Vec<String> {
	if file_type == "fb2" {
		return FB2_CONVERSIONS.iter().map(|kind| kind.to_string()).collect();
	}

	vec![file_type.to_string()]
}

/// Union of the formats offered for several stored files, sorted.
pub fn merged_available_types<I, S>(file_types: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	file_types
		.into_iter()
		.flat_map(|file_type| available_types(file_type.as_ref()))
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}
