pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_sources.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_sources.sql")),
				"tables/002_authors.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_authors.sql")),
				"tables/003_author_annotations.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_author_annotations.sql")),
				"tables/004_books.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_books.sql")),
				"tables/005_book_annotations.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_book_annotations.sql")),
				"tables/006_book_authors.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_book_authors.sql")),
				"tables/007_translations.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_translations.sql")),
				"tables/008_sequences.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_sequences.sql")),
				"tables/009_book_sequences.sql" =>
					out.push_str(include_str!("../../../sql/tables/009_book_sequences.sql")),
				"tables/010_genres.sql" =>
					out.push_str(include_str!("../../../sql/tables/010_genres.sql")),
				"tables/011_book_genres.sql" =>
					out.push_str(include_str!("../../../sql/tables/011_book_genres.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
