pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_items.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_items.sql")),
				"tables/002_tags.sql" => out.push_str(include_str!("../../../sql/tables/002_tags.sql")),
				"tables/003_tag_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_tag_documents.sql")),
				"tables/004_controversial_items.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_controversial_items.sql")),
				"views/001_random_items_nsfl.sql" =>
					out.push_str(include_str!("../../../sql/views/001_random_items_nsfl.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
