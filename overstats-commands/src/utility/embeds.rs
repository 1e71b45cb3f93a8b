use crate::CommandMeta;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

pub fn no_commands_message(category: Option<&str>) -> String {
    match category {
        Some(cat) => format!("No commands found in category: {}", display_category(cat)),
        None => "No commands are registered.".to_owned(),
    }
}

/// Commands listed under bold category headers, with their usage line.
pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!("`{}`: {}\n", command.usage, command.desc));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{grouped_help_description, unknown_category_message};
    use crate::CommandMeta;

    const SAVE: CommandMeta = CommandMeta {
        name: "save",
        desc: "Link a profile.",
        category: "stats",
        usage: "!save <region> <handle>",
    };
    const HELP: CommandMeta = CommandMeta {
        name: "help",
        desc: "List commands.",
        category: "utility",
        usage: "!help",
    };

    #[test]
    fn groups_under_headers() {
        let text = grouped_help_description(&[&SAVE, &HELP]);
        assert_eq!(
            text,
            "**Stats**\n`!save <region> <handle>`: Link a profile.\n\n**Utility**\n`!help`: List commands."
        );
    }

    #[test]
    fn empty_listing() {
        assert_eq!(grouped_help_description(&[]), "No commands available.");
    }

    #[test]
    fn unknown_category_lists_valid_ones() {
        assert_eq!(
            unknown_category_message("fun", &["stats", "utility"]),
            "Unknown category: Fun\nValid categories: Stats, Utility"
        );
    }
}
