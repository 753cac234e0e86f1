//! Directive-name recognition: `v-name:arg.mod1.mod2`, and the `:`/`@`/`#`
//! shorthands for `v-bind`/`v-on`/`v-slot`, including the `[dynamic]`
//! argument form.
//!
//! No teacher file parses anything like this (`tag_processor.rs` only ever
//! sees plain attribute names); grounded on general recursive-descent style
//! carried over from the rest of this module rather than a specific source.

/// The parsed shape of an attribute name recognized as a directive.
pub struct ParsedDirectiveName {
    pub name: String,
    pub argument: Option<ParsedArgument>,
    pub modifiers: Vec<String>,
}

pub struct ParsedArgument {
    pub content: String,
    pub is_dynamic: bool,
    pub missing_bracket_end: bool,
}

/// Returns `None` for attribute names that are not directives at all.
pub fn parse_directive_name(name: &str) -> Option<ParsedDirectiveName> {
    let (directive_name, remainder) = if let Some(body) = name.strip_prefix("v-") {
        let end = body.find([':', '.']).unwrap_or(body.len());
        (body[..end].to_ascii_lowercase(), &body[end..])
    } else if name.starts_with(':') {
        ("bind".to_string(), name)
    } else if name.starts_with('@') {
        ("on".to_string(), name)
    } else if name.starts_with('#') {
        ("slot".to_string(), name)
    } else {
        return None;
    };

    let mut argument = None;
    let mut modifiers_part = remainder;
    if let Some(rest) = remainder
        .strip_prefix(':')
        .or_else(|| remainder.strip_prefix('@'))
        .or_else(|| remainder.strip_prefix('#'))
    {
        let arg_end = rest.find('.').unwrap_or(rest.len());
        let arg_text = &rest[..arg_end];
        modifiers_part = &rest[arg_end..];
        argument = Some(match arg_text.strip_prefix('[') {
            Some(inner) => match inner.find(']') {
                Some(close) => ParsedArgument {
                    content: inner[..close].to_string(),
                    is_dynamic: true,
                    missing_bracket_end: false,
                },
                None => ParsedArgument {
                    content: inner.to_string(),
                    is_dynamic: true,
                    missing_bracket_end: true,
                },
            },
            None => ParsedArgument {
                content: arg_text.to_string(),
                is_dynamic: false,
                missing_bracket_end: false,
            },
        });
    }

    let modifiers = modifiers_part
        .split('.')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    Some(ParsedDirectiveName {
        name: directive_name,
        argument,
        modifiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_directive_no_argument() {
        let parsed = parse_directive_name("v-if").unwrap();
        assert_eq!(parsed.name, "if");
        assert!(parsed.argument.is_none());
        assert!(parsed.modifiers.is_empty());
    }

    #[test]
    fn static_argument_with_modifier() {
        let parsed = parse_directive_name("v-on:click.stop").unwrap();
        assert_eq!(parsed.name, "on");
        let arg = parsed.argument.unwrap();
        assert_eq!(arg.content, "click");
        assert!(!arg.is_dynamic);
        assert_eq!(parsed.modifiers, vec!["stop".to_string()]);
    }

    #[test]
    fn dynamic_argument_with_modifier() {
        let parsed = parse_directive_name("v-bind:[key].sync").unwrap();
        assert_eq!(parsed.name, "bind");
        let arg = parsed.argument.unwrap();
        assert_eq!(arg.content, "key");
        assert!(arg.is_dynamic);
        assert!(!arg.missing_bracket_end);
        assert_eq!(parsed.modifiers, vec!["sync".to_string()]);
    }

    #[test]
    fn unterminated_dynamic_argument() {
        let parsed = parse_directive_name("v-bind:[key").unwrap();
        let arg = parsed.argument.unwrap();
        assert_eq!(arg.content, "key");
        assert!(arg.missing_bracket_end);
    }

    #[test]
    fn shorthand_bind() {
        let parsed = parse_directive_name(":href").unwrap();
        assert_eq!(parsed.name, "bind");
        assert_eq!(parsed.argument.unwrap().content, "href");
    }

    #[test]
    fn shorthand_on() {
        let parsed = parse_directive_name("@click").unwrap();
        assert_eq!(parsed.name, "on");
        assert_eq!(parsed.argument.unwrap().content, "click");
    }

    #[test]
    fn shorthand_slot() {
        let parsed = parse_directive_name("#default").unwrap();
        assert_eq!(parsed.name, "slot");
        assert_eq!(parsed.argument.unwrap().content, "default");
    }

    #[test]
    fn plain_attribute_is_not_a_directive() {
        assert!(parse_directive_name("class").is_none());
    }
}
