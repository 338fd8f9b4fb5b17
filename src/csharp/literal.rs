use crate::symbols::{Constant, ConstantExpr, TypeRef};
use tree_sitter::Node;

/// Evaluates a literal expression to a constant. Anything that would need
/// semantic analysis (member access, `nameof`, `default`, operators other
/// than unary sign) comes back as `Unresolved` with the source text.
pub fn evaluate(node: Node<'_>, source: &str) -> ConstantExpr {
    match constant_of(node, source) {
        Some(value) => ConstantExpr::Constant(value),
        None => ConstantExpr::Unresolved(super::syntax::node_text(node, source)),
    }
}

fn constant_of(node: Node<'_>, source: &str) -> Option<Constant> {
    let text = super::syntax::node_text(node, source);
    match node.kind() {
        "string_literal" => unescape_regular(strip_quotes(&text, '"')?).map(Constant::String),
        "verbatim_string_literal" => {
            let inner = text.strip_prefix('@')?;
            Some(Constant::String(strip_quotes(inner, '"')?.replace("\"\"", "\"")))
        }
        "raw_string_literal" => raw_string(&text).map(Constant::String),
        "character_literal" => {
            let value = unescape_regular(strip_quotes(&text, '\'')?)?;
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some(Constant::Char(ch)),
                _ => None,
            }
        }
        "integer_literal" => parse_integer(&text),
        "real_literal" => parse_real(&text),
        "boolean_literal" => match text.as_str() {
            "true" => Some(Constant::Bool(true)),
            "false" => Some(Constant::Bool(false)),
            _ => None,
        },
        "null_literal" => Some(Constant::Null),
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next()?;
            constant_of(inner, source)
        }
        "prefix_unary_expression" => {
            let operand = node
                .child_by_field_name("operand")
                .or_else(|| last_named_child(node))?;
            let value = constant_of(operand, source)?;
            if text.starts_with('-') {
                negate(value)
            } else if text.starts_with('+') {
                Some(value)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn last_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).last()
}

fn negate(value: Constant) -> Option<Constant> {
    match value {
        Constant::Int(v) => v.checked_neg().map(Constant::Int),
        // -9223372036854775808 lexes as a positive literal that only fits in u64.
        Constant::UInt(v) if v == i64::MIN.unsigned_abs() => Some(Constant::Int(i64::MIN)),
        Constant::Float(v) => Some(Constant::Float(-v)),
        _ => None,
    }
}

fn strip_quotes(raw: &str, quote: char) -> Option<&str> {
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner)
}

fn raw_string(raw: &str) -> Option<String> {
    let quote_count = raw.chars().take_while(|ch| *ch == '"').count();
    if quote_count < 3 || raw.len() < quote_count * 2 {
        return None;
    }
    let fence = "\"".repeat(quote_count);
    let inner = raw.strip_prefix(&fence)?.strip_suffix(&fence)?;
    if !inner.contains('\n') {
        return Some(inner.to_string());
    }
    // Multi-line raw strings drop the opening and closing lines and the
    // closing line's indentation from every content line.
    let lines: Vec<&str> = inner.lines().collect();
    if lines.len() < 2 {
        return Some(inner.to_string());
    }
    let closing = lines[lines.len() - 1];
    let indent = closing.len() - closing.trim_start().len();
    let body: Vec<&str> = lines[1..lines.len() - 1]
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect();
    Some(body.join("\n"))
}

fn unescape_regular(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let escaped = match chars.next()? {
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'e' => '\u{1b}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            'x' => {
                // \x takes one to four hex digits.
                let rest = chars.as_str();
                let digits = rest
                    .chars()
                    .take(4)
                    .take_while(|c| c.is_ascii_hexdigit())
                    .count();
                if digits == 0 {
                    return None;
                }
                let value = u32::from_str_radix(&rest[..digits], 16).ok()?;
                for _ in 0..digits {
                    chars.next();
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return None;
    }
    char::from_u32(u32::from_str_radix(&digits, 16).ok()?)
}

fn parse_integer(raw: &str) -> Option<Constant> {
    let cleaned = raw.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    let digits = lower.trim_end_matches(['u', 'l']);
    let value = if let Some(hex) = digits.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<u64>().ok()?
    };
    Some(match i64::try_from(value) {
        Ok(signed) => Constant::Int(signed),
        Err(_) => Constant::UInt(value),
    })
}

fn parse_real(raw: &str) -> Option<Constant> {
    let cleaned = raw.replace('_', "");
    let digits = cleaned.trim_end_matches(['f', 'F', 'd', 'D', 'm', 'M']);
    digits.parse::<f64>().ok().map(Constant::Float)
}

/// Converts a default value to the parameter's declared type the way the
/// compiler does for implicit numeric conversions, e.g. `double x = 1`.
pub fn convert_to(value: ConstantExpr, ty: &TypeRef) -> ConstantExpr {
    match value {
        ConstantExpr::Constant(constant) => ConstantExpr::Constant(constant.for_type(ty)),
        unresolved => unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Primitive;

    #[test]
    fn integer_forms() {
        assert_eq!(parse_integer("1"), Some(Constant::Int(1)));
        assert_eq!(parse_integer("1_000"), Some(Constant::Int(1000)));
        assert_eq!(parse_integer("0xFF"), Some(Constant::Int(255)));
        assert_eq!(parse_integer("0b101"), Some(Constant::Int(5)));
        assert_eq!(parse_integer("10UL"), Some(Constant::Int(10)));
        assert_eq!(
            parse_integer("18446744073709551615"),
            Some(Constant::UInt(u64::MAX))
        );
    }

    #[test]
    fn real_forms() {
        assert_eq!(parse_real("1.5"), Some(Constant::Float(1.5)));
        assert_eq!(parse_real("2f"), Some(Constant::Float(2.0)));
        assert_eq!(parse_real("1e3"), Some(Constant::Float(1000.0)));
        assert_eq!(parse_real("0.25m"), Some(Constant::Float(0.25)));
    }

    #[test]
    fn escapes() {
        assert_eq!(unescape_regular(r"a\tb").as_deref(), Some("a\tb"));
        assert_eq!(unescape_regular(r#"\"q\""#).as_deref(), Some("\"q\""));
        assert_eq!(unescape_regular(r"A").as_deref(), Some("A"));
        assert_eq!(unescape_regular(r"\x41z").as_deref(), Some("Az"));
        assert_eq!(unescape_regular(r"\q"), None);
    }

    #[test]
    fn raw_strings() {
        assert_eq!(raw_string(r#""""a "b" c""""#).as_deref(), Some(r#"a "b" c"#));
        let multi = "\"\"\"\n    one\n      two\n    \"\"\"";
        assert_eq!(raw_string(multi).as_deref(), Some("one\n  two"));
    }

    #[test]
    fn negation() {
        assert_eq!(negate(Constant::Int(3)), Some(Constant::Int(-3)));
        assert_eq!(
            negate(Constant::UInt(9_223_372_036_854_775_808)),
            Some(Constant::Int(i64::MIN))
        );
        assert_eq!(negate(Constant::String("x".into())), None);
    }

    #[test]
    fn numeric_conversion_follows_parameter_type() {
        let double = TypeRef::primitive(Primitive::Double);
        assert_eq!(
            convert_to(ConstantExpr::Constant(Constant::Int(1)), &double),
            ConstantExpr::Constant(Constant::Float(1.0))
        );
        let int = TypeRef::primitive(Primitive::Int);
        assert_eq!(
            convert_to(ConstantExpr::Constant(Constant::Int(1)), &int),
            ConstantExpr::Constant(Constant::Int(1))
        );
    }
}
