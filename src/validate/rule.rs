use crate::core::Value;
use crate::validate::ValidationMessage;

/// A single property-rule evaluator.
///
/// Receives the property name and its current value; returns a message when
/// the rule is violated. Evaluators are supplied by the consumer (or built
/// from the stock constructors below) and run in declaration order, after the
/// required rule.
pub type Rule = Box<dyn Fn(&str, &Value) -> Option<ValidationMessage> + Send + Sync>;

pub fn custom<F>(rule: F) -> Rule
where
    F: Fn(&str, &Value) -> Option<ValidationMessage> + Send + Sync + 'static,
{
    Box::new(rule)
}

/// Non-null and, for text, non-empty. Always evaluated first when a property
/// is declared required.
pub fn required() -> Rule {
    Box::new(|name, value| {
        let missing = match value {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        };
        if missing {
            Some(ValidationMessage::error(name, "is required"))
        } else {
            None
        }
    })
}

pub fn min_integer(min: i64) -> Rule {
    Box::new(move |name, value| match value.as_i64() {
        Some(actual) if actual < min => Some(ValidationMessage::error(
            name,
            format!("must be at least {} (was {})", min, actual),
        )),
        _ => None,
    })
}

pub fn max_integer(max: i64) -> Rule {
    Box::new(move |name, value| match value.as_i64() {
        Some(actual) if actual > max => Some(ValidationMessage::error(
            name,
            format!("must be at most {} (was {})", max, actual),
        )),
        _ => None,
    })
}

pub fn min_float(min: f64) -> Rule {
    Box::new(move |name, value| match value.as_f64() {
        Some(actual) if actual < min => Some(ValidationMessage::error(
            name,
            format!("must be at least {} (was {})", min, actual),
        )),
        _ => None,
    })
}

pub fn max_length(max: usize) -> Rule {
    Box::new(move |name, value| match value.as_str() {
        Some(s) if s.chars().count() > max => Some(ValidationMessage::error(
            name,
            format!("must be at most {} characters", max),
        )),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_null_and_empty_text() {
        let rule = required();
        assert!(rule("name", &Value::Null).is_some());
        assert!(rule("name", &Value::Text(String::new())).is_some());
        assert!(rule("name", &Value::Text("Ada".into())).is_none());
        assert!(rule("age", &Value::Integer(0)).is_none());
    }

    #[test]
    fn test_min_integer_boundary() {
        let rule = min_integer(18);
        assert!(rule("age", &Value::Integer(17)).is_some());
        assert!(rule("age", &Value::Integer(18)).is_none());
        // Non-numeric values are another rule's concern
        assert!(rule("age", &Value::Null).is_none());
    }

    #[test]
    fn test_max_length_counts_chars() {
        let rule = max_length(3);
        assert!(rule("code", &Value::from("abcd")).is_some());
        assert!(rule("code", &Value::from("abc")).is_none());
    }
}
